//! Host-side collaborators: the layout queries the core reads, the overlay style sink it writes,
//! and the render state it consults.

pub(crate) mod document;
pub(crate) mod scene;
pub(crate) mod style;

use crate::foundation::core::{ElementId, OverlayBoxId, Rect, Size, Vec2};
use crate::foundation::error::OverlayResult;
use style::{ComputedStyle, StyleProp, Visibility};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Measurement quirks of the host environment, detected once by the embedder.
pub struct HostQuirks {
    /// The rectangle query misreports size after scrolling; take width/height from the
    /// element's offset size instead.
    pub offset_size_dimensions: bool,
    /// The host mixes logical and device pixels. Width/height come from the offset size and a
    /// pixel ratio `offset_width / rect_width` corrects every derived offset.
    pub logical_zoom_ratio: bool,
    /// The host cannot render `position: fixed`; fixed targets are anchored like any other.
    pub no_fixed_positioning: bool,
}

impl HostQuirks {
    /// `true` when width/height must come from the offset size.
    pub fn uses_offset_size(self) -> bool {
        self.offset_size_dimensions || self.logical_zoom_ratio
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Document-level scroll and client-edge offsets.
pub struct DocumentMetrics {
    /// Document scroll offset (`scrollLeft`, `scrollTop`).
    pub scroll: Vec2,
    /// Width of the document's client-edge border (`clientLeft`, `clientTop`).
    pub client_edge: Vec2,
}

/// Read-only layout queries answered by the host document.
pub trait LayoutHost {
    /// Viewport-relative rectangle of `el` (`x0/y0` = left/top, `x1/y1` = right/bottom).
    fn bounding_client_rect(&self, el: ElementId) -> OverlayResult<Rect>;

    /// Intrinsic layout size of `el` (`offsetWidth`, `offsetHeight`).
    fn offset_size(&self, el: ElementId) -> OverlayResult<Size>;

    /// Parent element, or `None` at the top of the tree.
    fn parent(&self, el: ElementId) -> OverlayResult<Option<ElementId>>;

    /// Nearest offset parent, or `None` when there is none.
    fn offset_parent(&self, el: ElementId) -> OverlayResult<Option<ElementId>>;

    /// `true` for the element at which ancestor walks stop (the document body).
    fn is_document_root(&self, el: ElementId) -> OverlayResult<bool>;

    /// Upper- or lower-case tag name of `el`.
    fn tag_name(&self, el: ElementId) -> OverlayResult<String>;

    /// Resolved style of `el`.
    fn computed_style(&self, el: ElementId) -> OverlayResult<ComputedStyle>;

    /// Current document scroll and client-edge offsets.
    fn document_metrics(&self) -> DocumentMetrics;
}

/// Write access to the overlay box drawn on top of the target.
pub trait OverlayHost {
    /// Insert a new overlay box immediately before `before` and return its handle.
    fn insert_overlay_box(&mut self, before: ElementId) -> OverlayResult<OverlayBoxId>;

    /// Set one style property on an overlay box. An empty value clears the property.
    fn set_overlay_style(
        &mut self,
        overlay: OverlayBoxId,
        prop: StyleProp,
        value: &str,
    ) -> OverlayResult<()>;

    /// Remove an overlay box from the document.
    fn remove_overlay_box(&mut self, overlay: OverlayBoxId) -> OverlayResult<()>;
}

/// Facts the surrounding renderer supplies about the overlay's content.
pub trait RenderState {
    /// `true` while at least one child renderer draws into the overlay.
    fn is_active(&self) -> bool;

    /// `true` when visibility changed since the last update pass.
    fn visibility_changed(&self) -> bool;

    /// Current visibility of the target.
    fn visibility(&self) -> Visibility;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// A fixed [`RenderState`], for embedders that compute these facts up front.
pub struct StaticRenderState {
    /// Value returned by [`RenderState::is_active`].
    pub active: bool,
    /// Value returned by [`RenderState::visibility_changed`].
    pub visibility_changed: bool,
    /// Value returned by [`RenderState::visibility`].
    pub visibility: Visibility,
}

impl Default for StaticRenderState {
    fn default() -> Self {
        Self {
            active: true,
            visibility_changed: false,
            visibility: Visibility::default(),
        }
    }
}

impl RenderState for StaticRenderState {
    fn is_active(&self) -> bool {
        self.active
    }

    fn visibility_changed(&self) -> bool {
        self.visibility_changed
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }
}
