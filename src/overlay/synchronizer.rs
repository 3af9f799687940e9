use std::rc::Rc;

use crate::{
    bounds::tracker::BoundsTracker,
    foundation::core::{ElementId, GeometrySnapshot, OverlayBoxId, Vec2},
    foundation::error::OverlayResult,
    foundation::math::{parse_px_or_zero, px},
    host::style::{ComputedStyle, Position, StyleProp},
    host::{HostQuirks, LayoutHost, OverlayHost, RenderState},
};

/// Tags whose overlay is anchored to their offset parent rather than to themselves.
const TABLE_CELL_TAGS: [&str; 2] = ["TD", "TH"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Overlay synchronization settings.
pub struct SyncSettings {
    /// Clip the overlay box to the region left visible by `overflow: hidden` ancestors.
    pub clip_overflow: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Positioning scheme written to the overlay box.
pub enum AnchorMode {
    /// Anchored to the viewport.
    Fixed,
    /// Anchored to the nearest positioned ancestor or the document.
    Absolute,
}

impl AnchorMode {
    /// CSS `position` keyword.
    pub fn css_keyword(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Absolute => "absolute",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Where the overlay box goes, in its containing block's coordinate space.
pub struct OverlayPlacement {
    /// Positioning scheme.
    pub anchor: AnchorMode,
    /// `left`/`top` offsets in pixels.
    pub offset: Vec2,
    /// Positioned ancestor the offset is relative to; `None` for the viewport or document.
    pub relative_to: Option<ElementId>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
/// What one [`PositionSynchronizer::sync`] pass did.
pub struct SyncOutcome {
    /// The overlay was repositioned.
    pub positioned: bool,
    /// Visibility/activity was refreshed.
    pub visibility_updated: bool,
}

/// Keeps the overlay box aligned with the tracked target.
///
/// Lifecycle of the box: absent, then created (and positioned), then destroyed. Creation is
/// idempotent and happens lazily on the first update that needs the box.
#[derive(Debug)]
pub struct PositionSynchronizer {
    tracker: Rc<BoundsTracker>,
    settings: SyncSettings,
    overlay: Option<OverlayBoxId>,
    is_positioned: bool,
    last_placement: Option<OverlayPlacement>,
}

impl PositionSynchronizer {
    /// Synchronizer driven by a (possibly shared) tracker.
    pub fn new(tracker: Rc<BoundsTracker>, settings: SyncSettings) -> Self {
        Self {
            tracker,
            settings,
            overlay: None,
            is_positioned: false,
            last_placement: None,
        }
    }

    /// The tracker this synchronizer reads bounds from.
    pub fn tracker(&self) -> &Rc<BoundsTracker> {
        &self.tracker
    }

    /// Current overlay box, if created.
    pub fn overlay_id(&self) -> Option<OverlayBoxId> {
        self.overlay
    }

    /// `true` once the overlay has been positioned; consumers must not draw before that.
    pub fn is_positioned(&self) -> bool {
        self.is_positioned
    }

    /// Placement written by the last [`PositionSynchronizer::update_position`], until destroyed.
    pub fn last_placement(&self) -> Option<OverlayPlacement> {
        self.last_placement
    }

    fn target(&self) -> ElementId {
        self.tracker.target()
    }

    fn quirks(&self) -> HostQuirks {
        self.tracker.quirks()
    }

    /// Element the overlay is aligned to: the target, or its offset parent for table cells.
    pub fn positioning_element<H: LayoutHost + ?Sized>(&self, host: &H) -> OverlayResult<ElementId> {
        let target = self.target();
        let tag = host.tag_name(target)?;
        if TABLE_CELL_TAGS.iter().any(|t| tag.eq_ignore_ascii_case(t)) {
            if let Some(par) = host.offset_parent(target)? {
                return Ok(par);
            }
        }
        Ok(target)
    }

    /// Compute the overlay placement from the tracker's current bounds.
    pub fn placement<H: LayoutHost + ?Sized>(&self, host: &H) -> OverlayResult<OverlayPlacement> {
        let el = self.positioning_element(host)?;
        let style = host.computed_style(el)?;
        let bounds = self.tracker.bounds(host)?;
        self.placement_for(host, el, &style, &bounds)
    }

    fn placement_for<H: LayoutHost + ?Sized>(
        &self,
        host: &H,
        el: ElementId,
        style: &ComputedStyle,
        bounds: &GeometrySnapshot,
    ) -> OverlayResult<OverlayPlacement> {
        let ratio = bounds.pixel_ratio;

        if style.position == Position::Fixed && !self.quirks().no_fixed_positioning {
            return Ok(OverlayPlacement {
                anchor: AnchorMode::Fixed,
                offset: Vec2::new(bounds.x * ratio, bounds.y * ratio),
                relative_to: None,
            });
        }

        // Nearest positioned offset parent.
        let mut par = host.offset_parent(el)?;
        while let Some(p) = par {
            if host.computed_style(p)?.position != Position::Static {
                break;
            }
            par = host.offset_parent(p)?;
        }

        let offset = match par {
            Some(p) => {
                let rect = host.bounding_client_rect(p)?;
                let cs = host.computed_style(p)?;
                Vec2::new(
                    (bounds.x - rect.x0) * ratio - parse_px_or_zero(&cs.border_left_width),
                    (bounds.y - rect.y0) * ratio - parse_px_or_zero(&cs.border_top_width),
                )
            }
            None => {
                let doc = host.document_metrics();
                Vec2::new(
                    (bounds.x + doc.scroll.x - doc.client_edge.x) * ratio,
                    (bounds.y + doc.scroll.y - doc.client_edge.y) * ratio,
                )
            }
        };

        Ok(OverlayPlacement {
            anchor: AnchorMode::Absolute,
            offset,
            relative_to: par,
        })
    }

    /// Align the overlay box with the target. No-op while no child renderer is active.
    #[tracing::instrument(skip(self, host, state), fields(element = self.target().0))]
    pub fn update_position<H, S>(&mut self, host: &mut H, state: &S) -> OverlayResult<()>
    where
        H: LayoutHost + OverlayHost + ?Sized,
        S: RenderState + ?Sized,
    {
        if !state.is_active() {
            return Ok(());
        }

        let el = self.positioning_element(&*host)?;
        let style = host.computed_style(el)?;
        let bounds = self.tracker.bounds(&*host)?;
        let placement = self.placement_for(&*host, el, &style, &bounds)?;
        let overlay = self.overlay_box(host, state)?;

        host.set_overlay_style(overlay, StyleProp::Position, placement.anchor.css_keyword())?;
        host.set_overlay_style(overlay, StyleProp::Left, &px(placement.offset.x))?;
        host.set_overlay_style(overlay, StyleProp::Top, &px(placement.offset.y))?;
        if self.settings.clip_overflow {
            // Insets are relative to the box's own corner, i.e. the bounds it was placed at.
            let clip = self.tracker.clip_string_at(&*host, &bounds)?;
            host.set_overlay_style(overlay, StyleProp::Clip, &clip)?;
        }
        // Static targets keep the overlay underneath their own flow content.
        let z_index = if style.position == Position::Static {
            "-1"
        } else {
            style.z_index.as_str()
        };
        host.set_overlay_style(overlay, StyleProp::ZIndex, z_index)?;

        self.is_positioned = true;
        self.last_placement = Some(placement);
        tracing::debug!(?placement, "overlay positioned");
        Ok(())
    }

    /// Show or hide the overlay box according to the target's visibility.
    pub fn update_visibility<H, S>(&mut self, host: &mut H, state: &S) -> OverlayResult<()>
    where
        H: LayoutHost + OverlayHost + ?Sized,
        S: RenderState + ?Sized,
    {
        let overlay = self.overlay_box(host, state)?;
        write_display(host, overlay, state)
    }

    /// Refresh visibility while active; tear the overlay down once nothing draws into it.
    pub fn update_props<H, S>(&mut self, host: &mut H, state: &S) -> OverlayResult<()>
    where
        H: LayoutHost + OverlayHost + ?Sized,
        S: RenderState + ?Sized,
    {
        if state.is_active() {
            self.update_visibility(host, state)
        } else {
            self.destroy(host)
        }
    }

    /// `true` when the surrounding renderer reports a visibility change.
    pub fn needs_update<S: RenderState + ?Sized>(&self, state: &S) -> bool {
        state.visibility_changed()
    }

    /// The overlay box, inserting it in front of the positioning element on first use.
    pub fn overlay_box<H, S>(&mut self, host: &mut H, state: &S) -> OverlayResult<OverlayBoxId>
    where
        H: LayoutHost + OverlayHost + ?Sized,
        S: RenderState + ?Sized,
    {
        if let Some(overlay) = self.overlay {
            return Ok(overlay);
        }

        let el = self.positioning_element(&*host)?;
        let overlay = host.insert_overlay_box(el)?;
        self.overlay = Some(overlay);
        // Inherited rtl direction would otherwise shift the box.
        host.set_overlay_style(overlay, StyleProp::Direction, "ltr")?;
        write_display(host, overlay, state)?;

        tracing::debug!(element = el.0, overlay = overlay.0, "overlay box created");
        Ok(overlay)
    }

    /// Remove the overlay box if present. Safe to call repeatedly.
    pub fn destroy<H: OverlayHost + ?Sized>(&mut self, host: &mut H) -> OverlayResult<()> {
        self.is_positioned = false;
        self.last_placement = None;
        let Some(overlay) = self.overlay.take() else {
            return Ok(());
        };
        host.remove_overlay_box(overlay)?;
        tracing::debug!(overlay = overlay.0, "overlay box destroyed");
        Ok(())
    }

    /// One update pass under a single locked measurement session.
    ///
    /// Repositions when the overlay was never positioned or the target moved or resized since the
    /// last committed pass, and refreshes visibility when it changed. The session's snapshot is
    /// committed when the pass ends, whether it succeeds or fails.
    #[tracing::instrument(skip(self, host, state), fields(element = self.target().0))]
    pub fn sync<H, S>(&mut self, host: &mut H, state: &S) -> OverlayResult<SyncOutcome>
    where
        H: LayoutHost + OverlayHost + ?Sized,
        S: RenderState + ?Sized,
    {
        let tracker = Rc::clone(&self.tracker);
        let _lock = tracker.lock_scope();
        let mut outcome = SyncOutcome::default();

        if state.is_active()
            && (!self.is_positioned
                || tracker.position_changed(&*host)?
                || tracker.size_changed(&*host)?)
        {
            self.update_position(host, state)?;
            outcome.positioned = true;
        }
        if self.needs_update(state) {
            self.update_props(host, state)?;
            outcome.visibility_updated = true;
        }
        Ok(outcome)
    }
}

fn write_display<H, S>(host: &mut H, overlay: OverlayBoxId, state: &S) -> OverlayResult<()>
where
    H: OverlayHost + ?Sized,
    S: RenderState + ?Sized,
{
    let display = if state.visibility().is_shown() {
        ""
    } else {
        "none"
    };
    host.set_overlay_style(overlay, StyleProp::Display, display)
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/synchronizer.rs"]
mod tests;
