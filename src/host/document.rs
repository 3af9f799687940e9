use std::collections::BTreeMap;

use crate::{
    foundation::core::{ElementId, OverlayBoxId, Rect, Size},
    foundation::error::{OverlayError, OverlayResult},
    host::style::{ComputedStyle, Position, StyleProp},
    host::{DocumentMetrics, LayoutHost, OverlayHost},
};

/// Tags that act as offset parents even when statically positioned.
const OFFSET_PARENT_TAGS: [&str; 3] = ["TD", "TH", "TABLE"];

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Layout facts for one element of a [`Document`].
pub struct ElementSpec {
    /// Tag name, e.g. `"DIV"`.
    #[serde(default = "default_tag")]
    pub tag: String,
    /// Viewport-relative rectangle reported by the rectangle query.
    pub rect: Rect,
    /// Offset size; defaults to the size of `rect`.
    #[serde(default)]
    pub offset_size: Option<Size>,
    /// Resolved style.
    #[serde(default)]
    pub style: ComputedStyle,
}

fn default_tag() -> String {
    "DIV".to_string()
}

impl ElementSpec {
    /// Element with the given tag and rectangle, default style.
    pub fn new(tag: impl Into<String>, rect: Rect) -> Self {
        Self {
            tag: tag.into(),
            rect,
            offset_size: None,
            style: ComputedStyle::default(),
        }
    }

    /// Same element with a different style.
    pub fn with_style(mut self, style: ComputedStyle) -> Self {
        self.style = style;
        self
    }

    /// Same element with an explicit offset size.
    pub fn with_offset_size(mut self, size: Size) -> Self {
        self.offset_size = Some(size);
        self
    }
}

#[derive(Clone, Debug)]
struct ElementNode {
    spec: ElementSpec,
    parent: Option<ElementId>,
    attached: bool,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Everything written to one overlay box.
pub struct OverlayBoxRecord {
    /// Element the box was inserted in front of.
    pub anchor: ElementId,
    /// Last non-empty value written per property; an empty write clears the entry.
    pub style: BTreeMap<StyleProp, String>,
    /// Number of style writes received.
    pub writes: usize,
    /// `true` once the box was removed from the document.
    pub removed: bool,
}

impl OverlayBoxRecord {
    /// Last value written for `prop`.
    pub fn style(&self, prop: StyleProp) -> Option<&str> {
        self.style.get(&prop).map(String::as_str)
    }
}

#[derive(Clone, Debug)]
/// In-memory document implementing [`LayoutHost`] and [`OverlayHost`].
///
/// Element `0` is always the `BODY`, where ancestor walks stop.
pub struct Document {
    elements: Vec<ElementNode>,
    metrics: DocumentMetrics,
    overlays: Vec<OverlayBoxRecord>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document holding only the `BODY`.
    pub fn new() -> Self {
        Self {
            elements: vec![ElementNode {
                spec: ElementSpec::new("BODY", Rect::ZERO),
                parent: None,
                attached: true,
            }],
            metrics: DocumentMetrics::default(),
            overlays: Vec::new(),
        }
    }

    /// The `BODY` element.
    pub fn body(&self) -> ElementId {
        ElementId(0)
    }

    /// Append a child of `parent`.
    pub fn add_element(&mut self, parent: ElementId, spec: ElementSpec) -> OverlayResult<ElementId> {
        self.node(parent)?;
        let id = ElementId(self.elements.len());
        self.elements.push(ElementNode {
            spec,
            parent: Some(parent),
            attached: true,
        });
        Ok(id)
    }

    /// Detach `el` and its whole subtree; later queries on them fail.
    pub fn detach(&mut self, el: ElementId) -> OverlayResult<()> {
        self.node(el)?;
        if el == self.body() {
            return Err(OverlayError::validation("cannot detach the document body"));
        }
        for idx in 0..self.elements.len() {
            if self.is_descendant_or_self(ElementId(idx), el) {
                self.elements[idx].attached = false;
            }
        }
        Ok(())
    }

    /// Move `el` to a new viewport rectangle.
    pub fn set_rect(&mut self, el: ElementId, rect: Rect) -> OverlayResult<()> {
        self.node_mut(el)?.spec.rect = rect;
        Ok(())
    }

    /// Override the offset size of `el`.
    pub fn set_offset_size(&mut self, el: ElementId, size: Size) -> OverlayResult<()> {
        self.node_mut(el)?.spec.offset_size = Some(size);
        Ok(())
    }

    /// Replace the resolved style of `el`.
    pub fn set_style(&mut self, el: ElementId, style: ComputedStyle) -> OverlayResult<()> {
        self.node_mut(el)?.spec.style = style;
        Ok(())
    }

    /// Replace document scroll/client-edge offsets.
    pub fn set_metrics(&mut self, metrics: DocumentMetrics) {
        self.metrics = metrics;
    }

    /// Overlay box record, removed or not.
    pub fn overlay(&self, id: OverlayBoxId) -> Option<&OverlayBoxRecord> {
        self.overlays.get(id.0)
    }

    /// All overlay boxes ever inserted, in insertion order.
    pub fn overlays(&self) -> &[OverlayBoxRecord] {
        &self.overlays
    }

    /// Overlay boxes still present in the document.
    pub fn live_overlays(&self) -> impl Iterator<Item = (OverlayBoxId, &OverlayBoxRecord)> {
        self.overlays
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.removed)
            .map(|(idx, r)| (OverlayBoxId(idx), r))
    }

    fn node(&self, el: ElementId) -> OverlayResult<&ElementNode> {
        match self.elements.get(el.0) {
            Some(n) if n.attached => Ok(n),
            Some(_) => Err(OverlayError::host(format!(
                "element {} is detached from the document",
                el.0
            ))),
            None => Err(OverlayError::host(format!("unknown element {}", el.0))),
        }
    }

    fn node_mut(&mut self, el: ElementId) -> OverlayResult<&mut ElementNode> {
        self.node(el)?;
        Ok(&mut self.elements[el.0])
    }

    fn is_descendant_or_self(&self, el: ElementId, ancestor: ElementId) -> bool {
        let mut cur = Some(el);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.elements.get(c.0).and_then(|n| n.parent);
        }
        false
    }

    fn overlay_mut(&mut self, id: OverlayBoxId) -> OverlayResult<&mut OverlayBoxRecord> {
        match self.overlays.get_mut(id.0) {
            Some(r) if !r.removed => Ok(r),
            Some(_) => Err(OverlayError::host(format!(
                "overlay box {} was already removed",
                id.0
            ))),
            None => Err(OverlayError::host(format!("unknown overlay box {}", id.0))),
        }
    }
}

impl LayoutHost for Document {
    fn bounding_client_rect(&self, el: ElementId) -> OverlayResult<Rect> {
        Ok(self.node(el)?.spec.rect)
    }

    fn offset_size(&self, el: ElementId) -> OverlayResult<Size> {
        let spec = &self.node(el)?.spec;
        Ok(spec.offset_size.unwrap_or_else(|| spec.rect.size()))
    }

    fn parent(&self, el: ElementId) -> OverlayResult<Option<ElementId>> {
        Ok(self.node(el)?.parent)
    }

    fn offset_parent(&self, el: ElementId) -> OverlayResult<Option<ElementId>> {
        let node = self.node(el)?;
        if el == self.body() || node.spec.style.position == Position::Fixed {
            return Ok(None);
        }

        let mut cur = node.parent;
        while let Some(p) = cur {
            let pn = self.node(p)?;
            if p == self.body()
                || pn.spec.style.position != Position::Static
                || OFFSET_PARENT_TAGS
                    .iter()
                    .any(|t| pn.spec.tag.eq_ignore_ascii_case(t))
            {
                return Ok(Some(p));
            }
            cur = pn.parent;
        }
        Ok(None)
    }

    fn is_document_root(&self, el: ElementId) -> OverlayResult<bool> {
        Ok(self.node(el)?.spec.tag.eq_ignore_ascii_case("BODY"))
    }

    fn tag_name(&self, el: ElementId) -> OverlayResult<String> {
        Ok(self.node(el)?.spec.tag.clone())
    }

    fn computed_style(&self, el: ElementId) -> OverlayResult<ComputedStyle> {
        Ok(self.node(el)?.spec.style.clone())
    }

    fn document_metrics(&self) -> DocumentMetrics {
        self.metrics
    }
}

impl OverlayHost for Document {
    fn insert_overlay_box(&mut self, before: ElementId) -> OverlayResult<OverlayBoxId> {
        if self.node(before)?.parent.is_none() {
            return Err(OverlayError::host(
                "cannot insert an overlay box before the document root",
            ));
        }
        let id = OverlayBoxId(self.overlays.len());
        self.overlays.push(OverlayBoxRecord {
            anchor: before,
            style: BTreeMap::new(),
            writes: 0,
            removed: false,
        });
        Ok(id)
    }

    fn set_overlay_style(
        &mut self,
        overlay: OverlayBoxId,
        prop: StyleProp,
        value: &str,
    ) -> OverlayResult<()> {
        let record = self.overlay_mut(overlay)?;
        if value.is_empty() {
            record.style.remove(&prop);
        } else {
            record.style.insert(prop, value.to_string());
        }
        record.writes += 1;
        Ok(())
    }

    fn remove_overlay_box(&mut self, overlay: OverlayBoxId) -> OverlayResult<()> {
        self.overlay_mut(overlay)?.removed = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/document.rs"]
mod tests;
