#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Resolved `position` value.
pub enum Position {
    /// Normal flow.
    #[default]
    Static,
    /// Offset from its normal-flow position.
    Relative,
    /// Positioned against the nearest positioned ancestor.
    Absolute,
    /// Positioned against the viewport.
    Fixed,
    /// Sticky positioning.
    Sticky,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Resolved `overflow` value.
pub enum Overflow {
    /// Content may paint outside the box.
    #[default]
    Visible,
    /// Content outside the box is clipped.
    Hidden,
    /// Always scrollable.
    Scroll,
    /// Scrollable when needed.
    Auto,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// The subset of an element's resolved style the geometry core reads.
///
/// Lengths stay textual; they are read leniently at the point of use.
pub struct ComputedStyle {
    /// Resolved `position`.
    pub position: Position,
    /// Resolved `overflow`.
    pub overflow: Overflow,
    /// Resolved `z-index`, e.g. `"auto"` or `"3"`.
    pub z_index: String,
    /// Resolved `border-left-width`, e.g. `"2px"` or `"medium"`.
    pub border_left_width: String,
    /// Resolved `border-top-width`.
    pub border_top_width: String,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            position: Position::Static,
            overflow: Overflow::Visible,
            z_index: "auto".to_string(),
            border_left_width: "0px".to_string(),
            border_top_width: "0px".to_string(),
        }
    }
}

impl ComputedStyle {
    /// Same style with a different `position`.
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Same style with a different `overflow`.
    pub fn with_overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    /// Same style with a different `z-index`.
    pub fn with_z_index(mut self, z_index: impl Into<String>) -> Self {
        self.z_index = z_index.into();
        self
    }

    /// Same style with different left/top border widths.
    pub fn with_borders(mut self, left: impl Into<String>, top: impl Into<String>) -> Self {
        self.border_left_width = left.into();
        self.border_top_width = top.into();
        self
    }

    /// `true` when this element clips descendants to its box.
    pub fn clips_overflow(&self) -> bool {
        self.overflow == Overflow::Hidden
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
/// Overlay box style properties written by the synchronizer.
pub enum StyleProp {
    /// `position`
    #[serde(rename = "position")]
    Position,
    /// `left`
    #[serde(rename = "left")]
    Left,
    /// `top`
    #[serde(rename = "top")]
    Top,
    /// `z-index`
    #[serde(rename = "z-index")]
    ZIndex,
    /// `display`
    #[serde(rename = "display")]
    Display,
    /// `clip`
    #[serde(rename = "clip")]
    Clip,
    /// `direction`
    #[serde(rename = "direction")]
    Direction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Visibility facts about the target element.
pub struct Visibility {
    /// `visibility` is not `hidden`.
    pub visible: bool,
    /// `display` is not `none`.
    pub displayed: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            visible: true,
            displayed: true,
        }
    }
}

impl Visibility {
    /// `true` when the overlay should be shown.
    pub fn is_shown(self) -> bool {
        self.visible && self.displayed
    }
}
