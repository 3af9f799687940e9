pub use kurbo::{Point, Rect, Size, Vec2};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
/// Opaque handle to an element owned by a host document.
pub struct ElementId(pub usize);

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
/// Opaque handle to an overlay box created through an [`crate::OverlayHost`].
pub struct OverlayBoxId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One measured rectangle at one instant, in viewport-relative raw measurement units.
///
/// Snapshots are plain values: narrowing by a clip rectangle returns a new snapshot and never
/// touches the one it started from.
pub struct GeometrySnapshot {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
    /// Logical/device pixel correction factor; `1.0` outside the logical-zoom quirk.
    pub pixel_ratio: f64,
}

impl GeometrySnapshot {
    /// Snapshot with a neutral pixel ratio.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            y,
            w,
            h,
            pixel_ratio: 1.0,
        }
    }

    /// Same rectangle with a different pixel ratio.
    pub fn with_pixel_ratio(self, pixel_ratio: f64) -> Self {
        Self {
            pixel_ratio,
            ..self
        }
    }

    /// Snapshot spanning a host rectangle (`x0/y0` = left/top, `x1/y1` = right/bottom).
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.x0, rect.y0, rect.x1 - rect.x0, rect.y1 - rect.y0)
    }

    /// Rectangle covered by this snapshot.
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }

    /// Top-left corner.
    pub fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// `true` when both snapshots share the same top-left corner.
    pub fn same_position(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// `true` when both snapshots share the same width and height.
    pub fn same_size(&self, other: &Self) -> bool {
        self.w == other.w && self.h == other.h
    }

    /// Narrow this rectangle so it does not extend past `clip` on any side.
    ///
    /// Left/top edges are pulled inward (keeping the right/bottom edge fixed), then width and
    /// height are capped at the clip's right/bottom edge and clamped to be non-negative. Disjoint
    /// rectangles therefore collapse to a zero-sized snapshot. The pixel ratio of `self` is kept.
    pub fn narrowed_by(self, clip: &GeometrySnapshot) -> Self {
        let mut out = self;
        if out.x < clip.x {
            out.w -= clip.x - out.x;
            out.x = clip.x;
        }
        if out.y < clip.y {
            out.h -= clip.y - out.y;
            out.y = clip.y;
        }
        out.w = out.w.min(clip.w - (out.x - clip.x)).max(0.0);
        out.h = out.h.min(clip.h - (out.y - clip.y)).max(0.0);
        out
    }
}
