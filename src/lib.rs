//! overlay-sync keeps an overlay box aligned with the DOM element it decorates.
//!
//! The overlay is a positioned companion box drawn on top of a target element (borders,
//! backgrounds, shadows synthesized by other renderers). This crate owns the geometry:
//!
//! 1. **Measure**: [`BoundsTracker`] reads the target's viewport rectangle through a
//!    [`LayoutHost`], correcting for known host quirks ([`HostQuirks`]).
//! 2. **Clip**: the tracker walks the ancestor chain up to the document body and intersects every
//!    `overflow: hidden` ancestor, yielding clipped bounds and a `rect(top, right, bottom, left)`
//!    clip directive relative to the target's own box.
//! 3. **Freeze**: a locked session ([`BoundsTracker::lock_scope`]) serves one snapshot to every
//!    consumer of an update pass; leaving the outermost session commits it as the baseline for
//!    change detection.
//! 4. **Position**: [`PositionSynchronizer`] converts the target's bounds into the coordinate space
//!    of its nearest positioned ancestor (or the document/viewport) and writes the overlay style
//!    through an [`OverlayHost`].
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single-threaded**: trackers use interior mutability and are shared via `Rc`.
//! - **Host-agnostic**: all host access goes through traits; [`Document`] is a complete
//!   in-memory host used by tests and the `overlay-sync` binary.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod bounds;
mod foundation;
mod host;
mod overlay;

pub use bounds::tracker::{BoundsLock, BoundsTracker};
pub use foundation::core::{ElementId, GeometrySnapshot, OverlayBoxId, Point, Rect, Size, Vec2};
pub use foundation::error::{OverlayError, OverlayResult};
pub use host::document::{Document, ElementSpec, OverlayBoxRecord};
pub use host::scene::{BODY_NAME, BuiltScene, Scene, SceneDocument, SceneElement};
pub use host::style::{ComputedStyle, Overflow, Position, StyleProp, Visibility};
pub use host::{
    DocumentMetrics, HostQuirks, LayoutHost, OverlayHost, RenderState, StaticRenderState,
};
pub use overlay::synchronizer::{
    AnchorMode, OverlayPlacement, PositionSynchronizer, SyncOutcome, SyncSettings,
};
