use std::cell::Cell;

use crate::{
    foundation::core::{ElementId, GeometrySnapshot},
    foundation::error::OverlayResult,
    foundation::math::px,
    host::{HostQuirks, LayoutHost},
};

/// Measures one target element, caches its bounds while locked, and detects changes against the
/// last committed measurement.
///
/// The tracker holds no reference to the host; every query takes the host it should read from.
/// Interior mutability lets several consumers share one tracker (`Rc<BoundsTracker>`) and read
/// the same locked snapshot. The type is intentionally not `Sync`.
#[derive(Debug)]
pub struct BoundsTracker {
    target: ElementId,
    quirks: HostQuirks,
    lock_depth: Cell<u32>,
    locked: Cell<Option<GeometrySnapshot>>,
    last_committed: Cell<Option<GeometrySnapshot>>,
}

impl BoundsTracker {
    /// Tracker for `target` under the given host quirks.
    pub fn new(target: ElementId, quirks: HostQuirks) -> Self {
        Self {
            target,
            quirks,
            lock_depth: Cell::new(0),
            locked: Cell::new(None),
            last_committed: Cell::new(None),
        }
    }

    /// The tracked element.
    pub fn target(&self) -> ElementId {
        self.target
    }

    /// Quirks this tracker measures under.
    pub fn quirks(&self) -> HostQuirks {
        self.quirks
    }

    /// Measure any element's viewport rectangle. Never cached.
    pub fn measure<H: LayoutHost + ?Sized>(
        &self,
        host: &H,
        el: ElementId,
    ) -> OverlayResult<GeometrySnapshot> {
        let rect = host.bounding_client_rect(el)?;
        let raw = GeometrySnapshot::from_rect(rect);
        if !self.quirks.uses_offset_size() {
            return Ok(raw);
        }

        // Rect sizes are unreliable after scrolling; offset sizes are not.
        let size = host.offset_size(el)?;
        let pixel_ratio = if self.quirks.logical_zoom_ratio && raw.w != 0.0 {
            size.width / raw.w
        } else {
            1.0
        };
        Ok(GeometrySnapshot {
            w: size.width,
            h: size.height,
            pixel_ratio,
            ..raw
        })
    }

    /// Intersection of every `overflow: hidden` ancestor between the target and the document root.
    ///
    /// `None` when no ancestor clips. The nearest clipping ancestor seeds the rectangle (and its
    /// pixel ratio); each further one narrows it.
    pub fn clip_rect<H: LayoutHost + ?Sized>(
        &self,
        host: &H,
    ) -> OverlayResult<Option<GeometrySnapshot>> {
        let mut clip: Option<GeometrySnapshot> = None;
        let mut cur = host.parent(self.target)?;
        while let Some(el) = cur {
            if host.is_document_root(el)? {
                break;
            }
            if host.computed_style(el)?.clips_overflow() {
                let ancestor = self.measure(host, el)?;
                clip = Some(match clip {
                    None => ancestor,
                    Some(acc) => acc.narrowed_by(&ancestor),
                });
            }
            cur = host.parent(el)?;
        }
        Ok(clip)
    }

    /// Target bounds narrowed by all clipping ancestors, measured now.
    pub fn live_bounds<H: LayoutHost + ?Sized>(&self, host: &H) -> OverlayResult<GeometrySnapshot> {
        let own = self.measure(host, self.target)?;
        Ok(match self.clip_rect(host)? {
            Some(clip) => own.narrowed_by(&clip),
            None => own,
        })
    }

    /// Current bounds: the session snapshot while locked, a live measurement otherwise.
    ///
    /// The first call inside a locked session measures; every later call in the same session
    /// returns that same snapshot even if the host layout changed meanwhile.
    pub fn bounds<H: LayoutHost + ?Sized>(&self, host: &H) -> OverlayResult<GeometrySnapshot> {
        if self.lock_depth.get() == 0 {
            return self.live_bounds(host);
        }
        if let Some(snapshot) = self.locked.get() {
            return Ok(snapshot);
        }
        let snapshot = self.live_bounds(host)?;
        self.locked.set(Some(snapshot));
        Ok(snapshot)
    }

    /// Enter a locked session. Prefer [`BoundsTracker::lock_scope`].
    pub fn lock(&self) {
        self.lock_depth.set(self.lock_depth.get() + 1);
    }

    /// Leave a locked session.
    ///
    /// Leaving the outermost session promotes the session snapshot (if one was taken) to the
    /// committed baseline. An unlock without a matching lock is ignored.
    pub fn unlock(&self) {
        let depth = self.lock_depth.get();
        if depth == 0 {
            tracing::warn!(
                element = self.target.0,
                "unlock without matching lock; ignoring"
            );
            return;
        }
        self.lock_depth.set(depth - 1);
        if depth == 1 {
            if let Some(snapshot) = self.locked.take() {
                tracing::debug!(element = self.target.0, ?snapshot, "committed locked bounds");
                self.last_committed.set(Some(snapshot));
            }
        }
    }

    /// Enter a locked session that ends when the returned guard is dropped.
    pub fn lock_scope(&self) -> BoundsLock<'_> {
        self.lock();
        BoundsLock { tracker: self }
    }

    /// Current nesting depth of locked sessions.
    pub fn lock_depth(&self) -> u32 {
        self.lock_depth.get()
    }

    /// `true` inside a locked session.
    pub fn is_locked(&self) -> bool {
        self.lock_depth.get() > 0
    }

    /// The committed baseline, if any.
    pub fn last_committed(&self) -> Option<GeometrySnapshot> {
        self.last_committed.get()
    }

    /// `true` once a baseline has been committed.
    pub fn has_been_queried(&self) -> bool {
        self.last_committed.get().is_some()
    }

    /// `true` without a baseline, or when the current position differs from it.
    ///
    /// Only a locked session advances the baseline; calling this while unlocked keeps comparing
    /// against the last committed snapshot.
    pub fn position_changed<H: LayoutHost + ?Sized>(&self, host: &H) -> OverlayResult<bool> {
        match self.last_committed.get() {
            None => Ok(true),
            Some(last) => Ok(!last.same_position(&self.bounds(host)?)),
        }
    }

    /// `true` without a baseline, or when the current size differs from it.
    pub fn size_changed<H: LayoutHost + ?Sized>(&self, host: &H) -> OverlayResult<bool> {
        match self.last_committed.get() {
            None => Ok(true),
            Some(last) => Ok(!last.same_size(&self.bounds(host)?)),
        }
    }

    /// Clip directive relative to the unclipped target, measured now.
    ///
    /// Empty when no ancestor clips. Otherwise `rect(top, right, bottom, left)` with each edge of
    /// the clip rectangle expressed relative to the target's own top-left corner and scaled by
    /// the clip rectangle's pixel ratio.
    pub fn clip_string<H: LayoutHost + ?Sized>(&self, host: &H) -> OverlayResult<String> {
        let el = self.measure(host, self.target)?;
        self.clip_string_at(host, &el)
    }

    /// Clip directive for a box whose top-left corner sits at `origin`.
    ///
    /// The overlay is placed at [`BoundsTracker::bounds`], which an ancestor may have narrowed;
    /// passing that snapshot keeps the insets in the overlay's own frame.
    pub fn clip_string_at<H: LayoutHost + ?Sized>(
        &self,
        host: &H,
        origin: &GeometrySnapshot,
    ) -> OverlayResult<String> {
        let Some(clip) = self.clip_rect(host)? else {
            return Ok(String::new());
        };
        let ratio = clip.pixel_ratio;
        Ok(format!(
            "rect({}, {}, {}, {})",
            px((clip.y - origin.y) * ratio),
            px((clip.x + clip.w - origin.x) * ratio),
            px((clip.y + clip.h - origin.y) * ratio),
            px((clip.x - origin.x) * ratio),
        ))
    }
}

/// A locked session on a [`BoundsTracker`]; unlocks on drop, including during unwinding.
#[must_use = "the session ends as soon as the guard is dropped"]
#[derive(Debug)]
pub struct BoundsLock<'a> {
    tracker: &'a BoundsTracker,
}

impl Drop for BoundsLock<'_> {
    fn drop(&mut self) {
        self.tracker.unlock();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bounds/tracker.rs"]
mod tests;
