use super::*;
use crate::foundation::core::{Rect, Size};
use crate::host::document::{Document, ElementSpec};
use crate::host::style::{Overflow, Visibility};
use crate::host::{DocumentMetrics, StaticRenderState};

fn div(x0: f64, y0: f64, x1: f64, y1: f64) -> ElementSpec {
    ElementSpec::new("DIV", Rect::new(x0, y0, x1, y1))
}

fn active() -> StaticRenderState {
    StaticRenderState::default()
}

fn sync_for(target: ElementId, quirks: HostQuirks, settings: SyncSettings) -> PositionSynchronizer {
    PositionSynchronizer::new(Rc::new(BoundsTracker::new(target, quirks)), settings)
}

fn style_of(doc: &Document, sync: &PositionSynchronizer, prop: StyleProp) -> Option<String> {
    let id = sync.overlay_id()?;
    doc.overlay(id)?.style(prop).map(str::to_string)
}

/// Target at `(70,60)` inside a relatively positioned box at `(50,40)` with 2px/3px borders.
fn positioned_parent_doc() -> (Document, ElementId, ElementId) {
    let mut doc = Document::new();
    let parent = doc
        .add_element(
            doc.body(),
            div(50.0, 40.0, 450.0, 340.0).with_style(
                ComputedStyle::default()
                    .with_position(Position::Relative)
                    .with_borders("2px", "3px"),
            ),
        )
        .unwrap();
    let wrapper = doc.add_element(parent, div(52.0, 43.0, 400.0, 300.0)).unwrap();
    let target = doc.add_element(wrapper, div(70.0, 60.0, 170.0, 110.0)).unwrap();
    (doc, parent, target)
}

#[test]
fn offsets_are_relative_to_nearest_positioned_ancestor() {
    let (mut doc, parent, target) = positioned_parent_doc();
    let mut sync = sync_for(target, HostQuirks::default(), SyncSettings::default());

    let placement = sync.placement(&doc).unwrap();
    assert_eq!(placement.anchor, AnchorMode::Absolute);
    assert_eq!(placement.relative_to, Some(parent));
    assert_eq!(placement.offset, Vec2::new(18.0, 17.0));

    sync.update_position(&mut doc, &active()).unwrap();
    assert!(sync.is_positioned());
    assert_eq!(style_of(&doc, &sync, StyleProp::Position).as_deref(), Some("absolute"));
    assert_eq!(style_of(&doc, &sync, StyleProp::Left).as_deref(), Some("18px"));
    assert_eq!(style_of(&doc, &sync, StyleProp::Top).as_deref(), Some("17px"));
    assert_eq!(style_of(&doc, &sync, StyleProp::ZIndex).as_deref(), Some("-1"));
    assert_eq!(style_of(&doc, &sync, StyleProp::Direction).as_deref(), Some("ltr"));
    assert_eq!(style_of(&doc, &sync, StyleProp::Display), None);
    assert_eq!(style_of(&doc, &sync, StyleProp::Clip), None);
}

#[test]
fn unparseable_border_reads_as_zero() {
    let (mut doc, parent, target) = positioned_parent_doc();
    doc.set_style(
        parent,
        ComputedStyle::default()
            .with_position(Position::Absolute)
            .with_borders("medium", "thick"),
    )
    .unwrap();
    let sync = sync_for(target, HostQuirks::default(), SyncSettings::default());
    assert_eq!(sync.placement(&doc).unwrap().offset, Vec2::new(20.0, 20.0));
}

#[test]
fn without_positioned_ancestor_offsets_are_document_relative() {
    let mut doc = Document::new();
    let wrapper = doc.add_element(doc.body(), div(0.0, 0.0, 800.0, 600.0)).unwrap();
    let target = doc.add_element(wrapper, div(10.0, 20.0, 110.0, 70.0)).unwrap();
    doc.set_metrics(DocumentMetrics {
        scroll: Vec2::new(0.0, 40.0),
        client_edge: Vec2::new(2.0, 2.0),
    });
    let sync = sync_for(target, HostQuirks::default(), SyncSettings::default());

    let placement = sync.placement(&doc).unwrap();
    assert_eq!(placement.anchor, AnchorMode::Absolute);
    assert_eq!(placement.relative_to, None);
    assert_eq!(placement.offset, Vec2::new(8.0, 58.0));
}

#[test]
fn fixed_targets_anchor_to_viewport_unless_host_lacks_fixed() {
    let mut doc = Document::new();
    let target = doc
        .add_element(
            doc.body(),
            div(10.0, 20.0, 110.0, 70.0).with_style(
                ComputedStyle::default()
                    .with_position(Position::Fixed)
                    .with_z_index("5"),
            ),
        )
        .unwrap();
    doc.set_metrics(DocumentMetrics {
        scroll: Vec2::new(0.0, 100.0),
        client_edge: Vec2::ZERO,
    });

    let mut sync = sync_for(target, HostQuirks::default(), SyncSettings::default());
    let placement = sync.placement(&doc).unwrap();
    assert_eq!(placement.anchor, AnchorMode::Fixed);
    assert_eq!(placement.offset, Vec2::new(10.0, 20.0));

    sync.update_position(&mut doc, &active()).unwrap();
    assert_eq!(style_of(&doc, &sync, StyleProp::Position).as_deref(), Some("fixed"));
    assert_eq!(style_of(&doc, &sync, StyleProp::ZIndex).as_deref(), Some("5"));

    let legacy = sync_for(
        target,
        HostQuirks {
            no_fixed_positioning: true,
            ..HostQuirks::default()
        },
        SyncSettings::default(),
    );
    let placement = legacy.placement(&doc).unwrap();
    assert_eq!(placement.anchor, AnchorMode::Absolute);
    assert_eq!(placement.offset, Vec2::new(10.0, 120.0));
}

#[test]
fn pixel_ratio_scales_offsets() {
    let mut doc = Document::new();
    let target = doc
        .add_element(
            doc.body(),
            div(100.0, 40.0, 300.0, 140.0).with_offset_size(Size::new(250.0, 125.0)),
        )
        .unwrap();
    let sync = sync_for(
        target,
        HostQuirks {
            logical_zoom_ratio: true,
            ..HostQuirks::default()
        },
        SyncSettings::default(),
    );
    assert_eq!(
        sync.placement(&doc).unwrap().offset,
        Vec2::new(125.0, 50.0)
    );
}

#[test]
fn clip_is_written_only_when_enabled() {
    let mut doc = Document::new();
    let frame = doc
        .add_element(
            doc.body(),
            div(120.0, 50.0, 280.0, 200.0)
                .with_style(ComputedStyle::default().with_overflow(Overflow::Hidden)),
        )
        .unwrap();
    let target = doc.add_element(frame, div(100.0, 50.0, 300.0, 150.0)).unwrap();
    let settings = SyncSettings {
        clip_overflow: true,
    };

    let mut sync = sync_for(target, HostQuirks::default(), settings);
    sync.update_position(&mut doc, &active()).unwrap();
    // The frame cuts the target's left edge: the box starts at the frame's edge and the clip
    // keeps exactly the frame's span 120..280.
    assert_eq!(style_of(&doc, &sync, StyleProp::Left).as_deref(), Some("120px"));
    assert_eq!(
        style_of(&doc, &sync, StyleProp::Clip).as_deref(),
        Some("rect(0px, 160px, 150px, 0px)")
    );

    doc.set_style(frame, ComputedStyle::default()).unwrap();
    sync.update_position(&mut doc, &active()).unwrap();
    assert_eq!(style_of(&doc, &sync, StyleProp::Left).as_deref(), Some("100px"));
    assert_eq!(style_of(&doc, &sync, StyleProp::Clip), None);

    let mut unclipped = sync_for(target, HostQuirks::default(), SyncSettings::default());
    doc.set_style(
        frame,
        ComputedStyle::default().with_overflow(Overflow::Hidden),
    )
    .unwrap();
    unclipped.update_position(&mut doc, &active()).unwrap();
    assert_eq!(style_of(&doc, &unclipped, StyleProp::Clip), None);
}

#[test]
fn clip_insets_follow_the_clipped_overlay_origin() {
    let mut doc = Document::new();
    let frame = doc
        .add_element(
            doc.body(),
            div(120.0, 70.0, 280.0, 200.0).with_style(
                ComputedStyle::default()
                    .with_position(Position::Relative)
                    .with_overflow(Overflow::Hidden),
            ),
        )
        .unwrap();
    let target = doc.add_element(frame, div(100.0, 50.0, 300.0, 150.0)).unwrap();
    let mut sync = sync_for(
        target,
        HostQuirks::default(),
        SyncSettings {
            clip_overflow: true,
        },
    );

    sync.update_position(&mut doc, &active()).unwrap();
    let placement = sync.last_placement().unwrap();
    assert_eq!(placement.relative_to, Some(frame));
    assert_eq!(placement.offset, Vec2::ZERO);
    // Box corner at the frame's corner; the visible region is the whole frame.
    assert_eq!(
        style_of(&doc, &sync, StyleProp::Clip).as_deref(),
        Some("rect(0px, 160px, 130px, 0px)")
    );
    assert_eq!(
        sync.tracker().clip_string(&doc).unwrap(),
        "rect(20px, 180px, 150px, 20px)"
    );
}

#[test]
fn inactive_overlay_is_left_alone() {
    let (mut doc, _, target) = positioned_parent_doc();
    let mut sync = sync_for(target, HostQuirks::default(), SyncSettings::default());
    let idle = StaticRenderState {
        active: false,
        ..StaticRenderState::default()
    };

    sync.update_position(&mut doc, &idle).unwrap();
    assert!(!sync.is_positioned());
    assert_eq!(sync.overlay_id(), None);
    assert!(doc.overlays().is_empty());
}

#[test]
fn overlay_box_is_created_once_before_positioning_element() {
    let (mut doc, _, target) = positioned_parent_doc();
    let mut sync = sync_for(target, HostQuirks::default(), SyncSettings::default());

    let a = sync.overlay_box(&mut doc, &active()).unwrap();
    let b = sync.overlay_box(&mut doc, &active()).unwrap();
    assert_eq!(a, b);
    assert_eq!(doc.overlays().len(), 1);
    assert_eq!(doc.overlay(a).unwrap().anchor, target);
}

#[test]
fn table_cells_anchor_to_their_offset_parent() {
    let mut doc = Document::new();
    let table = doc
        .add_element(doc.body(), ElementSpec::new("TABLE", Rect::new(0.0, 0.0, 200.0, 100.0)))
        .unwrap();
    let cell = doc
        .add_element(table, ElementSpec::new("td", Rect::new(10.0, 10.0, 60.0, 40.0)))
        .unwrap();
    let mut sync = sync_for(cell, HostQuirks::default(), SyncSettings::default());

    assert_eq!(sync.positioning_element(&doc).unwrap(), table);
    let overlay = sync.overlay_box(&mut doc, &active()).unwrap();
    assert_eq!(doc.overlay(overlay).unwrap().anchor, table);
}

#[test]
fn destroy_is_idempotent_and_allows_recreation() {
    let (mut doc, _, target) = positioned_parent_doc();
    let mut sync = sync_for(target, HostQuirks::default(), SyncSettings::default());

    sync.destroy(&mut doc).unwrap();
    assert!(doc.overlays().is_empty());

    sync.update_position(&mut doc, &active()).unwrap();
    let first = sync.overlay_id().unwrap();
    sync.destroy(&mut doc).unwrap();
    sync.destroy(&mut doc).unwrap();
    assert!(doc.overlay(first).unwrap().removed);
    assert_eq!(sync.overlay_id(), None);
    assert!(!sync.is_positioned());

    sync.update_position(&mut doc, &active()).unwrap();
    assert_ne!(sync.overlay_id(), Some(first));
    assert_eq!(doc.live_overlays().count(), 1);
}

#[test]
fn hidden_target_hides_overlay() {
    let (mut doc, _, target) = positioned_parent_doc();
    let mut sync = sync_for(target, HostQuirks::default(), SyncSettings::default());
    let hidden = StaticRenderState {
        visibility_changed: true,
        visibility: Visibility {
            visible: false,
            displayed: true,
        },
        ..StaticRenderState::default()
    };

    assert!(sync.needs_update(&hidden));
    assert!(!sync.needs_update(&active()));
    sync.update_props(&mut doc, &hidden).unwrap();
    assert_eq!(style_of(&doc, &sync, StyleProp::Display).as_deref(), Some("none"));
}

#[test]
fn sync_repositions_only_after_committed_change() {
    let (mut doc, _, target) = positioned_parent_doc();
    let mut sync = sync_for(target, HostQuirks::default(), SyncSettings::default());

    let first = sync.sync(&mut doc, &active()).unwrap();
    assert!(first.positioned);
    assert!(!first.visibility_updated);
    assert!(sync.tracker().has_been_queried());
    assert!(!sync.tracker().is_locked());

    let idle = sync.sync(&mut doc, &active()).unwrap();
    assert!(!idle.positioned);

    doc.set_rect(target, Rect::new(80.0, 60.0, 180.0, 110.0)).unwrap();
    let moved = sync.sync(&mut doc, &active()).unwrap();
    assert!(moved.positioned);
    assert_eq!(style_of(&doc, &sync, StyleProp::Left).as_deref(), Some("28px"));

    let settled = sync.sync(&mut doc, &active()).unwrap();
    assert!(!settled.positioned);
}

#[test]
fn sync_repositions_on_resize_alone() {
    let (mut doc, _, target) = positioned_parent_doc();
    let mut sync = sync_for(target, HostQuirks::default(), SyncSettings::default());
    sync.sync(&mut doc, &active()).unwrap();
    assert!(!sync.sync(&mut doc, &active()).unwrap().positioned);

    doc.set_rect(target, Rect::new(70.0, 60.0, 200.0, 110.0)).unwrap();
    let resized = sync.sync(&mut doc, &active()).unwrap();
    assert!(resized.positioned);
    assert_eq!(sync.tracker().last_committed().map(|b| b.w), Some(130.0));
    assert_eq!(style_of(&doc, &sync, StyleProp::Left).as_deref(), Some("18px"));

    assert!(!sync.sync(&mut doc, &active()).unwrap().positioned);
}

#[test]
fn last_placement_is_the_one_written() {
    let (mut doc, parent, target) = positioned_parent_doc();
    let mut sync = sync_for(target, HostQuirks::default(), SyncSettings::default());
    assert_eq!(sync.last_placement(), None);

    sync.sync(&mut doc, &active()).unwrap();
    doc.set_rect(target, Rect::new(90.0, 60.0, 190.0, 110.0)).unwrap();
    let written = sync.last_placement().unwrap();
    assert_eq!(written.relative_to, Some(parent));
    assert_eq!(written.offset, Vec2::new(18.0, 17.0));
    assert_ne!(sync.placement(&doc).unwrap(), written);

    sync.destroy(&mut doc).unwrap();
    assert_eq!(sync.last_placement(), None);
}

#[test]
fn sync_tears_down_when_nothing_draws() {
    let (mut doc, _, target) = positioned_parent_doc();
    let mut sync = sync_for(target, HostQuirks::default(), SyncSettings::default());
    sync.sync(&mut doc, &active()).unwrap();
    let overlay = sync.overlay_id().unwrap();

    let gone = StaticRenderState {
        active: false,
        visibility_changed: true,
        ..StaticRenderState::default()
    };
    let outcome = sync.sync(&mut doc, &gone).unwrap();
    assert!(!outcome.positioned);
    assert!(outcome.visibility_updated);
    assert!(doc.overlay(overlay).unwrap().removed);
    assert_eq!(sync.overlay_id(), None);
}

#[test]
fn outer_lock_freezes_geometry_for_every_consumer() {
    let (mut doc, _, target) = positioned_parent_doc();
    let tracker = Rc::new(BoundsTracker::new(target, HostQuirks::default()));
    let mut sync = PositionSynchronizer::new(Rc::clone(&tracker), SyncSettings::default());

    let lock = tracker.lock_scope();
    let frozen = tracker.bounds(&doc).unwrap();
    doc.set_rect(target, Rect::new(300.0, 300.0, 400.0, 350.0)).unwrap();
    sync.update_position(&mut doc, &active()).unwrap();
    assert_eq!(style_of(&doc, &sync, StyleProp::Left).as_deref(), Some("18px"));
    assert_eq!(tracker.bounds(&doc).unwrap(), frozen);
    drop(lock);

    assert_eq!(tracker.last_committed(), Some(frozen));
    sync.update_position(&mut doc, &active()).unwrap();
    assert_eq!(style_of(&doc, &sync, StyleProp::Left).as_deref(), Some("248px"));
}

#[test]
fn failed_sync_still_releases_its_lock() {
    let (mut doc, _, target) = positioned_parent_doc();
    let mut sync = sync_for(target, HostQuirks::default(), SyncSettings::default());
    doc.detach(target).unwrap();

    assert!(sync.sync(&mut doc, &active()).is_err());
    assert_eq!(sync.tracker().lock_depth(), 0);
    assert!(!sync.is_positioned());
}
