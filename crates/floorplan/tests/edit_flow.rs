//! Headless integration tests for the edit-session event flow.
//!
//! Drives a minimal Bevy `App` (no window, no renderer) through the
//! drag/save/outcome protocol and the mode-scoped exit guard.
//!
//! Run: cargo test -p floorplan --test edit_flow

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use floorplan::coords::PlanPoint;
use floorplan::edit_session::{
    EditSession, ExitGuard, RevisionSaved, SaveOutcome, SaveRequested, TapDragEnd,
};
use floorplan::plan::{ActivePlan, Plan, PlanImage};
use floorplan::plan_mode::PlanMode;
use floorplan::taps::TapId;
use floorplan::FloorPlanPlugin;

fn test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.add_plugins(FloorPlanPlugin);
    app
}

fn drain_batches(app: &mut App) -> Vec<RevisionSaved> {
    let events = app.world().resource::<Events<RevisionSaved>>();
    let mut cursor = events.get_cursor();
    cursor.read(events).cloned().collect()
}

#[test]
fn drag_save_success_resets_the_session() {
    let mut app = test_app();

    // One drag-end: NoChanges -> Dirty at revision 1.
    app.world_mut().send_event(TapDragEnd {
        tap: TapId(1),
        position: PlanPoint::new(100.0, 200.0),
    });
    app.update();

    {
        let session = app.world().resource::<EditSession>();
        assert!(session.is_dirty());
        assert_eq!(session.local_revision(), 1);
    }

    // Save forwards exactly one batch with the staged position.
    app.world_mut().send_event(SaveRequested);
    app.update();

    let batches = drain_batches(&mut app);
    assert_eq!(batches.len(), 1);
    assert_eq!(
        batches[0].positions.get(&TapId(1)),
        Some(&PlanPoint::new(100.0, 200.0))
    );

    // Collaborator reports success: back to NoChanges.
    app.world_mut().send_event(SaveOutcome { success: true });
    app.update();

    let session = app.world().resource::<EditSession>();
    assert!(!session.is_dirty());
    assert_eq!(session.local_revision(), 0);
}

#[test]
fn failed_save_preserves_dirty_state() {
    let mut app = test_app();

    app.world_mut().send_event(TapDragEnd {
        tap: TapId(3),
        position: PlanPoint::new(5.0, 6.0),
    });
    app.update();

    app.world_mut().send_event(SaveRequested);
    app.update();
    app.world_mut().send_event(SaveOutcome { success: false });
    app.update();

    // No optimistic merge: revision and pending map are unchanged.
    let session = app.world().resource::<EditSession>();
    assert!(session.is_dirty());
    assert_eq!(session.local_revision(), 1);
    assert_eq!(
        session.pending().get(&TapId(3)),
        Some(&PlanPoint::new(5.0, 6.0))
    );
}

#[test]
fn save_while_clean_forwards_nothing() {
    let mut app = test_app();

    app.world_mut().send_event(SaveRequested);
    app.update();

    assert!(drain_batches(&mut app).is_empty());
}

#[test]
fn placed_but_never_dragged_tap_is_absent_from_the_batch() {
    let mut app = test_app();

    // Tap 9 was placed at the plan center but never dragged, so no
    // drag-end was ever emitted for it. Tap 4 was dragged.
    app.world_mut().send_event(TapDragEnd {
        tap: TapId(4),
        position: PlanPoint::new(42.0, 24.0),
    });
    app.update();

    app.world_mut().send_event(SaveRequested);
    app.update();

    let batches = drain_batches(&mut app);
    assert_eq!(batches.len(), 1);
    assert!(batches[0].positions.contains_key(&TapId(4)));
    assert!(!batches[0].positions.contains_key(&TapId(9)));
}

#[test]
fn plan_reload_discards_staged_positions() {
    let mut app = test_app();

    app.world_mut().send_event(TapDragEnd {
        tap: TapId(1),
        position: PlanPoint::new(1.0, 1.0),
    });
    app.update();
    assert!(app.world().resource::<EditSession>().is_dirty());

    app.world_mut()
        .resource_mut::<ActivePlan>()
        .replace(Some(Plan {
            length_pixels: 640,
            width_pixels: 480,
            image: PlanImage {
                width: 640,
                height: 480,
                rgba: vec![255; 640 * 480 * 4],
            },
        }));
    app.update();

    let session = app.world().resource::<EditSession>();
    assert!(!session.is_dirty());
    assert!(session.pending().is_empty());
}

#[test]
fn exit_guard_lives_exactly_as_long_as_edit_mode() {
    let mut app = test_app();
    app.update();
    assert!(!app.world().contains_resource::<ExitGuard>());

    app.world_mut()
        .resource_mut::<NextState<PlanMode>>()
        .set(PlanMode::Edit);
    app.update();
    assert!(app.world().contains_resource::<ExitGuard>());

    app.world_mut()
        .resource_mut::<NextState<PlanMode>>()
        .set(PlanMode::View);
    app.update();
    assert!(!app.world().contains_resource::<ExitGuard>());
}
