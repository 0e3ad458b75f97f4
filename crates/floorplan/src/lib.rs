use bevy::prelude::*;

pub mod coords;
pub mod edit_session;
pub mod plan;
pub mod plan_mode;
pub mod signal_grouping;
pub mod taps;
pub mod telemetry;

use edit_session::{
    PlanDeleted, RevisionSaved, SaveOutcome, SaveRequested, TapDragEnd,
};
use taps::{PlaceTapRequested, TapPlacementComplete};
use telemetry::RefreshRequested;

/// Domain core of the floor-plan engine: plan/tap/telemetry state, the
/// coordinate mapper, out-of-plan signal grouping, and the edit-session
/// tracker. Carries no rendering dependencies; everything downstream talks
/// to it through resources and events.
pub struct FloorPlanPlugin;

impl Plugin for FloorPlanPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<plan_mode::PlanMode>()
            .init_resource::<plan::ActivePlan>()
            .init_resource::<taps::TapRoster>()
            .init_resource::<telemetry::InstantPositions>()
            .init_resource::<telemetry::AggregatePositions>()
            .init_resource::<telemetry::OutOfPlanSignals>()
            .init_resource::<edit_session::EditSession>()
            .add_event::<TapDragEnd>()
            .add_event::<SaveRequested>()
            .add_event::<SaveOutcome>()
            .add_event::<RevisionSaved>()
            .add_event::<PlanDeleted>()
            .add_event::<RefreshRequested>()
            .add_event::<PlaceTapRequested>()
            .add_event::<TapPlacementComplete>()
            .add_systems(
                OnEnter(plan_mode::PlanMode::Edit),
                edit_session::install_exit_guard,
            )
            .add_systems(
                OnExit(plan_mode::PlanMode::Edit),
                edit_session::remove_exit_guard,
            )
            .add_systems(
                Update,
                (
                    edit_session::reset_session_on_plan_change,
                    edit_session::stage_drag_results,
                    edit_session::forward_save_batches,
                    edit_session::apply_save_outcomes,
                )
                    .chain(),
            );
    }
}
