//! Edit-session tracker: dirty state, staged positions, save intents.
//!
//! Drag-end events are the only way a position enters the session; nothing
//! mutates the collaborator-owned roster directly. Saving forwards the
//! full pending map as one [`RevisionSaved`] batch; the collaborator
//! answers with [`SaveOutcome`], and only a successful outcome resets the
//! session. A failed save leaves everything staged so the unsaved-changes
//! guard stays active and a retry remains possible.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::coords::PlanPoint;
use crate::plan::ActivePlan;
use crate::taps::TapId;

/// A marker drag finished at `position` (already converted to plan-pixel
/// space and clamped to plan bounds by the surface).
#[derive(Event, Debug, Clone, Copy)]
pub struct TapDragEnd {
    pub tap: TapId,
    pub position: PlanPoint,
}

/// Operator pressed save. Ignored while the session is clean.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct SaveRequested;

/// Collaborator verdict on the last forwarded batch.
#[derive(Event, Debug, Clone, Copy)]
pub struct SaveOutcome {
    pub success: bool,
}

/// The full staged-position batch, forwarded verbatim to the persistence
/// collaborator. There is no per-drag event stream; this is the only way
/// positions leave the engine.
#[derive(Event, Debug, Clone)]
pub struct RevisionSaved {
    pub positions: BTreeMap<TapId, PlanPoint>,
}

/// Confirmed, irreversible plan deletion; forwarded verbatim.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct PlanDeleted;

/// Scoped navigation guard. Present exactly while edit mode is active;
/// window-close interception keys off its existence, so the guard can
/// never leak past edit mode regardless of exit path.
#[derive(Resource, Default)]
pub struct ExitGuard;

/// Dirty-state tracker for the current edit session.
///
/// `local_revision == 0` means no unsaved change. Every drag-end
/// increments it, so it is monotonically non-decreasing within a session;
/// it resets only on save success, explicit discard, or plan reload.
#[derive(Resource, Default)]
pub struct EditSession {
    local_revision: u64,
    pending: BTreeMap<TapId, PlanPoint>,
}

impl EditSession {
    /// Stage a drag result. Last drag wins per tap.
    pub fn stage(&mut self, tap: TapId, position: PlanPoint) {
        self.pending.insert(tap, position);
        self.local_revision += 1;
    }

    pub fn is_dirty(&self) -> bool {
        self.local_revision != 0
    }

    pub fn local_revision(&self) -> u64 {
        self.local_revision
    }

    pub fn pending(&self) -> &BTreeMap<TapId, PlanPoint> {
        &self.pending
    }

    /// Discard all staged positions and return to the clean state.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.local_revision = 0;
    }
}

pub fn install_exit_guard(mut commands: Commands) {
    commands.init_resource::<ExitGuard>();
}

pub fn remove_exit_guard(mut commands: Commands) {
    commands.remove_resource::<ExitGuard>();
}

/// Fold drag-end events into the session. The session is the single owner
/// of the pending-position map; drag handlers never mutate shared state
/// beyond emitting [`TapDragEnd`].
pub fn stage_drag_results(
    mut drags: EventReader<TapDragEnd>,
    mut session: ResMut<EditSession>,
) {
    for drag in drags.read() {
        session.stage(drag.tap, drag.position);
        debug!(
            "staged tap {:?} at ({:.1}, {:.1}), local revision {}",
            drag.tap,
            drag.position.x,
            drag.position.y,
            session.local_revision()
        );
    }
}

/// Forward the staged batch to the persistence collaborator. One batch per
/// request, fire-and-forget; the engine performs no retry.
pub fn forward_save_batches(
    mut requests: EventReader<SaveRequested>,
    session: Res<EditSession>,
    mut saved: EventWriter<RevisionSaved>,
) {
    if requests.is_empty() {
        return;
    }
    requests.clear();

    if !session.is_dirty() {
        return;
    }

    saved.send(RevisionSaved {
        positions: session.pending().clone(),
    });
}

/// Apply the collaborator's verdict. Success resets to NoChanges; failure
/// leaves the session untouched — no optimistic merge, no partial commit.
pub fn apply_save_outcomes(
    mut outcomes: EventReader<SaveOutcome>,
    mut session: ResMut<EditSession>,
) {
    for outcome in outcomes.read() {
        if outcome.success {
            info!(
                "tap position revision saved ({} positions)",
                session.pending().len()
            );
            session.reset();
        } else {
            warn!(
                "save failed; keeping {} staged positions for retry",
                session.pending().len()
            );
        }
    }
}

/// A plan reload replaces the coordinate space, so staged positions are
/// meaningless: discard them and return to NoChanges.
pub fn reset_session_on_plan_change(
    plan: Res<ActivePlan>,
    mut session: ResMut<EditSession>,
    mut last_generation: Local<u64>,
) {
    if plan.generation() != *last_generation {
        *last_generation = plan.generation();
        session.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_is_clean() {
        let session = EditSession::default();
        assert!(!session.is_dirty());
        assert_eq!(session.local_revision(), 0);
        assert!(session.pending().is_empty());
    }

    #[test]
    fn drag_end_enters_dirty_at_revision_one() {
        let mut session = EditSession::default();
        session.stage(TapId(1), PlanPoint::new(10.0, 20.0));
        assert!(session.is_dirty());
        assert_eq!(session.local_revision(), 1);
    }

    #[test]
    fn last_drag_wins_but_revision_keeps_counting() {
        let mut session = EditSession::default();
        session.stage(TapId(1), PlanPoint::new(10.0, 20.0));
        session.stage(TapId(1), PlanPoint::new(30.0, 40.0));

        assert_eq!(session.local_revision(), 2);
        assert_eq!(session.pending().len(), 1);
        assert_eq!(
            session.pending().get(&TapId(1)),
            Some(&PlanPoint::new(30.0, 40.0))
        );
    }

    #[test]
    fn reset_returns_to_no_changes() {
        let mut session = EditSession::default();
        session.stage(TapId(1), PlanPoint::new(10.0, 20.0));
        session.stage(TapId(2), PlanPoint::new(1.0, 2.0));
        session.reset();

        assert!(!session.is_dirty());
        assert_eq!(session.local_revision(), 0);
        assert!(session.pending().is_empty());
    }
}
