//! Stand-in data collaborator for running the console without a live
//! backend.
//!
//! Owns everything the engine treats as collaborator territory: the plan
//! image, the tap roster, periodic telemetry refreshes, and the answer to
//! save batches and plan deletion. Data is procedurally generated from a
//! seeded RNG so every run looks the same.

use std::collections::BTreeMap;

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use floorplan::coords::PlanPoint;
use floorplan::edit_session::{EditSession, PlanDeleted, RevisionSaved, SaveOutcome};
use floorplan::plan::{ActivePlan, Plan, PlanImage};
use floorplan::plan_mode::PlanMode;
use floorplan::taps::{PlaceTapRequested, TapRoster};
use floorplan::telemetry::{
    AggregatePositions, InstantPositions, OutOfPlanSignals, RefreshRequested,
};
use ui::confirm_dialog::{ConfirmAction, PendingConfirmAction};

const PLAN_LENGTH: u32 = 1200;
const PLAN_WIDTH: u32 = 800;
/// Seconds between automatic telemetry refreshes.
const POLL_INTERVAL_SECS: f32 = 2.0;
/// Aggregate history cap; oldest samples fall off first.
const AGGREGATE_CAP: usize = 500;

const ROSTER_JSON: &str = include_str!("../fixtures/taps.json");

pub struct DemoFeedPlugin;

impl Plugin for DemoFeedPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(DemoRng(ChaCha8Rng::seed_from_u64(0x5eed)))
            .add_systems(Startup, load_demo_data)
            .add_systems(
                Update,
                (poll_telemetry, answer_saves, answer_deletion, keybinds),
            );
    }
}

#[derive(Resource)]
struct DemoRng(ChaCha8Rng);

/// One persisted tap position, as it would be logged to the backend.
#[derive(Serialize)]
struct PersistedPosition {
    tap: u64,
    x: f32,
    y: f32,
}

fn load_demo_data(
    mut plan: ResMut<ActivePlan>,
    mut roster: ResMut<TapRoster>,
    mut rng: ResMut<DemoRng>,
) {
    plan.replace(Some(Plan {
        length_pixels: PLAN_LENGTH,
        width_pixels: PLAN_WIDTH,
        image: generate_plan_image(&mut rng.0, PLAN_LENGTH, PLAN_WIDTH),
    }));

    match serde_json::from_str(ROSTER_JSON) {
        Ok(taps) => {
            roster.0 = taps;
            info!("loaded demo roster with {} taps", roster.0.len());
        }
        Err(err) => error!("demo roster fixture is invalid: {err}"),
    }
}

/// Draw a floor-plan-looking image: light background, dark outer walls,
/// and a handful of interior partitions.
fn generate_plan_image(rng: &mut ChaCha8Rng, width: u32, height: u32) -> PlanImage {
    let background = [240u8, 238, 230, 255];
    let wall = [60u8, 60, 64, 255];

    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..width * height {
        rgba.extend_from_slice(&background);
    }

    let mut paint = |x: u32, y: u32| {
        let i = ((y * width + x) * 4) as usize;
        rgba[i..i + 4].copy_from_slice(&wall);
    };

    // Outer walls, 4px.
    for y in 0..height {
        for x in 0..width {
            if x < 4 || x >= width - 4 || y < 4 || y >= height - 4 {
                paint(x, y);
            }
        }
    }

    // Interior partitions with door gaps. Margins and gap lengths scale
    // with the plan so the sampling ranges stay non-empty; plans too small
    // to hold a partition get outer walls only.
    if width >= 64 && height >= 64 {
        let x_margin = (width / 4).max(8);
        let y_margin = (height / 4).max(8);

        // Vertical partitions.
        let door = (height / 8).max(8);
        for _ in 0..5 {
            let x = rng.gen_range(x_margin..width - x_margin);
            let gap_start = rng.gen_range(4..height - 4 - door);
            for y in 4..height - 4 {
                if y < gap_start || y > gap_start + door {
                    for dx in 0..3 {
                        paint(x + dx, y);
                    }
                }
            }
        }

        // Horizontal partitions.
        let door = (width / 8).max(8);
        for _ in 0..3 {
            let y = rng.gen_range(y_margin..height - y_margin);
            let gap_start = rng.gen_range(4..width - 4 - door);
            for x in 4..width - 4 {
                if x < gap_start || x > gap_start + door {
                    for dy in 0..3 {
                        paint(x, y + dy);
                    }
                }
            }
        }
    }

    PlanImage {
        width,
        height,
        rgba,
    }
}

/// Regenerate the telemetry read models on a fixed cadence, or immediately
/// when a refresh is requested.
fn poll_telemetry(
    time: Res<Time>,
    mut refreshes: EventReader<RefreshRequested>,
    mut elapsed: Local<f32>,
    roster: Res<TapRoster>,
    mut rng: ResMut<DemoRng>,
    mut instant: ResMut<InstantPositions>,
    mut aggregate: ResMut<AggregatePositions>,
    mut out_of_plan: ResMut<OutOfPlanSignals>,
) {
    *elapsed += time.delta_secs();
    let due = *elapsed >= POLL_INTERVAL_SECS;
    if !due && refreshes.is_empty() {
        return;
    }
    refreshes.clear();
    if due {
        *elapsed = 0.0;
    }

    let rng = &mut rng.0;

    // Instant estimates cluster loosely around the placed taps.
    let mut latest = Vec::new();
    for tap in roster.0.iter().filter(|t| t.active) {
        let Some(pos) = tap.position else {
            continue;
        };
        for _ in 0..rng.gen_range(1..=3) {
            latest.push(PlanPoint::new(
                (pos.x + rng.gen_range(-90.0..90.0)).clamp(0.0, PLAN_LENGTH as f32),
                (pos.y + rng.gen_range(-90.0..90.0)).clamp(0.0, PLAN_WIDTH as f32),
            ));
        }
    }

    aggregate.0.extend(latest.iter().copied());
    let overflow = aggregate.0.len().saturating_sub(AGGREGATE_CAP);
    if overflow > 0 {
        aggregate.0.drain(..overflow);
    }
    instant.0 = latest;

    // A few sources estimated outside the plan, pinned to its edges.
    out_of_plan.0 = BTreeMap::new();
    for _ in 0..rng.gen_range(3..=6) {
        let strength = rng.gen_range(-90..=-40);
        let point = match rng.gen_range(0..4u8) {
            0 => PlanPoint::new(rng.gen_range(0.0..PLAN_LENGTH as f32), 0.0),
            1 => PlanPoint::new(rng.gen_range(0.0..PLAN_LENGTH as f32), PLAN_WIDTH as f32),
            2 => PlanPoint::new(0.0, rng.gen_range(0.0..PLAN_WIDTH as f32)),
            _ => PlanPoint::new(PLAN_LENGTH as f32, rng.gen_range(0.0..PLAN_WIDTH as f32)),
        };
        out_of_plan.0.insert(strength, point);
    }
}

/// Persist a forwarded batch: apply it to the roster and acknowledge.
fn answer_saves(
    mut batches: EventReader<RevisionSaved>,
    mut roster: ResMut<TapRoster>,
    mut outcomes: EventWriter<SaveOutcome>,
) {
    for batch in batches.read() {
        let persisted: Vec<PersistedPosition> = batch
            .positions
            .iter()
            .map(|(id, p)| PersistedPosition {
                tap: id.0,
                x: p.x,
                y: p.y,
            })
            .collect();
        match serde_json::to_string(&persisted) {
            Ok(json) => info!("persisting tap positions: {json}"),
            Err(err) => warn!("could not encode save batch: {err}"),
        }

        roster.apply_positions(&batch.positions);
        outcomes.send(SaveOutcome { success: true });
    }
}

fn answer_deletion(mut deletions: EventReader<PlanDeleted>, mut plan: ResMut<ActivePlan>) {
    if deletions.is_empty() {
        return;
    }
    deletions.clear();
    plan.replace(None);
    info!("floor plan deleted");
}

/// E toggles edit mode, P places the next unplaced tap, R refreshes.
#[allow(clippy::too_many_arguments)]
fn keybinds(
    keys: Res<ButtonInput<KeyCode>>,
    mode: Res<State<PlanMode>>,
    mut next_mode: ResMut<NextState<PlanMode>>,
    session: Res<EditSession>,
    roster: Res<TapRoster>,
    mut pending: ResMut<PendingConfirmAction>,
    mut refreshes: EventWriter<RefreshRequested>,
    mut placements: EventWriter<PlaceTapRequested>,
) {
    if keys.just_pressed(KeyCode::KeyR) {
        refreshes.send(RefreshRequested);
    }

    if keys.just_pressed(KeyCode::KeyE) {
        match *mode.get() {
            PlanMode::View => next_mode.set(PlanMode::Edit),
            PlanMode::Edit => {
                if session.is_dirty() {
                    pending.0 = Some(ConfirmAction::LeaveEdit);
                } else {
                    next_mode.set(PlanMode::View);
                }
            }
        }
    }

    if keys.just_pressed(KeyCode::KeyP) && *mode.get() == PlanMode::Edit {
        if let Some(tap) = roster.0.iter().find(|t| t.position.is_none()) {
            placements.send(PlaceTapRequested { tap: tap.clone() });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorplan::taps::Tap;

    #[test]
    fn roster_fixture_parses() {
        let taps: Vec<Tap> = serde_json::from_str(ROSTER_JSON).unwrap();
        assert_eq!(taps.len(), 5);
        assert!(taps.iter().any(|t| t.position.is_none()));
        assert!(taps.iter().any(|t| t.position.is_some()));
    }

    #[test]
    fn plan_image_matches_declared_dimensions() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let image = generate_plan_image(&mut rng, 300, 200);
        assert_eq!(image.rgba.len(), 300 * 200 * 4);
    }

    #[test]
    fn plan_generation_is_deterministic_per_seed() {
        let a = generate_plan_image(&mut ChaCha8Rng::seed_from_u64(7), 120, 90);
        let b = generate_plan_image(&mut ChaCha8Rng::seed_from_u64(7), 120, 90);
        assert_eq!(a.rgba, b.rgba);
    }

    #[test]
    fn plans_below_the_partition_minimum_get_outer_walls_only() {
        // Small enough that no partition sampling range exists.
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let image = generate_plan_image(&mut rng, 32, 16);
        assert_eq!(image.rgba.len(), 32 * 16 * 4);

        // Interior stays background-colored.
        let center = ((8 * 32 + 16) * 4) as usize;
        assert_eq!(&image.rgba[center..center + 4], &[240, 238, 230, 255]);
    }
}
