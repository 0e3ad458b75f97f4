//! Marker lifecycle: tap markers, the transient placement marker, and
//! out-of-plan strength indicators.
//!
//! Three independent, toggle-able categories. Category rebuilds are always
//! despawn-then-respawn from the live source resources (never a cache), so
//! status icons stay current and at most one marker exists per logical
//! entity id. Toggling an empty category off is a no-op.

use bevy::prelude::*;

use floorplan::plan_mode::PlanMode;
use floorplan::signal_grouping::group_out_of_plan;
use floorplan::taps::{PlaceTapRequested, Tap, TapId, TapPlacementComplete, TapRoster};
use floorplan::telemetry::OutOfPlanSignals;

use crate::color_ramp::strength_color;
use crate::drag::DragState;
use crate::surface::{SurfacePart, SurfaceState, Z_INDICATOR, Z_PLACEMENT_MARKER, Z_TAP_MARKER};

/// Side length of a tap marker square, in plan pixels.
pub const MARKER_SIZE: f32 = 24.0;
/// Out-of-plan strength indicators are small rectangles.
const INDICATOR_SIZE: Vec2 = Vec2::new(26.0, 16.0);

/// Marker for a persisted tap position.
#[derive(Component)]
pub struct TapMarker {
    pub tap: TapId,
}

/// The single "being placed" new tap. Lives until its position is
/// persisted or the surface is torn down.
#[derive(Component)]
pub struct PlacementMarker {
    pub tap: TapId,
}

/// A rectangular out-of-plan strength indicator.
#[derive(Component)]
pub struct StrengthIndicator;

/// Operator-controlled visibility toggles for the marker categories.
#[derive(Resource, Default)]
pub struct MarkerVisibility {
    pub taps: bool,
    pub strength_indicators: bool,
}

/// Which icon a tap marker gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconVariant {
    Online,
    Offline,
    Transient,
}

impl IconVariant {
    pub fn for_tap(tap: &Tap) -> Self {
        if tap.active {
            Self::Online
        } else {
            Self::Offline
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Online => Color::srgb(0.18, 0.72, 0.35),
            Self::Offline => Color::srgb(0.85, 0.25, 0.20),
            Self::Transient => Color::srgb(0.25, 0.55, 0.95),
        }
    }
}

/// Rebuild tap markers from the live roster whenever the roster, the
/// visibility toggles, the mode, or the surface changes.
///
/// Rebuilds are deferred while a drag is active so the dragged marker is
/// never despawned mid-gesture.
pub fn sync_tap_markers(
    mut commands: Commands,
    roster: Res<TapRoster>,
    visibility: Res<MarkerVisibility>,
    mode: Res<State<PlanMode>>,
    surface: Res<SurfaceState>,
    drag: Res<DragState>,
    existing: Query<Entity, With<TapMarker>>,
    mut rebuild_pending: Local<bool>,
) {
    if roster.is_changed()
        || visibility.is_changed()
        || mode.is_changed()
        || surface.is_changed()
    {
        *rebuild_pending = true;
    }
    if !*rebuild_pending || drag.active.is_some() {
        return;
    }
    *rebuild_pending = false;

    // Remove pass: re-creation always replaces the previous instance.
    for entity in &existing {
        commands.entity(entity).despawn();
    }

    let editing = *mode.get() == PlanMode::Edit;
    if !(visibility.taps || editing) {
        return;
    }
    let Some(mapper) = surface.mapper else {
        return;
    };

    for tap in &roster.0 {
        let Some(position) = tap.position else {
            continue;
        };
        let surface_pos = mapper.to_surface(position);
        commands.spawn((
            Sprite::from_color(
                IconVariant::for_tap(tap).color(),
                Vec2::splat(MARKER_SIZE),
            ),
            Transform::from_xyz(surface_pos.x, surface_pos.y, Z_TAP_MARKER),
            TapMarker { tap: tap.id },
            SurfacePart,
        ));
    }
}

/// Handle "place a new tap": spawn a draggable transient marker at the
/// plan's visual center. Center placement alone stages nothing — a pending
/// position only exists once the marker has been dragged.
pub fn spawn_placement_markers(
    mut commands: Commands,
    mut requests: EventReader<PlaceTapRequested>,
    surface: Res<SurfaceState>,
    existing: Query<(Entity, &PlacementMarker)>,
    tap_markers: Query<(Entity, &TapMarker)>,
    mut completed: EventWriter<TapPlacementComplete>,
) {
    for request in requests.read() {
        let Some(mapper) = surface.mapper else {
            warn!("tap placement requested without a renderable plan");
            continue;
        };

        // One marker per logical tap: drop any previous instance.
        for (entity, marker) in &existing {
            if marker.tap == request.tap.id {
                commands.entity(entity).despawn();
            }
        }
        for (entity, marker) in &tap_markers {
            if marker.tap == request.tap.id {
                commands.entity(entity).despawn();
            }
        }

        let center = mapper.to_surface(mapper.center());
        commands.spawn((
            Sprite::from_color(IconVariant::Transient.color(), Vec2::splat(MARKER_SIZE)),
            Transform::from_xyz(center.x, center.y, Z_PLACEMENT_MARKER),
            PlacementMarker {
                tap: request.tap.id,
            },
            SurfacePart,
        ));
        completed.send(TapPlacementComplete {
            tap: request.tap.id,
        });
    }
}

/// Once the roster reports a persisted position for a placed tap, the
/// transient marker is obsolete — the regular tap marker takes over.
pub fn retire_placement_markers(
    mut commands: Commands,
    roster: Res<TapRoster>,
    placements: Query<(Entity, &PlacementMarker)>,
) {
    if !roster.is_changed() {
        return;
    }
    for (entity, marker) in &placements {
        let persisted = roster
            .get(marker.tap)
            .is_some_and(|tap| tap.position.is_some());
        if persisted {
            commands.entity(entity).despawn();
        }
    }
}

/// Rebuild the out-of-plan strength indicators from the live signal map.
/// View mode only; ranks and colors come from the grouping engine.
pub fn sync_strength_indicators(
    mut commands: Commands,
    signals: Res<OutOfPlanSignals>,
    visibility: Res<MarkerVisibility>,
    mode: Res<State<PlanMode>>,
    surface: Res<SurfaceState>,
    existing: Query<Entity, With<StrengthIndicator>>,
) {
    if !(signals.is_changed()
        || visibility.is_changed()
        || mode.is_changed()
        || surface.is_changed())
    {
        return;
    }

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    let showing = visibility.strength_indicators && *mode.get() == PlanMode::View;
    if !showing {
        return;
    }
    let Some(mapper) = surface.mapper else {
        return;
    };

    for ranked in group_out_of_plan(&signals.0) {
        let surface_pos = mapper.to_surface(ranked.position);
        commands.spawn((
            Sprite::from_color(strength_color(ranked.rank), INDICATOR_SIZE),
            Transform::from_xyz(surface_pos.x, surface_pos.y, Z_INDICATOR),
            StrengthIndicator,
            SurfacePart,
        ));
    }
}
