//! Marker dragging in edit mode.
//!
//! A drag moves the sprite live but stages nothing by itself. Only the
//! release emits a [`TapDragEnd`] event carrying the final plan-space
//! position; the edit session is the sole owner of staged positions.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use floorplan::coords::PlanPoint;
use floorplan::edit_session::TapDragEnd;
use floorplan::taps::TapId;

use crate::markers::{PlacementMarker, TapMarker, MARKER_SIZE};
use crate::surface::SurfaceState;

/// The marker currently being dragged, if any.
#[derive(Clone, Copy)]
pub struct ActiveDrag {
    pub entity: Entity,
    pub tap: TapId,
}

#[derive(Resource, Default)]
pub struct DragState {
    pub active: Option<ActiveDrag>,
}

/// Left-press hit test against tap and placement markers. The topmost hit
/// wins. Presses captured by the ui layer never start a drag.
pub fn begin_marker_drag(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    markers: Query<(Entity, &Transform, Option<&TapMarker>, Option<&PlacementMarker>)>,
    mut state: ResMut<DragState>,
    mut egui: EguiContexts,
) {
    if !buttons.just_pressed(MouseButton::Left) || state.active.is_some() {
        return;
    }
    if egui.ctx_mut().wants_pointer_input() {
        return;
    }
    let Some(cursor) = cursor_world_pos(&windows, &cameras) else {
        return;
    };

    let half = MARKER_SIZE / 2.0;
    let mut best: Option<(f32, ActiveDrag)> = None;
    for (entity, transform, tap_marker, placement) in &markers {
        let pos = transform.translation;
        if (cursor.x - pos.x).abs() > half || (cursor.y - pos.y).abs() > half {
            continue;
        }
        let tap = match (tap_marker, placement) {
            (Some(m), _) => m.tap,
            (None, Some(m)) => m.tap,
            (None, None) => continue,
        };
        if best.is_none_or(|(z, _)| pos.z > z) {
            best = Some((pos.z, ActiveDrag { entity, tap }));
        }
    }
    if let Some((_, drag)) = best {
        state.active = Some(drag);
    }
}

/// Follow the cursor with the dragged marker, clamped to the plan bounds.
pub fn update_marker_drag(
    state: Res<DragState>,
    windows: Query<&Window>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    surface: Res<SurfaceState>,
    mut transforms: Query<&mut Transform>,
) {
    let Some(drag) = state.active else {
        return;
    };
    let Some(mapper) = surface.mapper else {
        return;
    };
    let Some(cursor) = cursor_world_pos(&windows, &cameras) else {
        return;
    };
    let Ok(mut transform) = transforms.get_mut(drag.entity) else {
        return;
    };
    let clamped = mapper.to_surface(mapper.clamp(mapper.from_surface(cursor)));
    transform.translation.x = clamped.x;
    transform.translation.y = clamped.y;
}

/// On release, report the marker's final plan-space position.
pub fn end_marker_drag(
    buttons: Res<ButtonInput<MouseButton>>,
    surface: Res<SurfaceState>,
    transforms: Query<&Transform>,
    mut state: ResMut<DragState>,
    mut drag_ends: EventWriter<TapDragEnd>,
) {
    if !buttons.just_released(MouseButton::Left) {
        return;
    }
    let Some(drag) = state.active.take() else {
        return;
    };
    let (Some(mapper), Ok(transform)) = (surface.mapper, transforms.get(drag.entity)) else {
        return;
    };
    let position: PlanPoint =
        mapper.clamp(mapper.from_surface(transform.translation.truncate()));
    drag_ends.send(TapDragEnd {
        tap: drag.tap,
        position,
    });
}

/// Leaving edit mode cancels any in-flight drag without staging it.
pub fn clear_drag_state(mut state: ResMut<DragState>) {
    state.active = None;
}

fn cursor_world_pos(
    windows: &Query<&Window>,
    cameras: &Query<(&Camera, &GlobalTransform), With<Camera2d>>,
) -> Option<Vec2> {
    let window = windows.get_single().ok()?;
    let cursor = window.cursor_position()?;
    let (camera, camera_transform) = cameras.get_single().ok()?;
    camera.viewport_to_world_2d(camera_transform, cursor).ok()
}
