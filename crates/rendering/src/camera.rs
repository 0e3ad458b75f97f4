//! 2D surface camera: fit-to-plan on rebuild, wheel zoom, middle-drag pan.

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use crate::surface::SurfaceState;

const ZOOM_SPEED: f32 = 0.15;
const MIN_SCALE: f32 = 0.05;
const MAX_SCALE: f32 = 20.0;
/// Extra margin around the plan when fitting the view.
const FIT_MARGIN: f32 = 1.08;

#[derive(Resource, Default)]
pub struct CameraDrag {
    pub dragging: bool,
    pub last_pos: Vec2,
}

pub fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Center the camera on the plan and pick a zoom that shows all of it.
/// Runs once per surface rebuild.
pub fn fit_camera_to_plan(
    mut state: ResMut<SurfaceState>,
    windows: Query<&Window>,
    mut cameras: Query<(&mut Transform, &mut OrthographicProjection), With<Camera2d>>,
) {
    if !state.fit_pending {
        return;
    }
    let Some(mapper) = state.mapper else {
        state.fit_pending = false;
        return;
    };
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Ok((mut transform, mut projection)) = cameras.get_single_mut() else {
        return;
    };

    let plan = mapper.surface_size();
    let scale_x = plan.x / window.width().max(1.0);
    let scale_y = plan.y / window.height().max(1.0);
    projection.scale = (scale_x.max(scale_y) * FIT_MARGIN).clamp(MIN_SCALE, MAX_SCALE);
    transform.translation = Vec3::new(0.0, 0.0, transform.translation.z);
    state.fit_pending = false;
}

/// Middle-mouse drag: pan the camera across the plan.
pub fn camera_pan_drag(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    mut drag: ResMut<CameraDrag>,
    mut cameras: Query<(&mut Transform, &OrthographicProjection), With<Camera2d>>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };

    if buttons.just_pressed(MouseButton::Middle) {
        if let Some(pos) = window.cursor_position() {
            drag.dragging = true;
            drag.last_pos = pos;
        }
    }
    if buttons.just_released(MouseButton::Middle) {
        drag.dragging = false;
    }

    if drag.dragging {
        if let Some(pos) = window.cursor_position() {
            let delta = pos - drag.last_pos;
            let Ok((mut transform, projection)) = cameras.get_single_mut() else {
                return;
            };
            // Screen y grows downward; world y grows upward.
            transform.translation.x -= delta.x * projection.scale;
            transform.translation.y += delta.y * projection.scale;
            drag.last_pos = pos;
        }
    }
}

/// Scroll wheel: zoom in and out around the current view center.
pub fn camera_zoom(
    mut scroll_evts: EventReader<MouseWheel>,
    mut cameras: Query<&mut OrthographicProjection, With<Camera2d>>,
) {
    let Ok(mut projection) = cameras.get_single_mut() else {
        return;
    };
    for evt in scroll_evts.read() {
        let dy = match evt.unit {
            MouseScrollUnit::Line => evt.y,
            MouseScrollUnit::Pixel => evt.y / 100.0,
        };
        let factor = 1.0 - dy * ZOOM_SPEED;
        projection.scale = (projection.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
    }
}
