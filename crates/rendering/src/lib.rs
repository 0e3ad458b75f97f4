use bevy::prelude::*;

pub mod camera;
pub mod color_ramp;
pub mod drag;
pub mod heatmap;
pub mod markers;
pub mod surface;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<surface::SurfaceState>()
            .init_resource::<markers::MarkerVisibility>()
            .init_resource::<heatmap::HeatmapSettings>()
            .init_resource::<camera::CameraDrag>()
            .init_resource::<drag::DragState>()
            .add_systems(Startup, camera::setup_camera)
            .add_systems(
                Update,
                (
                    surface::sync_surface,
                    camera::fit_camera_to_plan,
                    camera::camera_pan_drag,
                    camera::camera_zoom,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    markers::sync_tap_markers,
                    markers::spawn_placement_markers,
                    markers::retire_placement_markers,
                    markers::sync_strength_indicators,
                )
                    .after(surface::sync_surface),
            )
            .add_systems(
                Update,
                (
                    heatmap::sync_instant_overlay,
                    heatmap::sync_aggregate_overlay,
                )
                    .after(surface::sync_surface),
            )
            .add_systems(
                Update,
                (
                    drag::begin_marker_drag,
                    drag::update_marker_drag,
                    drag::end_marker_drag,
                )
                    .chain()
                    .run_if(in_state(floorplan::plan_mode::PlanMode::Edit)),
            )
            .add_systems(
                OnExit(floorplan::plan_mode::PlanMode::Edit),
                drag::clear_drag_state,
            );
    }
}
