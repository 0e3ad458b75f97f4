//! Floor-plan surface orchestration.
//!
//! The surface is constructed once per distinct plan identity. On a
//! generation change it is fully torn down — every entity tagged
//! [`SurfacePart`] is despawned — and reconstructed, because the bounds
//! and the background image must change atomically. A live surface's
//! bounds or backdrop are never mutated in place.

use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use floorplan::coords::PlanMapper;
use floorplan::plan::{ActivePlan, Plan};

/// Teardown tag: everything belonging to the current surface carries it,
/// backdrop, markers, indicators, and heatmap overlays alike.
#[derive(Component)]
pub struct SurfacePart;

/// The plan image sprite.
#[derive(Component)]
pub struct PlanBackdrop;

// Z layering for surface entities (backdrop at the bottom, transient
// placement marker on top).
pub(crate) const Z_BACKDROP: f32 = 0.0;
pub(crate) const Z_AGGREGATE_OVERLAY: f32 = 1.0;
pub(crate) const Z_INSTANT_OVERLAY: f32 = 2.0;
pub(crate) const Z_INDICATOR: f32 = 3.0;
pub(crate) const Z_TAP_MARKER: f32 = 4.0;
pub(crate) const Z_PLACEMENT_MARKER: f32 = 5.0;

/// Current surface construction state. `mapper` is `Some` exactly while a
/// renderable surface exists; marker, drag, and heatmap systems read the
/// coordinate mapper from here.
#[derive(Resource, Default)]
pub struct SurfaceState {
    built_generation: Option<u64>,
    pub mapper: Option<PlanMapper>,
    /// Set on rebuild; consumed by the camera fit system.
    pub fit_pending: bool,
}

/// Tear down and reconstruct the surface when the plan identity changes.
pub fn sync_surface(
    mut commands: Commands,
    plan: Res<ActivePlan>,
    mut state: ResMut<SurfaceState>,
    parts: Query<Entity, With<SurfacePart>>,
    mut images: ResMut<Assets<Image>>,
) {
    if state.built_generation == Some(plan.generation()) {
        return;
    }

    // Remove pass first: the old surface disappears before any part of
    // the new one is spawned.
    for entity in &parts {
        commands.entity(entity).despawn();
    }
    state.built_generation = Some(plan.generation());
    state.mapper = None;

    let Some(plan) = plan.renderable() else {
        // Missing or zero-dimension plan: the ui shows the placeholder.
        return;
    };

    let Some(image) = backdrop_image(plan) else {
        warn!(
            "plan image payload does not match {}x{} dimensions; not rendering",
            plan.length_pixels, plan.width_pixels
        );
        return;
    };

    let mapper = PlanMapper::new(plan);
    let handle = images.add(image);
    commands.spawn((
        Sprite {
            image: handle,
            custom_size: Some(mapper.surface_size()),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, Z_BACKDROP),
        PlanBackdrop,
        SurfacePart,
    ));

    state.mapper = Some(mapper);
    state.fit_pending = true;
    info!(
        "floor plan surface rebuilt ({}x{} px)",
        plan.length_pixels, plan.width_pixels
    );
}

/// Upload the plan's RGBA payload as a texture. Returns `None` when the
/// payload length does not match the declared dimensions.
fn backdrop_image(plan: &Plan) -> Option<Image> {
    let expected = plan.image.width as usize * plan.image.height as usize * 4;
    if plan.image.rgba.len() != expected {
        return None;
    }

    let mut image = Image::new(
        Extent3d {
            width: plan.image.width,
            height: plan.image.height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        plan.image.rgba.clone(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
    );
    image.sampler = bevy::image::ImageSampler::linear();
    Some(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorplan::plan::PlanImage;

    #[test]
    fn backdrop_rejects_mismatched_payloads() {
        let plan = Plan {
            length_pixels: 4,
            width_pixels: 4,
            image: PlanImage {
                width: 4,
                height: 4,
                rgba: vec![0; 7], // wrong length
            },
        };
        assert!(backdrop_image(&plan).is_none());

        let plan_ok = Plan {
            length_pixels: 4,
            width_pixels: 4,
            image: PlanImage {
                width: 4,
                height: 4,
                rgba: vec![128; 4 * 4 * 4],
            },
        };
        assert!(backdrop_image(&plan_ok).is_some());
    }
}
