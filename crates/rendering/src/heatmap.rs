//! Density heatmap overlays for signal positions.
//!
//! Two independent overlay categories, instant and aggregate, each drawn
//! as a single plan-sized texture. An overlay is replaced wholesale on
//! every data refresh: the remove pass runs even when the new data is
//! empty, so a category that goes quiet disappears instead of ghosting.

use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use floorplan::coords::PlanPoint;
use floorplan::plan_mode::PlanMode;
use floorplan::telemetry::{AggregatePositions, InstantPositions};

use crate::color_ramp::HEAT;
use crate::surface::{SurfacePart, SurfaceState, Z_AGGREGATE_OVERLAY, Z_INSTANT_OVERLAY};

/// Splat radius around each position, in plan pixels.
const POINT_RADIUS: f32 = 20.0;
/// Soft falloff extends the splat beyond the core radius.
const POINT_BLUR: f32 = 15.0;
/// Density texture resolution: one texel per this many plan pixels.
const TEXELS_PER_PIXEL: u32 = 4;

/// Marker for the instant (latest sample) overlay.
#[derive(Component, Default)]
pub struct InstantOverlay;

/// Marker for the aggregate (time window) overlay.
#[derive(Component, Default)]
pub struct AggregateOverlay;

#[derive(Resource)]
pub struct HeatmapSettings {
    /// Uniform weight applied to every instant sample, `0.0..=1.0`. The
    /// aggregate overlay ignores it.
    pub intensity: f32,
}

impl Default for HeatmapSettings {
    fn default() -> Self {
        Self { intensity: 0.7 }
    }
}

/// A plan-space density field with values in `[0, 1]`.
pub struct DensityGrid {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<f32>,
}

/// Accumulate radial splats of the given weight onto a downscaled grid,
/// then clamp the field to the fixed normalization max of 1.0. Callers
/// pre-scale weights; the instant overlay passes the operator-controlled
/// intensity, the aggregate overlay weight 1 per sample.
pub fn bake_density(
    points: &[PlanPoint],
    weight: f32,
    plan_length: u32,
    plan_width: u32,
) -> DensityGrid {
    let width = (plan_length / TEXELS_PER_PIXEL).max(1);
    let height = (plan_width / TEXELS_PER_PIXEL).max(1);
    let mut cells = vec![0.0f32; (width * height) as usize];

    let reach = (POINT_RADIUS + POINT_BLUR) / TEXELS_PER_PIXEL as f32;
    for point in points {
        let cx = point.x / TEXELS_PER_PIXEL as f32;
        let cy = point.y / TEXELS_PER_PIXEL as f32;
        let x_lo = ((cx - reach).floor().max(0.0)) as u32;
        let x_hi = ((cx + reach).ceil() as u32).min(width.saturating_sub(1));
        let y_lo = ((cy - reach).floor().max(0.0)) as u32;
        let y_hi = ((cy + reach).ceil() as u32).min(height.saturating_sub(1));
        for y in y_lo..=y_hi {
            for x in x_lo..=x_hi {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                let d = (dx * dx + dy * dy).sqrt() / reach;
                if d < 1.0 {
                    // Quadratic falloff reads as a blurred disc.
                    cells[(y * width + x) as usize] += weight * (1.0 - d * d);
                }
            }
        }
    }

    for cell in &mut cells {
        *cell = cell.min(1.0);
    }
    DensityGrid {
        width,
        height,
        cells,
    }
}

/// Map a density field through the heat ramp into an RGBA texture.
/// Alpha follows density, so empty cells stay fully transparent.
pub fn overlay_image(grid: &DensityGrid) -> Image {
    let mut rgba = Vec::with_capacity(grid.cells.len() * 4);
    for &d in &grid.cells {
        let [r, g, b] = HEAT.sample(d);
        let a = (d * 255.0) as u8;
        rgba.extend_from_slice(&[
            (r * 255.0) as u8,
            (g * 255.0) as u8,
            (b * 255.0) as u8,
            a,
        ]);
    }

    let mut image = Image::new(
        Extent3d {
            width: grid.width,
            height: grid.height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        rgba,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
    );
    image.sampler = bevy::image::ImageSampler::linear();
    image
}

pub fn sync_instant_overlay(
    commands: Commands,
    positions: Res<InstantPositions>,
    settings: Res<HeatmapSettings>,
    mode: Res<State<PlanMode>>,
    surface: Res<SurfaceState>,
    images: ResMut<Assets<Image>>,
    existing: Query<Entity, With<InstantOverlay>>,
) {
    if !(positions.is_changed()
        || settings.is_changed()
        || mode.is_changed()
        || surface.is_changed())
    {
        return;
    }
    // Instant samples all carry the operator-controlled intensity.
    rebuild_overlay::<InstantOverlay>(
        commands,
        &positions.0,
        settings.intensity.clamp(0.0, 1.0),
        &mode,
        &surface,
        images,
        &existing,
        Z_INSTANT_OVERLAY,
    );
}

pub fn sync_aggregate_overlay(
    commands: Commands,
    positions: Res<AggregatePositions>,
    mode: Res<State<PlanMode>>,
    surface: Res<SurfaceState>,
    images: ResMut<Assets<Image>>,
    existing: Query<Entity, With<AggregateOverlay>>,
) {
    if !(positions.is_changed() || mode.is_changed() || surface.is_changed()) {
        return;
    }
    // Historical samples weigh 1 each; the intensity slider does not
    // affect the aggregate view.
    rebuild_overlay::<AggregateOverlay>(
        commands,
        &positions.0,
        1.0,
        &mode,
        &surface,
        images,
        &existing,
        Z_AGGREGATE_OVERLAY,
    );
}

/// Shared remove-then-add pass. Only entities of the caller's category
/// are touched; the two overlays never claim each other's sprites.
#[allow(clippy::too_many_arguments)]
fn rebuild_overlay<C: Component + Default>(
    mut commands: Commands,
    points: &[PlanPoint],
    weight: f32,
    mode: &State<PlanMode>,
    surface: &SurfaceState,
    mut images: ResMut<Assets<Image>>,
    existing: &Query<Entity, With<C>>,
    z: f32,
) {
    for entity in existing {
        commands.entity(entity).despawn();
    }

    if points.is_empty() || *mode.get() != PlanMode::View {
        return;
    }
    let Some(mapper) = surface.mapper else {
        return;
    };

    let size = mapper.surface_size();
    let grid = bake_density(points, weight, size.x as u32, size.y as u32);
    let handle = images.add(overlay_image(&grid));
    commands.spawn((
        Sprite {
            image: handle,
            custom_size: Some(mapper.surface_size()),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, z),
        C::default(),
        SurfacePart,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use floorplan::coords::PlanMapper;
    use floorplan::plan::{Plan, PlanImage};

    #[test]
    fn empty_input_bakes_an_empty_field() {
        let grid = bake_density(&[], 1.0, 400, 300);
        assert!(grid.cells.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn density_peaks_at_the_point_and_falls_off() {
        let grid = bake_density(&[PlanPoint::new(200.0, 150.0)], 1.0, 400, 300);
        let at = |x: u32, y: u32| grid.cells[(y * grid.width + x) as usize];

        let cx = 200 / TEXELS_PER_PIXEL;
        let cy = 150 / TEXELS_PER_PIXEL;
        let peak = at(cx, cy);
        assert!(peak > 0.9, "peak should be near 1.0, got {peak}");
        assert!(at(cx + 5, cy) < peak);
        // Outside the splat reach the field is untouched.
        assert_eq!(at(0, 0), 0.0);
    }

    #[test]
    fn point_weight_scales_the_field() {
        let point = [PlanPoint::new(100.0, 100.0)];
        let full = bake_density(&point, 1.0, 400, 300);
        let half = bake_density(&point, 0.5, 400, 300);
        let i = ((100 / TEXELS_PER_PIXEL) * full.width + 100 / TEXELS_PER_PIXEL) as usize;
        assert!((half.cells[i] - full.cells[i] * 0.5).abs() < 1e-6);
    }

    #[test]
    fn overlapping_points_clamp_to_full_density() {
        let points = vec![PlanPoint::new(100.0, 100.0); 8];
        let grid = bake_density(&points, 1.0, 400, 300);
        let cx = 100 / TEXELS_PER_PIXEL;
        let cy = 100 / TEXELS_PER_PIXEL;
        let cell = grid.cells[(cy * grid.width + cx) as usize];
        assert!(cell <= 1.0);
        assert!((cell - 1.0).abs() < 1e-6);
    }

    #[test]
    fn overlay_alpha_follows_density() {
        let grid = DensityGrid {
            width: 2,
            height: 1,
            cells: vec![1.0, 0.0],
        };
        let image = overlay_image(&grid);
        assert_eq!(image.data[3], 255);
        // Zero density stays fully transparent.
        assert_eq!(image.data[7], 0);
    }

    fn overlay_world() -> World {
        let mut world = World::new();
        world.insert_resource(InstantPositions(vec![PlanPoint::new(50.0, 50.0)]));
        world.insert_resource(AggregatePositions(vec![PlanPoint::new(150.0, 80.0)]));
        world.insert_resource(HeatmapSettings::default());
        world.insert_resource(State::new(PlanMode::View));
        world.insert_resource(Assets::<Image>::default());

        let mut surface = SurfaceState::default();
        surface.mapper = Some(PlanMapper::new(&Plan {
            length_pixels: 400,
            width_pixels: 300,
            image: PlanImage {
                width: 400,
                height: 300,
                rgba: Vec::new(),
            },
        }));
        world.insert_resource(surface);
        world
    }

    fn count<C: Component>(world: &mut World) -> usize {
        world
            .query_filtered::<Entity, With<C>>()
            .iter(world)
            .count()
    }

    #[test]
    fn successive_renders_keep_exactly_one_overlay_per_category() {
        let mut world = overlay_world();

        world.run_system_once(sync_instant_overlay).unwrap();
        world.run_system_once(sync_instant_overlay).unwrap();

        assert_eq!(count::<InstantOverlay>(&mut world), 1);
    }

    #[test]
    fn overlay_categories_never_claim_each_other() {
        let mut world = overlay_world();

        world.run_system_once(sync_instant_overlay).unwrap();
        world.run_system_once(sync_aggregate_overlay).unwrap();
        // Re-rendering one category must leave the other untouched.
        world.run_system_once(sync_instant_overlay).unwrap();

        assert_eq!(count::<InstantOverlay>(&mut world), 1);
        assert_eq!(count::<AggregateOverlay>(&mut world), 1);
    }

    #[test]
    fn empty_point_set_removes_the_overlay() {
        let mut world = overlay_world();
        world.run_system_once(sync_instant_overlay).unwrap();
        assert_eq!(count::<InstantOverlay>(&mut world), 1);

        world.resource_mut::<InstantPositions>().0.clear();
        world.run_system_once(sync_instant_overlay).unwrap();
        assert_eq!(count::<InstantOverlay>(&mut world), 0);
    }
}
