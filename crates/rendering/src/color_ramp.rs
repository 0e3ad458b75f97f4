//! Color ramps for the heatmap overlay and the strength indicators.
//!
//! The heatmap uses a continuous blue-to-red heat ramp sampled by density.
//! Out-of-plan strength indicators use a fixed 10-step discrete ramp,
//! light to saturated, indexed by intensity rank.

use bevy::prelude::*;

/// A continuous color ramp defined by evenly-spaced sRGB control points,
/// interpolated linearly for a `t` in `[0, 1]`.
pub struct ColorRamp {
    points: &'static [[f32; 3]],
}

impl ColorRamp {
    /// Sample the ramp at `t` (clamped to `[0, 1]`), as sRGB components.
    pub fn sample(&self, t: f32) -> [f32; 3] {
        let t = t.clamp(0.0, 1.0);
        let n = self.points.len();
        if n == 0 {
            return [0.0, 0.0, 0.0];
        }
        if n == 1 {
            return self.points[0];
        }
        let scaled = t * (n - 1) as f32;
        let lo = (scaled as usize).min(n - 2);
        let frac = scaled - lo as f32;
        let a = self.points[lo];
        let b = self.points[lo + 1];
        [
            a[0] + (b[0] - a[0]) * frac,
            a[1] + (b[1] - a[1]) * frac,
            a[2] + (b[2] - a[2]) * frac,
        ]
    }
}

/// Heat ramp for density overlays: cool blue through green and yellow to
/// saturated red at full density.
pub static HEAT: ColorRamp = ColorRamp {
    points: &[
        [0.00, 0.00, 1.00], // 0    - blue
        [0.00, 1.00, 1.00], // 0.25 - cyan
        [0.00, 1.00, 0.00], // 0.5  - lime
        [1.00, 1.00, 0.00], // 0.75 - yellow
        [1.00, 0.00, 0.00], // 1    - red
    ],
};

/// Fixed 10-step ramp for out-of-plan strength indicators, ordered light
/// to saturated. Rank `r` is drawn with `STRENGTH_COLORS[9 - r]`, so rank
/// 0 (strongest in the sample) gets the most saturated color.
pub static STRENGTH_COLORS: [Color; 10] = [
    Color::srgb(1.000, 1.000, 0.800), // weakest - pale yellow
    Color::srgb(1.000, 0.929, 0.627),
    Color::srgb(0.996, 0.851, 0.463),
    Color::srgb(0.996, 0.698, 0.298),
    Color::srgb(0.992, 0.553, 0.235),
    Color::srgb(0.988, 0.306, 0.165),
    Color::srgb(0.890, 0.102, 0.110),
    Color::srgb(0.741, 0.000, 0.149),
    Color::srgb(0.600, 0.000, 0.149),
    Color::srgb(0.502, 0.000, 0.149), // strongest - deep red
];

/// Color for an intensity rank from the grouping engine (0 = strongest).
pub fn strength_color(rank: u8) -> Color {
    let rank = rank.min(9) as usize;
    STRENGTH_COLORS[9 - rank]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_zero_gets_the_most_saturated_color() {
        assert_eq!(strength_color(0), STRENGTH_COLORS[9]);
        assert_eq!(strength_color(9), STRENGTH_COLORS[0]);
    }

    #[test]
    fn out_of_range_ranks_clamp_to_the_weakest_bucket() {
        assert_eq!(strength_color(200), STRENGTH_COLORS[0]);
    }

    #[test]
    fn all_ten_strength_colors_are_distinct() {
        for i in 0..10 {
            for j in (i + 1)..10 {
                assert_ne!(
                    STRENGTH_COLORS[i], STRENGTH_COLORS[j],
                    "colors {i} and {j} collide"
                );
            }
        }
    }

    #[test]
    fn heat_ramp_endpoints() {
        let cold = HEAT.sample(0.0);
        assert!(cold[2] > 0.9 && cold[0] < 0.1, "t=0 should be blue");
        let hot = HEAT.sample(1.0);
        assert!(hot[0] > 0.9 && hot[2] < 0.1, "t=1 should be red");
    }

    #[test]
    fn heat_ramp_clamps_out_of_range() {
        assert_eq!(HEAT.sample(-1.0), HEAT.sample(0.0));
        assert_eq!(HEAT.sample(2.0), HEAT.sample(1.0));
    }
}
