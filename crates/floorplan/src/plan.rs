//! The floor plan itself: pixel dimensions plus the raw plan image.
//!
//! A [`Plan`] is immutable per render and replaced wholesale on reload.
//! [`ActivePlan`] tracks a generation counter that increments on every
//! replacement (including replacement by `None`), so the surface
//! orchestrator can key full teardown/reconstruction off plan identity
//! instead of mutating a live surface in place.

use bevy::prelude::*;

/// Raw RGBA8 plan image as delivered by the collaborator.
#[derive(Clone)]
pub struct PlanImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// A building floor plan: the coordinate space for all tap placement.
///
/// Plan-pixel space runs x right in `0..length_pixels` and y down in
/// `0..width_pixels`, origin at the top-left corner of the image.
#[derive(Clone)]
pub struct Plan {
    /// Horizontal extent of the plan in pixels.
    pub length_pixels: u32,
    /// Vertical extent of the plan in pixels.
    pub width_pixels: u32,
    pub image: PlanImage,
}

impl Plan {
    /// A plan with a zero dimension is invalid and must not be rendered.
    pub fn is_renderable(&self) -> bool {
        self.length_pixels > 0 && self.width_pixels > 0
    }
}

/// The currently loaded plan, owned by the collaborator.
#[derive(Resource, Default)]
pub struct ActivePlan {
    plan: Option<Plan>,
    generation: u64,
}

impl ActivePlan {
    /// Replace the plan wholesale. Every replacement bumps the generation,
    /// even when the new plan is `None` (plan deleted).
    pub fn replace(&mut self, plan: Option<Plan>) {
        self.plan = plan;
        self.generation += 1;
    }

    /// The plan, if one is loaded and valid. Zero-dimension plans degrade
    /// to the "no floor plan" placeholder state.
    pub fn renderable(&self) -> Option<&Plan> {
        self.plan.as_ref().filter(|p| p.is_renderable())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(length: u32, width: u32) -> Plan {
        Plan {
            length_pixels: length,
            width_pixels: width,
            image: PlanImage {
                width: length,
                height: width,
                rgba: vec![0; (length * width * 4) as usize],
            },
        }
    }

    #[test]
    fn zero_dimension_plan_is_not_renderable() {
        assert!(plan(800, 600).is_renderable());
        assert!(!plan(0, 600).is_renderable());
        assert!(!plan(800, 0).is_renderable());
    }

    #[test]
    fn replacement_bumps_generation() {
        let mut active = ActivePlan::default();
        assert_eq!(active.generation(), 0);

        active.replace(Some(plan(800, 600)));
        assert_eq!(active.generation(), 1);
        assert!(active.renderable().is_some());

        // Deleting the plan is also a generational change.
        active.replace(None);
        assert_eq!(active.generation(), 2);
        assert!(active.renderable().is_none());
    }

    #[test]
    fn invalid_plan_is_filtered_from_renderable() {
        let mut active = ActivePlan::default();
        active.replace(Some(plan(0, 0)));
        assert_eq!(active.generation(), 1);
        assert!(active.renderable().is_none());
    }
}
