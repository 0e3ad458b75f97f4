//! Conversion between plan-pixel space and the map surface's native space.
//!
//! Plan-pixel space is the flat, non-geographic coordinate system of the
//! floor plan image: origin at the top-left, x right, y *down*, bounds
//! `[0,0]..[length_pixels, width_pixels]`. The surface space is the Bevy
//! 2D world: y *up*, one plan pixel per world unit, plan centered on the
//! origin. The axis flip lives here and only here — no other module may
//! special-case axis order. All placement and drag handling round-trips
//! through [`PlanMapper`].

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::plan::Plan;

/// A position in plan-pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanPoint {
    pub x: f32,
    pub y: f32,
}

impl PlanPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Maps between plan-pixel space and surface (world) space for one plan.
///
/// Built per surface construction; a new plan gets a new mapper.
#[derive(Debug, Clone, Copy)]
pub struct PlanMapper {
    length_pixels: f32,
    width_pixels: f32,
}

impl PlanMapper {
    pub fn new(plan: &Plan) -> Self {
        Self {
            length_pixels: plan.length_pixels as f32,
            width_pixels: plan.width_pixels as f32,
        }
    }

    /// Plan-pixel coordinates to surface (world) coordinates.
    pub fn to_surface(&self, p: PlanPoint) -> Vec2 {
        Vec2::new(
            p.x - self.length_pixels / 2.0,
            self.width_pixels / 2.0 - p.y,
        )
    }

    /// Surface (world) coordinates back to plan-pixel coordinates.
    pub fn from_surface(&self, v: Vec2) -> PlanPoint {
        PlanPoint::new(
            v.x + self.length_pixels / 2.0,
            self.width_pixels / 2.0 - v.y,
        )
    }

    /// Clamp a plan point into plan bounds. Drag-end positions are clamped
    /// before staging so a pending position always lies on the plan.
    pub fn clamp(&self, p: PlanPoint) -> PlanPoint {
        PlanPoint::new(
            p.x.clamp(0.0, self.length_pixels),
            p.y.clamp(0.0, self.width_pixels),
        )
    }

    /// The plan's visual center, where newly placed taps appear.
    pub fn center(&self) -> PlanPoint {
        PlanPoint::new(
            (self.length_pixels / 2.0).round(),
            (self.width_pixels / 2.0).round(),
        )
    }

    /// Full plan extent in surface units.
    pub fn surface_size(&self) -> Vec2 {
        Vec2::new(self.length_pixels, self.width_pixels)
    }
}
