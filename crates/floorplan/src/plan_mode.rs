//! Operating mode of the floor-plan surface.
//!
//! Defined here (in the domain crate) rather than in `rendering` or `ui`
//! so every crate can gate systems on it without circular dependencies.

use bevy::prelude::*;

/// The two interaction surfaces the engine exposes.
///
/// View mode shows telemetry overlays and read-only tap markers; edit mode
/// makes tap markers draggable and stages plan mutations until saved.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlanMode {
    /// Telemetry visualization — markers are read-only.
    #[default]
    View,
    /// Tap placement editing — drags are staged in the edit session.
    Edit,
}
