//! Polled telemetry: position estimates delivered by the collaborator.
//!
//! All three resources are ephemeral read models, replaced wholesale on
//! each refresh. The engine visualizes already-computed estimates; it
//! never computes positions itself.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::coords::PlanPoint;

/// Most recent position estimates, one per reporting bucket. Rendered as
/// the instantaneous-density heatmap with a uniform, operator-controlled
/// weight.
#[derive(Resource, Default)]
pub struct InstantPositions(pub Vec<PlanPoint>);

/// Accumulated historical position samples. Rendered as the aggregate
/// density heatmap with weight 1 per sample.
#[derive(Resource, Default)]
pub struct AggregatePositions(pub Vec<PlanPoint>);

/// Detected sources whose estimated position falls outside plan bounds,
/// keyed by signal strength in dBm. Read-only; visualization only.
#[derive(Resource, Default)]
pub struct OutOfPlanSignals(pub BTreeMap<i64, PlanPoint>);

/// Operator pressed refresh; forwarded verbatim to the collaborator, which
/// responds by replacing the telemetry resources.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RefreshRequested;
