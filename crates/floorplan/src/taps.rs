//! Taps: the physical sensors reported by the collaborator store.
//!
//! The roster is replaced wholesale on every poll; the engine never owns
//! tap state beyond transient working copies while a marker is dragged.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::coords::PlanPoint;

/// Stable identity of a tap across roster refreshes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TapId(pub u64);

/// One sensor as delivered by the collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tap {
    pub id: TapId,
    /// Operator-supplied free text. Must be sanitized before it is
    /// interpolated into any tooltip.
    pub name: String,
    pub active: bool,
    /// Seconds since the tap last reported, if it ever has.
    pub last_report_secs: Option<f64>,
    /// Plan-relative placement; `None` until the operator has placed the
    /// tap and the position was persisted.
    pub position: Option<PlanPoint>,
}

/// The live tap list, ordered as the collaborator delivers it.
#[derive(Resource, Default)]
pub struct TapRoster(pub Vec<Tap>);

impl TapRoster {
    pub fn get(&self, id: TapId) -> Option<&Tap> {
        self.0.iter().find(|t| t.id == id)
    }

    /// Apply a persisted batch of positions, as the collaborator would
    /// after a successful save.
    pub fn apply_positions(&mut self, positions: &BTreeMap<TapId, PlanPoint>) {
        for tap in &mut self.0 {
            if let Some(p) = positions.get(&tap.id) {
                tap.position = Some(*p);
            }
        }
    }
}

/// Collaborator signal: place this tap as a new draggable marker at the
/// plan's visual center.
#[derive(Event, Debug, Clone)]
pub struct PlaceTapRequested {
    pub tap: Tap,
}

/// Answered once the placement marker exists on the surface. Placement at
/// center alone stages nothing — only a completed drag does.
#[derive(Event, Debug, Clone, Copy)]
pub struct TapPlacementComplete {
    pub tap: TapId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tap(id: u64, name: &str) -> Tap {
        Tap {
            id: TapId(id),
            name: name.to_string(),
            active: true,
            last_report_secs: Some(30.0),
            position: None,
        }
    }

    #[test]
    fn roster_lookup_by_id() {
        let roster = TapRoster(vec![tap(1, "north"), tap(2, "south")]);
        assert_eq!(roster.get(TapId(2)).map(|t| t.name.as_str()), Some("south"));
        assert!(roster.get(TapId(3)).is_none());
    }

    #[test]
    fn apply_positions_updates_only_named_taps() {
        let mut roster = TapRoster(vec![tap(1, "north"), tap(2, "south")]);
        let mut batch = BTreeMap::new();
        batch.insert(TapId(2), PlanPoint::new(10.0, 20.0));
        roster.apply_positions(&batch);

        assert!(roster.get(TapId(1)).and_then(|t| t.position).is_none());
        assert_eq!(
            roster.get(TapId(2)).and_then(|t| t.position),
            Some(PlanPoint::new(10.0, 20.0))
        );
    }

    #[test]
    fn tap_roundtrips_through_json() {
        let original = tap(7, "basement <b>east</b>");
        let json = serde_json::to_string(&original).unwrap();
        let parsed: Tap = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, original.id);
        assert_eq!(parsed.name, original.name);
    }
}
