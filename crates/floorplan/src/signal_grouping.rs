//! Relative intensity binning for out-of-plan signal strengths.
//!
//! Sources that could not be resolved to lie inside the plan are still
//! worth showing: their relative strength makes direction and proximity
//! legible without exact numbers. Each distinct strength is assigned a
//! rank from 0 (strongest in the current sample) to 9 (weakest), which the
//! renderer maps onto a fixed 10-step color ramp.
//!
//! Ranking is relative to the current sample only and is recomputed on
//! every refresh; a shifting sample min/max can move a source between
//! ranks across refreshes. That jitter matches the upstream read model and
//! no smoothing is applied.

use std::collections::BTreeMap;

use crate::coords::PlanPoint;

/// Number of intensity buckets; ranks run `0..RANK_COUNT`.
pub const RANK_COUNT: i64 = 10;

/// One out-of-plan source with its assigned intensity rank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedSignal {
    pub strength_dbm: i64,
    pub position: PlanPoint,
    /// 0 = strongest visual, 9 = weakest.
    pub rank: u8,
}

/// Assign each strength a rank relative to the sample's min/max.
///
/// `bucket_width = max(1, (max - min) / 10)`; the floor of 1 avoids
/// near-zero division when all values are nearly equal. Ranks are clamped
/// to 9, so outliers below the last bucket still land in it. Empty input
/// yields an empty grouping; a single distinct value yields rank 0.
pub fn group_out_of_plan(signals: &BTreeMap<i64, PlanPoint>) -> Vec<RankedSignal> {
    let (Some(&weakest), Some(&strongest)) =
        (signals.keys().next(), signals.keys().next_back())
    else {
        return Vec::new();
    };

    let bucket_width = ((strongest - weakest) / RANK_COUNT).max(1);

    signals
        .iter()
        .map(|(&strength_dbm, &position)| RankedSignal {
            strength_dbm,
            position,
            rank: ((strongest - strength_dbm) / bucket_width).min(9) as u8,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(strengths: &[i64]) -> BTreeMap<i64, PlanPoint> {
        strengths
            .iter()
            .map(|&s| (s, PlanPoint::new(s as f32, 0.0)))
            .collect()
    }

    #[test]
    fn empty_input_yields_empty_grouping() {
        assert!(group_out_of_plan(&BTreeMap::new()).is_empty());
    }

    #[test]
    fn single_value_lands_in_rank_zero() {
        let ranked = group_out_of_plan(&signals(&[-62]));
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].rank, 0);
    }

    #[test]
    fn boundary_ranks_for_forty_dbm_spread() {
        // H = -40, L = -80, range = 40, bucket width = 4.
        let ranked = group_out_of_plan(&signals(&[-80, -70, -60, -50, -40]));
        let rank_of = |s: i64| {
            ranked
                .iter()
                .find(|r| r.strength_dbm == s)
                .map(|r| r.rank)
                .unwrap()
        };
        assert_eq!(rank_of(-40), 0);
        assert_eq!(rank_of(-50), 2);
        assert_eq!(rank_of(-60), 5);
        assert_eq!(rank_of(-70), 7);
        // floor(40 / 4) = 10 clamps to the weakest bucket.
        assert_eq!(rank_of(-80), 9);
    }

    #[test]
    fn nearly_equal_values_use_unit_bucket_width() {
        let ranked = group_out_of_plan(&signals(&[-61, -60]));
        let rank_of = |s: i64| {
            ranked
                .iter()
                .find(|r| r.strength_dbm == s)
                .map(|r| r.rank)
                .unwrap()
        };
        // range = 1 floors to bucket width 1, not a division blow-up.
        assert_eq!(rank_of(-60), 0);
        assert_eq!(rank_of(-61), 1);
    }

    #[test]
    fn grouping_is_pure() {
        let input = signals(&[-88, -73, -55, -41]);
        let first = group_out_of_plan(&input);
        let second = group_out_of_plan(&input);
        assert_eq!(first, second);
    }
}
