//! Efficiency scoring.
//!
//! # Formula
//!
//! ```text
//! efficiency = 1 − w_hard      · hard_conflicts / placements
//!                − w_unplaced  · unplaced / total_requirements
//!                − w_imbalance · utilization_imbalance
//!                − w_pref      · preference_violations / placements
//!                − duplicate_penalty
//! ```
//!
//! clamped to `[0, 1]`. Ratios with a zero denominator count as 0.
//!
//! `utilization_imbalance` weighs the faculty dimension by `faculty_share`
//! and the classroom one by `1 − faculty_share`, each being
//! `(max_load − min_load) / max_load`, taken over the
//! resources eligible for the request (idle eligible resources count with
//! load 0). A dimension with fewer than two eligible resources is balanced.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::ScoreWeights;
use crate::models::{Conflict, ConflictKind, ResourceKind, ScheduleCandidate};

/// Faculty and classroom ids that could have been used by a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibleResources {
    pub faculty: BTreeSet<String>,
    pub classrooms: BTreeSet<String>,
}

/// Efficiency and the terms it was computed from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyScore {
    /// Final score in [0, 1].
    pub efficiency: f64,
    pub hard_conflicts: usize,
    pub soft_conflicts: usize,
    pub unplaced: usize,
    /// Fixed plus assigned placements.
    pub placements: usize,
    pub total_requirements: usize,
    pub utilization_imbalance: f64,
    pub preference_violations: usize,
    /// Penalty applied because the candidate repeats another option.
    pub duplicate_penalty: f64,
}

impl EfficiencyScore {
    /// Scores a candidate from its detected conflicts.
    pub fn calculate(
        candidate: &ScheduleCandidate,
        conflicts: &[Conflict],
        total_requirements: usize,
        eligible: &EligibleResources,
        weights: &ScoreWeights,
        duplicate_penalty: f64,
    ) -> Self {
        let hard_conflicts = conflicts.iter().filter(|c| c.is_hard()).count();
        let soft_conflicts = conflicts.len() - hard_conflicts;
        let preference_violations = conflicts
            .iter()
            .filter(|c| {
                matches!(
                    c.kind,
                    ConflictKind::SubjectRepeatedInDay | ConflictKind::FacultyOverloaded
                )
            })
            .count();
        let unplaced = candidate.unplaced.len();
        let placements = candidate.placement_count();

        let faculty_imbalance =
            dimension_imbalance(&candidate.load_by(ResourceKind::Faculty), &eligible.faculty);
        let classroom_imbalance =
            dimension_imbalance(&candidate.load_by(ResourceKind::Classroom), &eligible.classrooms);
        let share = weights.faculty_share.clamp(0.0, 1.0);
        let utilization_imbalance = share * faculty_imbalance + (1.0 - share) * classroom_imbalance;

        let raw = 1.0
            - weights.hard_conflicts * ratio(hard_conflicts, placements)
            - weights.unplaced * ratio(unplaced, total_requirements)
            - weights.utilization_imbalance * utilization_imbalance
            - weights.preferences * ratio(preference_violations, placements)
            - duplicate_penalty;

        Self {
            efficiency: raw.clamp(0.0, 1.0),
            hard_conflicts,
            soft_conflicts,
            unplaced,
            placements,
            total_requirements,
            utilization_imbalance,
            preference_violations,
            duplicate_penalty,
        }
    }
}

fn ratio(n: usize, d: usize) -> f64 {
    if d == 0 {
        0.0
    } else {
        n as f64 / d as f64
    }
}

/// `(max − min) / max` over the eligible resources of one dimension.
fn dimension_imbalance(load: &BTreeMap<String, usize>, eligible: &BTreeSet<String>) -> f64 {
    if eligible.len() < 2 {
        return 0.0;
    }
    let loads = eligible.iter().map(|id| load.get(id).copied().unwrap_or(0));
    let (min, max) = loads.fold((usize::MAX, 0), |(lo, hi), l| (lo.min(l), hi.max(l)));
    if max == 0 {
        return 0.0;
    }
    (max - min) as f64 / max as f64
}
