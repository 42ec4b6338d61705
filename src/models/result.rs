//! Optimization result model.

use serde::{Deserialize, Serialize};

use super::{Conflict, ScheduleCandidate};
use crate::config::StrategyProfile;
use crate::ranker::{EfficiencyScore, ScheduleKpi};

/// One ranked timetable option returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Stable identifier (`opt_1`, `opt_2`, ...), by rank.
    pub id: String,
    /// Display name (`<label> Option <rank>`).
    pub name: String,
    /// The timetable.
    pub candidate: ScheduleCandidate,
    /// Every hard and soft conflict of the timetable.
    pub conflicts: Vec<Conflict>,
    /// One human-readable line per conflict.
    pub conflict_descriptions: Vec<String>,
    /// Advice derived from this timetable's own conflicts.
    pub suggestions: Vec<String>,
    /// Efficiency in [0, 1].
    pub efficiency: f64,
    /// Terms the efficiency was computed from.
    pub score: EfficiencyScore,
    /// Conflict counts, loads and utilization.
    pub kpi: ScheduleKpi,
    /// Scoring profile the efficiency was computed with.
    pub strategy: Option<StrategyProfile>,
    /// Set when too few distinct timetables existed and this option
    /// repeats (or nearly repeats) the named one.
    pub near_duplicate_of: Option<String>,
}

impl OptimizationResult {
    /// Number of hard conflicts.
    pub fn hard_conflict_count(&self) -> usize {
        self.conflicts.iter().filter(|c| c.is_hard()).count()
    }

    /// Whether the timetable has no hard conflicts and nothing unplaced.
    pub fn is_complete(&self) -> bool {
        self.hard_conflict_count() == 0 && self.candidate.unplaced.is_empty()
    }
}
