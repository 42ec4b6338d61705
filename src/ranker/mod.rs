//! Scoring, ranking and diversity.
//!
//! Turns raw candidates into ranked [`OptimizationResult`]s: conflicts are
//! detected, the efficiency score and KPIs computed, suggestions written,
//! and the results ordered. Each candidate is scored with the strategy
//! profile of its generation.
//!
//! # Ordering
//!
//! Efficiency descending, then fewer hard conflicts, then fewer unplaced
//! requirements, then generation order. Ids (`opt_<rank>`) and names
//! (`<label> Option <rank>`) follow the final order.

mod diversity;
mod kpi;
mod score;
mod suggestions;

pub use diversity::{DiversityFilter, NearDuplicate};
pub use kpi::ScheduleKpi;
pub use score::{EfficiencyScore, EligibleResources};
pub use suggestions::SuggestionWriter;

use std::cmp::Ordering;

use crate::config::OptimizerConfig;
use crate::conflict::ConflictDetector;
use crate::models::{OptimizationResult, ReferenceData, ScheduleCandidate};

/// A candidate queued for ranking.
#[derive(Debug, Clone)]
pub struct RankEntry {
    pub candidate: ScheduleCandidate,
    /// Index of the entry this one repeats, if it is a fill-in duplicate.
    pub duplicate_of: Option<usize>,
}

impl RankEntry {
    /// A distinct candidate.
    pub fn distinct(candidate: ScheduleCandidate) -> Self {
        Self {
            candidate,
            duplicate_of: None,
        }
    }

    /// A fill-in repeating entry `original`.
    pub fn duplicate(candidate: ScheduleCandidate, original: usize) -> Self {
        Self {
            candidate,
            duplicate_of: Some(original),
        }
    }
}

/// Scores and orders candidates of one request.
pub struct Ranker<'a> {
    reference: &'a ReferenceData,
    config: &'a OptimizerConfig,
    eligible: &'a EligibleResources,
    detector: ConflictDetector,
}

impl<'a> Ranker<'a> {
    pub fn new(
        reference: &'a ReferenceData,
        config: &'a OptimizerConfig,
        eligible: &'a EligibleResources,
    ) -> Self {
        Self {
            reference,
            config,
            eligible,
            detector: ConflictDetector::from_reference(reference),
        }
    }

    /// Builds the unranked result for one candidate.
    pub fn evaluate(&self, candidate: ScheduleCandidate, duplicate: bool) -> OptimizationResult {
        let conflicts = self.detector.detect_all(&candidate);
        let penalty = if duplicate {
            self.config.diversity.duplicate_penalty
        } else {
            0.0
        };
        let strategy = self.config.strategy_for(candidate.generation).cloned();
        let score = EfficiencyScore::calculate(
            &candidate,
            &conflicts,
            self.reference.requirements.len(),
            self.eligible,
            &self.config.weights_for(candidate.generation),
            penalty,
        );
        let kpi = ScheduleKpi::calculate(&candidate, &conflicts, self.reference);

        let writer = SuggestionWriter::new(self.reference, &candidate);
        let conflict_descriptions = conflicts.iter().map(|c| writer.describe(c)).collect();
        let suggestions = writer.suggestions(&conflicts);

        OptimizationResult {
            id: String::new(),
            name: String::new(),
            efficiency: score.efficiency,
            candidate,
            conflicts,
            conflict_descriptions,
            suggestions,
            score,
            kpi,
            strategy,
            near_duplicate_of: None,
        }
    }

    /// Evaluates, orders and names the entries.
    pub fn rank(&self, entries: Vec<RankEntry>) -> Vec<OptimizationResult> {
        let mut evaluated: Vec<(usize, Option<usize>, OptimizationResult)> = entries
            .into_iter()
            .enumerate()
            .map(|(i, e)| {
                let duplicate = e.duplicate_of.is_some();
                (i, e.duplicate_of, self.evaluate(e.candidate, duplicate))
            })
            .collect();

        evaluated.sort_by(|(ia, _, a), (ib, _, b)| compare(a, b).then(ia.cmp(ib)));

        let mut rank_of = vec![0usize; evaluated.len()];
        for (rank, (i, _, _)) in evaluated.iter().enumerate() {
            rank_of[*i] = rank + 1;
        }

        evaluated
            .into_iter()
            .enumerate()
            .map(|(pos, (_, duplicate_of, mut result))| {
                let rank = pos + 1;
                result.id = format!("opt_{rank}");
                result.name = format!("{} Option {}", self.reference.label, rank);
                result.near_duplicate_of = duplicate_of
                    .and_then(|j| rank_of.get(j))
                    .map(|r| format!("opt_{r}"));
                result
            })
            .collect()
    }
}

fn compare(a: &OptimizationResult, b: &OptimizationResult) -> Ordering {
    b.efficiency
        .total_cmp(&a.efficiency)
        .then(a.score.hard_conflicts.cmp(&b.score.hard_conflicts))
        .then(a.score.unplaced.cmp(&b.score.unplaced))
        .then(a.candidate.generation.cmp(&b.candidate.generation))
}
