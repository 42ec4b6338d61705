//! Optimization entry point.
//!
//! # Algorithm
//!
//! 1. Validate the reference data and fixed placements; malformed input is
//!    the only error returned.
//! 2. Compile the static problem (option pools, fixed occupancy).
//! 3. Generate `n` candidates in parallel, one seed per generation.
//! 4. Keep candidates that differ enough from those already kept; replace
//!    the rest with fresh generations for up to `max_resample_rounds`
//!    rounds.
//! 5. Fill any missing options with penalized near-duplicates.
//! 6. Score, order and name exactly `max(1, n)` results.
//!
//! The request deadline bounds steps 3 and 4. Searches in flight at the
//! deadline return their partial candidates; if none exists, the
//! fixed-placements-only candidate is returned.

use std::time::Instant;

use crate::config::OptimizerConfig;
use crate::error::OptimizeError;
use crate::generator::{CancelToken, CandidateGenerator, StopSignal, TimetableProblem};
use crate::models::{
    OptimizationResult, Placement, PlacementOrigin, ReferenceData, ScheduleCandidate,
    UnplacedReason,
};
use crate::ranker::{DiversityFilter, RankEntry, Ranker};
use crate::validation::validate_input;

/// Timetable optimizer.
///
/// # Example
///
/// ```
/// use timetable_optimizer::config::OptimizerConfig;
/// use timetable_optimizer::models::{
///     ClassRequirement, Classroom, Division, Faculty, ReferenceData, TimeSlot,
/// };
/// use timetable_optimizer::Optimizer;
///
/// let reference = ReferenceData::new()
///     .with_slot(TimeSlot::hourly("1", 9, 10))
///     .with_faculty(Faculty::new("F1").with_subject("Maths"))
///     .with_classroom(Classroom::lecture("A"))
///     .with_division(Division::new("D1"))
///     .with_requirement(ClassRequirement::new("R1", "Maths").with_division("D1"));
///
/// let optimizer = Optimizer::new(OptimizerConfig::default().with_seed(7));
/// let results = optimizer.optimize(&reference, &[], 2).unwrap();
/// assert_eq!(results.len(), 2);
/// assert_eq!(results[0].id, "opt_1");
/// assert_eq!(results[0].candidate.assigned_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Optimizer {
    config: OptimizerConfig,
}

impl Optimizer {
    /// Creates an optimizer with the given configuration.
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Produces `max(1, num_options)` ranked timetable options.
    pub fn optimize(
        &self,
        reference: &ReferenceData,
        fixed: &[Placement],
        num_options: usize,
    ) -> Result<Vec<OptimizationResult>, OptimizeError> {
        self.optimize_with_cancel(reference, fixed, num_options, &CancelToken::new())
    }

    /// Like [`optimize`](Self::optimize), stopping early once `cancel` fires.
    pub fn optimize_with_cancel(
        &self,
        reference: &ReferenceData,
        fixed: &[Placement],
        num_options: usize,
        cancel: &CancelToken,
    ) -> Result<Vec<OptimizationResult>, OptimizeError> {
        let started = Instant::now();
        validate_input(reference, fixed).map_err(OptimizeError::Validation)?;

        let wanted = num_options.max(1);
        let fixed: Vec<Placement> = fixed
            .iter()
            .cloned()
            .map(|mut p| {
                p.origin = PlacementOrigin::Fixed;
                p
            })
            .collect();

        let problem = TimetableProblem::build(reference, &fixed);
        let base_seed = self.config.seed.unwrap_or_else(rand::random);
        tracing::info!(
            requirements = reference.requirements.len(),
            open = problem.open.len(),
            infeasible = problem.infeasible.len(),
            fixed = fixed.len(),
            options = wanted,
            seed = base_seed,
            "optimization started"
        );

        let stop = StopSignal::new(started + self.config.timeout(), cancel);
        let generator = CandidateGenerator::new(&problem, &self.config, base_seed);
        let mut filter = DiversityFilter::new(self.config.diversity.overlap_threshold);

        let mut next_generation = 0;
        for _round in 0..=self.config.diversity.max_resample_rounds {
            let missing = wanted - filter.accepted_count();
            if missing == 0 || stop.should_stop() {
                break;
            }
            let batch = generator.generate(next_generation..next_generation + missing, &stop);
            next_generation += missing;
            for candidate in batch {
                filter.offer(candidate);
            }
        }

        let entries = fill_entries(filter, wanted, || {
            let reason = if stop.should_stop() {
                UnplacedReason::Timeout
            } else {
                UnplacedReason::SearchExhausted
            };
            problem.fixed_only_candidate(reason)
        });

        let ranker = Ranker::new(reference, &self.config, &problem.eligible);
        let results = ranker.rank(entries);

        tracing::info!(
            results = results.len(),
            generations = next_generation,
            best_efficiency = results.first().map(|r| r.efficiency).unwrap_or_default(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "optimization finished"
        );
        Ok(results)
    }
}

/// Accepted candidates first, then fill-ins until `wanted` entries exist.
fn fill_entries(
    filter: DiversityFilter,
    wanted: usize,
    fallback: impl FnOnce() -> ScheduleCandidate,
) -> Vec<RankEntry> {
    let (mut accepted, rejected) = filter.finish();
    if accepted.is_empty() {
        accepted.push(fallback());
    }
    let distinct = accepted.len();

    let mut entries: Vec<RankEntry> = accepted.into_iter().map(RankEntry::distinct).collect();
    let mut rejected = rejected.into_iter();
    while entries.len() < wanted {
        let entry = match rejected.next() {
            Some(near) => RankEntry::duplicate(near.candidate, near.closest),
            None => {
                let original = (entries.len() - distinct) % distinct;
                RankEntry::duplicate(entries[original].candidate.clone(), original)
            }
        };
        entries.push(entry);
    }

    if distinct < wanted {
        tracing::warn!(
            distinct,
            wanted,
            "insufficient diversity: returning near-duplicate options"
        );
    }
    entries
}

/// Optimizes with the default configuration.
pub fn optimize(
    reference: &ReferenceData,
    fixed: &[Placement],
    num_options: usize,
) -> Result<Vec<OptimizationResult>, OptimizeError> {
    Optimizer::default().optimize(reference, fixed, num_options)
}
