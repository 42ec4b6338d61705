//! Candidate generation.
//!
//! Turns a validated request into independent candidate timetables.
//!
//! # Pipeline
//!
//! 1. `problem`: compile reference data and fixed placements into dense
//!    indices and per-requirement static option pools.
//! 2. `search`: randomized explicit-stack backtracking, one candidate per
//!    seed.
//! 3. `pool`: rayon worker pool, results collected in generation order.
//!
//! Each candidate's seed is derived from the request seed and its
//! generation number alone, so a fixed request seed reproduces the same
//! candidates regardless of worker count.

mod pool;
mod problem;
mod search;

use std::ops::Range;

pub use pool::CancelToken;
pub(crate) use pool::StopSignal;
pub(crate) use problem::TimetableProblem;

use crate::config::OptimizerConfig;
use crate::models::ScheduleCandidate;

/// Derives the seed of candidate `generation` from the request seed.
///
/// SplitMix64 finalizer over `base + φ·(generation + 1)`.
pub fn candidate_seed(base: u64, generation: usize) -> u64 {
    let mut z = base.wrapping_add(
        (generation as u64)
            .wrapping_add(1)
            .wrapping_mul(0x9E37_79B9_7F4A_7C15),
    );
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Runs candidate searches for a compiled problem.
pub(crate) struct CandidateGenerator<'p, 'a> {
    problem: &'p TimetableProblem<'a>,
    config: &'p OptimizerConfig,
    base_seed: u64,
}

impl<'p, 'a> CandidateGenerator<'p, 'a> {
    pub fn new(
        problem: &'p TimetableProblem<'a>,
        config: &'p OptimizerConfig,
        base_seed: u64,
    ) -> Self {
        Self {
            problem,
            config,
            base_seed,
        }
    }

    /// Generates one candidate per generation number in `generations`.
    ///
    /// Generations not started before the stop signal fires are missing
    /// from the result; the rest are returned in generation order.
    pub fn generate(
        &self,
        generations: Range<usize>,
        stop: &StopSignal<'_>,
    ) -> Vec<ScheduleCandidate> {
        let requested = generations.len();
        let candidates: Vec<ScheduleCandidate> = pool::run_indexed(
            generations,
            self.config.effective_workers(),
            stop,
            |generation| {
                let seed = candidate_seed(self.base_seed, generation);
                let candidate = search::search_candidate(
                    self.problem,
                    &self.config.search,
                    seed,
                    generation,
                    stop,
                );
                tracing::debug!(
                    generation,
                    seed,
                    placed = candidate.assigned_count(),
                    unplaced = candidate.unplaced.len(),
                    backtracks = candidate.backtracks,
                    timed_out = candidate.timed_out,
                    "candidate searched"
                );
                candidate
            },
        )
        .into_iter()
        .map(|(_, c)| c)
        .collect();

        let partial = candidates.iter().filter(|c| c.timed_out).count();
        let skipped = requested - candidates.len();
        if partial > 0 || skipped > 0 {
            tracing::warn!(
                partial,
                skipped,
                "search deadline reached: returning best-effort candidates"
            );
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ClassRequirement, Classroom, Day, Faculty, ReferenceData, TimeSlot, UnplacedReason,
    };
    use std::time::{Duration, Instant};

    fn reference() -> ReferenceData {
        ReferenceData::new()
            .with_days(vec![Day::Monday, Day::Tuesday, Day::Wednesday])
            .with_slot(TimeSlot::hourly("s1", 9, 10))
            .with_slot(TimeSlot::hourly("s2", 10, 11))
            .with_faculty(Faculty::new("F1").with_subject("Maths"))
            .with_faculty(Faculty::new("F2").with_subject("Maths"))
            .with_classroom(Classroom::lecture("A"))
            .with_requirement(ClassRequirement::new("R1", "Maths"))
            .with_requirement(ClassRequirement::new("R2", "Maths"))
    }

    #[test]
    fn test_candidate_seed_distinct_and_stable() {
        let seeds: Vec<u64> = (0..16).map(|g| candidate_seed(42, g)).collect();
        let mut unique = seeds.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), seeds.len());
        assert_eq!(candidate_seed(42, 3), seeds[3]);
        assert_ne!(candidate_seed(43, 3), seeds[3]);
    }

    #[test]
    fn test_generation_independent_of_worker_count() {
        let reference = reference();
        let problem = TimetableProblem::build(&reference, &[]);
        let token = CancelToken::new();
        let stop = StopSignal::new(Instant::now() + Duration::from_secs(60), &token);

        let single = OptimizerConfig::default().with_workers(1);
        let many = OptimizerConfig::default().with_workers(4);
        let a = CandidateGenerator::new(&problem, &single, 7).generate(0..6, &stop);
        let b = CandidateGenerator::new(&problem, &many, 7).generate(0..6, &stop);

        assert_eq!(a.len(), 6);
        assert_eq!(a, b);
        let generations: Vec<usize> = a.iter().map(|c| c.generation).collect();
        assert_eq!(generations, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_offset_generations() {
        let reference = reference();
        let problem = TimetableProblem::build(&reference, &[]);
        let token = CancelToken::new();
        let stop = StopSignal::new(Instant::now() + Duration::from_secs(60), &token);
        let config = OptimizerConfig::default();

        let candidates = CandidateGenerator::new(&problem, &config, 1).generate(4..6, &stop);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].generation, 4);
        assert_eq!(candidates[0].seed, candidate_seed(1, 4));
    }

    #[test]
    fn test_cancelled_generation_is_empty() {
        let reference = reference();
        let problem = TimetableProblem::build(&reference, &[]);
        let token = CancelToken::new();
        token.cancel();
        let stop = StopSignal::new(Instant::now() + Duration::from_secs(60), &token);
        let config = OptimizerConfig::default();

        assert!(CandidateGenerator::new(&problem, &config, 1)
            .generate(0..3, &stop)
            .is_empty());
        let fallback = problem.fixed_only_candidate(UnplacedReason::Timeout);
        assert_eq!(fallback.unplaced.len(), 2);
    }
}
