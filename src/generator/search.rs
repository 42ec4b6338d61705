//! Randomized backtracking search for one candidate.
//!
//! # Algorithm
//!
//! Requirements are taken most-constrained first. Opening a requirement
//! pushes a frame holding its static options that are still free under
//! the committed placements, shuffled with the candidate's own RNG and,
//! with `prefer_spread`, stably partitioned so options keeping the soft
//! preferences come first.
//!
//! A frame with no option left is a dead end: the frame is popped, the
//! frame below undoes its choice and tries its next option. Each such step
//! costs one unit of the retry budget. When the budget is spent (or there
//! is nothing left to undo) the dead-end requirement is given up: recorded
//! unplaced, or with `relaxed_fallback` placed at its least-colliding
//! static option.
//!
//! The stack is explicit, so the search is bounded by the budget and can
//! stop between any two steps. On deadline or cancellation the committed
//! placements are kept and every requirement not yet placed is reported
//! with reason `Timeout`.
//!
//! # Reference
//! Russell & Norvig (2021), "Artificial Intelligence: A Modern Approach",
//! Ch. 6.3: Backtracking Search for CSPs

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::pool::StopSignal;
use super::problem::{OccupancyGrid, SessionOption, TimetableProblem};
use crate::config::SearchConfig;
use crate::models::{ScheduleCandidate, UnplacedReason};

/// One opened requirement.
#[derive(Debug)]
struct Frame {
    /// Index into `TimetableProblem::open`.
    open: usize,
    options: Vec<SessionOption>,
    next: usize,
    chosen: Option<SessionOption>,
}

impl Frame {
    fn open(
        problem: &TimetableProblem<'_>,
        grid: &OccupancyGrid,
        open: usize,
        prefer_spread: bool,
        rng: &mut SmallRng,
    ) -> Self {
        let req = &problem.open[open];
        let mut options: Vec<SessionOption> = req
            .options
            .iter()
            .copied()
            .filter(|&o| grid.is_free(&req.footprint(o)))
            .collect();
        options.shuffle(rng);
        if prefer_spread {
            options.sort_by_key(|&o| !grid.is_clean(&req.footprint(o), &problem.faculty_limits));
        }
        Self {
            open,
            options,
            next: 0,
            chosen: None,
        }
    }

    fn advance(&mut self) -> Option<SessionOption> {
        let option = self.options.get(self.next).copied();
        self.next += 1;
        self.chosen = option;
        option
    }
}

/// Searches one candidate.
pub(crate) fn search_candidate(
    problem: &TimetableProblem<'_>,
    settings: &SearchConfig,
    seed: u64,
    generation: usize,
    stop: &StopSignal<'_>,
) -> ScheduleCandidate {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut grid = problem.fixed_grid.clone();

    // Popped from the back: most-constrained first
    let mut pending: Vec<usize> = (0..problem.open.len()).rev().collect();
    let mut stack: Vec<Frame> = Vec::with_capacity(problem.open.len());
    let mut forced: Vec<(usize, SessionOption)> = Vec::new();
    let mut gave_up: Vec<usize> = Vec::new();
    let mut budget = settings.retry_budget;
    let mut backtracks = 0u32;
    let mut timed_out = false;

    'outer: while let Some(open) = pending.pop() {
        if stop.should_stop() {
            pending.push(open);
            timed_out = true;
            break;
        }
        stack.push(Frame::open(problem, &grid, open, settings.prefer_spread, &mut rng));

        while let Some(top) = stack.last_mut() {
            if let Some(option) = top.advance() {
                grid.occupy(&problem.open[top.open].footprint(option));
                continue 'outer;
            }

            if stop.should_stop() {
                if let Some(dead) = stack.pop() {
                    pending.push(dead.open);
                }
                timed_out = true;
                break 'outer;
            }

            if budget == 0 || stack.len() == 1 {
                if let Some(dead) = stack.pop() {
                    let req = &problem.open[dead.open];
                    if settings.relaxed_fallback {
                        // First least-colliding static option
                        if let Some(option) = req
                            .options
                            .iter()
                            .copied()
                            .min_by_key(|&o| grid.collisions(&req.footprint(o)))
                        {
                            grid.occupy(&req.footprint(option));
                            forced.push((dead.open, option));
                            continue 'outer;
                        }
                    }
                    gave_up.push(dead.open);
                }
                continue 'outer;
            }

            budget -= 1;
            backtracks += 1;
            if let Some(dead) = stack.pop() {
                pending.push(dead.open);
            }
            if let Some(prev) = stack.last_mut() {
                if let Some(option) = prev.chosen.take() {
                    grid.release(&problem.open[prev.open].footprint(option));
                }
            }
        }
    }

    let mut assigned: Vec<(usize, SessionOption)> = stack
        .iter()
        .filter_map(|f| f.chosen.map(|o| (f.open, o)))
        .chain(forced)
        .collect();
    assigned.sort_by_key(|(open, _)| problem.open[*open].index);

    let mut unplaced: Vec<(usize, UnplacedReason)> = problem
        .infeasible
        .iter()
        .copied()
        .chain(
            gave_up
                .iter()
                .map(|&o| (problem.open[o].index, UnplacedReason::SearchExhausted)),
        )
        .chain(
            pending
                .iter()
                .map(|&o| (problem.open[o].index, UnplacedReason::Timeout)),
        )
        .collect();
    unplaced.sort_by_key(|(index, _)| *index);

    let mut candidate = ScheduleCandidate::with_placements(problem.fixed.to_vec());
    for (open, option) in assigned {
        candidate.add_placement(problem.placement_for(&problem.open[open], option));
    }
    for (index, reason) in unplaced {
        candidate.add_unplaced(problem.unplaced(index, reason));
    }
    candidate.seed = seed;
    candidate.generation = generation;
    candidate.backtracks = backtracks;
    candidate.timed_out = timed_out;
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::detect_double_bookings;
    use crate::generator::CancelToken;
    use crate::models::{
        ClassRequirement, Classroom, Day, Division, Faculty, Placement, ReferenceData, SlotRef,
        TimeSlot,
    };
    use std::time::{Duration, Instant};

    fn settings() -> SearchConfig {
        SearchConfig::default()
    }

    fn run(
        problem: &TimetableProblem<'_>,
        settings: &SearchConfig,
        seed: u64,
    ) -> ScheduleCandidate {
        let token = CancelToken::new();
        let stop = StopSignal::new(Instant::now() + Duration::from_secs(60), &token);
        search_candidate(problem, settings, seed, 0, &stop)
    }

    /// One slot per day, two days, one division: exactly two sessions fit.
    fn tight_reference(sessions: usize) -> ReferenceData {
        let mut reference = ReferenceData::new()
            .with_days(vec![Day::Monday, Day::Tuesday])
            .with_slot(TimeSlot::hourly("s1", 9, 10))
            .with_faculty(Faculty::new("F1").with_subject("Maths"))
            .with_classroom(Classroom::lecture("A"))
            .with_division(Division::new("D1"));
        for i in 0..sessions {
            let req = ClassRequirement::new(format!("R{i}"), "Maths").with_division("D1");
            reference = reference.with_requirement(req);
        }
        reference
    }

    #[test]
    fn test_places_everything_when_feasible() {
        let reference = tight_reference(2);
        let problem = TimetableProblem::build(&reference, &[]);
        let candidate = run(&problem, &settings(), 7);

        assert_eq!(candidate.assigned_count(), 2);
        assert!(candidate.unplaced.is_empty());
        assert!(detect_double_bookings(&candidate.placements).is_empty());
        assert!(!candidate.timed_out);
    }

    #[test]
    fn test_overflow_is_reported_not_double_booked() {
        let reference = tight_reference(3);
        let problem = TimetableProblem::build(&reference, &[]);
        let candidate = run(&problem, &settings(), 7);

        assert_eq!(candidate.assigned_count(), 2);
        assert_eq!(candidate.unplaced.len(), 1);
        assert_eq!(candidate.unplaced[0].reason, UnplacedReason::SearchExhausted);
        assert!(detect_double_bookings(&candidate.placements).is_empty());
        assert!(candidate.backtracks > 0);
    }

    #[test]
    fn test_relaxed_fallback_places_with_collisions() {
        let reference = tight_reference(3);
        let problem = TimetableProblem::build(&reference, &[]);
        let relaxed = SearchConfig {
            relaxed_fallback: true,
            ..SearchConfig::default()
        };
        let candidate = run(&problem, &relaxed, 7);

        assert_eq!(candidate.assigned_count(), 3);
        assert!(candidate.unplaced.is_empty());
        assert!(!detect_double_bookings(&candidate.placements).is_empty());
    }

    #[test]
    fn test_zero_budget_gives_up_immediately() {
        let reference = tight_reference(3);
        let problem = TimetableProblem::build(&reference, &[]);
        let strict = SearchConfig {
            retry_budget: 0,
            ..SearchConfig::default()
        };
        let candidate = run(&problem, &strict, 1);
        assert_eq!(candidate.backtracks, 0);
        assert_eq!(candidate.assigned_count() + candidate.unplaced.len(), 3);
    }

    #[test]
    fn test_fills_every_cell() {
        // Four sessions, four cells, R0 pinned to Monday s1
        let reference = ReferenceData::new()
            .with_days(vec![Day::Monday, Day::Tuesday])
            .with_slot(TimeSlot::hourly("s1", 9, 10))
            .with_slot(TimeSlot::hourly("s2", 10, 11))
            .with_faculty(Faculty::new("F1").with_subject("Maths"))
            .with_classroom(Classroom::lecture("A"))
            .with_requirement(
                ClassRequirement::new("R0", "Maths")
                    .with_allowed_start(SlotRef::new(Day::Monday, "s1")),
            )
            .with_requirement(ClassRequirement::new("R1", "Maths"))
            .with_requirement(ClassRequirement::new("R2", "Maths"))
            .with_requirement(ClassRequirement::new("R3", "Maths"));
        let problem = TimetableProblem::build(&reference, &[]);

        for seed in 0..20 {
            let candidate = run(&problem, &settings(), seed);
            assert_eq!(candidate.assigned_count(), 4, "seed {seed}");
            assert!(detect_double_bookings(&candidate.placements).is_empty());
        }
    }

    #[test]
    fn test_fixed_placements_respected() {
        let reference = tight_reference(1);
        let fixed = vec![Placement::fixed("E1", "Seminar", Day::Monday, "s1", "F1", "A")];
        let problem = TimetableProblem::build(&reference, &fixed);
        let candidate = run(&problem, &settings(), 3);

        assert_eq!(candidate.placements[0].id, "E1");
        let placed = candidate.placement_for_requirement("R0").unwrap();
        assert_eq!(placed.day, Day::Tuesday);
    }

    #[test]
    fn test_same_seed_same_candidate() {
        let reference = tight_reference(2);
        let problem = TimetableProblem::build(&reference, &[]);
        assert_eq!(run(&problem, &settings(), 99), run(&problem, &settings(), 99));
    }

    #[test]
    fn test_cancelled_before_start() {
        let reference = tight_reference(2);
        let problem = TimetableProblem::build(&reference, &[]);
        let token = CancelToken::new();
        token.cancel();
        let stop = StopSignal::new(Instant::now() + Duration::from_secs(60), &token);
        let candidate = search_candidate(&problem, &settings(), 5, 3, &stop);

        assert!(candidate.timed_out);
        assert_eq!(candidate.generation, 3);
        assert_eq!(candidate.assigned_count(), 0);
        assert!(candidate
            .unplaced
            .iter()
            .all(|u| u.reason == UnplacedReason::Timeout));
        assert_eq!(candidate.unplaced.len(), 2);
    }

    #[test]
    fn test_prefer_spread_avoids_same_day_repeat() {
        // Two Maths sessions, two days with two slots each: a clean option
        // always exists, so the subject never repeats within a day.
        let reference = ReferenceData::new()
            .with_days(vec![Day::Monday, Day::Tuesday])
            .with_slot(TimeSlot::hourly("s1", 9, 10))
            .with_slot(TimeSlot::hourly("s2", 10, 11))
            .with_faculty(Faculty::new("F1").with_subject("Maths"))
            .with_classroom(Classroom::lecture("A"))
            .with_division(Division::new("D1"))
            .with_requirement(ClassRequirement::new("R0", "Maths").with_division("D1"))
            .with_requirement(ClassRequirement::new("R1", "Maths").with_division("D1"));
        let problem = TimetableProblem::build(&reference, &[]);

        for seed in 0..20 {
            let candidate = run(&problem, &settings(), seed);
            let days: Vec<Day> = candidate.placements.iter().map(|p| p.day).collect();
            assert_eq!(days.len(), 2);
            assert_ne!(days[0], days[1], "seed {seed}");
        }
    }
}
