//! Schedule candidate (solution) model.
//!
//! A candidate is one complete proposed timetable: the fixed placements,
//! the placements chosen by the search, and an explicit record for every
//! requirement that could not be placed.
//!
//! # Invariant
//! Every requirement of the request appears exactly once, either as a
//! placement (`requirement_id`) or as an `UnplacedRequirement`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::{Day, Placement, PlacementSignature, ResourceKind, UnplacedRequirement};

/// One proposed timetable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleCandidate {
    /// Fixed placements first (input order), then assigned ones.
    pub placements: Vec<Placement>,
    /// Requirements with no placement.
    pub unplaced: Vec<UnplacedRequirement>,
    /// Seed the search ran with.
    pub seed: u64,
    /// Generation number (order in which candidates were requested).
    pub generation: usize,
    /// Backtrack steps spent by the search.
    pub backtracks: u32,
    /// Whether the search stopped at the deadline.
    pub timed_out: bool,
}

/// How bad a conflict is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// A resource is booked twice. Invalidates the timetable.
    Hard,
    /// A requirement is missing or a preference is not met.
    Soft,
}

/// Classification of conflicts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConflictKind {
    /// Two placements share a resource in the same cell.
    DoubleBooked(ResourceKind),
    /// A requirement has no placement.
    Unplaced,
    /// A subject occurs more than once on one day for a division.
    SubjectRepeatedInDay,
    /// A faculty member exceeds their weekly slot limit.
    FacultyOverloaded,
}

/// A constraint violation found in a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// What was violated.
    pub kind: ConflictKind,
    /// Hard or soft.
    pub severity: Severity,
    /// Resource (or requirement, for `Unplaced`) the conflict is about.
    pub entity_id: String,
    /// Day of the collision, if the conflict is tied to one.
    pub day: Option<Day>,
    /// Slot of the (first) collision, if the conflict is tied to one.
    pub slot_id: Option<String>,
    /// Placement ids involved (a pair for double bookings).
    pub placement_ids: Vec<String>,
}

impl Conflict {
    /// Creates a double-booking conflict between two placements.
    pub fn double_booked(
        resource: ResourceKind,
        resource_id: impl Into<String>,
        day: Day,
        slot_id: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self {
            kind: ConflictKind::DoubleBooked(resource),
            severity: Severity::Hard,
            entity_id: resource_id.into(),
            day: Some(day),
            slot_id: Some(slot_id.into()),
            placement_ids: vec![first.into(), second.into()],
        }
    }

    /// Creates a soft conflict for an unplaced requirement.
    pub fn unplaced(requirement_id: impl Into<String>) -> Self {
        Self {
            kind: ConflictKind::Unplaced,
            severity: Severity::Soft,
            entity_id: requirement_id.into(),
            day: None,
            slot_id: None,
            placement_ids: Vec::new(),
        }
    }

    /// Creates a soft conflict for a subject repeated within a day.
    pub fn subject_repeated(
        division_id: impl Into<String>,
        day: Day,
        placement_ids: Vec<String>,
    ) -> Self {
        Self {
            kind: ConflictKind::SubjectRepeatedInDay,
            severity: Severity::Soft,
            entity_id: division_id.into(),
            day: Some(day),
            slot_id: None,
            placement_ids,
        }
    }

    /// Creates a soft conflict for an overloaded faculty member.
    pub fn faculty_overloaded(faculty_id: impl Into<String>, placement_ids: Vec<String>) -> Self {
        Self {
            kind: ConflictKind::FacultyOverloaded,
            severity: Severity::Soft,
            entity_id: faculty_id.into(),
            day: None,
            slot_id: None,
            placement_ids,
        }
    }

    /// Whether the conflict invalidates the timetable.
    #[inline]
    pub fn is_hard(&self) -> bool {
        self.severity == Severity::Hard
    }

    /// Whether the conflict references placement `id`.
    pub fn involves(&self, id: &str) -> bool {
        self.placement_ids.iter().any(|p| p == id)
    }
}

impl ScheduleCandidate {
    /// Creates an empty candidate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a candidate holding only the given placements.
    pub fn with_placements(placements: Vec<Placement>) -> Self {
        Self {
            placements,
            ..Self::default()
        }
    }

    /// Adds a placement.
    pub fn add_placement(&mut self, placement: Placement) {
        self.placements.push(placement);
    }

    /// Adds an unplaced record.
    pub fn add_unplaced(&mut self, unplaced: UnplacedRequirement) {
        self.unplaced.push(unplaced);
    }

    /// Placements produced by the search.
    pub fn assigned(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(|p| !p.is_fixed())
    }

    /// Number of placements produced by the search.
    pub fn assigned_count(&self) -> usize {
        self.assigned().count()
    }

    /// Number of placements (fixed + assigned).
    pub fn placement_count(&self) -> usize {
        self.placements.len()
    }

    /// Finds the placement covering a requirement.
    pub fn placement_for_requirement(&self, requirement_id: &str) -> Option<&Placement> {
        self.placements
            .iter()
            .find(|p| p.requirement_id.as_deref() == Some(requirement_id))
    }

    /// Whether a requirement is reported unplaced.
    pub fn is_unplaced(&self, requirement_id: &str) -> bool {
        self.unplaced.iter().any(|u| u.requirement_id == requirement_id)
    }

    /// All placements taught by a faculty member.
    pub fn placements_for_faculty(&self, faculty_id: &str) -> Vec<&Placement> {
        self.placements
            .iter()
            .filter(|p| p.faculty_id == faculty_id)
            .collect()
    }

    /// All placements hosted by a classroom.
    pub fn placements_for_classroom(&self, classroom_id: &str) -> Vec<&Placement> {
        self.placements
            .iter()
            .filter(|p| p.classroom_id == classroom_id)
            .collect()
    }

    /// All placements attended by a division.
    pub fn placements_for_division(&self, division_id: &str) -> Vec<&Placement> {
        self.placements
            .iter()
            .filter(|p| p.division_ids.iter().any(|d| d == division_id))
            .collect()
    }

    /// Occupied slots per resource id for one dimension.
    ///
    /// Sorted by id so iteration order is stable.
    pub fn load_by(&self, resource: ResourceKind) -> BTreeMap<String, usize> {
        let mut load = BTreeMap::new();
        for p in &self.placements {
            let n = p.slot_count();
            match resource {
                ResourceKind::Faculty => *load.entry(p.faculty_id.clone()).or_insert(0) += n,
                ResourceKind::Classroom => *load.entry(p.classroom_id.clone()).or_insert(0) += n,
                ResourceKind::Division => {
                    for d in &p.division_ids {
                        *load.entry(d.clone()).or_insert(0) += n;
                    }
                }
            }
        }
        load
    }

    /// Signatures of the assigned placements.
    pub fn assigned_signatures(&self) -> HashSet<PlacementSignature> {
        self.assigned().map(|p| p.signature()).collect()
    }

    /// Fraction of assigned placements shared with `other`, in [0, 1].
    ///
    /// Measured against the larger of the two assigned sets. Two candidates
    /// without assigned placements are identical (1.0).
    pub fn overlap_with(&self, other: &ScheduleCandidate) -> f64 {
        let a = self.assigned_signatures();
        let b = other.assigned_signatures();
        let larger = a.len().max(b.len());
        if larger == 0 {
            return 1.0;
        }
        a.intersection(&b).count() as f64 / larger as f64
    }
}
