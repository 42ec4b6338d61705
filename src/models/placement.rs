//! Placement model.
//!
//! A placement binds a session to a day, one or more consecutive slots,
//! a faculty member, a classroom and the attending divisions. Fixed
//! placements come from the input and are never moved; assigned
//! placements are produced by the search.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ClassRequirement, Day, SessionKind, SlotRef};

/// Where a placement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementOrigin {
    /// Pre-existing class supplied by the caller. Immovable.
    Fixed,
    /// Chosen by the optimizer.
    Assigned,
}

/// A session bound to concrete time and resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Placement identifier (unique within a candidate).
    pub id: String,
    /// Requirement this placement satisfies, if known.
    pub requirement_id: Option<String>,
    /// Subject name.
    pub subject: String,
    /// Lecture or lab.
    pub kind: SessionKind,
    /// Day of the week.
    pub day: Day,
    /// Occupied slot ids in chronological order. The first is the start slot.
    pub slot_ids: Vec<String>,
    /// Teaching faculty.
    pub faculty_id: String,
    /// Hosting classroom.
    pub classroom_id: String,
    /// Attending divisions.
    pub division_ids: Vec<String>,
    /// Lab batch of the attending divisions (`A`, `B`). Different batches
    /// of one division may be placed in the same slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
    /// Fixed or assigned.
    pub origin: PlacementOrigin,
}

impl Placement {
    /// Creates a one-slot fixed lecture.
    pub fn fixed(
        id: impl Into<String>,
        subject: impl Into<String>,
        day: Day,
        slot_id: impl Into<String>,
        faculty_id: impl Into<String>,
        classroom_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            requirement_id: None,
            subject: subject.into(),
            kind: SessionKind::Lecture,
            day,
            slot_ids: vec![slot_id.into()],
            faculty_id: faculty_id.into(),
            classroom_id: classroom_id.into(),
            division_ids: Vec::new(),
            batch: None,
            origin: PlacementOrigin::Fixed,
        }
    }

    /// Creates an assigned placement for `requirement`.
    pub fn assigned(
        requirement: &ClassRequirement,
        day: Day,
        slot_ids: Vec<String>,
        faculty_id: impl Into<String>,
        classroom_id: impl Into<String>,
    ) -> Self {
        Self {
            id: requirement.id.clone(),
            requirement_id: Some(requirement.id.clone()),
            subject: requirement.subject.clone(),
            kind: requirement.kind,
            day,
            slot_ids,
            faculty_id: faculty_id.into(),
            classroom_id: classroom_id.into(),
            division_ids: requirement.division_ids.clone(),
            batch: None,
            origin: PlacementOrigin::Assigned,
        }
    }

    /// Records which requirement this placement covers.
    pub fn covering(mut self, requirement_id: impl Into<String>) -> Self {
        self.requirement_id = Some(requirement_id.into());
        self
    }

    /// Sets the session kind.
    pub fn with_kind(mut self, kind: SessionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Replaces the occupied slots.
    pub fn spanning(mut self, slot_ids: Vec<String>) -> Self {
        self.slot_ids = slot_ids;
        self
    }

    /// Adds an attending division.
    pub fn with_division(mut self, division_id: impl Into<String>) -> Self {
        self.division_ids.push(division_id.into());
        self
    }

    /// Restricts the placement to one batch of its divisions.
    pub fn in_batch(mut self, batch: impl Into<String>) -> Self {
        self.batch = Some(batch.into());
        self
    }

    /// Whether both placements hold different batches, so they may share
    /// their divisions' time.
    pub fn is_parallel_batch_of(&self, other: &Placement) -> bool {
        matches!((&self.batch, &other.batch), (Some(a), Some(b)) if a != b)
    }

    /// Whether the placement is an immovable input.
    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.origin == PlacementOrigin::Fixed
    }

    /// Start slot id.
    pub fn start_slot(&self) -> Option<&str> {
        self.slot_ids.first().map(|s| s.as_str())
    }

    /// Number of occupied slots.
    pub fn slot_count(&self) -> usize {
        self.slot_ids.len()
    }

    /// Every (day, slot) cell the placement occupies.
    pub fn cells(&self) -> impl Iterator<Item = SlotRef> + '_ {
        self.slot_ids.iter().map(|s| SlotRef::new(self.day, s.clone()))
    }

    /// Identity used for diversity comparison: what, when, who, where.
    pub fn signature(&self) -> PlacementSignature {
        PlacementSignature {
            requirement: self
                .requirement_id
                .clone()
                .unwrap_or_else(|| self.id.clone()),
            day: self.day,
            start_slot: self.start_slot().unwrap_or_default().to_string(),
            faculty_id: self.faculty_id.clone(),
            classroom_id: self.classroom_id.clone(),
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {} slot {} (faculty {}, room {})",
            self.subject,
            self.day,
            self.slot_ids.join("+"),
            self.faculty_id,
            self.classroom_id
        )
    }
}

/// Hashable identity of a placement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlacementSignature {
    pub requirement: String,
    pub day: Day,
    pub start_slot: String,
    pub faculty_id: String,
    pub classroom_id: String,
}

/// Why a requirement ended up without a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnplacedReason {
    /// No faculty member is qualified (or listed) for the subject.
    NoQualifiedFaculty,
    /// No classroom matches the session kind, candidate list and head count.
    NoCompatibleClassroom,
    /// No start cell leaves enough consecutive slots inside the allowed window.
    NoCompatibleSlot,
    /// Qualified faculty exist but none is available at any compatible cell.
    FacultyUnavailable,
    /// Every compatible option collides with a fixed placement.
    BlockedByFixed,
    /// Options existed but the retry budget ran out before one fitted.
    SearchExhausted,
    /// The request deadline passed before the requirement was reached.
    Timeout,
}

impl UnplacedReason {
    /// Infeasible reasons hold regardless of other placements and are never retried.
    pub fn is_permanent(self) -> bool {
        matches!(
            self,
            UnplacedReason::NoQualifiedFaculty
                | UnplacedReason::NoCompatibleClassroom
                | UnplacedReason::NoCompatibleSlot
                | UnplacedReason::FacultyUnavailable
                | UnplacedReason::BlockedByFixed
        )
    }

    /// Short explanation for suggestion strings.
    pub fn explanation(self) -> &'static str {
        match self {
            UnplacedReason::NoQualifiedFaculty => "no faculty member is qualified to teach it",
            UnplacedReason::NoCompatibleClassroom => {
                "no classroom of the right type and size exists"
            }
            UnplacedReason::NoCompatibleSlot => {
                "no allowed start slot leaves enough consecutive slots"
            }
            UnplacedReason::FacultyUnavailable => {
                "every qualified faculty member is unavailable at the allowed slots"
            }
            UnplacedReason::BlockedByFixed => {
                "every compatible slot, room and faculty combination is taken by existing classes"
            }
            UnplacedReason::SearchExhausted => {
                "the search could not fit it around the other classes"
            }
            UnplacedReason::Timeout => "the optimization deadline passed before it was placed",
        }
    }
}

/// A requirement reported without a placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnplacedRequirement {
    /// Requirement identifier.
    pub requirement_id: String,
    /// Subject name.
    pub subject: String,
    /// Divisions that needed it.
    pub division_ids: Vec<String>,
    /// Why it was not placed.
    pub reason: UnplacedReason,
}

impl UnplacedRequirement {
    /// Creates an unplaced record for `requirement`.
    pub fn new(requirement: &ClassRequirement, reason: UnplacedReason) -> Self {
        Self {
            requirement_id: requirement.id.clone(),
            subject: requirement.subject.clone(),
            division_ids: requirement.division_ids.clone(),
            reason,
        }
    }
}
