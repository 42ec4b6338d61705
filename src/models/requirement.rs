//! Class requirement (demand) model.
//!
//! A requirement is one session that still has to be put on the
//! timetable: a subject, taught to one or more divisions, lasting one or
//! more consecutive slots. A subject taught three times a week is three
//! requirements.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::SlotRef;

/// Lecture or lab. Decides which rooms are compatible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionKind {
    Lecture,
    Lab,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Lecture => f.write_str("lecture"),
            SessionKind::Lab => f.write_str("lab"),
        }
    }
}

/// A session to be scheduled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRequirement {
    /// Unique requirement identifier.
    pub id: String,
    /// Subject name, matched against `Faculty::subjects`.
    pub subject: String,
    /// Lecture or lab.
    pub kind: SessionKind,
    /// Number of consecutive slots the session occupies.
    pub duration_slots: u32,
    /// Divisions attending.
    pub division_ids: Vec<String>,
    /// Faculty allowed to teach it. Empty = anyone qualified for the subject.
    pub faculty_candidates: Vec<String>,
    /// Rooms allowed to host it. Empty = any room of a compatible kind.
    pub classroom_candidates: Vec<String>,
    /// Cells the session may start in. Empty = any cell.
    pub allowed_starts: Vec<SlotRef>,
}

impl ClassRequirement {
    /// Creates a one-slot lecture.
    pub fn new(id: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            kind: SessionKind::Lecture,
            duration_slots: 1,
            division_ids: Vec::new(),
            faculty_candidates: Vec::new(),
            classroom_candidates: Vec::new(),
            allowed_starts: Vec::new(),
        }
    }

    /// Creates a lab spanning `duration_slots` slots.
    pub fn lab(id: impl Into<String>, subject: impl Into<String>, duration_slots: u32) -> Self {
        Self::new(id, subject)
            .with_kind(SessionKind::Lab)
            .with_duration(duration_slots)
    }

    /// Sets the session kind.
    pub fn with_kind(mut self, kind: SessionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the duration in slots.
    pub fn with_duration(mut self, duration_slots: u32) -> Self {
        self.duration_slots = duration_slots;
        self
    }

    /// Adds an attending division.
    pub fn with_division(mut self, division_id: impl Into<String>) -> Self {
        self.division_ids.push(division_id.into());
        self
    }

    /// Restricts teaching to the given faculty.
    pub fn with_faculty_candidates(mut self, faculty_ids: Vec<String>) -> Self {
        self.faculty_candidates = faculty_ids;
        self
    }

    /// Restricts hosting to the given rooms.
    pub fn with_classroom_candidates(mut self, classroom_ids: Vec<String>) -> Self {
        self.classroom_candidates = classroom_ids;
        self
    }

    /// Adds an allowed start cell.
    pub fn with_allowed_start(mut self, cell: SlotRef) -> Self {
        self.allowed_starts.push(cell);
        self
    }

    /// Whether the session may start at `cell`.
    pub fn may_start_at(&self, cell: &SlotRef) -> bool {
        self.allowed_starts.is_empty() || self.allowed_starts.contains(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Day;

    #[test]
    fn test_requirement_builder() {
        let req = ClassRequirement::new("R1", "Algorithms")
            .with_division("D1")
            .with_faculty_candidates(vec!["F1".into()])
            .with_classroom_candidates(vec!["A-101".into(), "A-102".into()]);

        assert_eq!(req.kind, SessionKind::Lecture);
        assert_eq!(req.duration_slots, 1);
        assert_eq!(req.division_ids, vec!["D1"]);
        assert_eq!(req.faculty_candidates.len(), 1);
        assert_eq!(req.classroom_candidates.len(), 2);
    }

    #[test]
    fn test_lab_constructor() {
        let lab = ClassRequirement::lab("L1", "Physics Lab", 2);
        assert_eq!(lab.kind, SessionKind::Lab);
        assert_eq!(lab.duration_slots, 2);
        assert_eq!(lab.kind.to_string(), "lab");
    }

    #[test]
    fn test_allowed_starts() {
        let any = ClassRequirement::new("R1", "Math");
        assert!(any.may_start_at(&SlotRef::new(Day::Friday, "7")));

        let fixed = ClassRequirement::new("R2", "Math")
            .with_allowed_start(SlotRef::new(Day::Monday, "1"));
        assert!(fixed.may_start_at(&SlotRef::new(Day::Monday, "1")));
        assert!(!fixed.may_start_at(&SlotRef::new(Day::Monday, "2")));
    }
}
