//! Resource models.
//!
//! Three kinds of resources take part in a timetable: faculty who teach,
//! classrooms that host sessions, and divisions (student groups) that
//! attend them. Each can be in at most one place per (day, slot).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{SessionKind, SlotRef};

/// Resource dimension used by conflict detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Faculty,
    Classroom,
    Division,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::Faculty => "Faculty",
            ResourceKind::Classroom => "Classroom",
            ResourceKind::Division => "Division",
        };
        f.write_str(s)
    }
}

/// A faculty member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faculty {
    /// Unique faculty identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Subjects this faculty member is qualified to teach.
    pub subjects: Vec<String>,
    /// Maximum occupied slots per week. `None` = unlimited.
    pub max_slots_per_week: Option<u32>,
    /// Cells of the week this faculty member cannot teach.
    pub unavailable: Vec<SlotRef>,
}

impl Faculty {
    /// Creates a faculty member with no qualifications.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            subjects: Vec::new(),
            max_slots_per_week: None,
            unavailable: Vec::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a qualified subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subjects.push(subject.into());
        self
    }

    /// Sets the weekly slot limit.
    pub fn with_max_slots(mut self, max_slots: u32) -> Self {
        self.max_slots_per_week = Some(max_slots);
        self
    }

    /// Marks a cell as unavailable.
    pub fn with_unavailable(mut self, cell: SlotRef) -> Self {
        self.unavailable.push(cell);
        self
    }

    /// Whether this faculty member may teach `subject`.
    pub fn teaches(&self, subject: &str) -> bool {
        self.subjects.iter().any(|s| s.eq_ignore_ascii_case(subject))
    }

    /// Whether this faculty member is free at `cell` (ignoring bookings).
    pub fn is_available_at(&self, cell: &SlotRef) -> bool {
        !self.unavailable.contains(cell)
    }

    /// Name for messages, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// What a room is equipped for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomKind {
    /// Lecture hall, seminar room or any non-lab room.
    Lecture,
    /// Laboratory.
    Lab,
}

impl RoomKind {
    /// Whether a session of `kind` can run in this room.
    pub fn hosts(self, kind: SessionKind) -> bool {
        matches!(
            (self, kind),
            (RoomKind::Lecture, SessionKind::Lecture) | (RoomKind::Lab, SessionKind::Lab)
        )
    }
}

/// A room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classroom {
    /// Unique classroom identifier.
    pub id: String,
    /// Display name (e.g. "A-101").
    pub name: String,
    /// Equipment class.
    pub kind: RoomKind,
    /// Free-form type label from the source data (e.g. "Seminar Room").
    pub room_type: String,
    /// Seats. `None` = unknown, never restricts placement.
    pub capacity: Option<u32>,
}

impl Classroom {
    /// Creates a classroom of the given kind.
    pub fn new(id: impl Into<String>, kind: RoomKind) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            kind,
            room_type: String::new(),
            capacity: None,
        }
    }

    /// Creates a lecture room.
    pub fn lecture(id: impl Into<String>) -> Self {
        Self::new(id, RoomKind::Lecture)
    }

    /// Creates a lab.
    pub fn lab(id: impl Into<String>) -> Self {
        Self::new(id, RoomKind::Lab)
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the type label.
    pub fn with_room_type(mut self, room_type: impl Into<String>) -> Self {
        self.room_type = room_type.into();
        self
    }

    /// Sets the seat count.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Whether `students` fit. Unknown capacity or head count always fits.
    pub fn fits(&self, students: Option<u32>) -> bool {
        match (self.capacity, students) {
            (Some(cap), Some(n)) => n <= cap,
            _ => true,
        }
    }

    /// Name for messages, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// A student group that attends sessions together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Division {
    /// Unique division identifier.
    pub id: String,
    /// Display name (e.g. "3a1").
    pub name: String,
    /// Number of students, if known.
    pub strength: Option<u32>,
}

impl Division {
    /// Creates a division.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            strength: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the head count.
    pub fn with_strength(mut self, strength: u32) -> Self {
        self.strength = Some(strength);
        self
    }

    /// Name for messages, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}
