//! Timetable domain models.
//!
//! Provides the data types for timetable problems and their solutions.
//! Pure data plus invariants; no search logic lives here.
//!
//! # Domain Mappings
//!
//! | Model | Campus term | Generic scheduling term |
//! |-------|-------------|-------------------------|
//! | `ClassRequirement` | Lecture / lab session | Activity |
//! | `Faculty`, `Classroom`, `Division` | Teacher, room, student group | Resource |
//! | `Placement` | Timetable entry | Assignment |
//! | `ScheduleCandidate` | Proposed timetable | Schedule |
//! | `Conflict` | Clash | Violation |

mod placement;
mod reference;
mod requirement;
mod resource;
mod result;
mod schedule;
mod slot;

pub use placement::{
    Placement, PlacementOrigin, PlacementSignature, UnplacedReason, UnplacedRequirement,
};
pub use reference::ReferenceData;
pub use requirement::{ClassRequirement, SessionKind};
pub use resource::{Classroom, Division, Faculty, ResourceKind, RoomKind};
pub use result::OptimizationResult;
pub use schedule::{Conflict, ConflictKind, ScheduleCandidate, Severity};
pub use slot::{Day, ParseDayError, SlotRef, TimeSlot};
