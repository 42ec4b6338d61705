//! Reference data for one optimization request.
//!
//! Everything the optimizer reads but never changes: the slot grid,
//! resources, and the requirements still to be scheduled. Built fresh
//! per request.

use serde::{Deserialize, Serialize};

use super::{ClassRequirement, Classroom, Day, Division, Faculty, TimeSlot};

/// Read-only inputs of a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceData {
    /// Display prefix for result names (e.g. the division name).
    pub label: String,
    /// Slots of the selected shift, repeated on each day.
    pub time_slots: Vec<TimeSlot>,
    /// Schedulable days.
    pub days: Vec<Day>,
    /// Teaching staff.
    pub faculty: Vec<Faculty>,
    /// Rooms.
    pub classrooms: Vec<Classroom>,
    /// Student groups.
    pub divisions: Vec<Division>,
    /// Sessions to schedule.
    pub requirements: Vec<ClassRequirement>,
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self {
            label: "Timetable".to_string(),
            time_slots: Vec::new(),
            days: Day::WEEKDAYS.to_vec(),
            faculty: Vec::new(),
            classrooms: Vec::new(),
            divisions: Vec::new(),
            requirements: Vec::new(),
        }
    }
}

impl ReferenceData {
    /// Creates empty reference data scheduling Monday to Friday.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Replaces the schedulable days.
    pub fn with_days(mut self, days: Vec<Day>) -> Self {
        self.days = days;
        self
    }

    /// Adds a slot.
    pub fn with_slot(mut self, slot: TimeSlot) -> Self {
        self.time_slots.push(slot);
        self
    }

    /// Adds a faculty member.
    pub fn with_faculty(mut self, faculty: Faculty) -> Self {
        self.faculty.push(faculty);
        self
    }

    /// Adds a classroom.
    pub fn with_classroom(mut self, classroom: Classroom) -> Self {
        self.classrooms.push(classroom);
        self
    }

    /// Adds a division.
    pub fn with_division(mut self, division: Division) -> Self {
        self.divisions.push(division);
        self
    }

    /// Adds a requirement.
    pub fn with_requirement(mut self, requirement: ClassRequirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    /// Looks up a faculty member.
    pub fn faculty_by_id(&self, id: &str) -> Option<&Faculty> {
        self.faculty.iter().find(|f| f.id == id)
    }

    /// Looks up a classroom.
    pub fn classroom_by_id(&self, id: &str) -> Option<&Classroom> {
        self.classrooms.iter().find(|c| c.id == id)
    }

    /// Looks up a division.
    pub fn division_by_id(&self, id: &str) -> Option<&Division> {
        self.divisions.iter().find(|d| d.id == id)
    }

    /// Looks up a slot.
    pub fn slot_by_id(&self, id: &str) -> Option<&TimeSlot> {
        self.time_slots.iter().find(|s| s.id == id)
    }

    /// Looks up a requirement.
    pub fn requirement_by_id(&self, id: &str) -> Option<&ClassRequirement> {
        self.requirements.iter().find(|r| r.id == id)
    }

    /// Slots sorted by start time (stable for equal starts).
    pub fn ordered_slots(&self) -> Vec<&TimeSlot> {
        let mut slots: Vec<&TimeSlot> = self.time_slots.iter().collect();
        slots.sort_by_key(|s| s.start);
        slots
    }

    /// Combined head count of the given divisions, if every one is known.
    pub fn head_count(&self, division_ids: &[String]) -> Option<u32> {
        division_ids
            .iter()
            .map(|id| self.division_by_id(id).and_then(|d| d.strength))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let r = ReferenceData::new();
        assert_eq!(r.label, "Timetable");
        assert_eq!(r.days, Day::WEEKDAYS.to_vec());
    }

    #[test]
    fn test_ordered_slots() {
        let r = ReferenceData::new()
            .with_slot(TimeSlot::hourly("late", 11, 12))
            .with_slot(TimeSlot::hourly("early", 9, 10))
            .with_slot(TimeSlot::hourly("mid", 10, 11));
        let ids: Vec<&str> = r.ordered_slots().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "mid", "late"]);
    }

    #[test]
    fn test_head_count() {
        let r = ReferenceData::new()
            .with_division(Division::new("D1").with_strength(30))
            .with_division(Division::new("D2").with_strength(25))
            .with_division(Division::new("D3"));

        assert_eq!(r.head_count(&["D1".into(), "D2".into()]), Some(55));
        assert_eq!(r.head_count(&["D1".into(), "D3".into()]), None);
        assert_eq!(r.head_count(&[]), Some(0));
    }

    #[test]
    fn test_lookups() {
        let r = ReferenceData::new()
            .with_faculty(Faculty::new("F1"))
            .with_classroom(Classroom::lab("L1"))
            .with_requirement(ClassRequirement::new("R1", "Maths"));
        assert!(r.faculty_by_id("F1").is_some());
        assert!(r.classroom_by_id("L1").is_some());
        assert!(r.requirement_by_id("R1").is_some());
        assert!(r.slot_by_id("1").is_none());
    }
}
