//! Human-readable conflict descriptions and advice.
//!
//! Messages name resources by their display names and slots by their
//! labels, so they can be shown to timetable editors as-is.

use crate::models::{
    Conflict, ConflictKind, Day, Placement, ReferenceData, ResourceKind, ScheduleCandidate,
    SessionKind, UnplacedReason, UnplacedRequirement,
};

/// Renders conflicts of one candidate.
pub struct SuggestionWriter<'a> {
    reference: &'a ReferenceData,
    candidate: &'a ScheduleCandidate,
}

impl<'a> SuggestionWriter<'a> {
    pub fn new(reference: &'a ReferenceData, candidate: &'a ScheduleCandidate) -> Self {
        Self {
            reference,
            candidate,
        }
    }

    /// One line stating what is wrong.
    pub fn describe(&self, conflict: &Conflict) -> String {
        match &conflict.kind {
            ConflictKind::DoubleBooked(resource) => {
                let (first, second) = self.pair_subjects(conflict);
                format!(
                    "{} {} double-booked on {}: {} and {}",
                    resource_label(*resource),
                    self.resource_name(*resource, &conflict.entity_id),
                    self.when(conflict),
                    first,
                    second
                )
            }
            ConflictKind::Unplaced => match self.unplaced_record(&conflict.entity_id) {
                Some(u) => format!(
                    "{} could not be placed: {}",
                    self.session_label(u),
                    u.reason.explanation()
                ),
                None => format!("Requirement {} could not be placed", conflict.entity_id),
            },
            ConflictKind::SubjectRepeatedInDay => {
                let subject = self
                    .placement(conflict.placement_ids.first().map(String::as_str))
                    .map(|p| p.subject.as_str())
                    .unwrap_or("A subject");
                format!(
                    "{} is scheduled {} times on {} for division {}",
                    subject,
                    conflict.placement_ids.len(),
                    day_name(conflict.day),
                    self.resource_name(ResourceKind::Division, &conflict.entity_id)
                )
            }
            ConflictKind::FacultyOverloaded => {
                let load: usize = self
                    .candidate
                    .placements_for_faculty(&conflict.entity_id)
                    .iter()
                    .map(|p| p.slot_count())
                    .sum();
                let limit = self
                    .reference
                    .faculty_by_id(&conflict.entity_id)
                    .and_then(|f| f.max_slots_per_week)
                    .unwrap_or_default();
                format!(
                    "Faculty {} is scheduled for {} slots, above the weekly limit of {}",
                    self.resource_name(ResourceKind::Faculty, &conflict.entity_id),
                    load,
                    limit
                )
            }
        }
    }

    /// One line of advice for resolving the conflict.
    pub fn advise(&self, conflict: &Conflict) -> String {
        match &conflict.kind {
            ConflictKind::DoubleBooked(resource) => {
                let (_, second) = self.pair_subjects(conflict);
                let name = self.resource_name(*resource, &conflict.entity_id);
                match resource {
                    ResourceKind::Faculty => format!(
                        "Faculty {} double-booked on {}: move {} to a free slot \
                         or assign another qualified faculty member",
                        name,
                        self.when(conflict),
                        second
                    ),
                    ResourceKind::Classroom => format!(
                        "Classroom {} double-booked on {}: move {} to another room or a free slot",
                        name,
                        self.when(conflict),
                        second
                    ),
                    ResourceKind::Division => format!(
                        "Division {} has two classes on {}: reschedule {}",
                        name,
                        self.when(conflict),
                        second
                    ),
                }
            }
            ConflictKind::Unplaced => match self.unplaced_record(&conflict.entity_id) {
                Some(u) => format!(
                    "{} is unplaced ({}): {}",
                    self.session_label(u),
                    u.reason.explanation(),
                    self.remedy(u)
                ),
                None => format!(
                    "Requirement {} is unplaced: add time slots or resources",
                    conflict.entity_id
                ),
            },
            ConflictKind::SubjectRepeatedInDay => format!(
                "Spread repeated sessions across the week for division {} ({})",
                self.resource_name(ResourceKind::Division, &conflict.entity_id),
                day_name(conflict.day)
            ),
            ConflictKind::FacultyOverloaded => format!(
                "Reassign some classes of {} to other qualified faculty",
                self.resource_name(ResourceKind::Faculty, &conflict.entity_id)
            ),
        }
    }

    /// Advice lines for a conflict list, without repeats, in conflict order.
    pub fn suggestions(&self, conflicts: &[Conflict]) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for conflict in conflicts {
            let line = self.advise(conflict);
            if !out.contains(&line) {
                out.push(line);
            }
        }
        out
    }

    fn remedy(&self, u: &UnplacedRequirement) -> String {
        let kind = self
            .reference
            .requirement_by_id(&u.requirement_id)
            .map(|r| r.kind)
            .unwrap_or(SessionKind::Lecture);
        match u.reason {
            UnplacedReason::NoQualifiedFaculty => {
                format!("add a faculty member qualified to teach {}", u.subject)
            }
            UnplacedReason::NoCompatibleClassroom => {
                format!("add a {} room large enough for the attending divisions", kind)
            }
            UnplacedReason::NoCompatibleSlot => {
                format!("allow more start slots for {} or extend the shift", u.subject)
            }
            UnplacedReason::FacultyUnavailable => {
                format!("free up a qualified faculty member for {}", u.subject)
            }
            UnplacedReason::BlockedByFixed => {
                format!("move an existing class to open a slot for {}", u.subject)
            }
            UnplacedReason::SearchExhausted => {
                format!("add time slots or rooms so {} fits", u.subject)
            }
            UnplacedReason::Timeout => "increase the optimization timeout".to_string(),
        }
    }

    fn session_label(&self, u: &UnplacedRequirement) -> String {
        let kind = self
            .reference
            .requirement_by_id(&u.requirement_id)
            .map(|r| r.kind)
            .unwrap_or(SessionKind::Lecture);
        let mut label = format!("{} {}", capitalize(&kind.to_string()), u.subject);
        if !u.division_ids.is_empty() {
            let names: Vec<&str> = u
                .division_ids
                .iter()
                .map(|d| self.resource_name(ResourceKind::Division, d))
                .collect();
            label.push_str(&format!(" for {}", names.join(", ")));
        }
        label
    }

    fn unplaced_record(&self, requirement_id: &str) -> Option<&'a UnplacedRequirement> {
        self.candidate
            .unplaced
            .iter()
            .find(|u| u.requirement_id == requirement_id)
    }

    fn placement(&self, id: Option<&str>) -> Option<&'a Placement> {
        let id = id?;
        self.candidate.placements.iter().find(|p| p.id == id)
    }

    fn pair_subjects(&self, conflict: &Conflict) -> (String, String) {
        let subject = |i: usize| {
            let id = conflict.placement_ids.get(i).map(String::as_str);
            self.placement(id)
                .map(|p| p.subject.clone())
                .or_else(|| id.map(str::to_string))
                .unwrap_or_default()
        };
        (subject(0), subject(1))
    }

    fn when(&self, conflict: &Conflict) -> String {
        let slot = conflict
            .slot_id
            .as_deref()
            .map(|id| {
                self.reference
                    .slot_by_id(id)
                    .map(|s| s.label.as_str())
                    .unwrap_or(id)
            })
            .unwrap_or("?");
        format!("{} slot {}", day_name(conflict.day), slot)
    }

    fn resource_name<'s>(&'s self, resource: ResourceKind, id: &'s str) -> &'s str {
        let name = match resource {
            ResourceKind::Faculty => self.reference.faculty_by_id(id).map(|f| f.display_name()),
            ResourceKind::Classroom => self.reference.classroom_by_id(id).map(|c| c.display_name()),
            ResourceKind::Division => self.reference.division_by_id(id).map(|d| d.display_name()),
        };
        name.unwrap_or(id)
    }
}

fn resource_label(resource: ResourceKind) -> &'static str {
    match resource {
        ResourceKind::Faculty => "Faculty",
        ResourceKind::Classroom => "Classroom",
        ResourceKind::Division => "Division",
    }
}

fn day_name(day: Option<Day>) -> &'static str {
    day.map(Day::name).unwrap_or("some day")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::ConflictDetector;
    use crate::models::{ClassRequirement, Classroom, Division, Faculty, TimeSlot};

    fn reference() -> ReferenceData {
        ReferenceData::new()
            .with_slot(TimeSlot::hourly("3", 11, 12).with_label("11:00 AM - 12:00 PM"))
            .with_faculty(Faculty::new("F1").with_name("Dr. Rao").with_max_slots(1))
            .with_classroom(Classroom::lecture("A").with_name("Room 101"))
            .with_division(Division::new("D1").with_name("SE-A"))
            .with_requirement(ClassRequirement::lab("R9", "Physics Lab", 2).with_division("D1"))
    }

    fn clashing() -> ScheduleCandidate {
        let mut c = ScheduleCandidate::with_placements(vec![
            Placement::fixed("P1", "Algorithms", Day::Monday, "3", "F1", "A").with_division("D1"),
            Placement::fixed("P2", "Databases", Day::Monday, "3", "F1", "A"),
        ]);
        let lab = ClassRequirement::lab("R9", "Physics Lab", 2).with_division("D1");
        c.add_unplaced(UnplacedRequirement::new(&lab, UnplacedReason::BlockedByFixed));
        c
    }

    #[test]
    fn test_double_booking_names_everything() {
        let reference = reference();
        let c = clashing();
        let conflicts = ConflictDetector::new().detect(&c);
        let writer = SuggestionWriter::new(&reference, &c);

        let faculty = conflicts
            .iter()
            .find(|x| x.kind == ConflictKind::DoubleBooked(ResourceKind::Faculty))
            .unwrap();
        assert_eq!(
            writer.describe(faculty),
            "Faculty Dr. Rao double-booked on Monday slot 11:00 AM - 12:00 PM: \
             Algorithms and Databases"
        );
        assert!(writer
            .advise(faculty)
            .starts_with("Faculty Dr. Rao double-booked on Monday slot 11:00 AM - 12:00 PM"));

        let room = conflicts
            .iter()
            .find(|x| x.kind == ConflictKind::DoubleBooked(ResourceKind::Classroom))
            .unwrap();
        assert!(writer.describe(room).starts_with("Classroom Room 101 double-booked"));
    }

    #[test]
    fn test_unplaced_names_subject_and_division() {
        let reference = reference();
        let c = clashing();
        let writer = SuggestionWriter::new(&reference, &c);
        let line = writer.describe(&Conflict::unplaced("R9"));

        assert!(line.starts_with("Lab Physics Lab for SE-A could not be placed"));
        assert!(line.contains("taken by existing classes"));
        assert!(writer
            .advise(&Conflict::unplaced("R9"))
            .contains("move an existing class"));
    }

    #[test]
    fn test_overload_and_dedup() {
        let reference = reference();
        let c = clashing();
        let detector = ConflictDetector::from_reference(&reference);
        let conflicts = detector.detect_all(&c);
        let writer = SuggestionWriter::new(&reference, &c);

        let overload = conflicts
            .iter()
            .find(|x| x.kind == ConflictKind::FacultyOverloaded)
            .unwrap();
        assert_eq!(
            writer.describe(overload),
            "Faculty Dr. Rao is scheduled for 2 slots, above the weekly limit of 1"
        );

        let mut doubled = conflicts.clone();
        doubled.extend(conflicts.iter().cloned());
        assert_eq!(writer.suggestions(&doubled).len(), writer.suggestions(&conflicts).len());
    }

    #[test]
    fn test_unknown_ids_fall_back() {
        let reference = ReferenceData::new();
        let c = ScheduleCandidate::new();
        let writer = SuggestionWriter::new(&reference, &c);
        let conflict =
            Conflict::double_booked(ResourceKind::Classroom, "X9", Day::Friday, "7", "P1", "P2");
        assert_eq!(
            writer.describe(&conflict),
            "Classroom X9 double-booked on Friday slot 7: P1 and P2"
        );
    }
}
