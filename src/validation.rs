//! Input validation for timetable requests.
//!
//! Checks structural integrity of the reference data and fixed placements
//! before any search runs. Detects:
//! - Duplicate IDs
//! - Placements or requirements referencing unknown slots, faculty,
//!   classrooms, divisions or requirements
//! - Malformed slots (`start >= end`) and zero-length sessions
//! - Fixed placements on days outside the schedule or spanning
//!   non-consecutive slots
//!
//! Every problem is collected; nothing is dropped silently.

use crate::models::{Placement, ReferenceData};
use std::collections::{HashMap, HashSet};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities of the same kind share an ID.
    DuplicateId,
    /// A reference to a slot that doesn't exist.
    UnknownSlot,
    /// A reference to a faculty member that doesn't exist.
    UnknownFaculty,
    /// A reference to a classroom that doesn't exist.
    UnknownClassroom,
    /// A reference to a division that doesn't exist.
    UnknownDivision,
    /// A fixed placement claims to cover a requirement that doesn't exist.
    UnknownRequirement,
    /// A fixed placement sits on a day that is not schedulable.
    UnknownDay,
    /// A slot ends at or before its start.
    InvalidSlot,
    /// A session occupies no slots.
    InvalidDuration,
    /// A multi-slot placement's slots are not consecutive.
    NonConsecutiveSlots,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input data for a timetable request.
///
/// Checks:
/// 1. No duplicate slot, faculty, classroom, division, requirement or
///    fixed placement IDs
/// 2. Every slot has `start < end`
/// 3. Every requirement lasts at least one slot and references known
///    divisions, faculty, classrooms and start slots
/// 4. Every fixed placement references known slots, faculty, classroom,
///    divisions and requirement, sits on a schedulable day and spans
///    consecutive slots
/// 5. No requirement is covered by two fixed placements, and no fixed
///    placement ID equals a requirement ID
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(reference: &ReferenceData, fixed: &[Placement]) -> ValidationResult {
    let mut errors = Vec::new();

    let slot_ids = collect_ids(
        "slot",
        reference.time_slots.iter().map(|s| s.id.as_str()),
        &mut errors,
    );
    let faculty_ids = collect_ids(
        "faculty",
        reference.faculty.iter().map(|f| f.id.as_str()),
        &mut errors,
    );
    let classroom_ids = collect_ids(
        "classroom",
        reference.classrooms.iter().map(|c| c.id.as_str()),
        &mut errors,
    );
    let division_ids = collect_ids(
        "division",
        reference.divisions.iter().map(|d| d.id.as_str()),
        &mut errors,
    );
    let requirement_ids = collect_ids(
        "requirement",
        reference.requirements.iter().map(|r| r.id.as_str()),
        &mut errors,
    );
    collect_ids(
        "fixed placement",
        fixed.iter().map(|p| p.id.as_str()),
        &mut errors,
    );

    for slot in &reference.time_slots {
        if slot.start >= slot.end {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidSlot,
                format!(
                    "Slot '{}' ends at {} which is not after its start {}",
                    slot.id, slot.end, slot.start
                ),
            ));
        }
    }

    // Requirement references
    for req in &reference.requirements {
        if req.duration_slots == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDuration,
                format!("Requirement '{}' has a duration of zero slots", req.id),
            ));
        }
        let mut seen = HashSet::new();
        for d in &req.division_ids {
            if !seen.insert(d.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("Requirement '{}' lists division '{}' twice", req.id, d),
                ));
            }
            if !division_ids.contains(d.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownDivision,
                    format!("Requirement '{}' references unknown division '{}'", req.id, d),
                ));
            }
        }
        for f in &req.faculty_candidates {
            if !faculty_ids.contains(f.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownFaculty,
                    format!("Requirement '{}' references unknown faculty '{}'", req.id, f),
                ));
            }
        }
        for c in &req.classroom_candidates {
            if !classroom_ids.contains(c.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownClassroom,
                    format!("Requirement '{}' references unknown classroom '{}'", req.id, c),
                ));
            }
        }
        for cell in &req.allowed_starts {
            if !slot_ids.contains(cell.slot_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownSlot,
                    format!("Requirement '{}' references unknown slot '{}'", req.id, cell.slot_id),
                ));
            }
        }
    }

    // Fixed placement references
    let position: HashMap<&str, usize> = reference
        .ordered_slots()
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id.as_str(), i))
        .collect();
    let days: HashSet<_> = reference.days.iter().copied().collect();
    let mut covered: HashSet<&str> = HashSet::new();

    for p in fixed {
        if requirement_ids.contains(p.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Fixed placement ID '{}' is also a requirement ID", p.id),
            ));
        }
        if p.slot_ids.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDuration,
                format!("Fixed placement '{}' occupies no slots", p.id),
            ));
        }
        if !days.contains(&p.day) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownDay,
                format!("Fixed placement '{}' is on {} which is not schedulable", p.id, p.day),
            ));
        }
        let mut all_known = true;
        for s in &p.slot_ids {
            if !slot_ids.contains(s.as_str()) {
                all_known = false;
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownSlot,
                    format!("Fixed placement '{}' references unknown slot '{}'", p.id, s),
                ));
            }
        }
        if all_known && !is_consecutive(&p.slot_ids, &position) {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonConsecutiveSlots,
                format!(
                    "Fixed placement '{}' spans slots [{}] which are not consecutive",
                    p.id,
                    p.slot_ids.join(", ")
                ),
            ));
        }
        if !faculty_ids.contains(p.faculty_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownFaculty,
                format!("Fixed placement '{}' references unknown faculty '{}'", p.id, p.faculty_id),
            ));
        }
        if !classroom_ids.contains(p.classroom_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownClassroom,
                format!(
                    "Fixed placement '{}' references unknown classroom '{}'",
                    p.id, p.classroom_id
                ),
            ));
        }
        for d in &p.division_ids {
            if !division_ids.contains(d.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownDivision,
                    format!("Fixed placement '{}' references unknown division '{}'", p.id, d),
                ));
            }
        }
        if let Some(req) = &p.requirement_id {
            if !requirement_ids.contains(req.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownRequirement,
                    format!("Fixed placement '{}' covers unknown requirement '{}'", p.id, req),
                ));
            } else if !covered.insert(req.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("Requirement '{}' is covered twice (again by '{}')", req, p.id),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Collects IDs into a set, reporting duplicates.
fn collect_ids<'a>(
    what: &str,
    ids: impl Iterator<Item = &'a str>,
    errors: &mut Vec<ValidationError>,
) -> HashSet<&'a str> {
    let mut set = HashSet::new();
    for id in ids {
        if !set.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {what} ID: {id}"),
            ));
        }
    }
    set
}

/// Whether the slots follow each other in chronological order.
fn is_consecutive(slot_ids: &[String], position: &HashMap<&str, usize>) -> bool {
    let positions: Vec<usize> = slot_ids
        .iter()
        .filter_map(|s| position.get(s.as_str()).copied())
        .collect();
    positions.windows(2).all(|w| w[1] == w[0] + 1)
}
