//! JSON wire layer.
//!
//! Accepts the payload posted by the timetable frontend, converts it into
//! [`ReferenceData`](crate::models::ReferenceData) plus fixed placements,
//! runs the optimizer and maps the ranked results back to the frontend's
//! option format.
//!
//! # Conversion
//!
//! | Wire | Domain |
//! |------|--------|
//! | `subjects[].hoursPerWeek` (theory) | that many 1-slot lectures |
//! | `subjects[].hoursPerWeek` (lab) | `max(1, h / 2)` 2-slot labs |
//! | `existingClasses[]` | fixed placements; `spansTwoSlots` rows take two slots |
//! | `existingClasses[].labSession` | batch: batches `A`/`B` of a division run in parallel |
//! | `faculty[].maxHoursPerWeek` | weekly slot limit |
//! | `classrooms[].type` containing "lab" | lab room |
//!
//! Ids may be numbers or strings; numeric ids are returned as numbers.

mod request;
mod response;

pub use request::{
    parse_clock, ClassroomDto, DepartmentDto, DivisionDto, ExistingClassDto, FacultyDto,
    OptimizeRequest, RequestPlan, ShiftDto, SpecializationDto, SubjectDto, TimeSlotDto, WireId,
    DEFAULT_DAYS, LAB_SLOTS,
};
pub use response::{ClassDto, OptimizeResponse, UnplacedDto};

use crate::error::OptimizeError;
use crate::optimizer::Optimizer;

/// Converts, optimizes and maps one request.
///
/// A `seed` in the request overrides the optimizer's configured seed.
pub fn handle(
    request: &OptimizeRequest,
    optimizer: &Optimizer,
) -> Result<Vec<OptimizeResponse>, OptimizeError> {
    let plan = request.to_plan().map_err(OptimizeError::Validation)?;

    tracing::debug!(
        requirements = plan.reference.requirements.len(),
        fixed = plan.fixed.len(),
        options = plan.num_options,
        "Converted optimization request"
    );

    let results = match request.seed {
        Some(seed) => Optimizer::new(optimizer.config().clone().with_seed(seed)).optimize(
            &plan.reference,
            &plan.fixed,
            plan.num_options,
        )?,
        None => optimizer.optimize(&plan.reference, &plan.fixed, plan.num_options)?,
    };

    Ok(results
        .iter()
        .map(|r| OptimizeResponse::from_result(r, &plan.reference))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptimizerConfig;
    use crate::validation::ValidationErrorKind;

    const PAYLOAD: &str = r#"{
        "departments": [
            { "name": "Computer", "specializations": [
                { "name": "AI", "divisions": [ { "id": 1, "name": "1a1", "strength": 40 } ] }
            ] }
        ],
        "selectedDivision": { "id": 1, "name": "1a1", "strength": 40 },
        "timeSlots": [
            { "id": 1, "label": "8:30 AM - 9:30 AM", "start": "", "end": "" },
            { "id": 2, "label": "9:30 AM - 10:30 AM", "start": "", "end": "" },
            { "id": 3, "label": "10:30 AM - 11:30 AM", "start": "", "end": "" }
        ],
        "faculty": [
            { "id": 1, "name": "Dr. Sonawane", "subjects": ["Data Structures", "Physics Lab"],
              "maxHoursPerWeek": 20 },
            { "id": 2, "name": "Prof. Kulkarni", "subjects": ["Algorithms"],
              "maxHoursPerWeek": 20 },
            { "id": 3, "name": "Dr. Joshi", "subjects": ["Chemistry Lab"], "maxHoursPerWeek": 20 }
        ],
        "classrooms": [
            { "id": 1, "name": "A-101", "capacity": 60, "type": "Lecture Hall" },
            { "id": 2, "name": "L-201", "capacity": 60, "type": "Computer Lab" },
            { "id": 3, "name": "L-202", "capacity": 60, "type": "Chemistry Lab" }
        ],
        "subjects": [
            { "id": 1, "name": "Data Structures", "hoursPerWeek": 3, "type": "theory" },
            { "id": 2, "name": "Algorithms", "hoursPerWeek": 2, "type": "theory" },
            { "id": 7, "name": "Physics Lab", "hoursPerWeek": 2, "type": "lab" },
            { "id": 8, "name": "Chemistry Lab", "hoursPerWeek": 2, "type": "lab" }
        ],
        "existingClasses": [
            { "id": 11, "subjectName": "Physics Lab", "facultyId": 1, "classroomId": 2,
              "slotId": 1, "day": "Monday", "divisionId": 1, "type": "lab", "labSession": "A",
              "isLabMode": true, "spansTwoSlots": true },
            { "id": 12, "subjectName": "Chemistry Lab", "facultyId": 3, "classroomId": 3,
              "slotId": 1, "day": "Monday", "divisionId": 1, "type": "lab", "labSession": "B",
              "isLabMode": true, "spansTwoSlots": true }
        ],
        "num_options": 3,
        "seed": 42
    }"#;

    #[test]
    fn test_handle_end_to_end() {
        let request: OptimizeRequest = serde_json::from_str(PAYLOAD).unwrap();
        let responses = handle(&request, &Optimizer::default()).unwrap();

        assert_eq!(responses.len(), 3);
        let best = &responses[0];
        assert_eq!(best.id, "opt_1");
        assert_eq!(best.name, "1a1 Option 1");
        assert!(best.unplaced.is_empty());
        // Parallel batches do not collide on the division
        assert!(best.conflicts.iter().all(|c| !c.contains("double-booked")));
        // 2 batches x 2 lab rows + 5 lectures
        assert_eq!(best.classes.len(), 9);
        assert!(best.efficiency > 0.9);
        assert_eq!(best.by_time.values().sum::<usize>(), best.classes.len());
        assert!(responses.iter().all(|r| r.strategy.is_some()));

        let lab_rows: Vec<&ClassDto> = best.classes.iter().filter(|c| c.is_lab_mode).collect();
        assert_eq!(lab_rows.len(), 4);
        assert!(lab_rows.iter().all(|c| c.day == "Monday"));
        let batch_of = |subject: &str| {
            lab_rows
                .iter()
                .filter(|c| c.subject_name == subject)
                .map(|c| c.lab_session.as_deref())
                .collect::<Vec<_>>()
        };
        assert_eq!(batch_of("Physics Lab"), vec![Some("A"), Some("A")]);
        assert_eq!(batch_of("Chemistry Lab"), vec![Some("B"), Some("B")]);

        // Nothing new lands on the labs' Monday slots for the division
        let monday_morning = best
            .classes
            .iter()
            .filter(|c| c.day == "Monday" && c.slot_id != WireId::Num(3))
            .count();
        assert_eq!(monday_morning, 4);
    }

    #[test]
    fn test_seeded_requests_repeat() {
        let request: OptimizeRequest = serde_json::from_str(PAYLOAD).unwrap();
        let optimizer = Optimizer::new(OptimizerConfig::default().with_workers(2));
        let a = serde_json::to_string(&handle(&request, &optimizer).unwrap()).unwrap();
        let b = serde_json::to_string(&handle(&request, &optimizer).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bad_day_is_a_validation_error() {
        let mut request: OptimizeRequest = serde_json::from_str(PAYLOAD).unwrap();
        request.existing_classes[0].day = "Blursday".into();

        let err = handle(&request, &Optimizer::default()).unwrap_err();
        assert_eq!(err.validation_errors()[0].kind, ValidationErrorKind::UnknownDay);
    }

    #[test]
    fn test_empty_request_yields_one_option() {
        let request = OptimizeRequest {
            num_options: Some(0),
            ..Default::default()
        };
        let responses = handle(&request, &Optimizer::default()).unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].name, "Timetable Option 1");
        assert!(responses[0].classes.is_empty());
    }
}
