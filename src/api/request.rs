//! Wire request and its conversion into domain inputs.
//!
//! The request mirrors the JSON posted by the timetable frontend: integer
//! (or string) ids, `camelCase` fields, a catalog of subjects with weekly
//! hours, and the classes already on the timetable.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::models::{
    ClassRequirement, Classroom, Day, Division, Faculty, Placement, ReferenceData, RoomKind,
    SessionKind, TimeSlot,
};
use crate::validation::{ValidationError, ValidationErrorKind};

/// Slots occupied by one lab session.
pub const LAB_SLOTS: u32 = 2;

/// Days scheduled when the request names none (the frontend grid).
pub const DEFAULT_DAYS: [Day; 6] = [
    Day::Monday,
    Day::Tuesday,
    Day::Wednesday,
    Day::Thursday,
    Day::Friday,
    Day::Saturday,
];

/// An id sent as a JSON number or string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Num(i64),
    Text(String),
}

impl WireId {
    /// Restores the wire form of a domain id: numeric when it parses.
    pub fn from_domain(id: &str) -> Self {
        id.parse().map(WireId::Num).unwrap_or_else(|_| WireId::Text(id.to_string()))
    }
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireId::Num(n) => write!(f, "{n}"),
            WireId::Text(s) => f.write_str(s),
        }
    }
}

/// Optimization request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizeRequest {
    pub departments: Vec<DepartmentDto>,
    pub faculty: Vec<FacultyDto>,
    pub classrooms: Vec<ClassroomDto>,
    pub subjects: Vec<SubjectDto>,
    pub selected_division: Option<DivisionDto>,
    pub selected_shift: Option<ShiftDto>,
    pub time_slots: Vec<TimeSlotDto>,
    pub existing_classes: Vec<ExistingClassDto>,
    /// Requested option count. Values below 1 yield one option.
    #[serde(rename = "num_options")]
    pub num_options: Option<i64>,
    /// Day names to schedule. Defaults to Monday through Saturday.
    pub days: Option<Vec<String>>,
    /// Fixes the search seed for reproducible output.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DepartmentDto {
    pub name: String,
    pub specializations: Vec<SpecializationDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecializationDto {
    pub name: String,
    pub divisions: Vec<DivisionDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionDto {
    pub id: WireId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub strength: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftDto {
    pub id: WireId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub time_slots: Vec<TimeSlotDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyDto {
    pub id: WireId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub max_hours_per_week: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassroomDto {
    pub id: WireId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default, rename = "type")]
    pub room_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectDto {
    pub id: WireId,
    pub name: String,
    #[serde(default)]
    pub hours_per_week: u32,
    #[serde(default, rename = "type")]
    pub subject_type: Option<String>,
    /// Divisions taking the subject. Empty = the selected division.
    #[serde(default)]
    pub division_ids: Vec<WireId>,
}

/// A slot as sent by the frontend. `start` and `end` may be blank, in
/// which case the times are read from the label.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotDto {
    pub id: WireId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingClassDto {
    #[serde(default)]
    pub id: Option<WireId>,
    #[serde(alias = "subject")]
    pub subject_name: String,
    #[serde(default)]
    pub subject_id: Option<WireId>,
    pub faculty_id: WireId,
    #[serde(default)]
    pub faculty_name: Option<String>,
    pub classroom_id: WireId,
    #[serde(default)]
    pub classroom_name: Option<String>,
    pub slot_id: WireId,
    pub day: String,
    #[serde(default)]
    pub division_id: Option<WireId>,
    #[serde(default)]
    pub division_name: Option<String>,
    #[serde(default, rename = "type")]
    pub class_type: Option<String>,
    /// Batch letter (`A`, `B`) of a lab run in parallel batches.
    #[serde(default)]
    pub lab_session: Option<String>,
    #[serde(default)]
    pub is_lab_mode: bool,
    /// The row stands for its slot and the following one.
    #[serde(default)]
    pub spans_two_slots: bool,
}

/// Domain inputs built from a request.
#[derive(Debug, Clone)]
pub struct RequestPlan {
    pub reference: ReferenceData,
    pub fixed: Vec<Placement>,
    pub num_options: usize,
}

impl OptimizeRequest {
    /// Converts the request. Unknown day names are reported together.
    pub fn to_plan(&self) -> Result<RequestPlan, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let days = match &self.days {
            Some(names) => names
                .iter()
                .filter_map(|name| match name.parse::<Day>() {
                    Ok(day) => Some(day),
                    Err(e) => {
                        errors.push(ValidationError::new(
                            ValidationErrorKind::UnknownDay,
                            e.to_string(),
                        ));
                        None
                    }
                })
                .collect(),
            None => DEFAULT_DAYS.to_vec(),
        };

        let label = self
            .selected_division
            .as_ref()
            .map(|d| d.name.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Timetable".to_string());

        let mut reference = ReferenceData::new().with_label(label).with_days(days);
        reference.time_slots = self.slots();
        reference.faculty = self.faculty.iter().map(FacultyDto::to_faculty).collect();
        reference.classrooms = self.classrooms.iter().map(ClassroomDto::to_classroom).collect();
        reference.divisions = self.divisions();
        reference.requirements = self.requirements();

        let fixed = self.fixed_placements(&reference, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(RequestPlan {
            reference,
            fixed,
            num_options: self
                .num_options
                .map(|n| usize::try_from(n.max(1)).unwrap_or(usize::MAX))
                .unwrap_or(3),
        })
    }

    /// Slots of the request, falling back to the selected shift's slots.
    ///
    /// When any slot has no readable times, every slot is timed by its
    /// position in the request instead.
    fn slots(&self) -> Vec<TimeSlot> {
        let source = if self.time_slots.is_empty() {
            self.selected_shift
                .as_ref()
                .map(|s| s.time_slots.as_slice())
                .unwrap_or_default()
        } else {
            self.time_slots.as_slice()
        };

        let timed: Option<Vec<TimeSlot>> = source.iter().map(TimeSlotDto::to_timed_slot).collect();
        match timed {
            Some(slots) => slots,
            None => source
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let start = NaiveTime::MIN + chrono::Duration::minutes(10 * i as i64);
                    let end = start + chrono::Duration::minutes(10);
                    TimeSlot::new(s.id.to_string(), start, end).with_label(s.display_label())
                })
                .collect(),
        }
    }

    /// Selected division plus every division listed under departments.
    fn divisions(&self) -> Vec<Division> {
        let mut seen = HashSet::new();
        self.selected_division
            .iter()
            .chain(
                self.departments
                    .iter()
                    .flat_map(|d| &d.specializations)
                    .flat_map(|s| &s.divisions),
            )
            .filter(|d| seen.insert(d.id.to_string()))
            .map(DivisionDto::to_division)
            .collect()
    }

    /// Weekly sessions of every subject for its divisions.
    fn requirements(&self) -> Vec<ClassRequirement> {
        let selected = self.selected_division.as_ref().map(|d| d.id.to_string());
        let mut requirements = Vec::new();

        for subject in &self.subjects {
            let divisions: Vec<Option<String>> = if subject.division_ids.is_empty() {
                vec![selected.clone()]
            } else {
                subject.division_ids.iter().map(|d| Some(d.to_string())).collect()
            };
            if subject.hours_per_week == 0 {
                continue;
            }
            let kind = subject.kind();
            let (count, duration) = match kind {
                SessionKind::Lecture => (subject.hours_per_week, 1),
                SessionKind::Lab => ((subject.hours_per_week / LAB_SLOTS).max(1), LAB_SLOTS),
            };

            for division in divisions {
                for k in 1..=count {
                    let id = match &division {
                        Some(d) => format!("{}-{}-{}", subject.id, d, k),
                        None => format!("{}-{}", subject.id, k),
                    };
                    let mut req = ClassRequirement::new(id, subject.name.clone())
                        .with_kind(kind)
                        .with_duration(duration);
                    if let Some(d) = &division {
                        req = req.with_division(d.clone());
                    }
                    requirements.push(req);
                }
            }
        }
        requirements
    }

    /// Existing classes as fixed placements, each covering one matching
    /// session when one exists.
    ///
    /// A row with `spansTwoSlots` occupies its slot and the next one. Rows
    /// repeating a lab in the following slot (same subject, faculty, room,
    /// division and batch) extend that lab instead of adding a class. The
    /// `labSession` letter becomes the placement's batch, so batches `A`
    /// and `B` of one division may share a slot.
    fn fixed_placements(
        &self,
        reference: &ReferenceData,
        errors: &mut Vec<ValidationError>,
    ) -> Vec<Placement> {
        let ordered = reference.ordered_slots();
        let position = |slot_id: &str| ordered.iter().position(|s| s.id == slot_id);
        let next_after = |slots: &[String]| {
            slots.last().and_then(|s| position(s.as_str())).map(|l| l + 1)
        };
        let mut placements: Vec<Placement> = Vec::new();

        for (i, class) in self.existing_classes.iter().enumerate() {
            let day = match class.day.parse::<Day>() {
                Ok(day) => day,
                Err(e) => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnknownDay,
                        format!("existing class {}: {}", i + 1, e),
                    ));
                    continue;
                }
            };

            let kind = class.kind();
            let slot_id = class.slot_id.to_string();
            let mut slot_ids = vec![slot_id.clone()];
            if class.spans_two_slots {
                if let Some(next) = position(slot_id.as_str()).and_then(|p| ordered.get(p + 1)) {
                    slot_ids.push(next.id.clone());
                }
            }
            let batch = class
                .lab_session
                .as_deref()
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(str::to_uppercase);
            let division = class.division_id.as_ref().map(WireId::to_string);
            let faculty_id = class.faculty_id.to_string();
            let classroom_id = class.classroom_id.to_string();

            if kind == SessionKind::Lab {
                let same_lab = placements.iter_mut().find(|p| {
                    p.kind == SessionKind::Lab
                        && p.day == day
                        && p.subject == class.subject_name
                        && p.faculty_id == faculty_id
                        && p.classroom_id == classroom_id
                        && p.division_ids.first() == division.as_ref()
                        && p.batch == batch
                        && (p.slot_ids.contains(&slot_id)
                            || next_after(&p.slot_ids) == position(slot_id.as_str()))
                });
                if let Some(lab) = same_lab {
                    let extra: Vec<String> = slot_ids
                        .into_iter()
                        .filter(|s| !lab.slot_ids.contains(s))
                        .collect();
                    if lab.slot_count() + extra.len() <= LAB_SLOTS as usize {
                        lab.slot_ids.extend(extra);
                        continue;
                    }
                    if extra.is_empty() {
                        continue;
                    }
                    slot_ids = extra;
                }
            }

            let id = class
                .id
                .as_ref()
                .map(|id| format!("existing-{id}"))
                .unwrap_or_else(|| format!("existing-{}", i + 1));
            let mut placement = Placement::fixed(
                id,
                class.subject_name.clone(),
                day,
                slot_id,
                faculty_id,
                classroom_id,
            )
            .with_kind(kind)
            .spanning(slot_ids);
            if let Some(d) = division {
                placement = placement.with_division(d);
            }
            if let Some(b) = batch {
                placement = placement.in_batch(b);
            }
            placements.push(placement);
        }

        // Each fixed placement covers the first unclaimed matching session
        let mut claimed: HashSet<&str> = HashSet::new();
        for placement in &mut placements {
            let matching = reference.requirements.iter().find(|r| {
                !claimed.contains(r.id.as_str())
                    && r.subject.eq_ignore_ascii_case(&placement.subject)
                    && r.division_ids == placement.division_ids
                    && r.duration_slots as usize == placement.slot_count()
            });
            if let Some(req) = matching {
                claimed.insert(req.id.as_str());
                placement.requirement_id = Some(req.id.clone());
            }
        }

        placements
    }
}

impl ExistingClassDto {
    fn kind(&self) -> SessionKind {
        if self.is_lab_mode || self.lab_session.is_some() {
            SessionKind::Lab
        } else {
            classify(self.class_type.as_deref(), &self.subject_name)
        }
    }
}

impl SubjectDto {
    fn kind(&self) -> SessionKind {
        classify(self.subject_type.as_deref(), &self.name)
    }
}

/// Lab when the type says so, or (no type) when the name mentions a lab.
fn classify(declared: Option<&str>, name: &str) -> SessionKind {
    let is_lab = match declared.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => t.eq_ignore_ascii_case("lab"),
        None => name.to_lowercase().contains("lab"),
    };
    if is_lab {
        SessionKind::Lab
    } else {
        SessionKind::Lecture
    }
}

impl FacultyDto {
    fn to_faculty(&self) -> Faculty {
        let mut faculty = Faculty::new(self.id.to_string()).with_name(self.name.clone());
        faculty.subjects = self.subjects.clone();
        faculty.max_slots_per_week = self.max_hours_per_week;
        faculty
    }
}

impl ClassroomDto {
    fn to_classroom(&self) -> Classroom {
        let kind = if self.room_type.to_lowercase().contains("lab") {
            RoomKind::Lab
        } else {
            RoomKind::Lecture
        };
        let mut room = Classroom::new(self.id.to_string(), kind)
            .with_name(self.name.clone())
            .with_room_type(self.room_type.clone());
        room.capacity = self.capacity;
        room
    }
}

impl DivisionDto {
    fn to_division(&self) -> Division {
        let mut division = Division::new(self.id.to_string()).with_name(self.name.clone());
        division.strength = self.strength;
        division
    }
}

impl TimeSlotDto {
    fn display_label(&self) -> String {
        [&self.label, &self.time]
            .into_iter()
            .find(|s| !s.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| self.id.to_string())
    }

    /// Slot with times from `start`/`end`, or from a `start - end` label.
    fn to_timed_slot(&self) -> Option<TimeSlot> {
        let (start, end) = match (parse_clock(&self.start), parse_clock(&self.end)) {
            (Some(s), Some(e)) => (s, e),
            _ => {
                let label = self.display_label();
                let (a, b) = label.split_once('-')?;
                (parse_clock(a)?, parse_clock(b)?)
            }
        };
        Some(TimeSlot::new(self.id.to_string(), start, end).with_label(self.display_label()))
    }
}

/// Parses `HH:MM`, `HH:MM:SS` and `h:MM AM` clock times.
pub fn parse_clock(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    ["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p", "%I:%M:%S %p"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}
