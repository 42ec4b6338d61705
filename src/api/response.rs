//! Wire response built from ranked results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::request::WireId;
use crate::models::{OptimizationResult, Placement, ReferenceData, SessionKind};

/// One timetable option.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeResponse {
    pub id: String,
    pub name: String,
    pub classes: Vec<ClassDto>,
    pub conflicts: Vec<String>,
    pub suggestions: Vec<String>,
    /// In `[0, 1]`.
    pub efficiency: f64,
    pub unplaced: Vec<UnplacedDto>,
    /// Scoring profile name, e.g. `Faculty-Optimized`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advantages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disadvantages: Vec<String>,
    /// Sessions per slot label across the week.
    pub by_time: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub near_duplicate_of: Option<String>,
}

/// One occupied slot of a timetable option.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDto {
    pub subject_name: String,
    pub faculty_id: WireId,
    pub faculty_name: Option<String>,
    pub classroom_id: WireId,
    pub classroom_name: Option<String>,
    pub slot_id: WireId,
    pub day: String,
    pub time: String,
    pub division_id: Option<WireId>,
    pub division_name: Option<String>,
    #[serde(rename = "type")]
    pub class_type: String,
    /// Batch letter when only one batch of the division attends.
    pub lab_session: Option<String>,
    pub is_lab_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnplacedDto {
    pub requirement_id: String,
    pub subject: String,
    pub reason: String,
}

impl OptimizeResponse {
    pub fn from_result(result: &OptimizationResult, reference: &ReferenceData) -> Self {
        let classes = result
            .candidate
            .placements
            .iter()
            .flat_map(|p| class_rows(p, reference))
            .collect();
        let unplaced = result
            .candidate
            .unplaced
            .iter()
            .map(|u| UnplacedDto {
                requirement_id: u.requirement_id.clone(),
                subject: u.subject.clone(),
                reason: u.reason.explanation().to_string(),
            })
            .collect();

        let strategy = result.strategy.clone().unwrap_or_default();

        Self {
            id: result.id.clone(),
            name: result.name.clone(),
            classes,
            conflicts: result.conflict_descriptions.clone(),
            suggestions: result.suggestions.clone(),
            efficiency: result.efficiency,
            unplaced,
            strategy: result.strategy.as_ref().map(|s| s.name.clone()),
            description: strategy.description,
            advantages: strategy.advantages,
            disadvantages: strategy.disadvantages,
            by_time: result.kpi.placements_per_slot.clone(),
            near_duplicate_of: result.near_duplicate_of.clone(),
        }
    }
}

/// One row per slot the placement occupies.
fn class_rows(placement: &Placement, reference: &ReferenceData) -> Vec<ClassDto> {
    let faculty_name = reference
        .faculty_by_id(&placement.faculty_id)
        .map(|f| f.display_name().to_string());
    let classroom_name = reference
        .classroom_by_id(&placement.classroom_id)
        .map(|c| c.display_name().to_string());
    let division = placement.division_ids.first();
    let division_name = division
        .and_then(|d| reference.division_by_id(d))
        .map(|d| d.display_name().to_string());
    let class_type = match placement.kind {
        SessionKind::Lab => "lab",
        SessionKind::Lecture => "theory",
    };

    placement
        .slot_ids
        .iter()
        .map(|slot_id| ClassDto {
            subject_name: placement.subject.clone(),
            faculty_id: WireId::from_domain(&placement.faculty_id),
            faculty_name: faculty_name.clone(),
            classroom_id: WireId::from_domain(&placement.classroom_id),
            classroom_name: classroom_name.clone(),
            slot_id: WireId::from_domain(slot_id),
            day: placement.day.to_string(),
            time: reference
                .slot_by_id(slot_id)
                .map(|s| s.label.clone())
                .unwrap_or_default(),
            division_id: division.map(|d| WireId::from_domain(d)),
            division_name: division_name.clone(),
            class_type: class_type.to_string(),
            lab_session: placement.batch.clone(),
            is_lab_mode: placement.kind == SessionKind::Lab,
        })
        .collect()
}
