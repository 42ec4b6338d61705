//! Timetable quality metrics (KPIs).
//!
//! Computes descriptive indicators for one candidate, alongside its
//! efficiency score.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Faculty / classroom / division conflicts | Hard conflicts per dimension |
//! | Faculty load | Occupied slots per faculty member |
//! | Classroom load | Occupied slots per classroom |
//! | Placements per day | Sessions starting on each day |
//! | Placements per slot | Occupied slots per slot label, over all days |
//! | Slot utilization | Occupied division-slots / (days × slots × divisions) |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Conflict, ConflictKind, ReferenceData, ResourceKind, ScheduleCandidate};

/// Timetable indicators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    pub faculty_conflicts: usize,
    pub classroom_conflicts: usize,
    pub division_conflicts: usize,
    /// Occupied slots per faculty id.
    pub faculty_load: BTreeMap<String, usize>,
    /// Occupied slots per classroom id.
    pub classroom_load: BTreeMap<String, usize>,
    /// Placements per day name.
    pub placements_per_day: BTreeMap<String, usize>,
    /// Occupied slots per slot label (slot id when unlabeled).
    pub placements_per_slot: BTreeMap<String, usize>,
    /// Fraction of the division × day × slot grid in use (0.0..1.0).
    pub slot_utilization: f64,
}

impl ScheduleKpi {
    /// Computes KPIs from a candidate and its conflicts.
    pub fn calculate(
        candidate: &ScheduleCandidate,
        conflicts: &[Conflict],
        reference: &ReferenceData,
    ) -> Self {
        let mut kpi = Self {
            faculty_load: candidate.load_by(ResourceKind::Faculty),
            classroom_load: candidate.load_by(ResourceKind::Classroom),
            ..Self::default()
        };

        for conflict in conflicts {
            match conflict.kind {
                ConflictKind::DoubleBooked(ResourceKind::Faculty) => kpi.faculty_conflicts += 1,
                ConflictKind::DoubleBooked(ResourceKind::Classroom) => kpi.classroom_conflicts += 1,
                ConflictKind::DoubleBooked(ResourceKind::Division) => kpi.division_conflicts += 1,
                _ => {}
            }
        }

        for p in &candidate.placements {
            *kpi.placements_per_day.entry(p.day.to_string()).or_insert(0) += 1;
            for slot_id in &p.slot_ids {
                let label = reference
                    .slot_by_id(slot_id)
                    .map(|s| s.label.as_str())
                    .filter(|l| !l.is_empty())
                    .unwrap_or(slot_id.as_str());
                *kpi.placements_per_slot.entry(label.to_string()).or_insert(0) += 1;
            }
        }

        let grid = reference.days.len() * reference.time_slots.len() * reference.divisions.len();
        if grid > 0 {
            let occupied: usize = candidate.load_by(ResourceKind::Division).values().sum();
            kpi.slot_utilization = (occupied as f64 / grid as f64).min(1.0);
        }

        kpi
    }

    /// Total hard conflicts across dimensions.
    pub fn total_conflicts(&self) -> usize {
        self.faculty_conflicts + self.classroom_conflicts + self.division_conflicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::ConflictDetector;
    use crate::models::{Day, Division, Placement, TimeSlot};

    fn reference() -> ReferenceData {
        ReferenceData::new()
            .with_days(vec![Day::Monday, Day::Tuesday])
            .with_slot(TimeSlot::hourly("1", 9, 10).with_label("9:00 AM - 10:00 AM"))
            .with_slot(TimeSlot::hourly("2", 10, 11))
            .with_division(Division::new("D1"))
    }

    #[test]
    fn test_kpi_loads_and_utilization() {
        let c = ScheduleCandidate::with_placements(vec![
            Placement::fixed("P1", "Maths", Day::Monday, "1", "F1", "A").with_division("D1"),
            Placement::fixed("P2", "Lab", Day::Tuesday, "1", "F2", "L")
                .spanning(vec!["1".into(), "2".into()])
                .with_division("D1"),
        ]);
        let kpi = ScheduleKpi::calculate(&c, &[], &reference());

        assert_eq!(kpi.faculty_load["F1"], 1);
        assert_eq!(kpi.faculty_load["F2"], 2);
        assert_eq!(kpi.classroom_load["L"], 2);
        assert_eq!(kpi.placements_per_day["Monday"], 1);
        assert_eq!(kpi.placements_per_day["Tuesday"], 1);
        assert_eq!(kpi.placements_per_slot["9:00 AM - 10:00 AM"], 2);
        // 3 occupied of 2 days × 2 slots × 1 division
        assert!((kpi.slot_utilization - 0.75).abs() < 1e-12);
        assert_eq!(kpi.total_conflicts(), 0);
    }

    #[test]
    fn test_kpi_conflict_counts() {
        let c = ScheduleCandidate::with_placements(vec![
            Placement::fixed("P1", "Maths", Day::Monday, "1", "F1", "A").with_division("D1"),
            Placement::fixed("P2", "English", Day::Monday, "1", "F1", "B").with_division("D1"),
        ]);
        let conflicts = ConflictDetector::new().detect_all(&c);
        let kpi = ScheduleKpi::calculate(&c, &conflicts, &reference());

        assert_eq!(kpi.faculty_conflicts, 1);
        assert_eq!(kpi.classroom_conflicts, 0);
        assert_eq!(kpi.division_conflicts, 1);
        assert_eq!(kpi.total_conflicts(), 2);
    }

    #[test]
    fn test_kpi_empty_reference() {
        let kpi = ScheduleKpi::calculate(&ScheduleCandidate::new(), &[], &ReferenceData::new());
        assert_eq!(kpi.slot_utilization, 0.0);
        assert!(kpi.faculty_load.is_empty());
    }
}
