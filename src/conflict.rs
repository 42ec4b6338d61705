//! Conflict detection.
//!
//! # Algorithm
//!
//! Every placement is expanded into one occupancy entry per occupied slot
//! and per resource it holds (its faculty, its classroom, each attending
//! division). Entries are sorted by `(day, slot, dimension, resource,
//! placement)`; any run of equal keys longer than one is a double booking
//! and yields one conflict per colliding pair.
//!
//! A pair colliding on the same resource in several slots (two overlapping
//! labs) is reported once, at the first colliding slot in scan order.
//! Collisions on different dimensions stay separate conflicts. Different
//! lab batches of one division never collide on the division itself.
//!
//! # Complexity
//! O(E log E) with E = Σ slots × (2 + divisions), i.e. O(P log P) for a
//! bounded session length and division count.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::{
    Conflict, Day, Placement, ReferenceData, ResourceKind, ScheduleCandidate,
};

/// Finds hard and soft conflicts in a candidate.
#[derive(Debug, Clone, Default)]
pub struct ConflictDetector {
    faculty_limits: HashMap<String, u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Occupancy<'a> {
    day: Day,
    slot: &'a str,
    kind: ResourceKind,
    resource: &'a str,
    placement: usize,
}

impl<'a> Occupancy<'a> {
    fn same_cell_and_resource(&self, other: &Occupancy<'_>) -> bool {
        self.day == other.day
            && self.slot == other.slot
            && self.kind == other.kind
            && self.resource == other.resource
    }
}

impl ConflictDetector {
    /// Creates a detector without faculty load limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detector using the weekly limits of the reference faculty.
    pub fn from_reference(reference: &ReferenceData) -> Self {
        let faculty_limits = reference
            .faculty
            .iter()
            .filter_map(|f| f.max_slots_per_week.map(|max| (f.id.clone(), max)))
            .collect();
        Self { faculty_limits }
    }

    /// Sets a weekly slot limit for one faculty member.
    pub fn with_faculty_limit(mut self, faculty_id: impl Into<String>, max_slots: u32) -> Self {
        self.faculty_limits.insert(faculty_id.into(), max_slots);
        self
    }

    /// Hard conflicts: resources booked twice in the same cell.
    pub fn detect(&self, candidate: &ScheduleCandidate) -> Vec<Conflict> {
        detect_double_bookings(&candidate.placements)
    }

    /// Soft conflicts: unplaced requirements and unmet preferences.
    pub fn detect_soft(&self, candidate: &ScheduleCandidate) -> Vec<Conflict> {
        let mut conflicts: Vec<Conflict> = candidate
            .unplaced
            .iter()
            .map(|u| Conflict::unplaced(&u.requirement_id))
            .collect();

        // Same subject more than once a day for one division
        let mut per_day: BTreeMap<(&str, Day, String), Vec<String>> = BTreeMap::new();
        for p in &candidate.placements {
            for d in &p.division_ids {
                per_day
                    .entry((d.as_str(), p.day, p.subject.to_lowercase()))
                    .or_default()
                    .push(p.id.clone());
            }
        }
        for ((division, day, _), ids) in per_day {
            if ids.len() > 1 {
                conflicts.push(Conflict::subject_repeated(division, day, ids));
            }
        }

        // Faculty weekly limits
        let mut per_faculty: BTreeMap<&str, (usize, Vec<String>)> = BTreeMap::new();
        for p in &candidate.placements {
            let entry = per_faculty.entry(p.faculty_id.as_str()).or_default();
            entry.0 += p.slot_count();
            entry.1.push(p.id.clone());
        }
        for (faculty, (load, ids)) in per_faculty {
            if let Some(&limit) = self.faculty_limits.get(faculty) {
                if load > limit as usize {
                    conflicts.push(Conflict::faculty_overloaded(faculty, ids));
                }
            }
        }

        conflicts
    }

    /// Hard conflicts followed by soft ones.
    pub fn detect_all(&self, candidate: &ScheduleCandidate) -> Vec<Conflict> {
        let mut conflicts = self.detect(candidate);
        conflicts.extend(self.detect_soft(candidate));
        conflicts
    }
}

/// Sort-then-scan double-booking detection.
pub fn detect_double_bookings(placements: &[Placement]) -> Vec<Conflict> {
    let mut entries: Vec<Occupancy<'_>> = Vec::new();
    for (idx, p) in placements.iter().enumerate() {
        let held = [
            (ResourceKind::Faculty, p.faculty_id.as_str()),
            (ResourceKind::Classroom, p.classroom_id.as_str()),
        ]
        .into_iter()
        .chain(p.division_ids.iter().map(|d| (ResourceKind::Division, d.as_str())));

        for (kind, resource) in held {
            for slot in &p.slot_ids {
                entries.push(Occupancy {
                    day: p.day,
                    slot: slot.as_str(),
                    kind,
                    resource,
                    placement: idx,
                });
            }
        }
    }
    entries.sort_unstable();

    let mut conflicts = Vec::new();
    let mut reported: HashSet<(ResourceKind, &str, usize, usize)> = HashSet::new();

    let mut start = 0;
    while start < entries.len() {
        let mut end = start + 1;
        while end < entries.len() && entries[end].same_cell_and_resource(&entries[start]) {
            end += 1;
        }

        let run = &entries[start..end];
        for (i, a) in run.iter().enumerate() {
            for b in &run[i + 1..] {
                if a.placement == b.placement {
                    continue;
                }
                if a.kind == ResourceKind::Division
                    && placements[a.placement].is_parallel_batch_of(&placements[b.placement])
                {
                    continue;
                }
                let (first, second) = (a.placement.min(b.placement), a.placement.max(b.placement));
                if reported.insert((a.kind, a.resource, first, second)) {
                    conflicts.push(Conflict::double_booked(
                        a.kind,
                        a.resource,
                        a.day,
                        a.slot,
                        &placements[first].id,
                        &placements[second].id,
                    ));
                }
            }
        }

        start = end;
    }

    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ClassRequirement, ConflictKind, Severity, UnplacedReason, UnplacedRequirement,
    };
    use proptest::prelude::*;

    fn lecture(
        id: &str,
        day: Day,
        slot: &str,
        faculty: &str,
        room: &str,
        division: &str,
    ) -> Placement {
        Placement::fixed(id, "Maths", day, slot, faculty, room).with_division(division)
    }

    fn batch_lab(id: &str, batch: &str, faculty: &str, room: &str) -> Placement {
        Placement::fixed(id, "Lab", Day::Monday, "1", faculty, room)
            .spanning(vec!["1".into(), "2".into()])
            .with_division("D1")
            .in_batch(batch)
    }

    fn kinds(conflicts: &[Conflict]) -> Vec<ConflictKind> {
        conflicts.iter().map(|c| c.kind.clone()).collect()
    }

    #[test]
    fn test_no_conflicts() {
        let c = ScheduleCandidate::with_placements(vec![
            lecture("P1", Day::Monday, "1", "F1", "A", "D1"),
            lecture("P2", Day::Monday, "2", "F1", "A", "D1"),
            lecture("P3", Day::Tuesday, "1", "F1", "A", "D1"),
            lecture("P4", Day::Monday, "1", "F2", "B", "D2"),
        ]);
        assert!(ConflictDetector::new().detect(&c).is_empty());
    }

    #[test]
    fn test_faculty_double_booked() {
        let c = ScheduleCandidate::with_placements(vec![
            lecture("P1", Day::Monday, "1", "F1", "A", "D1"),
            lecture("P2", Day::Monday, "1", "F1", "B", "D2"),
        ]);
        let conflicts = ConflictDetector::new().detect(&c);
        assert_eq!(conflicts.len(), 1);
        let conflict = &conflicts[0];
        assert_eq!(conflict.kind, ConflictKind::DoubleBooked(ResourceKind::Faculty));
        assert_eq!(conflict.entity_id, "F1");
        assert_eq!(conflict.day, Some(Day::Monday));
        assert_eq!(conflict.slot_id.as_deref(), Some("1"));
        assert!(conflict.involves("P1") && conflict.involves("P2"));
    }

    #[test]
    fn test_distinct_dimensions_not_deduplicated() {
        // Same room and same division: two separate conflicts
        let c = ScheduleCandidate::with_placements(vec![
            lecture("P1", Day::Monday, "1", "F1", "A", "D1"),
            lecture("P2", Day::Monday, "1", "F2", "A", "D1"),
        ]);
        let found = kinds(&ConflictDetector::new().detect(&c));
        assert_eq!(found.len(), 2);
        assert!(found.contains(&ConflictKind::DoubleBooked(ResourceKind::Classroom)));
        assert!(found.contains(&ConflictKind::DoubleBooked(ResourceKind::Division)));
    }

    #[test]
    fn test_lab_checked_on_every_slot() {
        // Lab starts at slot 1 and runs into slot 2 where the lecture sits
        let lab = Placement::fixed("LAB", "Physics Lab", Day::Monday, "1", "F1", "L")
            .spanning(vec!["1".into(), "2".into()])
            .with_division("D1");
        let c = ScheduleCandidate::with_placements(vec![
            lab,
            lecture("P2", Day::Monday, "2", "F2", "A", "D1"),
        ]);
        let conflicts = ConflictDetector::new().detect(&c);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::DoubleBooked(ResourceKind::Division));
        assert_eq!(conflicts[0].slot_id.as_deref(), Some("2"));
    }

    #[test]
    fn test_overlapping_labs_reported_once_per_dimension() {
        let lab = |id: &str| {
            Placement::fixed(id, "Lab", Day::Monday, "1", "F1", "L")
                .spanning(vec!["1".into(), "2".into()])
        };
        let c = ScheduleCandidate::with_placements(vec![lab("A"), lab("B")]);
        let conflicts = ConflictDetector::new().detect(&c);
        // Faculty + classroom, not doubled for the second slot
        assert_eq!(conflicts.len(), 2);
    }

    #[test]
    fn test_parallel_batches_share_division() {
        let c = ScheduleCandidate::with_placements(vec![
            batch_lab("A", "A", "F1", "L1"),
            batch_lab("B", "B", "F2", "L2"),
        ]);
        assert!(ConflictDetector::new().detect(&c).is_empty());

        // Same batch twice, or a whole-division lecture, still collides
        let c = ScheduleCandidate::with_placements(vec![
            batch_lab("A1", "A", "F1", "L1"),
            batch_lab("A2", "A", "F2", "L2"),
            lecture("P", Day::Monday, "2", "F3", "R", "D1"),
        ]);
        let conflicts = ConflictDetector::new().detect(&c);
        assert_eq!(conflicts.len(), 3);
        assert!(conflicts
            .iter()
            .all(|c| c.kind == ConflictKind::DoubleBooked(ResourceKind::Division)));
    }

    #[test]
    fn test_three_way_collision_yields_each_pair() {
        let c = ScheduleCandidate::with_placements(vec![
            lecture("P1", Day::Friday, "3", "F1", "A", "D1"),
            lecture("P2", Day::Friday, "3", "F1", "B", "D2"),
            lecture("P3", Day::Friday, "3", "F1", "C", "D3"),
        ]);
        let conflicts = ConflictDetector::new().detect(&c);
        assert_eq!(conflicts.len(), 3);
    }

    #[test]
    fn test_soft_unplaced_and_repeats() {
        let req = ClassRequirement::new("R9", "English").with_division("D1");
        let mut c = ScheduleCandidate::with_placements(vec![
            lecture("P1", Day::Monday, "1", "F1", "A", "D1"),
            lecture("P2", Day::Monday, "3", "F1", "A", "D1"),
            lecture("P3", Day::Tuesday, "1", "F1", "A", "D1"),
        ]);
        c.add_unplaced(UnplacedRequirement::new(&req, UnplacedReason::SearchExhausted));

        let soft = ConflictDetector::new().detect_soft(&c);
        assert!(soft.iter().all(|s| s.severity == Severity::Soft));
        assert!(soft
            .iter()
            .any(|s| s.kind == ConflictKind::Unplaced && s.entity_id == "R9"));
        let repeat = soft
            .iter()
            .find(|s| s.kind == ConflictKind::SubjectRepeatedInDay)
            .unwrap();
        assert_eq!(repeat.day, Some(Day::Monday));
        assert_eq!(repeat.placement_ids, vec!["P1", "P2"]);
    }

    #[test]
    fn test_faculty_limit() {
        let c = ScheduleCandidate::with_placements(vec![
            lecture("P1", Day::Monday, "1", "F1", "A", "D1"),
            lecture("P2", Day::Tuesday, "1", "F1", "A", "D1"),
        ]);
        let lenient = ConflictDetector::new().with_faculty_limit("F1", 2);
        assert!(lenient.detect_soft(&c).is_empty());

        let strict = ConflictDetector::new().with_faculty_limit("F1", 1);
        let soft = strict.detect_soft(&c);
        assert_eq!(soft.len(), 1);
        assert_eq!(soft[0].kind, ConflictKind::FacultyOverloaded);
    }

    #[test]
    fn test_detect_all_orders_hard_first() {
        let req = ClassRequirement::new("R9", "English");
        let mut c = ScheduleCandidate::with_placements(vec![
            lecture("P1", Day::Monday, "1", "F1", "A", "D1"),
            lecture("P2", Day::Monday, "1", "F1", "B", "D2"),
        ]);
        c.add_unplaced(UnplacedRequirement::new(&req, UnplacedReason::Timeout));
        let all = ConflictDetector::new().detect_all(&c);
        assert_eq!(all.len(), 2);
        assert!(all[0].is_hard());
        assert!(!all[1].is_hard());
    }

    /// Reference O(P²) detector used by the property tests.
    fn brute_force(placements: &[Placement]) -> HashSet<(ResourceKind, String, usize, usize)> {
        let mut found = HashSet::new();
        for i in 0..placements.len() {
            for j in (i + 1)..placements.len() {
                let (a, b) = (&placements[i], &placements[j]);
                if a.day != b.day || !a.slot_ids.iter().any(|s| b.slot_ids.contains(s)) {
                    continue;
                }
                if a.faculty_id == b.faculty_id {
                    found.insert((ResourceKind::Faculty, a.faculty_id.clone(), i, j));
                }
                if a.classroom_id == b.classroom_id {
                    found.insert((ResourceKind::Classroom, a.classroom_id.clone(), i, j));
                }
                for d in &a.division_ids {
                    if b.division_ids.contains(d) && !a.is_parallel_batch_of(b) {
                        found.insert((ResourceKind::Division, d.clone(), i, j));
                    }
                }
            }
        }
        found
    }

    type Spec = (u8, u8, bool, u8, u8, u8, u8);

    fn arb_placement() -> impl Strategy<Value = Spec> {
        // (day, start slot, two-slot lab?, faculty, room, division, batch or 0)
        (0u8..2, 0u8..4, any::<bool>(), 0u8..3, 0u8..3, 0u8..3, 0u8..3)
    }

    fn build(specs: &[Spec]) -> Vec<Placement> {
        specs
            .iter()
            .enumerate()
            .map(|(i, &(day, slot, lab, f, r, d, batch))| {
                let day = if day == 0 { Day::Monday } else { Day::Tuesday };
                let mut slots = vec![slot.to_string()];
                if lab {
                    slots.push((slot + 1).to_string());
                }
                let (faculty, room) = (format!("F{f}"), format!("R{r}"));
                let p = Placement::fixed(format!("P{i}"), "S", day, "0", faculty, room)
                    .spanning(slots)
                    .with_division(format!("D{d}"));
                match batch {
                    0 => p,
                    b => p.in_batch(b.to_string()),
                }
            })
            .collect()
    }

    proptest! {
        #[test]
        fn prop_detector_matches_brute_force(
            specs in prop::collection::vec(arb_placement(), 0..24)
        ) {
            let placements = build(&specs);
            let index: HashMap<&str, usize> = placements
                .iter()
                .enumerate()
                .map(|(i, p)| (p.id.as_str(), i))
                .collect();

            let found: HashSet<(ResourceKind, String, usize, usize)> =
                detect_double_bookings(&placements)
                    .into_iter()
                    .map(|c| {
                        let kind = match c.kind {
                            ConflictKind::DoubleBooked(k) => k,
                            _ => unreachable!("only double bookings are hard"),
                        };
                        let a = index[c.placement_ids[0].as_str()];
                        let b = index[c.placement_ids[1].as_str()];
                        (kind, c.entity_id, a.min(b), a.max(b))
                    })
                    .collect();

            prop_assert_eq!(found, brute_force(&placements));
        }

        #[test]
        fn prop_disjoint_cells_have_no_conflicts(n in 0usize..30) {
            // Every placement alone in its own cell
            let placements: Vec<Placement> = (0..n)
                .map(|i| {
                    Placement::fixed(format!("P{i}"), "S", Day::Monday, i.to_string(), "F", "R")
                        .with_division("D")
                })
                .collect();
            prop_assert!(detect_double_bookings(&placements).is_empty());
        }
    }
}
