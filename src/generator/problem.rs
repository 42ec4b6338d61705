//! Static search problem.
//!
//! Compiles the reference data and fixed placements of one request into
//! dense indices, the occupancy grid of the fixed placements, and the
//! static option pool of every requirement still to be placed.
//!
//! # Static domains
//!
//! An option is `(day, start slot, faculty, classroom)`. The pool of a
//! requirement is built in stages, and the first stage that comes up empty
//! names the reason the requirement can never be placed:
//!
//! 1. qualified faculty → `NoQualifiedFaculty`
//! 2. compatible classrooms (kind, explicit list, capacity) → `NoCompatibleClassroom`
//! 3. start cells inside the allowed window with enough consecutive slots → `NoCompatibleSlot`
//! 4. faculty available for every occupied slot → `FacultyUnavailable`
//! 5. options not colliding with a fixed placement → `BlockedByFixed`
//!
//! Infeasible requirements are reported once and never searched.

use std::collections::{HashMap, HashSet};

use crate::models::{
    ClassRequirement, Day, Placement, ReferenceData, ScheduleCandidate, SlotRef, TimeSlot,
    UnplacedReason, UnplacedRequirement,
};
use crate::ranker::EligibleResources;

/// One way to place a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SessionOption {
    pub day: usize,
    pub start: usize,
    pub faculty: usize,
    pub classroom: usize,
}

/// Cells and resources held by a placed session.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Footprint<'a> {
    pub day: usize,
    pub start: usize,
    pub len: usize,
    pub faculty: usize,
    pub classroom: usize,
    pub divisions: &'a [usize],
    pub subject: usize,
}

/// A requirement with a non-empty static option pool.
#[derive(Debug, Clone)]
pub(crate) struct OpenRequirement {
    /// Index into `ReferenceData::requirements`.
    pub index: usize,
    pub duration: usize,
    pub divisions: Vec<usize>,
    pub subject: usize,
    pub options: Vec<SessionOption>,
}

impl OpenRequirement {
    pub fn footprint(&self, option: SessionOption) -> Footprint<'_> {
        Footprint {
            day: option.day,
            start: option.start,
            len: self.duration,
            faculty: option.faculty,
            classroom: option.classroom,
            divisions: &self.divisions,
            subject: self.subject,
        }
    }
}

/// Occupancy counts per resource and cell, plus the counters behind the
/// soft preferences.
#[derive(Debug, Clone)]
pub(crate) struct OccupancyGrid {
    nslots: usize,
    cells: usize,
    faculty: Vec<u16>,
    classroom: Vec<u16>,
    division: Vec<u16>,
    faculty_load: Vec<u32>,
    subject_day: HashMap<(usize, usize, usize), u16>,
}

impl OccupancyGrid {
    pub fn new(
        nfaculty: usize,
        nclassrooms: usize,
        ndivisions: usize,
        ndays: usize,
        nslots: usize,
    ) -> Self {
        let cells = ndays * nslots;
        Self {
            nslots,
            cells,
            faculty: vec![0; nfaculty * cells],
            classroom: vec![0; nclassrooms * cells],
            division: vec![0; ndivisions * cells],
            faculty_load: vec![0; nfaculty],
            subject_day: HashMap::new(),
        }
    }

    #[inline]
    fn at(&self, resource: usize, day: usize, slot: usize) -> usize {
        resource * self.cells + day * self.nslots + slot
    }

    /// Whether every resource of `fp` is free in every occupied cell.
    pub fn is_free(&self, fp: &Footprint<'_>) -> bool {
        (fp.start..fp.start + fp.len).all(|slot| {
            self.faculty[self.at(fp.faculty, fp.day, slot)] == 0
                && self.classroom[self.at(fp.classroom, fp.day, slot)] == 0
                && fp
                    .divisions
                    .iter()
                    .all(|&d| self.division[self.at(d, fp.day, slot)] == 0)
        })
    }

    /// Number of existing bookings `fp` would collide with.
    pub fn collisions(&self, fp: &Footprint<'_>) -> u32 {
        (fp.start..fp.start + fp.len)
            .map(|slot| {
                let mut n = u32::from(self.faculty[self.at(fp.faculty, fp.day, slot)])
                    + u32::from(self.classroom[self.at(fp.classroom, fp.day, slot)]);
                for &d in fp.divisions {
                    n += u32::from(self.division[self.at(d, fp.day, slot)]);
                }
                n
            })
            .sum()
    }

    /// Whether `fp` keeps the soft preferences: no subject repeated on a
    /// day for any attending division, faculty within their weekly limit.
    pub fn is_clean(&self, fp: &Footprint<'_>, faculty_limits: &[Option<u32>]) -> bool {
        let repeats = fp.divisions.iter().any(|&d| {
            self.subject_day
                .get(&(d, fp.day, fp.subject))
                .is_some_and(|&n| n > 0)
        });
        let within_limit = match faculty_limits.get(fp.faculty).copied().flatten() {
            Some(limit) => self.faculty_load[fp.faculty] + fp.len as u32 <= limit,
            None => true,
        };
        !repeats && within_limit
    }

    /// Books `fp`.
    pub fn occupy(&mut self, fp: &Footprint<'_>) {
        for slot in fp.start..fp.start + fp.len {
            let f = self.at(fp.faculty, fp.day, slot);
            self.faculty[f] = self.faculty[f].saturating_add(1);
            let c = self.at(fp.classroom, fp.day, slot);
            self.classroom[c] = self.classroom[c].saturating_add(1);
            for &d in fp.divisions {
                let i = self.at(d, fp.day, slot);
                self.division[i] = self.division[i].saturating_add(1);
            }
        }
        self.faculty_load[fp.faculty] += fp.len as u32;
        for &d in fp.divisions {
            *self.subject_day.entry((d, fp.day, fp.subject)).or_insert(0) += 1;
        }
    }

    /// Releases a booking made with `occupy`.
    pub fn release(&mut self, fp: &Footprint<'_>) {
        for slot in fp.start..fp.start + fp.len {
            let f = self.at(fp.faculty, fp.day, slot);
            self.faculty[f] = self.faculty[f].saturating_sub(1);
            let c = self.at(fp.classroom, fp.day, slot);
            self.classroom[c] = self.classroom[c].saturating_sub(1);
            for &d in fp.divisions {
                let i = self.at(d, fp.day, slot);
                self.division[i] = self.division[i].saturating_sub(1);
            }
        }
        self.faculty_load[fp.faculty] = self.faculty_load[fp.faculty].saturating_sub(fp.len as u32);
        for &d in fp.divisions {
            if let Some(n) = self.subject_day.get_mut(&(d, fp.day, fp.subject)) {
                *n = n.saturating_sub(1);
            }
        }
    }
}

/// Compiled request.
#[derive(Debug)]
pub(crate) struct TimetableProblem<'a> {
    pub reference: &'a ReferenceData,
    pub fixed: &'a [Placement],
    pub days: Vec<Day>,
    pub slots: Vec<&'a TimeSlot>,
    /// Requirements to search, most-constrained first.
    pub open: Vec<OpenRequirement>,
    /// Requirements with an empty static pool, by requirement index.
    pub infeasible: Vec<(usize, UnplacedReason)>,
    /// Fixed placements only.
    pub fixed_grid: OccupancyGrid,
    pub faculty_limits: Vec<Option<u32>>,
    pub eligible: EligibleResources,
}

impl<'a> TimetableProblem<'a> {
    /// Compiles a validated request.
    pub fn build(reference: &'a ReferenceData, fixed: &'a [Placement]) -> Self {
        let days = reference.days.clone();
        let slots = reference.ordered_slots();
        let nslots = slots.len();

        let day_index: HashMap<Day, usize> =
            days.iter().enumerate().map(|(i, d)| (*d, i)).collect();
        let slot_index: HashMap<&str, usize> =
            slots.iter().enumerate().map(|(i, s)| (s.id.as_str(), i)).collect();
        let faculty_index: HashMap<&str, usize> = reference
            .faculty
            .iter()
            .enumerate()
            .map(|(i, f)| (f.id.as_str(), i))
            .collect();
        let classroom_index: HashMap<&str, usize> = reference
            .classrooms
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.as_str(), i))
            .collect();
        let division_index: HashMap<&str, usize> = reference
            .divisions
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id.as_str(), i))
            .collect();

        let mut subjects: HashMap<String, usize> = HashMap::new();
        let mut intern = |subject: &str| {
            let next = subjects.len();
            *subjects.entry(subject.to_lowercase()).or_insert(next)
        };

        let mut grid = OccupancyGrid::new(
            reference.faculty.len(),
            reference.classrooms.len(),
            reference.divisions.len(),
            days.len(),
            nslots,
        );
        let mut eligible = EligibleResources::default();
        let mut covered: HashSet<&str> = HashSet::new();

        for p in fixed {
            if let Some(r) = p.requirement_id.as_deref() {
                covered.insert(r);
            }
            eligible.faculty.insert(p.faculty_id.clone());
            eligible.classrooms.insert(p.classroom_id.clone());

            let (Some(&day), Some(&start), Some(&faculty), Some(&classroom)) = (
                day_index.get(&p.day),
                p.start_slot().and_then(|s| slot_index.get(s)),
                faculty_index.get(p.faculty_id.as_str()),
                classroom_index.get(p.classroom_id.as_str()),
            ) else {
                continue;
            };
            let divisions: Vec<usize> = p
                .division_ids
                .iter()
                .filter_map(|d| division_index.get(d.as_str()).copied())
                .collect();
            let len = p.slot_count().min(nslots - start);
            grid.occupy(&Footprint {
                day,
                start,
                len,
                faculty,
                classroom,
                divisions: &divisions,
                subject: intern(&p.subject),
            });
        }

        // Availability per faculty over the day × slot grid
        let availability: Vec<Vec<bool>> = reference
            .faculty
            .iter()
            .map(|f| {
                let mut free = vec![true; days.len() * nslots];
                for cell in &f.unavailable {
                    if let (Some(&d), Some(&s)) =
                        (day_index.get(&cell.day), slot_index.get(cell.slot_id.as_str()))
                    {
                        free[d * nslots + s] = false;
                    }
                }
                free
            })
            .collect();

        let faculty_limits = reference.faculty.iter().map(|f| f.max_slots_per_week).collect();

        let mut open = Vec::new();
        let mut infeasible = Vec::new();

        for (index, req) in reference.requirements.iter().enumerate() {
            if covered.contains(req.id.as_str()) {
                continue;
            }
            let divisions: Vec<usize> = req
                .division_ids
                .iter()
                .filter_map(|d| division_index.get(d.as_str()).copied())
                .collect();
            let mut candidate = OpenRequirement {
                index,
                duration: req.duration_slots as usize,
                divisions,
                subject: intern(&req.subject),
                options: Vec::new(),
            };

            let domain = StaticDomain {
                reference,
                days: &days,
                slots: &slots,
                faculty_index: &faculty_index,
                availability: &availability,
                fixed_grid: &grid,
            };
            match domain.options_for(req, &candidate) {
                Ok(options) => {
                    for o in &options {
                        eligible.faculty.insert(reference.faculty[o.faculty].id.clone());
                        eligible.classrooms.insert(reference.classrooms[o.classroom].id.clone());
                    }
                    candidate.options = options;
                    open.push(candidate);
                }
                Err(reason) => infeasible.push((index, reason)),
            }
        }

        // Most-constrained first; ties keep input order
        open.sort_by_key(|r| (r.options.len(), r.index));

        Self {
            reference,
            fixed,
            days,
            slots,
            open,
            infeasible,
            fixed_grid: grid,
            faculty_limits,
            eligible,
        }
    }

    /// The requirement behind an open entry.
    pub fn requirement(&self, open: &OpenRequirement) -> &'a ClassRequirement {
        &self.reference.requirements[open.index]
    }

    /// Materializes an option as an assigned placement.
    pub fn placement_for(&self, open: &OpenRequirement, option: SessionOption) -> Placement {
        let slot_ids = self.slots[option.start..option.start + open.duration]
            .iter()
            .map(|s| s.id.clone())
            .collect();
        Placement::assigned(
            self.requirement(open),
            self.days[option.day],
            slot_ids,
            self.reference.faculty[option.faculty].id.clone(),
            self.reference.classrooms[option.classroom].id.clone(),
        )
    }

    /// Unplaced record for a requirement index.
    pub fn unplaced(&self, index: usize, reason: UnplacedReason) -> UnplacedRequirement {
        UnplacedRequirement::new(&self.reference.requirements[index], reason)
    }

    /// Candidate holding only the fixed placements. Every open requirement
    /// is reported with `reason`, infeasible ones with their own reason.
    pub fn fixed_only_candidate(&self, reason: UnplacedReason) -> ScheduleCandidate {
        let mut unplaced: Vec<(usize, UnplacedReason)> = self
            .infeasible
            .iter()
            .copied()
            .chain(self.open.iter().map(|o| (o.index, reason)))
            .collect();
        unplaced.sort_by_key(|(i, _)| *i);

        let mut candidate = ScheduleCandidate::with_placements(self.fixed.to_vec());
        candidate.unplaced = unplaced
            .into_iter()
            .map(|(i, r)| self.unplaced(i, r))
            .collect();
        candidate
    }
}

/// Builds the static option pool of one requirement.
struct StaticDomain<'p, 'a> {
    reference: &'a ReferenceData,
    days: &'p [Day],
    slots: &'p [&'a TimeSlot],
    faculty_index: &'p HashMap<&'a str, usize>,
    availability: &'p [Vec<bool>],
    fixed_grid: &'p OccupancyGrid,
}

impl StaticDomain<'_, '_> {
    fn options_for(
        &self,
        req: &ClassRequirement,
        open: &OpenRequirement,
    ) -> Result<Vec<SessionOption>, UnplacedReason> {
        let nslots = self.slots.len();

        let faculty: Vec<usize> = if req.faculty_candidates.is_empty() {
            self.reference
                .faculty
                .iter()
                .enumerate()
                .filter(|(_, f)| f.teaches(&req.subject))
                .map(|(i, _)| i)
                .collect()
        } else {
            req.faculty_candidates
                .iter()
                .filter_map(|id| self.faculty_index.get(id.as_str()).copied())
                .collect()
        };
        if faculty.is_empty() {
            return Err(UnplacedReason::NoQualifiedFaculty);
        }

        let head_count = self.reference.head_count(&req.division_ids);
        let classrooms: Vec<usize> = self
            .reference
            .classrooms
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                c.kind.hosts(req.kind)
                    && (req.classroom_candidates.is_empty()
                        || req.classroom_candidates.iter().any(|id| *id == c.id))
                    && c.fits(head_count)
            })
            .map(|(i, _)| i)
            .collect();
        if classrooms.is_empty() {
            return Err(UnplacedReason::NoCompatibleClassroom);
        }

        let duration = open.duration;
        let mut starts = Vec::new();
        if duration > 0 && duration <= nslots {
            for (d, day) in self.days.iter().enumerate() {
                for s in 0..=(nslots - duration) {
                    if req.may_start_at(&SlotRef::new(*day, self.slots[s].id.clone())) {
                        starts.push((d, s));
                    }
                }
            }
        }
        if starts.is_empty() {
            return Err(UnplacedReason::NoCompatibleSlot);
        }

        let mut staffed = Vec::new();
        for &(d, s) in &starts {
            for &f in &faculty {
                let free = &self.availability[f];
                if (s..s + duration).all(|t| free[d * nslots + t]) {
                    staffed.push((d, s, f));
                }
            }
        }
        if staffed.is_empty() {
            return Err(UnplacedReason::FacultyUnavailable);
        }

        let mut options = Vec::new();
        for &(day, start, faculty) in &staffed {
            for &classroom in &classrooms {
                let option = SessionOption {
                    day,
                    start,
                    faculty,
                    classroom,
                };
                if self.fixed_grid.is_free(&open.footprint(option)) {
                    options.push(option);
                }
            }
        }
        if options.is_empty() {
            return Err(UnplacedReason::BlockedByFixed);
        }

        Ok(options)
    }
}
