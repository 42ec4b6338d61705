//! Diversity filtering.
//!
//! Candidates are offered in generation order. A candidate is accepted
//! unless its assigned placements overlap an accepted candidate by more
//! than the threshold (see [`ScheduleCandidate::overlap_with`]). Rejected
//! candidates are kept, with the accepted candidate they resemble most, as
//! fill-ins for when too few distinct candidates exist.

use crate::models::ScheduleCandidate;

/// A rejected candidate and the accepted one it repeats.
#[derive(Debug, Clone)]
pub struct NearDuplicate {
    pub candidate: ScheduleCandidate,
    /// Index into the accepted list.
    pub closest: usize,
    pub overlap: f64,
}

/// Accumulates distinct candidates.
#[derive(Debug, Clone)]
pub struct DiversityFilter {
    threshold: f64,
    accepted: Vec<ScheduleCandidate>,
    rejected: Vec<NearDuplicate>,
}

impl DiversityFilter {
    /// Creates a filter rejecting overlaps strictly above `threshold`.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            accepted: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Offers a candidate. Returns whether it was accepted.
    pub fn offer(&mut self, candidate: ScheduleCandidate) -> bool {
        let closest = self
            .accepted
            .iter()
            .enumerate()
            .map(|(i, a)| (i, candidate.overlap_with(a)))
            .fold(None, |best: Option<(usize, f64)>, (i, o)| match best {
                Some((_, b)) if b >= o => best,
                _ => Some((i, o)),
            });

        match closest {
            Some((closest, overlap)) if overlap > self.threshold => {
                self.rejected.push(NearDuplicate {
                    candidate,
                    closest,
                    overlap,
                });
                false
            }
            _ => {
                self.accepted.push(candidate);
                true
            }
        }
    }

    /// Number of accepted candidates.
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    /// Accepted candidates and rejected near-duplicates, both in offer order.
    pub fn finish(self) -> (Vec<ScheduleCandidate>, Vec<NearDuplicate>) {
        (self.accepted, self.rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassRequirement, Day, Placement};

    fn candidate(days: &[Day]) -> ScheduleCandidate {
        let placements = days
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let req = ClassRequirement::new(format!("R{i}"), "Maths");
                Placement::assigned(&req, *d, vec!["1".into()], "F1", "A")
            })
            .collect();
        ScheduleCandidate::with_placements(placements)
    }

    #[test]
    fn test_first_always_accepted() {
        let mut filter = DiversityFilter::new(0.9);
        assert!(filter.offer(ScheduleCandidate::new()));
        assert_eq!(filter.accepted_count(), 1);
    }

    #[test]
    fn test_identical_rejected() {
        let mut filter = DiversityFilter::new(0.9);
        let a = candidate(&[Day::Monday, Day::Tuesday]);
        assert!(filter.offer(a.clone()));
        assert!(!filter.offer(a));

        let (accepted, rejected) = filter.finish();
        assert_eq!(accepted.len(), 1);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].closest, 0);
        assert!((rejected[0].overlap - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // Overlap exactly 0.5 passes a 0.5 threshold
        let mut filter = DiversityFilter::new(0.5);
        assert!(filter.offer(candidate(&[Day::Monday, Day::Tuesday])));
        assert!(filter.offer(candidate(&[Day::Monday, Day::Friday])));
    }

    #[test]
    fn test_closest_accepted_is_recorded() {
        let mut filter = DiversityFilter::new(0.6);
        filter.offer(candidate(&[Day::Monday, Day::Tuesday, Day::Wednesday]));
        filter.offer(candidate(&[Day::Friday, Day::Friday, Day::Friday]));
        assert!(!filter.offer(candidate(&[Day::Friday, Day::Friday, Day::Wednesday])));

        let (_, rejected) = filter.finish();
        assert_eq!(rejected[0].closest, 1);
    }
}
