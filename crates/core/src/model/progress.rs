use serde::Serialize;
use std::collections::BTreeSet;

use crate::model::ids::{CourseId, VideoId};

/// Completion percentage for a course, rounded to the nearest integer.
///
/// Total function over any input pair: `total == 0` yields 0, and a
/// completion count above `total` clamps to 100 so the result never leaves
/// `[0, 100]`.
#[must_use]
pub fn completion_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    // Integer round-half-up; widened so the multiply cannot overflow.
    let percent = (completed as u128 * 100 + total as u128 / 2) / total as u128;
    percent as u8
}

/// Derived progress view for one course. Never stored; always rebuilt from
/// the full completion set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseProgress {
    pub course_id: CourseId,
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

impl CourseProgress {
    /// Builds the progress view from a completion set and the course's total
    /// video count.
    #[must_use]
    pub fn compute(course_id: CourseId, completions: &BTreeSet<VideoId>, total: usize) -> Self {
        let completed = completions.len();
        Self {
            course_id,
            completed,
            total,
            percent: completion_percent(completed, total),
        }
    }

    /// Whether every video in the course has been completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.percent == 100
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> BTreeSet<VideoId> {
        ids.iter().map(|id| VideoId::new(*id)).collect()
    }

    #[test]
    fn empty_set_is_zero() {
        assert_eq!(completion_percent(0, 7), 0);
    }

    #[test]
    fn zero_total_is_zero_not_division_error() {
        assert_eq!(completion_percent(0, 0), 0);
        assert_eq!(completion_percent(3, 0), 0);
    }

    #[test]
    fn rounds_to_nearest_integer() {
        assert_eq!(completion_percent(1, 3), 33);
        assert_eq!(completion_percent(2, 3), 67);
        assert_eq!(completion_percent(2, 4), 50);
        assert_eq!(completion_percent(4, 4), 100);
    }

    #[test]
    fn clamps_overcount_to_one_hundred() {
        assert_eq!(completion_percent(5, 4), 100);
        assert_eq!(completion_percent(usize::MAX, 4), 100);
    }

    #[test]
    fn deterministic_for_equal_inputs() {
        for completed in 0..=10 {
            for total in 0..=10 {
                assert_eq!(
                    completion_percent(completed, total),
                    completion_percent(completed, total)
                );
            }
        }
    }

    #[test]
    fn monotone_in_completed_count() {
        for total in 1..=12 {
            let mut last = 0;
            for completed in 0..=total {
                let percent = completion_percent(completed, total);
                assert!(percent >= last, "dropped at {completed}/{total}");
                assert!(percent <= 100);
                last = percent;
            }
        }
    }

    #[test]
    fn compute_builds_view_from_set() {
        let progress =
            CourseProgress::compute(CourseId::new("c1"), &set(&["v1", "v2"]), 4);

        assert_eq!(progress.completed, 2);
        assert_eq!(progress.total, 4);
        assert_eq!(progress.percent, 50);
        assert!(!progress.is_complete());
    }

    #[test]
    fn compute_full_set_is_complete() {
        let progress =
            CourseProgress::compute(CourseId::new("c1"), &set(&["v1", "v2"]), 2);
        assert!(progress.is_complete());
    }
}
