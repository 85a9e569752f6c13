use serde::Serialize;

use crate::model::progress::CourseProgress;
use crate::model::task::Task;

/// Derived dashboard aggregate across all courses and the task journal.
///
/// `certificates` always equals `completed_courses` by construction: a
/// certificate is earned exactly when a course reaches 100 %. Learning hours
/// are not derivable from completion data and are passed through from an
/// external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub total_courses: usize,
    pub completed_courses: usize,
    pub learning_hours: u32,
    pub certificates: usize,
    pub tasks_completed: usize,
    pub total_tasks: usize,
}

impl UserStats {
    /// Pure fold over the full input collections. No internal state; every
    /// invocation starts from scratch.
    #[must_use]
    pub fn compute(progress: &[CourseProgress], tasks: &[Task], learning_hours: u32) -> Self {
        let completed_courses = progress.iter().filter(|p| p.is_complete()).count();
        let tasks_completed = tasks.iter().filter(|t| t.completed()).count();

        Self {
            total_courses: progress.len(),
            completed_courses,
            learning_hours,
            certificates: completed_courses,
            tasks_completed,
            total_tasks: tasks.len(),
        }
    }
}
