use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::TaskId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TaskError {
    #[error("task title cannot be empty")]
    EmptyTitle,
}

/// A learner-created to-do item, stored in the task journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    due_date: DateTime<Utc>,
    completed: bool,
}

impl Task {
    /// Creates a new, not-yet-completed task.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::EmptyTitle` if the title is empty or
    /// whitespace-only.
    pub fn new(
        id: TaskId,
        title: impl Into<String>,
        due_date: DateTime<Utc>,
    ) -> Result<Self, TaskError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(TaskError::EmptyTitle);
        }

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            due_date,
            completed: false,
        })
    }

    /// Rehydrates a task from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::EmptyTitle` if the stored title is empty.
    pub fn from_persisted(
        id: TaskId,
        title: impl Into<String>,
        due_date: DateTime<Utc>,
        completed: bool,
    ) -> Result<Self, TaskError> {
        let mut task = Self::new(id, title, due_date)?;
        task.completed = completed;
        Ok(task)
    }

    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Flips the completion flag.
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }

    /// Whether this task falls on the given calendar day. Time of day is
    /// ignored.
    #[must_use]
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        self.due_date.date_naive() == date
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn new_rejects_empty_title() {
        let err = Task::new(TaskId::generate(), "   ", fixed_now()).unwrap_err();
        assert_eq!(err, TaskError::EmptyTitle);
    }

    #[test]
    fn new_trims_title_and_starts_incomplete() {
        let task = Task::new(TaskId::generate(), "  Finish ch.3  ", fixed_now()).unwrap();
        assert_eq!(task.title(), "Finish ch.3");
        assert!(!task.completed());
    }

    #[test]
    fn toggle_is_self_inverse() {
        let mut task = Task::new(TaskId::generate(), "Review notes", fixed_now()).unwrap();
        task.toggle();
        assert!(task.completed());
        task.toggle();
        assert!(!task.completed());
    }

    #[test]
    fn due_matching_ignores_time_of_day() {
        let morning = fixed_now() + Duration::hours(8);
        let task = Task::new(TaskId::generate(), "Watch lecture", morning).unwrap();

        assert!(task.is_due_on(fixed_now().date_naive()));
        assert!(!task.is_due_on(fixed_now().date_naive() + Duration::days(1)));
    }

    #[test]
    fn from_persisted_restores_completion() {
        let id = TaskId::generate();
        let task = Task::from_persisted(id, "Done thing", fixed_now(), true).unwrap();
        assert_eq!(task.id(), id);
        assert!(task.completed());
    }
}
