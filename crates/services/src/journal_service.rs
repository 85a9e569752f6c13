use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use course_core::model::{CalendarEvent, EventId, Task, TaskId, UserId};
use storage::repository::{EventRepository, TaskRepository};

use crate::error::JournalError;

/// User-scoped task and calendar-event journal.
///
/// Every mutation loads the full collection, applies the change, and
/// persists the whole list before returning, so readers never observe a
/// partial write. Mutations referencing an absent id are no-ops by contract,
/// which keeps callers idempotent.
pub struct JournalService {
    tasks: Arc<dyn TaskRepository>,
    events: Arc<dyn EventRepository>,
}

impl JournalService {
    #[must_use]
    pub fn new(tasks: Arc<dyn TaskRepository>, events: Arc<dyn EventRepository>) -> Self {
        Self { tasks, events }
    }

    // ─── Tasks ─────────────────────────────────────────────────────────────

    /// Create a task with a generated id and persist it.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::Task` for an empty title, or
    /// `JournalError::Storage` if persistence fails (the journal keeps its
    /// prior contents).
    pub async fn add_task(
        &self,
        user: &UserId,
        title: &str,
        due_date: DateTime<Utc>,
    ) -> Result<Task, JournalError> {
        let task = Task::new(TaskId::generate(), title, due_date)?;
        let mut list = self.tasks.list_tasks(user).await?;
        list.push(task.clone());
        self.tasks.put_tasks(user, &list).await?;
        Ok(task)
    }

    /// Flip the completion flag of a task. Missing id: no-op.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::Storage` if persistence fails.
    pub async fn toggle_task(&self, user: &UserId, id: TaskId) -> Result<(), JournalError> {
        let mut list = self.tasks.list_tasks(user).await?;
        let Some(task) = list.iter_mut().find(|t| t.id() == id) else {
            return Ok(());
        };
        task.toggle();
        self.tasks.put_tasks(user, &list).await?;
        Ok(())
    }

    /// Remove a task. Missing id: no-op (nothing is written).
    ///
    /// # Errors
    ///
    /// Returns `JournalError::Storage` if persistence fails.
    pub async fn delete_task(&self, user: &UserId, id: TaskId) -> Result<(), JournalError> {
        let mut list = self.tasks.list_tasks(user).await?;
        let before = list.len();
        list.retain(|t| t.id() != id);
        if list.len() == before {
            return Ok(());
        }
        self.tasks.put_tasks(user, &list).await?;
        Ok(())
    }

    /// All tasks for the user, in journal order.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::Storage` if the read fails.
    pub async fn tasks(&self, user: &UserId) -> Result<Vec<Task>, JournalError> {
        Ok(self.tasks.list_tasks(user).await?)
    }

    /// Tasks due on the given calendar day. Time of day is ignored.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::Storage` if the read fails.
    pub async fn tasks_due_on(
        &self,
        user: &UserId,
        date: NaiveDate,
    ) -> Result<Vec<Task>, JournalError> {
        let mut list = self.tasks.list_tasks(user).await?;
        list.retain(|t| t.is_due_on(date));
        Ok(list)
    }

    // ─── Events ────────────────────────────────────────────────────────────

    /// Create a calendar event with a generated id and persist it.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::Event` for an empty title, or
    /// `JournalError::Storage` if persistence fails.
    pub async fn add_event(
        &self,
        user: &UserId,
        title: &str,
        date: NaiveDate,
        time: Option<NaiveTime>,
    ) -> Result<CalendarEvent, JournalError> {
        let event = CalendarEvent::new(EventId::generate(), title, date, time)?;
        let mut list = self.events.list_events(user).await?;
        list.push(event.clone());
        self.events.put_events(user, &list).await?;
        Ok(event)
    }

    /// Remove an event. Missing id: no-op (nothing is written).
    ///
    /// # Errors
    ///
    /// Returns `JournalError::Storage` if persistence fails.
    pub async fn delete_event(&self, user: &UserId, id: EventId) -> Result<(), JournalError> {
        let mut list = self.events.list_events(user).await?;
        let before = list.len();
        list.retain(|e| e.id() != id);
        if list.len() == before {
            return Ok(());
        }
        self.events.put_events(user, &list).await?;
        Ok(())
    }

    /// All events for the user, sorted by date ascending for the upcoming
    /// list. Events on the same day keep their journal order.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::Storage` if the read fails.
    pub async fn events(&self, user: &UserId) -> Result<Vec<CalendarEvent>, JournalError> {
        let mut list = self.events.list_events(user).await?;
        list.sort_by_key(CalendarEvent::date);
        Ok(list)
    }

    /// Events on the given calendar day.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::Storage` if the read fails.
    pub async fn events_on(
        &self,
        user: &UserId,
        date: NaiveDate,
    ) -> Result<Vec<CalendarEvent>, JournalError> {
        let mut list = self.events.list_events(user).await?;
        list.retain(|e| e.occurs_on(date));
        Ok(list)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
