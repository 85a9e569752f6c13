use async_trait::async_trait;
use chrono::{DateTime, Utc};
use course_core::model::{CalendarEvent, CourseId, Task, UserId, VideoId};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted completion facts for one `(user, course)` pair.
///
/// The set grows monotonically under normal operation; nothing in this
/// subsystem removes entries. `put_completions` replaces the full set
/// atomically so a concurrent reader never observes a partial write.
#[async_trait]
pub trait CompletionRepository: Send + Sync {
    /// Fetch the completion set. A pair with no record yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails.
    async fn get_completions(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> Result<BTreeSet<VideoId>, StorageError>;

    /// Replace the stored set with `completions`, atomically.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails; the prior set is retained.
    async fn put_completions(
        &self,
        user: &UserId,
        course: &CourseId,
        completions: &BTreeSet<VideoId>,
    ) -> Result<(), StorageError>;
}

/// Durable "first earned at" timestamps, written once per `(user, course)`
/// the first time progress reaches 100 %.
#[async_trait]
pub trait MilestoneRepository: Send + Sync {
    /// When the course was first completed, if ever.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails.
    async fn first_earned_at(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> Result<Option<DateTime<Utc>>, StorageError>;

    /// Record the first-earned timestamp. First write wins; a later call for
    /// the same pair is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn record_first_earned(
        &self,
        user: &UserId,
        course: &CourseId,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError>;
}

/// User-scoped task journal. Mutations persist the full list.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// All tasks for the user, in stored order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails.
    async fn list_tasks(&self, user: &UserId) -> Result<Vec<Task>, StorageError>;

    /// Replace the stored list with `tasks`, atomically.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails; the prior list is retained.
    async fn put_tasks(&self, user: &UserId, tasks: &[Task]) -> Result<(), StorageError>;
}

/// User-scoped calendar event journal. Same contract shape as tasks.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// All events for the user, in stored order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails.
    async fn list_events(&self, user: &UserId) -> Result<Vec<CalendarEvent>, StorageError>;

    /// Replace the stored list with `events`, atomically.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails; the prior list is retained.
    async fn put_events(&self, user: &UserId, events: &[CalendarEvent])
    -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    completions: Arc<Mutex<HashMap<(UserId, CourseId), BTreeSet<VideoId>>>>,
    milestones: Arc<Mutex<HashMap<(UserId, CourseId), DateTime<Utc>>>>,
    tasks: Arc<Mutex<HashMap<UserId, Vec<Task>>>>,
    events: Arc<Mutex<HashMap<UserId, Vec<CalendarEvent>>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl CompletionRepository for InMemoryRepository {
    async fn get_completions(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> Result<BTreeSet<VideoId>, StorageError> {
        let guard = self.completions.lock().map_err(poisoned)?;
        Ok(guard
            .get(&(user.clone(), course.clone()))
            .cloned()
            .unwrap_or_default())
    }

    async fn put_completions(
        &self,
        user: &UserId,
        course: &CourseId,
        completions: &BTreeSet<VideoId>,
    ) -> Result<(), StorageError> {
        let mut guard = self.completions.lock().map_err(poisoned)?;
        guard.insert((user.clone(), course.clone()), completions.clone());
        Ok(())
    }
}

#[async_trait]
impl MilestoneRepository for InMemoryRepository {
    async fn first_earned_at(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> Result<Option<DateTime<Utc>>, StorageError> {
        let guard = self.milestones.lock().map_err(poisoned)?;
        Ok(guard.get(&(user.clone(), course.clone())).copied())
    }

    async fn record_first_earned(
        &self,
        user: &UserId,
        course: &CourseId,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self.milestones.lock().map_err(poisoned)?;
        guard.entry((user.clone(), course.clone())).or_insert(at);
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for InMemoryRepository {
    async fn list_tasks(&self, user: &UserId) -> Result<Vec<Task>, StorageError> {
        let guard = self.tasks.lock().map_err(poisoned)?;
        Ok(guard.get(user).cloned().unwrap_or_default())
    }

    async fn put_tasks(&self, user: &UserId, tasks: &[Task]) -> Result<(), StorageError> {
        let mut guard = self.tasks.lock().map_err(poisoned)?;
        guard.insert(user.clone(), tasks.to_vec());
        Ok(())
    }
}

#[async_trait]
impl EventRepository for InMemoryRepository {
    async fn list_events(&self, user: &UserId) -> Result<Vec<CalendarEvent>, StorageError> {
        let guard = self.events.lock().map_err(poisoned)?;
        Ok(guard.get(user).cloned().unwrap_or_default())
    }

    async fn put_events(
        &self,
        user: &UserId,
        events: &[CalendarEvent],
    ) -> Result<(), StorageError> {
        let mut guard = self.events.lock().map_err(poisoned)?;
        guard.insert(user.clone(), events.to_vec());
        Ok(())
    }
}

/// Aggregates the four stores behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub completions: Arc<dyn CompletionRepository>,
    pub milestones: Arc<dyn MilestoneRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub events: Arc<dyn EventRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let completions: Arc<dyn CompletionRepository> = Arc::new(repo.clone());
        let milestones: Arc<dyn MilestoneRepository> = Arc::new(repo.clone());
        let tasks: Arc<dyn TaskRepository> = Arc::new(repo.clone());
        let events: Arc<dyn EventRepository> = Arc::new(repo);
        Self {
            completions,
            milestones,
            tasks,
            events,
        }
    }
}
