use std::sync::Arc;

use course_core::Clock;
use course_core::model::CourseCatalog;
use storage::repository::Storage;

use crate::error::AppServicesError;
use crate::journal_service::JournalService;
use crate::progress_service::ProgressService;
use crate::stats_service::StatsService;
use crate::sync::ProgressChannel;

/// Assembles the app-facing services over one storage backend and one
/// synchronization channel, so every surface observes the same state.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<CourseCatalog>,
    channel: Arc<ProgressChannel>,
    progress: Arc<ProgressService>,
    journal: Arc<JournalService>,
    stats: Arc<StatsService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        catalog: Arc<CourseCatalog>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(storage, clock, catalog))
    }

    /// Build services over in-memory storage, for tests and prototyping.
    #[must_use]
    pub fn in_memory(clock: Clock, catalog: Arc<CourseCatalog>) -> Self {
        Self::with_storage(Storage::in_memory(), clock, catalog)
    }

    fn with_storage(storage: Storage, clock: Clock, catalog: Arc<CourseCatalog>) -> Self {
        let channel = Arc::new(ProgressChannel::new());

        let progress = Arc::new(ProgressService::new(
            Arc::clone(&catalog),
            Arc::clone(&storage.completions),
            Arc::clone(&storage.milestones),
            Arc::clone(&channel),
            clock,
        ));
        let journal = Arc::new(JournalService::new(
            Arc::clone(&storage.tasks),
            Arc::clone(&storage.events),
        ));
        let stats = Arc::new(StatsService::new(
            Arc::clone(&catalog),
            Arc::clone(&storage.completions),
            Arc::clone(&storage.milestones),
            Arc::clone(&storage.tasks),
            clock,
        ));

        Self {
            catalog,
            channel,
            progress,
            journal,
            stats,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CourseCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn channel(&self) -> Arc<ProgressChannel> {
        Arc::clone(&self.channel)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn journal(&self) -> Arc<JournalService> {
        Arc::clone(&self.journal)
    }

    #[must_use]
    pub fn stats(&self) -> Arc<StatsService> {
        Arc::clone(&self.stats)
    }
}
