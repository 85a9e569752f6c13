use std::sync::Arc;

use course_core::Clock;
use course_core::model::{
    Certificate, CourseCatalog, CourseProgress, UserProfile, UserStats,
};
use serde::Serialize;
use storage::repository::{CompletionRepository, MilestoneRepository, TaskRepository};

use crate::error::StatsError;

/// Everything a dashboard surface needs, rebuilt in one pass.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub progress: Vec<CourseProgress>,
    pub certificates: Vec<Certificate>,
    pub stats: UserStats,
}

/// Aggregation over all courses, derived certificates, and the task journal.
///
/// Owns no persisted state and memoizes nothing: every snapshot is a full
/// recomputation over the stores, so it can never desynchronize from them.
/// Surfaces call it once on mount and once per channel notification.
pub struct StatsService {
    catalog: Arc<CourseCatalog>,
    completions: Arc<dyn CompletionRepository>,
    milestones: Arc<dyn MilestoneRepository>,
    tasks: Arc<dyn TaskRepository>,
    clock: Clock,
}

impl StatsService {
    #[must_use]
    pub fn new(
        catalog: Arc<CourseCatalog>,
        completions: Arc<dyn CompletionRepository>,
        milestones: Arc<dyn MilestoneRepository>,
        tasks: Arc<dyn TaskRepository>,
        clock: Clock,
    ) -> Self {
        Self {
            catalog,
            completions,
            milestones,
            tasks,
            clock,
        }
    }

    /// Build the full dashboard snapshot for a user.
    ///
    /// `learning_hours` is supplied by an external collaborator and passed
    /// through unchanged. Completed courses read their certificate date from
    /// the first-earned milestone; if none was ever recorded (data predating
    /// milestones), the current pass time stands in, without writing
    /// anything back.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Storage` if any store read fails.
    pub async fn snapshot(
        &self,
        profile: &UserProfile,
        learning_hours: u32,
    ) -> Result<DashboardSnapshot, StatsError> {
        let mut progress = Vec::with_capacity(self.catalog.len());
        let mut certificates = Vec::with_capacity(self.catalog.len());

        for course in self.catalog.courses() {
            let completions = self
                .completions
                .get_completions(&profile.id, course.id())
                .await?;
            let course_progress =
                CourseProgress::compute(course.id().clone(), &completions, course.total_videos());

            let earned_at = if course_progress.is_complete() {
                match self
                    .milestones
                    .first_earned_at(&profile.id, course.id())
                    .await?
                {
                    Some(at) => Some(at),
                    None => Some(self.clock.now()),
                }
            } else {
                None
            };

            certificates.push(Certificate::derive(
                course,
                course_progress.percent,
                &profile.username,
                earned_at,
            ));
            progress.push(course_progress);
        }

        let tasks = self.tasks.list_tasks(&profile.id).await?;
        let stats = UserStats::compute(&progress, &tasks, learning_hours);

        Ok(DashboardSnapshot {
            progress,
            certificates,
            stats,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
