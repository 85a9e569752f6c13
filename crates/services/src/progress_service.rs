use std::collections::BTreeSet;
use std::sync::Arc;

use course_core::Clock;
use course_core::model::{CourseCatalog, CourseId, CourseProgress, UserId, VideoId};
use storage::repository::{CompletionRepository, MilestoneRepository};
use tracing::warn;

use crate::error::ProgressError;
use crate::sync::ProgressChannel;

/// The completion store: validates completion facts against the catalog,
/// persists them, and broadcasts the change.
///
/// Completion sets only grow here; resetting progress would be a separate,
/// explicitly authorized operation that this service does not offer.
pub struct ProgressService {
    catalog: Arc<CourseCatalog>,
    completions: Arc<dyn CompletionRepository>,
    milestones: Arc<dyn MilestoneRepository>,
    channel: Arc<ProgressChannel>,
    clock: Clock,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        catalog: Arc<CourseCatalog>,
        completions: Arc<dyn CompletionRepository>,
        milestones: Arc<dyn MilestoneRepository>,
        channel: Arc<ProgressChannel>,
        clock: Clock,
    ) -> Self {
        Self {
            catalog,
            completions,
            milestones,
            channel,
            clock,
        }
    }

    /// Record that `user` finished `video` in `course`.
    ///
    /// A video or course the catalog does not know is dropped silently:
    /// nothing is persisted and no notification goes out, which keeps
    /// progress at or below 100 %. A successful call persists the full
    /// updated set, records the first-earned milestone when the course just
    /// reached completion, and then publishes on the channel.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if persistence fails; prior state is
    /// retained and no notification is published.
    pub async fn mark_complete(
        &self,
        user: &UserId,
        course_id: &CourseId,
        video: &VideoId,
    ) -> Result<(), ProgressError> {
        let Some(course) = self.catalog.course(course_id) else {
            warn!(course = %course_id, "dropping completion for unknown course");
            return Ok(());
        };
        if !course.contains_video(video) {
            warn!(course = %course_id, video = %video, "dropping completion for unknown video");
            return Ok(());
        }

        let mut completions = self.completions.get_completions(user, course_id).await?;
        completions.insert(video.clone());
        self.completions
            .put_completions(user, course_id, &completions)
            .await?;

        if completions.len() == course.total_videos() {
            // First write wins inside the repository, so re-completions
            // cannot move the earned date.
            self.milestones
                .record_first_earned(user, course_id, self.clock.now())
                .await?;
        }

        self.channel.publish(user);
        Ok(())
    }

    /// The persisted completion set for one course.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the read fails.
    pub async fn completions(
        &self,
        user: &UserId,
        course_id: &CourseId,
    ) -> Result<BTreeSet<VideoId>, ProgressError> {
        Ok(self.completions.get_completions(user, course_id).await?)
    }

    /// Progress for one catalog course, or `None` for an unknown course.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the read fails.
    pub async fn course_progress(
        &self,
        user: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<CourseProgress>, ProgressError> {
        let Some(course) = self.catalog.course(course_id) else {
            return Ok(None);
        };
        let completions = self.completions.get_completions(user, course_id).await?;
        Ok(Some(CourseProgress::compute(
            course_id.clone(),
            &completions,
            course.total_videos(),
        )))
    }

    /// Progress for every catalog course, in catalog order. Always rebuilt
    /// from the full completion sets.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if any read fails.
    pub async fn all_progress(&self, user: &UserId) -> Result<Vec<CourseProgress>, ProgressError> {
        let mut out = Vec::with_capacity(self.catalog.len());
        for course in self.catalog.courses() {
            let completions = self.completions.get_completions(user, course.id()).await?;
            out.push(CourseProgress::compute(
                course.id().clone(),
                &completions,
                course.total_videos(),
            ));
        }
        Ok(out)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::time::fixed_clock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use storage::repository::InMemoryRepository;

    fn service() -> (ProgressService, Arc<ProgressChannel>) {
        let repo = InMemoryRepository::new();
        let channel = Arc::new(ProgressChannel::new());
        let service = ProgressService::new(
            Arc::new(CourseCatalog::sample()),
            Arc::new(repo.clone()),
            Arc::new(repo),
            Arc::clone(&channel),
            fixed_clock(),
        );
        (service, channel)
    }

    fn user() -> UserId {
        UserId::new("u1")
    }

    fn rust_course() -> CourseId {
        CourseId::new("rust-foundations")
    }

    #[tokio::test]
    async fn mark_complete_persists_and_publishes() {
        let (service, channel) = service();
        let hits = Arc::new(AtomicUsize::new(0));
        let _sub = {
            let hits = Arc::clone(&hits);
            channel.subscribe(user(), move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };

        service
            .mark_complete(&user(), &rust_course(), &VideoId::new("rf-1-1"))
            .await
            .unwrap();

        let set = service.completions(&user(), &rust_course()).await.unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_video_is_dropped_without_notification() {
        let (service, channel) = service();
        let hits = Arc::new(AtomicUsize::new(0));
        let _sub = {
            let hits = Arc::clone(&hits);
            channel.subscribe(user(), move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };

        service
            .mark_complete(&user(), &rust_course(), &VideoId::new("not-in-catalog"))
            .await
            .unwrap();

        assert!(
            service
                .completions(&user(), &rust_course())
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_course_is_dropped_without_notification() {
        let (service, channel) = service();
        let hits = Arc::new(AtomicUsize::new(0));
        let _sub = {
            let hits = Arc::clone(&hits);
            channel.subscribe(user(), move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };

        service
            .mark_complete(&user(), &CourseId::new("ghost"), &VideoId::new("v"))
            .await
            .unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn duplicate_completions_collapse() {
        let (service, _channel) = service();
        let video = VideoId::new("rf-1-1");

        service
            .mark_complete(&user(), &rust_course(), &video)
            .await
            .unwrap();
        service
            .mark_complete(&user(), &rust_course(), &video)
            .await
            .unwrap();

        let progress = service
            .course_progress(&user(), &rust_course())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.percent, 25);
    }

    #[tokio::test]
    async fn progress_reaches_one_hundred_and_records_milestone() {
        let (service, _channel) = service();

        for video in ["rf-1-1", "rf-1-2", "rf-2-1", "rf-2-2"] {
            service
                .mark_complete(&user(), &rust_course(), &VideoId::new(video))
                .await
                .unwrap();
        }

        let progress = service
            .course_progress(&user(), &rust_course())
            .await
            .unwrap()
            .unwrap();
        assert!(progress.is_complete());
    }

    #[tokio::test]
    async fn unknown_course_progress_is_none() {
        let (service, _channel) = service();
        let progress = service
            .course_progress(&user(), &CourseId::new("ghost"))
            .await
            .unwrap();
        assert!(progress.is_none());
    }

    #[tokio::test]
    async fn all_progress_covers_catalog_in_order() {
        let (service, _channel) = service();
        let all = service.all_progress(&user()).await.unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(all[0].course_id, rust_course());
        assert!(all.iter().all(|p| p.percent == 0));
    }
}
