use course_core::model::{CourseId, UserId, VideoId};
use sqlx::Row;
use std::collections::BTreeSet;

use super::SqliteRepository;
use super::mapping::{conn, ser};
use crate::repository::{CompletionRepository, StorageError};

#[async_trait::async_trait]
impl CompletionRepository for SqliteRepository {
    async fn get_completions(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> Result<BTreeSet<VideoId>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT video_id
                FROM video_completions
                WHERE user_id = ?1 AND course_id = ?2
            ",
        )
        .bind(user.as_str())
        .bind(course.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = BTreeSet::new();
        for row in rows {
            let video: String = row.try_get("video_id").map_err(ser)?;
            out.insert(VideoId::new(video));
        }
        Ok(out)
    }

    async fn put_completions(
        &self,
        user: &UserId,
        course: &CourseId,
        completions: &BTreeSet<VideoId>,
    ) -> Result<(), StorageError> {
        // Full-set replacement inside one transaction: readers see either the
        // prior set or the new one, never a partial write.
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
                DELETE FROM video_completions
                WHERE user_id = ?1 AND course_id = ?2
            ",
        )
        .bind(user.as_str())
        .bind(course.as_str())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        for video in completions {
            sqlx::query(
                r"
                    INSERT INTO video_completions (user_id, course_id, video_id)
                    VALUES (?1, ?2, ?3)
                ",
            )
            .bind(user.as_str())
            .bind(course.as_str())
            .bind(video.as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)
    }
}
