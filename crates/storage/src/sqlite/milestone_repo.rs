use chrono::{DateTime, Utc};
use course_core::model::{CourseId, UserId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser};
use crate::repository::{MilestoneRepository, StorageError};

#[async_trait::async_trait]
impl MilestoneRepository for SqliteRepository {
    async fn first_earned_at(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> Result<Option<DateTime<Utc>>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT first_earned_at
                FROM course_milestones
                WHERE user_id = ?1 AND course_id = ?2
            ",
        )
        .bind(user.as_str())
        .bind(course.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.map(|r| r.try_get("first_earned_at").map_err(ser))
            .transpose()
    }

    async fn record_first_earned(
        &self,
        user: &UserId,
        course: &CourseId,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        // First write wins: the conflict clause keeps the original timestamp.
        sqlx::query(
            r"
                INSERT INTO course_milestones (user_id, course_id, first_earned_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(user_id, course_id) DO NOTHING
            ",
        )
        .bind(user.as_str())
        .bind(course.as_str())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
