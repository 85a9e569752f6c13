use course_core::model::{CalendarEvent, UserId};

use super::SqliteRepository;
use super::mapping::{conn, map_event_row, position_i64};
use crate::repository::{EventRepository, StorageError};

#[async_trait::async_trait]
impl EventRepository for SqliteRepository {
    async fn list_events(&self, user: &UserId) -> Result<Vec<CalendarEvent>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, title, date, time
                FROM events
                WHERE user_id = ?1
                ORDER BY position ASC
            ",
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_event_row(&row)?);
        }
        Ok(out)
    }

    async fn put_events(
        &self,
        user: &UserId,
        events: &[CalendarEvent],
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query("DELETE FROM events WHERE user_id = ?1")
            .bind(user.as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for (position, event) in events.iter().enumerate() {
            sqlx::query(
                r"
                    INSERT INTO events (id, user_id, position, title, date, time)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
            )
            .bind(event.id().to_string())
            .bind(user.as_str())
            .bind(position_i64(position)?)
            .bind(event.title())
            .bind(event.date())
            .bind(event.time())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)
    }
}
