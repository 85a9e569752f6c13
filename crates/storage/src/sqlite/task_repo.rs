use course_core::model::{Task, UserId};

use super::SqliteRepository;
use super::mapping::{conn, map_task_row, position_i64};
use crate::repository::{StorageError, TaskRepository};

#[async_trait::async_trait]
impl TaskRepository for SqliteRepository {
    async fn list_tasks(&self, user: &UserId) -> Result<Vec<Task>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, title, due_date, completed
                FROM tasks
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
            out.push(map_task_row(&row)?);
        }
        Ok(out)
    }

    async fn put_tasks(&self, user: &UserId, tasks: &[Task]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query("DELETE FROM tasks WHERE user_id = ?1")
            .bind(user.as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for (position, task) in tasks.iter().enumerate() {
            sqlx::query(
                r"
                    INSERT INTO tasks (id, user_id, position, title, due_date, completed)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
            )
            .bind(task.id().to_string())
            .bind(user.as_str())
            .bind(position_i64(position)?)
            .bind(task.title())
            .bind(task.due_date())
            .bind(task.completed())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)
    }
}
