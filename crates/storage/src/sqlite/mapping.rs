use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use course_core::model::{CalendarEvent, EventId, Task, TaskId};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn position_i64(position: usize) -> Result<i64, StorageError> {
    i64::try_from(position)
        .map_err(|_| StorageError::Serialization(format!("position overflow: {position}")))
}

pub(crate) fn task_id_from_str(raw: &str) -> Result<TaskId, StorageError> {
    raw.parse::<TaskId>().map_err(ser)
}

pub(crate) fn event_id_from_str(raw: &str) -> Result<EventId, StorageError> {
    raw.parse::<EventId>().map_err(ser)
}

pub(crate) fn map_task_row(row: &sqlx::sqlite::SqliteRow) -> Result<Task, StorageError> {
    let id = task_id_from_str(row.try_get::<&str, _>("id").map_err(ser)?)?;
    let title: String = row.try_get("title").map_err(ser)?;
    let due_date: DateTime<Utc> = row.try_get("due_date").map_err(ser)?;
    let completed: bool = row.try_get("completed").map_err(ser)?;

    Task::from_persisted(id, title, due_date, completed).map_err(ser)
}

pub(crate) fn map_event_row(row: &sqlx::sqlite::SqliteRow) -> Result<CalendarEvent, StorageError> {
    let id = event_id_from_str(row.try_get::<&str, _>("id").map_err(ser)?)?;
    let title: String = row.try_get("title").map_err(ser)?;
    let date: NaiveDate = row.try_get("date").map_err(ser)?;
    let time: Option<NaiveTime> = row.try_get("time").map_err(ser)?;

    CalendarEvent::new(id, title, date, time).map_err(ser)
}
