use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::EventId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EventError {
    #[error("event title cannot be empty")]
    EmptyTitle,
}

/// A learner-created calendar entry. Same shape as a task minus the
/// completion flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    id: EventId,
    title: String,
    date: NaiveDate,
    time: Option<NaiveTime>,
}

impl CalendarEvent {
    /// Creates a new calendar event.
    ///
    /// # Errors
    ///
    /// Returns `EventError::EmptyTitle` if the title is empty or
    /// whitespace-only.
    pub fn new(
        id: EventId,
        title: impl Into<String>,
        date: NaiveDate,
        time: Option<NaiveTime>,
    ) -> Result<Self, EventError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(EventError::EmptyTitle);
        }

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            date,
            time,
        })
    }

    #[must_use]
    pub fn id(&self) -> EventId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    /// Whether this event falls on the given calendar day.
    #[must_use]
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.date == date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[test]
    fn new_rejects_empty_title() {
        let err = CalendarEvent::new(EventId::generate(), "", day(), None).unwrap_err();
        assert_eq!(err, EventError::EmptyTitle);
    }

    #[test]
    fn event_matches_its_day_only() {
        let event = CalendarEvent::new(
            EventId::generate(),
            "Study group",
            day(),
            NaiveTime::from_hms_opt(18, 30, 0),
        )
        .unwrap();

        assert!(event.occurs_on(day()));
        assert!(!event.occurs_on(day() + Duration::days(1)));
        assert_eq!(event.time(), NaiveTime::from_hms_opt(18, 30, 0));
    }
}
