use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::error::SchedulerResult;
use crate::models::{FixedEvent, TaskEvent};

/// A calendar an event can be written to or read from. Implemented by
/// [`crate::calendar::google::GoogleCalendarService`] against the real
/// Google Calendar API, and by in-memory fakes in tests — the pipeline
/// only ever depends on this trait, never on the concrete client, so the
/// calendar backend stays swappable (spec.md §6 "External interfaces").
#[async_trait]
pub trait CalendarService: Send + Sync {
    /// Lists every event in `[time_min, time_max]`, tagged so the caller
    /// can tell application-owned writes from user events
    /// (spec.md §4.2 "Filtering").
    async fn list_events(
        &self,
        time_min: DateTime<FixedOffset>,
        time_max: DateTime<FixedOffset>,
    ) -> SchedulerResult<Vec<FixedEvent>>;

    /// Writes one task placement to the calendar, tagged with `tag` so a
    /// later erase pass can find it again. Returns the calendar's event id.
    async fn insert_event(&self, event: &TaskEvent, tag: &str) -> SchedulerResult<String>;

    /// Deletes a single event by the id `insert_event` returned.
    async fn delete_event(&self, event_id: &str) -> SchedulerResult<()>;
}
