use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use tracing::{info, warn};

use crate::calendar::client::CalendarService;
use crate::error::{SchedulerError, SchedulerResult};
use crate::models::{EventOwnership, TaskEvent};

/// Writes placed [`TaskEvent`]s to a calendar and can erase its own prior
/// writes, tagging every event it creates so a later run can tell its own
/// placements apart from user events (spec.md §4.5).
///
/// Failures are reported but do not stop the batch: a write or erase pass
/// that fails on some events still applies the ones that succeeded, and
/// the count of failures is surfaced to the caller so the calendar state
/// stays consistent with what was logged (spec.md §7).
pub struct CalendarWriter {
    service: Arc<dyn CalendarService>,
    tag: String,
}

impl CalendarWriter {
    pub fn new(service: Arc<dyn CalendarService>, tag: impl Into<String>) -> Self {
        Self {
            service,
            tag: tag.into(),
        }
    }

    /// Writes every event, returning the number written. If any writes
    /// failed, returns `SchedulerError::CalendarWriteFailed` after still
    /// attempting the remainder of the batch.
    pub async fn write(&self, events: &[TaskEvent]) -> SchedulerResult<usize> {
        let mut written = 0usize;
        let mut failures = Vec::new();

        for event in events {
            match self.service.insert_event(event, &self.tag).await {
                Ok(_) => written += 1,
                Err(err) => {
                    warn!(target: "scheduler::calendar", task_id = %event.task_id, error = %err, "failed to write event");
                    failures.push(format!("{}: {err}", event.task_id));
                }
            }
        }

        if !failures.is_empty() {
            return Err(SchedulerError::calendar_write_failed(events.len(), failures));
        }

        info!(target: "scheduler::calendar", written, "wrote task events to calendar");
        Ok(written)
    }

    /// Deletes every application-owned event in `[time_min, time_max]`,
    /// used to clear a previous run's placements before writing new ones.
    pub async fn erase_owned(
        &self,
        time_min: DateTime<FixedOffset>,
        time_max: DateTime<FixedOffset>,
    ) -> SchedulerResult<usize> {
        let events = self.service.list_events(time_min, time_max).await?;
        let owned: Vec<_> = events
            .into_iter()
            .filter(|e| matches!(e.ownership, EventOwnership::Owned))
            .collect();

        let mut deleted = 0usize;
        let mut failures = Vec::new();

        for event in &owned {
            match self.service.delete_event(&event.id).await {
                Ok(()) => deleted += 1,
                Err(err) => {
                    warn!(target: "scheduler::calendar", event_id = %event.id, error = %err, "failed to delete event");
                    failures.push(format!("{}: {err}", event.id));
                }
            }
        }

        if !failures.is_empty() {
            return Err(SchedulerError::calendar_write_failed(owned.len(), failures));
        }

        info!(target: "scheduler::calendar", deleted, "erased application-owned calendar events");
        Ok(deleted)
    }
}
