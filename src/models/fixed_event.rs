use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{SchedulerError, SchedulerResult};

/// Whether a calendar event was created by this application or by the user.
///
/// The Free-Interval Generator only subtracts `User` events from the
/// daily template (spec.md §4.2); `Owned` events are the application's own
/// prior writes and are discarded before subtraction so the pipeline never
/// treats its own placements as obstacles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOwnership {
    User,
    Owned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedEvent {
    pub id: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub ownership: EventOwnership,
}

impl FixedEvent {
    pub fn validate(&self) -> SchedulerResult<()> {
        if self.end <= self.start {
            return Err(SchedulerError::bad_input(format!(
                "fixed event {} has end <= start",
                self.id
            )));
        }
        Ok(())
    }

    pub fn is_user_owned(&self) -> bool {
        matches!(self.ownership, EventOwnership::User)
    }
}
