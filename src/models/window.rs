use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{SchedulerError, SchedulerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    Work,
    Free,
}

/// A recurring daily clock-time interval, with no associated date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowTemplate {
    pub id: String,
    pub kind: WindowKind,
    pub start_of_day: NaiveTime,
    pub end_of_day: NaiveTime,
}

impl WindowTemplate {
    pub fn validate(&self) -> SchedulerResult<()> {
        if self.end_of_day <= self.start_of_day {
            return Err(SchedulerError::bad_input(format!(
                "window template {} has end {} <= start {}",
                self.id, self.end_of_day, self.start_of_day
            )));
        }
        Ok(())
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_of_day - self.start_of_day).num_minutes()
    }
}
