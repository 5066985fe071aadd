use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{SchedulerError, SchedulerResult};

/// Priority class of a task, 0 (most urgent) through 6 (least urgent).
///
/// Priority 0 carries the special meaning from spec.md §3: "must be
/// scheduled on day 0", realized through the value table's 100000x weight
/// (see [`crate::services::value_table`]) rather than a hard constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const MUST_RUN_TODAY: Priority = Priority(0);
    pub const MAX: u8 = 6;

    pub fn new(value: u8) -> SchedulerResult<Self> {
        if value > Self::MAX {
            return Err(SchedulerError::bad_input(format!(
                "priority must be in 0..={}, got {value}",
                Self::MAX
            )));
        }
        Ok(Priority(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_must_run_today(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u8> for Priority {
    type Error = SchedulerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Priority::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

/// Lifecycle state of a task as read from the task store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    Cancelled,
}

impl TaskStatus {
    /// Statuses the pipeline is willing to place on the calendar. Mirrors
    /// the original `Organizer` project's `all_tasks = [t for t in all_tasks
    /// if t.status == "ToDo"]` filter in `main.py`.
    pub fn is_schedulable(self) -> bool {
        matches!(self, TaskStatus::Todo)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub priority: Priority,
    /// Duration in minutes. Must be strictly positive (spec.md §3 invariant).
    pub duration_minutes: i64,
    pub due_at: Option<DateTime<FixedOffset>>,
    pub status: TaskStatus,
}

impl Task {
    pub fn validate(&self) -> SchedulerResult<()> {
        if self.duration_minutes <= 0 {
            return Err(SchedulerError::bad_input(format!(
                "task {} has non-positive duration {} minutes",
                self.id, self.duration_minutes
            )));
        }
        Ok(())
    }
}
