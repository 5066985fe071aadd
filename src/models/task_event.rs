use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A task with a concrete `[start, end]` timestamp, ready to be written to
/// the calendar. The final artefact of the pipeline; discarded after the
/// Calendar Writer step (spec.md §3 "Lifecycle").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEvent {
    pub task_id: String,
    pub task_name: String,
    pub estimated_minutes: i64,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl TaskEvent {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}
