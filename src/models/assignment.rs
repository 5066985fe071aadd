use serde::{Deserialize, Serialize};

use crate::models::{DaySlot, Task};

/// The solver's choice of which tasks go into a given [`DaySlot`]. Tasks are
/// listed in their input order (spec.md §4.3 "Output"), never solver/hash
/// iteration order, so placement is deterministic downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub slot: DaySlot,
    pub tasks: Vec<Task>,
}

impl Assignment {
    pub fn total_minutes(&self) -> i64 {
        self.tasks.iter().map(|t| t.duration_minutes).sum()
    }
}
