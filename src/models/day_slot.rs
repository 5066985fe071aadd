use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A concrete, date-bound, event-subtracted instance of a [`crate::models::
/// WindowTemplate`], produced by the Free-Interval Generator.
///
/// Invariant (spec.md §3): `hard_start <= concrete_start < concrete_end <=
/// hard_end`, and no untagged (user) [`crate::models::FixedEvent`] overlaps
/// `[concrete_start, concrete_end]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySlot {
    pub day_index: u32,
    pub window_id: String,
    pub concrete_start: DateTime<FixedOffset>,
    pub concrete_end: DateTime<FixedOffset>,
    pub hard_start: DateTime<FixedOffset>,
    pub hard_end: DateTime<FixedOffset>,
}

impl DaySlot {
    pub fn soft_length_minutes(&self) -> i64 {
        (self.concrete_end - self.concrete_start).num_minutes()
    }

    pub fn hard_length_minutes(&self) -> i64 {
        (self.hard_end - self.hard_start).num_minutes()
    }

    pub fn margin_low_minutes(&self) -> i64 {
        (self.concrete_start - self.hard_start).num_minutes()
    }

    pub fn margin_high_minutes(&self) -> i64 {
        (self.hard_end - self.concrete_end).num_minutes()
    }
}
