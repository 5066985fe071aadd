use tracing::debug;

use crate::error::{SchedulerError, SchedulerResult};
use crate::models::{Task, WindowTemplate};

/// Computes the minimum number of days `D` such that
/// `D * sum(template.duration) >= sum(task.duration)` (spec.md §4.1).
///
/// This `D` is only the initial horizon fed to the Free-Interval Generator;
/// the Assignment Solver may enlarge it further if no feasible assignment
/// exists (spec.md §4.3 "Search strategy").
pub fn estimate_horizon_days(tasks: &[Task], templates: &[WindowTemplate]) -> SchedulerResult<u32> {
    let task_minutes: i64 = tasks.iter().map(|t| t.duration_minutes).sum();

    if task_minutes == 0 {
        return Ok(1);
    }

    let daily_capacity: i64 = templates.iter().map(|w| w.duration_minutes()).sum();

    if daily_capacity <= 0 {
        return Err(SchedulerError::no_capacity(task_minutes));
    }

    let mut day: u32 = 1;
    let mut capacity = daily_capacity;
    while capacity < task_minutes {
        day += 1;
        capacity += daily_capacity;
    }

    debug!(
        target: "scheduler::feasibility",
        task_minutes,
        daily_capacity,
        horizon_days = day,
        "estimated scheduling horizon"
    );

    Ok(day)
}
