use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::error::SchedulerResult;
use crate::models::{Assignment, DaySlot, TaskEvent};
use crate::services::time_utils;

/// Picks the contiguous block `[start, start + total_minutes)` a slot's
/// assigned tasks are packed into, per spec.md §4.4.
///
/// When the block fits within the soft sub-interval (`T <= L`), the two
/// boundary candidates (`concrete_start` and `concrete_end - T`) are
/// compared and whichever's midpoint lands closer to local noon wins. When
/// it doesn't (`T > L`), the length-`T` segment within `[hard_start,
/// hard_end]` that maximises overlap with `[concrete_start, concrete_end]`
/// is chosen, per the three-way overlap rule in spec.md §4.4 step 3.
fn block_start(slot: &DaySlot, total_minutes: i64) -> SchedulerResult<DateTime<FixedOffset>> {
    let soft_len = slot.soft_length_minutes();
    let noon = time_utils::on_day(
        slot.concrete_start,
        0,
        chrono::NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
    );

    if total_minutes <= soft_len {
        let early = slot.concrete_start;
        let late = time_utils::add_minutes(slot.concrete_end, -total_minutes)?;
        let early_mid = time_utils::add_minutes(early, total_minutes / 2)?;
        let late_mid = time_utils::add_minutes(late, total_minutes / 2)?;
        let early_distance = (early_mid - noon).num_minutes().abs();
        let late_distance = (late_mid - noon).num_minutes().abs();
        return Ok(if early_distance <= late_distance { early } else { late });
    }

    let hard_start = slot.hard_start;
    let hard_end = slot.hard_end;
    let latest_start = time_utils::add_minutes(hard_end, -total_minutes)?;

    let overlap_start = slot.concrete_start.max(hard_start);
    let overlap_end = slot.concrete_end.min(hard_end);
    let overlap = (overlap_end - overlap_start).num_minutes();

    let start = if overlap <= 0 {
        let hard_len = (hard_end - hard_start).num_minutes();
        let mid = time_utils::add_minutes(hard_start, hard_len / 2)?;
        time_utils::add_minutes(mid, -(total_minutes / 2))?
    } else if overlap >= total_minutes {
        let inner_len = (overlap_end - overlap_start).num_minutes();
        let mid = time_utils::add_minutes(overlap_start, inner_len / 2)?;
        time_utils::add_minutes(mid, -(total_minutes / 2))?
    } else {
        time_utils::add_minutes(slot.concrete_end, -overlap)?
    };

    Ok(start.max(hard_start).min(latest_start))
}

/// Assigns concrete `[start, end)` timestamps to every task in one
/// [`Assignment`], in the solver's declared (input) order, producing
/// contiguous, non-overlapping [`TaskEvent`]s (spec.md §4.4).
pub fn place_assignment(assignment: &Assignment) -> SchedulerResult<Vec<TaskEvent>> {
    if assignment.tasks.is_empty() {
        return Ok(Vec::new());
    }

    let total_minutes = assignment.total_minutes();
    let mut cursor = block_start(&assignment.slot, total_minutes)?;

    let mut events = Vec::with_capacity(assignment.tasks.len());
    for task in &assignment.tasks {
        let end = time_utils::add_minutes(cursor, task.duration_minutes)?;
        events.push(TaskEvent {
            task_id: task.id.clone(),
            task_name: task.name.clone(),
            estimated_minutes: task.duration_minutes,
            start: cursor,
            end,
        });
        cursor = end;
    }

    debug!(
        target: "scheduler::placement",
        day_index = assignment.slot.day_index,
        task_count = assignment.tasks.len(),
        "placed tasks in slot"
    );

    Ok(events)
}

/// Runs [`place_assignment`] over every assignment, preserving the order of
/// `assignments` so downstream writes stay deterministic.
pub fn place_all(assignments: &[Assignment]) -> SchedulerResult<Vec<TaskEvent>> {
    let mut events = Vec::new();
    for assignment in assignments {
        events.extend(place_assignment(assignment)?);
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, TaskStatus};
    use chrono::{NaiveDate, TimeZone};

    fn dt(h: u32, m: u32) -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(0).unwrap();
        offset
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2026, 1, 5)
                    .unwrap()
                    .and_hms_opt(h, m, 0)
                    .unwrap(),
            )
            .single()
            .unwrap()
    }

    fn task(id: &str, minutes: i64) -> crate::models::Task {
        crate::models::Task {
            id: id.into(),
            name: id.into(),
            priority: Priority::new(3).unwrap(),
            duration_minutes: minutes,
            due_at: None,
            status: TaskStatus::Todo,
        }
    }

    #[test]
    fn fits_within_soft_interval_picks_candidate_nearer_noon() {
        // spec.md §8 scenario a: candidates are 09:00 (midpoint 09:30) and
        // 16:00 (midpoint 16:30); 09:30 is closer to noon.
        let slot = DaySlot {
            day_index: 0,
            window_id: "w".into(),
            concrete_start: dt(9, 0),
            concrete_end: dt(17, 0),
            hard_start: dt(0, 0),
            hard_end: dt(23, 59),
        };
        let assignment = Assignment {
            slot,
            tasks: vec![task("t1", 60)],
        };
        let events = place_assignment(&assignment).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start, dt(9, 0));
        assert_eq!(events[0].end, dt(10, 0));
    }

    #[test]
    fn fits_within_soft_interval_prefers_late_candidate_when_nearer_noon() {
        let slot = DaySlot {
            day_index: 0,
            window_id: "w".into(),
            concrete_start: dt(6, 0),
            concrete_end: dt(13, 0),
            hard_start: dt(0, 0),
            hard_end: dt(23, 59),
        };
        let assignment = Assignment {
            slot,
            tasks: vec![task("t1", 60)],
        };
        let events = place_assignment(&assignment).unwrap();
        assert_eq!(events[0].start, dt(12, 0));
    }

    #[test]
    fn overflow_uses_margin_and_stays_within_hard_bounds() {
        // spec.md §8 scenario e: overlap (09:00-10:00) is 60 min, less than
        // the 90-min task, so start = slot.end - overlap = 09:00.
        let slot = DaySlot {
            day_index: 0,
            window_id: "w".into(),
            concrete_start: dt(9, 0),
            concrete_end: dt(10, 0),
            hard_start: dt(7, 0),
            hard_end: dt(11, 0),
        };
        let assignment = Assignment {
            slot,
            tasks: vec![task("t1", 90)],
        };
        let events = place_assignment(&assignment).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start, dt(9, 0));
        assert_eq!(events[0].end, dt(10, 30));
        assert_eq!(events[0].duration_minutes(), 90);
    }

    #[test]
    fn multiple_tasks_are_contiguous_and_ordered() {
        let slot = DaySlot {
            day_index: 0,
            window_id: "w".into(),
            concrete_start: dt(9, 0),
            concrete_end: dt(17, 0),
            hard_start: dt(0, 0),
            hard_end: dt(23, 59),
        };
        let assignment = Assignment {
            slot,
            tasks: vec![task("first", 30), task("second", 45)],
        };
        let events = place_assignment(&assignment).unwrap();
        assert_eq!(events[0].task_id, "first");
        assert_eq!(events[1].task_id, "second");
        assert_eq!(events[0].end, events[1].start);
    }

    #[test]
    fn empty_assignment_yields_no_events() {
        let slot = DaySlot {
            day_index: 0,
            window_id: "w".into(),
            concrete_start: dt(9, 0),
            concrete_end: dt(17, 0),
            hard_start: dt(0, 0),
            hard_end: dt(23, 59),
        };
        let assignment = Assignment { slot, tasks: vec![] };
        assert!(place_assignment(&assignment).unwrap().is_empty());
    }
}
