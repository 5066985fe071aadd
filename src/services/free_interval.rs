use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::error::SchedulerResult;
use crate::models::{DaySlot, FixedEvent, WindowKind, WindowTemplate};
use crate::services::time_utils;

/// Subtracts a single fixed event from a free interval, per the four cases
/// in spec.md §4.2 step 3. Returns 0, 1, or 2 resulting intervals.
fn subtract_one(
    interval: (DateTime<FixedOffset>, DateTime<FixedOffset>),
    event: &FixedEvent,
) -> Vec<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    let (start, end) = interval;

    if event.start <= start && event.end >= end {
        // Event covers the interval entirely.
        return vec![];
    }
    if event.start <= start && event.end > start && event.end < end {
        // Clips the left edge.
        return vec![(event.end, end)];
    }
    if event.start > start && event.start < end && event.end >= end {
        // Clips the right edge.
        return vec![(start, event.start)];
    }
    if event.start > start && event.end < end {
        // Strictly inside: split in two.
        return vec![(start, event.start), (event.end, end)];
    }
    // No overlap.
    vec![(start, end)]
}

fn subtract_all(
    interval: (DateTime<FixedOffset>, DateTime<FixedOffset>),
    events: &[&FixedEvent],
) -> Vec<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    let mut intervals = vec![interval];
    for event in events {
        let mut next = Vec::new();
        for current in intervals {
            next.extend(subtract_one(current, event));
        }
        intervals = next;
    }
    intervals
}

fn margins(
    anchor: DateTime<FixedOffset>,
    day_index: u32,
    sub_start: DateTime<FixedOffset>,
    sub_end: DateTime<FixedOffset>,
    user_events: &[&FixedEvent],
) -> (i64, i64) {
    let day_start = time_utils::midnight(anchor, day_index);
    let day_end = time_utils::end_of_day(anchor, day_index);

    let previous_end = user_events
        .iter()
        .filter(|e| e.end <= sub_start)
        .map(|e| e.end)
        .max()
        .unwrap_or(day_start);

    let next_start = user_events
        .iter()
        .filter(|e| e.start >= sub_end)
        .map(|e| e.start)
        .min()
        .unwrap_or(day_end);

    let margin_low = (sub_start - previous_end).num_minutes().max(0);
    let margin_high = (next_start - sub_end).num_minutes().max(0);
    (margin_low, margin_high)
}

/// Produces the ordered list of [`DaySlot`]s covering days `0..horizon_days`,
/// consuming Work-kind templates, the current wall-clock time, and the
/// fixed events intersecting the horizon (spec.md §4.2).
///
/// Events tagged as application-owned are discarded before subtraction
/// (spec.md §4.2 "Filtering") — only user-owned events constrain scheduling.
pub fn generate_day_slots(
    templates: &[WindowTemplate],
    horizon_days: u32,
    fixed_events: &[FixedEvent],
    now: DateTime<FixedOffset>,
) -> SchedulerResult<Vec<DaySlot>> {
    let work_templates: Vec<&WindowTemplate> = templates
        .iter()
        .filter(|w| w.kind == WindowKind::Work)
        .collect();

    let mut user_events: Vec<&FixedEvent> = fixed_events.iter().filter(|e| e.is_user_owned()).collect();
    user_events.sort_by_key(|e| e.start);

    let mut slots = Vec::new();

    for day_index in 0..horizon_days {
        for template in &work_templates {
            let mut start = time_utils::on_day(now, day_index, template.start_of_day);
            let end = time_utils::on_day(now, day_index, template.end_of_day);

            if day_index == 0 {
                if end <= now {
                    continue;
                }
                if start <= now {
                    start = now;
                }
            }

            if end <= start {
                continue;
            }

            for (sub_start, sub_end) in subtract_all((start, end), &user_events) {
                if sub_end <= sub_start {
                    continue;
                }

                let (margin_low, margin_high) =
                    margins(now, day_index, sub_start, sub_end, &user_events);

                let hard_start = time_utils::add_minutes(sub_start, -margin_low)?;
                let hard_end = time_utils::add_minutes(sub_end, margin_high)?;

                slots.push(DaySlot {
                    day_index,
                    window_id: template.id.clone(),
                    concrete_start: sub_start,
                    concrete_end: sub_end,
                    hard_start,
                    hard_end,
                });
            }
        }
    }

    debug!(
        target: "scheduler::free_interval",
        horizon_days,
        slot_count = slots.len(),
        "generated day slots"
    );

    Ok(slots)
}
