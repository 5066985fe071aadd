use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::calendar::{CalendarService, CalendarWriter};
use crate::config::SchedulerConfig;
use crate::error::{SchedulerError, SchedulerResult};
use crate::models::{DaySlot, Task, TaskEvent, WindowKind};
use crate::services::{assignment_solver, feasibility, free_interval, placement, time_utils};
use crate::stores::{TaskStore, WindowStore};

/// Checks invariant 6 (spec.md §8: "a feasible task of priority 0 is placed
/// on day 0 whenever day-0 capacity permits") at input time, rather than
/// letting it silently fail to hold once the solver runs (SPEC_FULL.md
/// §10.4 "Priority-0 'must run today' validation").
fn validate_day_zero_capacity(tasks: &[Task], slots: &[DaySlot]) -> SchedulerResult<()> {
    let urgent_minutes: i64 = tasks
        .iter()
        .filter(|t| t.priority.is_must_run_today())
        .map(|t| t.duration_minutes)
        .sum();

    if urgent_minutes == 0 {
        return Ok(());
    }

    let day_zero_capacity: i64 = slots
        .iter()
        .filter(|s| s.day_index == 0)
        .map(|s| s.hard_length_minutes())
        .sum();

    if urgent_minutes > day_zero_capacity {
        return Err(SchedulerError::bad_input(format!(
            "priority-0 tasks need {urgent_minutes} minutes today, but only {day_zero_capacity} minutes of day-0 capacity exist"
        )));
    }
    Ok(())
}

/// Runs the whole scheduling pipeline once: Feasibility Estimator,
/// Free-Interval Generator, Assignment Solver, Placement Organiser, and
/// (unless `dry_run`) the Calendar Writer (spec.md §5 "Pipeline").
pub struct Pipeline {
    calendar: Arc<dyn CalendarService>,
    config: SchedulerConfig,
}

impl Pipeline {
    pub fn new(calendar: Arc<dyn CalendarService>, config: SchedulerConfig) -> Self {
        Self { calendar, config }
    }

    pub async fn run(
        &self,
        conn: &Connection,
        now: DateTime<FixedOffset>,
        dry_run: bool,
        erase_owned: bool,
    ) -> SchedulerResult<Vec<TaskEvent>> {
        let tasks = TaskStore::load_schedulable(conn, &self.config.schedulable_statuses)?;
        let templates = WindowStore::load_all(conn)?;
        let work_templates: Vec<_> = templates.iter().filter(|w| w.kind == WindowKind::Work).cloned().collect();

        let mut horizon_days = feasibility::estimate_horizon_days(&tasks, &work_templates)?;

        let writer = CalendarWriter::new(self.calendar.clone(), self.config.primary_calendar_tag().to_string());

        if erase_owned && !dry_run {
            let window_end = time_utils::on_day(
                now,
                horizon_days.max(self.config.max_horizon_retries + 1),
                chrono::NaiveTime::from_hms_opt(23, 59, 0).unwrap(),
            );
            writer.erase_owned(now, window_end).await?;
        }

        let mut attempt = 0;
        let assignments = loop {
            let window_end = time_utils::on_day(
                now,
                horizon_days,
                chrono::NaiveTime::from_hms_opt(23, 59, 0).unwrap(),
            );
            let fixed_events = self.calendar.list_events(now, window_end).await?;
            let slots = free_interval::generate_day_slots(&templates, horizon_days, &fixed_events, now)?;

            if attempt == 0 {
                validate_day_zero_capacity(&tasks, &slots)?;
            }

            match assignment_solver::solve(&slots, &tasks, self.config.soft_margins_enabled) {
                Ok(assignments) => break assignments,
                Err(SchedulerError::Infeasible { .. }) if attempt < self.config.max_horizon_retries => {
                    attempt += 1;
                    horizon_days += 1;
                    warn!(
                        target: "scheduler::solver",
                        attempt,
                        horizon_days,
                        "no feasible assignment, enlarging horizon"
                    );
                }
                Err(err) => return Err(err),
            }
        };

        let events = placement::place_all(&assignments)?;

        if dry_run {
            info!(target: "scheduler::pipeline", event_count = events.len(), "dry run, not writing to calendar");
            return Ok(events);
        }

        writer.write(&events).await?;
        Ok(events)
    }
}
