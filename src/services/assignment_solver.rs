use good_lp::{constraint, default_solver, variable, variables, Expression, Solution, SolverModel, Variable};
use tracing::{debug, warn};

use crate::error::{SchedulerError, SchedulerResult};
use crate::models::{Assignment, DaySlot, Task};
use crate::services::value_table;

/// Big-M used to linearize the strict/penalty indicator relationship
/// (spec.md §4.3 "Soft margins"). Large enough that it can never bind
/// tighter than the true slot lengths for any realistic task load.
fn big_m(tasks: &[Task]) -> f64 {
    let total: i64 = tasks.iter().map(|t| t.duration_minutes).sum();
    (total + 1) as f64
}

/// Solves the task-to-slot assignment problem for a fixed set of day slots
/// (spec.md §4.3). Does not itself retry with a larger horizon on
/// infeasibility — that loop lives in the pipeline, which is the only
/// caller with enough context to regenerate slots for a wider horizon.
///
/// When `soft_margins_enabled` is false, every slot is held to its strict
/// (soft) length bound and no margin time is ever used.
pub fn solve(
    slots: &[DaySlot],
    tasks: &[Task],
    soft_margins_enabled: bool,
) -> SchedulerResult<Vec<Assignment>> {
    if tasks.is_empty() {
        return Ok(Vec::new());
    }
    if slots.is_empty() {
        return Err(SchedulerError::infeasible(0));
    }

    let mut vars = variables!();

    // x[s][t]: task t is placed into slot s.
    let x: Vec<Vec<Variable>> = slots
        .iter()
        .map(|_| {
            tasks
                .iter()
                .map(|_| vars.add(variable().integer().min(0).max(1)))
                .collect()
        })
        .collect();

    // strict[s]: slot s is held to its soft length bound (no margin used).
    let strict: Vec<Variable> = slots
        .iter()
        .map(|_| vars.add(variable().integer().min(0).max(1)))
        .collect();

    // penalty[s]: minutes of margin consumed by slot s when not strict.
    let max_penalty = slots
        .iter()
        .map(|s| (s.hard_length_minutes() - s.soft_length_minutes()) as f64)
        .fold(0.0_f64, f64::max);
    let penalty: Vec<Variable> = slots
        .iter()
        .map(|_| vars.add(variable().min(0).max(max_penalty)))
        .collect();

    let objective: Expression = slots
        .iter()
        .enumerate()
        .flat_map(|(s, slot)| {
            tasks
                .iter()
                .enumerate()
                .map(move |(t, task)| x[s][t] * value_table::day_value(task.priority, slot.day_index))
        })
        .sum::<Expression>()
        - penalty.iter().sum::<Expression>();

    let mut problem = vars.maximise(objective).using(default_solver);

    // Every task is placed in exactly one slot.
    for t in 0..tasks.len() {
        let sum: Expression = (0..slots.len()).map(|s| x[s][t]).sum();
        problem = problem.with(constraint!(sum == 1));
    }

    let m = big_m(tasks);
    for (s, slot) in slots.iter().enumerate() {
        let load: Expression = (0..tasks.len())
            .map(|t| x[s][t] * tasks[t].duration_minutes as f64)
            .sum();

        // Hard length bound: never violable, regardless of soft margins.
        problem = problem.with(constraint!(load.clone() <= slot.hard_length_minutes() as f64));

        if soft_margins_enabled {
            // strict[s] == 1 forces load <= L(s); strict[s] == 0 relaxes the
            // bound by at most M, in exchange for paying `penalty[s]`.
            problem = problem.with(constraint!(
                load.clone() <= slot.soft_length_minutes() as f64 + m * (1.0 - strict[s])
            ));
            problem = problem.with(constraint!(
                penalty[s] >= load - slot.soft_length_minutes() as f64 - m * strict[s]
            ));
        } else {
            problem = problem.with(constraint!(load <= slot.soft_length_minutes() as f64));
        }
    }

    let solution = match problem.solve() {
        Ok(solution) => solution,
        Err(err) => {
            debug!(target: "scheduler::solver", error = %err, "solver reported no solution");
            return Err(SchedulerError::infeasible(
                slots.iter().map(|s| s.day_index).max().unwrap_or(0) + 1,
            ));
        }
    };

    let mut assignments: Vec<Assignment> = slots
        .iter()
        .cloned()
        .map(|slot| Assignment { slot, tasks: Vec::new() })
        .collect();

    // Walk tasks in their input order so placement downstream is
    // deterministic rather than dependent on solver iteration order
    // (spec.md §4.3 "Output").
    for (t, task) in tasks.iter().enumerate() {
        let chosen = (0..slots.len()).find(|&s| solution.value(x[s][t]).round() > 0.5);
        match chosen {
            Some(s) => assignments[s].tasks.push(task.clone()),
            None => {
                warn!(target: "scheduler::solver", task_id = %task.id, "solver left task unassigned");
                return Err(SchedulerError::infeasible(
                    slots.iter().map(|s| s.day_index).max().unwrap_or(0) + 1,
                ));
            }
        }
    }

    Ok(assignments)
}
