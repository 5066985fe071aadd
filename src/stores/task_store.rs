use std::convert::TryFrom;

use chrono::{DateTime, FixedOffset};
use rusqlite::{Connection, Row};

use crate::error::{SchedulerError, SchedulerResult};
use crate::models::{Priority, Task, TaskStatus};

const BASE_SELECT: &str = r#"
    SELECT id, name, priority, duration_minutes, due_at, status
    FROM tasks
"#;

#[derive(Debug, Clone)]
struct TaskRow {
    id: String,
    name: String,
    priority: i64,
    duration_minutes: i64,
    due_at: Option<String>,
    status: String,
}

impl TryFrom<&Row<'_>> for TaskRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            priority: row.get("priority")?,
            duration_minutes: row.get("duration_minutes")?,
            due_at: row.get("due_at")?,
            status: row.get("status")?,
        })
    }
}

impl TaskRow {
    fn into_task(self) -> SchedulerResult<Task> {
        let priority = Priority::new(u8::try_from(self.priority).map_err(|_| {
            SchedulerError::Database(format!("task {} has out-of-range priority", self.id))
        })?)?;

        let due_at = self
            .due_at
            .as_deref()
            .map(DateTime::<FixedOffset>::parse_from_rfc3339)
            .transpose()
            .map_err(|e| SchedulerError::Database(format!("task {} has bad due_at: {e}", self.id)))?;

        let status = match self.status.as_str() {
            "todo" => TaskStatus::Todo,
            "in_progress" => TaskStatus::InProgress,
            "done" => TaskStatus::Done,
            "cancelled" => TaskStatus::Cancelled,
            other => {
                return Err(SchedulerError::Database(format!(
                    "task {} has unknown status {other}",
                    self.id
                )))
            }
        };

        Ok(Task {
            id: self.id,
            name: self.name,
            priority,
            duration_minutes: self.duration_minutes,
            due_at,
            status,
        })
    }
}

/// Read-only access to the `tasks` table. The scheduler never writes tasks
/// back; it only observes them.
pub struct TaskStore;

impl TaskStore {
    /// Loads every task whose `status` is one of `schedulable_statuses`
    /// (SPEC_FULL.md §10.4 "Task status filtering"), defaulting to the
    /// original's `status == "ToDo"` filter via `SchedulerConfig`'s default.
    pub fn load_schedulable(conn: &Connection, schedulable_statuses: &[String]) -> SchedulerResult<Vec<Task>> {
        if schedulable_statuses.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = schedulable_statuses.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let sql = format!("{BASE_SELECT} WHERE status IN ({placeholders})");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(schedulable_statuses), |row| TaskRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut tasks = Vec::with_capacity(rows.len());
        for row in rows {
            let task = row.into_task()?;
            task.validate()?;
            tasks.push(task);
        }
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE tasks (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                priority INTEGER NOT NULL,
                duration_minutes INTEGER NOT NULL,
                due_at TEXT,
                status TEXT NOT NULL
            );
            INSERT INTO tasks VALUES ('t1', 'Write report', 2, 60, NULL, 'todo');
            INSERT INTO tasks VALUES ('t2', 'Archived', 4, 30, NULL, 'done');
            "#,
        )
        .unwrap();
        conn
    }

    #[test]
    fn load_schedulable_filters_non_todo_tasks() {
        let conn = memory_conn();
        let tasks = TaskStore::load_schedulable(&conn, &["todo".to_string()]).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "t1");
    }

    #[test]
    fn load_schedulable_honors_configurable_status_set() {
        let conn = memory_conn();
        let tasks = TaskStore::load_schedulable(&conn, &["todo".to_string(), "done".to_string()]).unwrap();
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn load_schedulable_with_no_statuses_returns_empty() {
        let conn = memory_conn();
        let tasks = TaskStore::load_schedulable(&conn, &[]).unwrap();
        assert!(tasks.is_empty());
    }
}
