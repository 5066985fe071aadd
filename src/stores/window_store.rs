use std::convert::TryFrom;

use chrono::NaiveTime;
use rusqlite::{Connection, Row};

use crate::error::{SchedulerError, SchedulerResult};
use crate::models::{WindowKind, WindowTemplate};

const BASE_SELECT: &str = "SELECT id, kind, start_of_day, end_of_day FROM window_templates";

#[derive(Debug, Clone)]
struct WindowRow {
    id: String,
    kind: String,
    start_of_day: String,
    end_of_day: String,
}

impl TryFrom<&Row<'_>> for WindowRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            kind: row.get("kind")?,
            start_of_day: row.get("start_of_day")?,
            end_of_day: row.get("end_of_day")?,
        })
    }
}

impl WindowRow {
    fn into_template(self) -> SchedulerResult<WindowTemplate> {
        let kind = match self.kind.as_str() {
            "work" => WindowKind::Work,
            "free" => WindowKind::Free,
            other => {
                return Err(SchedulerError::Database(format!(
                    "window template {} has unknown kind {other}",
                    self.id
                )))
            }
        };

        let parse_time = |value: &str| -> SchedulerResult<NaiveTime> {
            NaiveTime::parse_from_str(value, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
                .map_err(|e| {
                    SchedulerError::Database(format!(
                        "window template {} has unparsable time {value}: {e}",
                        self.id
                    ))
                })
        };

        Ok(WindowTemplate {
            id: self.id.clone(),
            kind,
            start_of_day: parse_time(&self.start_of_day)?,
            end_of_day: parse_time(&self.end_of_day)?,
        })
    }
}

/// Read-only access to the `window_templates` table.
pub struct WindowStore;

impl WindowStore {
    pub fn load_all(conn: &Connection) -> SchedulerResult<Vec<WindowTemplate>> {
        let mut stmt = conn.prepare(BASE_SELECT)?;
        let rows = stmt
            .query_map([], |row| WindowRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut templates = Vec::with_capacity(rows.len());
        for row in rows {
            let template = row.into_template()?;
            template.validate()?;
            templates.push(template);
        }
        Ok(templates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE window_templates (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                start_of_day TEXT NOT NULL,
                end_of_day TEXT NOT NULL
            );
            INSERT INTO window_templates VALUES ('work', 'work', '09:00:00', '17:00:00');
            INSERT INTO window_templates VALUES ('lunch', 'free', '12:00:00', '13:00:00');
            "#,
        )
        .unwrap();
        conn
    }

    #[test]
    fn load_all_returns_every_template_kind() {
        let conn = memory_conn();
        let templates = WindowStore::load_all(&conn).unwrap();
        assert_eq!(templates.len(), 2);
    }
}
