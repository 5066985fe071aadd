use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use chronoslot::calendar::client::CalendarService;
use chronoslot::config::{CalendarConfig, SchedulerConfig};
use chronoslot::error::SchedulerResult;
use chronoslot::models::{EventOwnership, FixedEvent, TaskEvent};
use chronoslot::pipeline::Pipeline;
use chronoslot::stores::DbPool;
use tempfile::tempdir;

struct FakeCalendarService {
    events: Mutex<Vec<FixedEvent>>,
}

impl FakeCalendarService {
    fn new(events: Vec<FixedEvent>) -> Self {
        Self {
            events: Mutex::new(events),
        }
    }
}

#[async_trait]
impl CalendarService for FakeCalendarService {
    async fn list_events(
        &self,
        _time_min: DateTime<FixedOffset>,
        _time_max: DateTime<FixedOffset>,
    ) -> SchedulerResult<Vec<FixedEvent>> {
        Ok(self.events.lock().unwrap().clone())
    }

    async fn insert_event(&self, event: &TaskEvent, _tag: &str) -> SchedulerResult<String> {
        let id = format!("evt-{}", event.task_id);
        self.events.lock().unwrap().push(FixedEvent {
            id: id.clone(),
            start: event.start,
            end: event.end,
            ownership: EventOwnership::Owned,
        });
        Ok(id)
    }

    async fn delete_event(&self, event_id: &str) -> SchedulerResult<()> {
        self.events.lock().unwrap().retain(|e| e.id != event_id);
        Ok(())
    }
}

fn dt(h: u32) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(0).unwrap();
    offset
        .from_local_datetime(
            &NaiveDate::from_ymd_opt(2026, 1, 5)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap(),
        )
        .single()
        .unwrap()
}

fn test_config(db_path: std::path::PathBuf) -> SchedulerConfig {
    SchedulerConfig {
        database_path: db_path,
        log_dir: std::env::temp_dir(),
        max_horizon_retries: 4,
        soft_margins_enabled: true,
        calendar_tags: vec!["chronoslot".to_string()],
        schedulable_statuses: vec!["todo".to_string()],
        calendar: CalendarConfig {
            calendar_id: "primary".into(),
            client_id: "unused".into(),
            client_secret: "unused".into(),
            keyring_service: "unused".into(),
            keyring_user: "unused".into(),
            time_zone: "UTC".into(),
        },
    }
}

fn seed_db(path: &std::path::Path) {
    // Opened directly, bypassing the scheduler's read-only `DbPool`: in
    // production this schema is owned and populated by the task manager
    // the scheduler reads from, never by the scheduler itself.
    let conn = rusqlite::Connection::open(path).unwrap();
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
        CREATE TABLE window_templates (
            id TEXT PRIMARY KEY,
            kind TEXT NOT NULL,
            start_of_day TEXT NOT NULL,
            end_of_day TEXT NOT NULL
        );
        INSERT INTO window_templates VALUES ('work', 'work', '09:00:00', '17:00:00');
        INSERT INTO tasks VALUES ('t1', 'Draft report', 2, 60, NULL, 'todo');
        "#,
    )
    .unwrap();
}

#[tokio::test]
async fn single_task_fits_in_a_single_day() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("scheduler.db");
    let db = DbPool::new(&db_path).unwrap();
    seed_db(&db_path);

    let calendar = Arc::new(FakeCalendarService::new(Vec::new()));
    let pipeline = Pipeline::new(calendar.clone(), test_config(db_path));

    let conn = db.get_connection().unwrap();
    let events = pipeline.run(&conn, dt(0), false, false).await.unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].task_id, "t1");
    assert_eq!(events[0].duration_minutes(), 60);
    assert_eq!(calendar.events.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn dry_run_does_not_write_to_calendar() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("scheduler.db");
    let db = DbPool::new(&db_path).unwrap();
    seed_db(&db_path);

    let calendar = Arc::new(FakeCalendarService::new(Vec::new()));
    let pipeline = Pipeline::new(calendar.clone(), test_config(db_path));

    let conn = db.get_connection().unwrap();
    let events = pipeline.run(&conn, dt(0), true, false).await.unwrap();

    assert_eq!(events.len(), 1);
    assert!(calendar.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn existing_fixed_event_splits_the_work_window() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("scheduler.db");
    let db = DbPool::new(&db_path).unwrap();
    seed_db(&db_path);

    let existing = FixedEvent {
        id: "meeting".into(),
        start: dt(9),
        end: dt(10),
        ownership: EventOwnership::User,
    };
    let calendar = Arc::new(FakeCalendarService::new(vec![existing]));
    let pipeline = Pipeline::new(calendar.clone(), test_config(db_path));

    let conn = db.get_connection().unwrap();
    let events = pipeline.run(&conn, dt(0), false, false).await.unwrap();

    assert_eq!(events.len(), 1);
    assert!(events[0].start >= dt(10));
}
