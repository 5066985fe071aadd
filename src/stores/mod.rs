use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::SchedulerResult;

pub mod task_store;
pub mod window_store;

pub use task_store::TaskStore;
pub use window_store::WindowStore;

/// Thin wrapper around a single SQLite file, opened read-only by
/// convention: the scheduler observes tasks and window templates, it never
/// writes them back.
#[derive(Clone, Debug)]
pub struct DbPool {
    path: PathBuf,
}

impl DbPool {
    pub fn new<P: Into<PathBuf>>(path: P) -> SchedulerResult<Self> {
        let path = path.into();
        info!(db_path = %path.display(), "opening scheduler database");
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let pool = Self { path };
        {
            pool.get_connection()?;
        }
        Ok(pool)
    }

    pub fn get_connection(&self) -> SchedulerResult<Connection> {
        let conn = Connection::open(&self.path)?;
        configure_connection(&conn)?;
        debug!(db_path = %self.path.display(), "database connection ready");
        Ok(conn)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn configure_connection(conn: &Connection) -> SchedulerResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.pragma_update(None, "foreign_keys", 1)?;
    conn.pragma_update(None, "query_only", 1)?;
    Ok(())
}
