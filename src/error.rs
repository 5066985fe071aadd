use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{error, warn};

pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Errors surfaced by the scheduling pipeline, per the error kinds the
/// pipeline's entry point is responsible for reporting.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("no work capacity available for {task_minutes} minutes of pending tasks")]
    NoCapacity { task_minutes: i64 },

    #[error("no feasible assignment found within a horizon of {horizon_days} days")]
    Infeasible { horizon_days: u32 },

    #[error("calendar service unreachable: {message}")]
    CalendarUnreachable { message: String },

    #[error("{failed} of {attempted} calendar event writes failed")]
    CalendarWriteFailed {
        attempted: usize,
        failed: usize,
        details: Vec<String>,
    },

    #[error("invalid input: {message}")]
    BadInput {
        message: String,
        details: Option<JsonValue>,
    },

    #[error("database error: {0}")]
    Database(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchedulerError {
    pub fn no_capacity(task_minutes: i64) -> Self {
        warn!(target: "scheduler::feasibility", task_minutes, "no work capacity for pending tasks");
        SchedulerError::NoCapacity { task_minutes }
    }

    pub fn infeasible(horizon_days: u32) -> Self {
        warn!(target: "scheduler::solver", horizon_days, "solver could not find a feasible assignment");
        SchedulerError::Infeasible { horizon_days }
    }

    pub fn calendar_unreachable(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "scheduler::calendar", %message, "calendar service unreachable");
        SchedulerError::CalendarUnreachable { message }
    }

    pub fn calendar_write_failed(attempted: usize, details: Vec<String>) -> Self {
        let failed = details.len();
        error!(target: "scheduler::calendar", attempted, failed, "partial failure writing calendar events");
        SchedulerError::CalendarWriteFailed {
            attempted,
            failed,
            details,
        }
    }

    pub fn bad_input(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "scheduler::validation", %message, "bad input");
        SchedulerError::BadInput {
            message,
            details: None,
        }
    }

    pub fn bad_input_with_details(message: impl Into<String>, details: JsonValue) -> Self {
        let message = message.into();
        warn!(target: "scheduler::validation", %message, details = %details, "bad input with details");
        SchedulerError::BadInput {
            message,
            details: Some(details),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "scheduler::config", %message, "configuration error");
        SchedulerError::Config(message)
    }

    /// Exit code the CLI entry point returns for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            SchedulerError::NoCapacity { .. } => 2,
            SchedulerError::Infeasible { .. } => 3,
            SchedulerError::CalendarUnreachable { .. } => 4,
            SchedulerError::CalendarWriteFailed { .. } => 5,
            SchedulerError::BadInput { .. } => 6,
            SchedulerError::Database(_) | SchedulerError::Config(_) | SchedulerError::Io(_) => 1,
        }
    }
}

impl From<rusqlite::Error> for SchedulerError {
    fn from(err: rusqlite::Error) -> Self {
        error!(target: "scheduler::database", error = ?err, "sqlite error");
        SchedulerError::Database(err.to_string())
    }
}

impl From<reqwest::Error> for SchedulerError {
    fn from(err: reqwest::Error) -> Self {
        SchedulerError::calendar_unreachable(err.to_string())
    }
}

impl From<toml::de::Error> for SchedulerError {
    fn from(err: toml::de::Error) -> Self {
        SchedulerError::config(err.to_string())
    }
}
