use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::calendar::google::OAuthConfig;
use crate::error::{SchedulerError, SchedulerResult};

/// Scheduler-wide configuration, loaded from a TOML file and overridable by
/// individual CLI flags (spec.md §6 "CLI surface").
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Path to the SQLite database holding tasks and window templates.
    pub database_path: PathBuf,
    /// Directory log files are written to.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Upper bound on how many times the horizon may be enlarged before the
    /// pipeline gives up and reports infeasibility (spec.md §4.3 "Search
    /// strategy").
    #[serde(default = "default_max_horizon_retries")]
    pub max_horizon_retries: u32,
    /// Whether the Assignment Solver is allowed to use a slot's margin time
    /// at a penalty, or must hold every slot to its strict soft length.
    #[serde(default = "default_soft_margins_enabled")]
    pub soft_margins_enabled: bool,
    /// The small set of reserved extended-property values that mark an
    /// event as application-owned (spec.md §6: "a single reserved
    /// identifier distinct from the set of colour/label identifiers the
    /// user is assumed to pick; all of a small set of reserved identifiers
    /// is considered application-owned"). New writes always use the first
    /// entry; every entry is recognized as owned when reading events back.
    #[serde(default = "default_calendar_tags")]
    pub calendar_tags: Vec<String>,
    /// Task statuses the pipeline treats as schedulable, read from the
    /// `tasks.status` column before the Feasibility Estimator runs
    /// (SPEC_FULL.md §10.4 "Task status filtering"). Matches the original
    /// `status == "ToDo"` filter by default.
    #[serde(default = "default_schedulable_statuses")]
    pub schedulable_statuses: Vec<String>,
    pub calendar: CalendarConfig,
}

impl SchedulerConfig {
    /// The tag value new calendar writes are stamped with.
    pub fn primary_calendar_tag(&self) -> &str {
        self.calendar_tags.first().map(String::as_str).unwrap_or("chronoslot")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    pub calendar_id: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,
    pub keyring_user: String,
    /// IANA time zone name attached to every event this application writes
    /// (spec.md §6 "Insert event").
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

impl CalendarConfig {
    pub fn oauth(&self) -> OAuthConfig {
        OAuthConfig {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            keyring_service: self.keyring_service.clone(),
            keyring_user: self.keyring_user.clone(),
        }
    }

    /// Rejects a `time_zone` that isn't a recognized IANA zone name before
    /// it ever reaches the calendar API.
    pub fn validate(&self) -> SchedulerResult<()> {
        chrono_tz::Tz::from_str(&self.time_zone).map_err(|_| {
            SchedulerError::bad_input(format!("unknown time zone '{}'", self.time_zone))
        })?;
        Ok(())
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("./logs")
}

fn default_max_horizon_retries() -> u32 {
    4
}

fn default_soft_margins_enabled() -> bool {
    true
}

fn default_calendar_tags() -> Vec<String> {
    vec!["chronoslot".to_string()]
}

fn default_schedulable_statuses() -> Vec<String> {
    vec!["todo".to_string()]
}

fn default_keyring_service() -> String {
    "chronoslot-calendar".to_string()
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

impl SchedulerConfig {
    pub fn load(path: &Path) -> SchedulerResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: SchedulerConfig = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> SchedulerResult<()> {
        if self.calendar_tags.is_empty() {
            return Err(SchedulerError::bad_input("calendar_tags must not be empty"));
        }
        if self.schedulable_statuses.is_empty() {
            return Err(SchedulerError::bad_input("schedulable_statuses must not be empty"));
        }
        self.calendar.validate()
    }
}
