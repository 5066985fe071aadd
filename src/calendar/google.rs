use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::calendar::client::CalendarService;
use crate::error::{SchedulerError, SchedulerResult};
use crate::models::{EventOwnership, FixedEvent, TaskEvent};

const API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Extended-property key every application write is stamped under. The
/// *value* stored there is one of `reserved_tags` (spec.md §6: "a small set
/// of reserved identifiers is considered application-owned").
const TAG_PROPERTY_KEY: &str = "chronoslot_tag";

/// Where the long-lived OAuth2 refresh token lives. The original project
/// cached it in a plaintext `token.json`; here it lives in the platform
/// keychain instead, fetched fresh on every access-token refresh.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub keyring_service: String,
    pub keyring_user: String,
}

struct CachedAccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Google Calendar v3 client, speaking the REST API directly over `reqwest`
/// rather than a generated SDK (spec.md §6 "External interfaces").
pub struct GoogleCalendarService {
    http: reqwest::Client,
    base_url: String,
    calendar_id: String,
    /// The small set of reserved tag values recognized as application-owned
    /// on read; writes always use the first (spec.md §6).
    reserved_tags: Vec<String>,
    time_zone: String,
    oauth: OAuthConfig,
    cached_token: Mutex<Option<CachedAccessToken>>,
}

impl GoogleCalendarService {
    pub fn new(
        calendar_id: impl Into<String>,
        reserved_tags: Vec<String>,
        time_zone: impl Into<String>,
        oauth: OAuthConfig,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: API_BASE.to_string(),
            calendar_id: calendar_id.into(),
            reserved_tags,
            time_zone: time_zone.into(),
            oauth,
            cached_token: Mutex::new(None),
        }
    }

    /// Points this client at a different API base, e.g. a test server or an
    /// enterprise Calendar API proxy.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Seeds the access-token cache with a token obtained out of band,
    /// skipping the keyring-backed refresh flow entirely. Useful for
    /// short-lived processes that already hold a valid token, and for
    /// tests that should not depend on a platform keyring being present.
    pub fn with_static_token(self, token: impl Into<String>) -> Self {
        let far_future = Utc::now() + chrono::Duration::days(365);
        *self
            .cached_token
            .try_lock()
            .expect("no concurrent access during construction") = Some(CachedAccessToken {
            token: token.into(),
            expires_at: far_future,
        });
        self
    }

    fn cached_refresh_token(&self) -> SchedulerResult<String> {
        let entry = keyring::Entry::new(&self.oauth.keyring_service, &self.oauth.keyring_user)
            .map_err(|e| SchedulerError::calendar_unreachable(format!("keyring unavailable: {e}")))?;
        entry
            .get_password()
            .map_err(|e| SchedulerError::calendar_unreachable(format!("no cached refresh token: {e}")))
    }

    async fn access_token(&self) -> SchedulerResult<String> {
        {
            let cache = self.cached_token.lock().await;
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at > Utc::now() {
                    return Ok(cached.token.clone());
                }
            }
        }

        let refresh_token = self.cached_refresh_token()?;
        let response: TokenResponse = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("client_id", self.oauth.client_id.as_str()),
                ("client_secret", self.oauth.client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let expires_at = Utc::now() + chrono::Duration::seconds(response.expires_in - 30);
        let mut cache = self.cached_token.lock().await;
        *cache = Some(CachedAccessToken {
            token: response.access_token.clone(),
            expires_at,
        });
        Ok(response.access_token)
    }

    fn events_url(&self, suffix: &str) -> String {
        format!("{}/calendars/{}/events{suffix}", self.base_url, self.calendar_id)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct EventsListResponse {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

#[derive(Debug, Deserialize, Serialize)]
struct GoogleEvent {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    id: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    description: Option<String>,
    start: GoogleDateTime,
    end: GoogleDateTime,
    #[serde(default, rename = "extendedProperties")]
    extended_properties: Option<ExtendedProperties>,
}

/// Google represents a timed event with `dateTime` and a whole-date event
/// with `date` alone (spec.md §6: "whole-date events are treated as
/// `[00:00, 24:00)` of that date").
#[derive(Debug, Deserialize, Serialize, Default)]
struct GoogleDateTime {
    #[serde(rename = "dateTime", default, skip_serializing_if = "Option::is_none")]
    date_time: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
    #[serde(rename = "timeZone", default, skip_serializing_if = "Option::is_none")]
    time_zone: Option<String>,
}

impl GoogleDateTime {
    fn timed(at: DateTime<FixedOffset>, time_zone: &str) -> Self {
        Self {
            date_time: Some(at),
            date: None,
            time_zone: Some(time_zone.to_string()),
        }
    }

    /// Resolves to a concrete instant; whole-date events are midnight UTC
    /// of the given date, since the Calendar API carries no offset for them.
    fn resolve(&self) -> SchedulerResult<DateTime<FixedOffset>> {
        if let Some(dt) = self.date_time {
            return Ok(dt);
        }
        if let Some(date) = self.date {
            let naive = date.and_time(NaiveTime::from_hms_opt(0, 0, 0).unwrap());
            return Ok(Utc.from_utc_datetime(&naive).fixed_offset());
        }
        Err(SchedulerError::bad_input("calendar event missing both dateTime and date"))
    }
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct ExtendedProperties {
    #[serde(default)]
    private: std::collections::HashMap<String, String>,
}

#[async_trait]
impl CalendarService for GoogleCalendarService {
    async fn list_events(
        &self,
        time_min: DateTime<FixedOffset>,
        time_max: DateTime<FixedOffset>,
    ) -> SchedulerResult<Vec<FixedEvent>> {
        let token = self.access_token().await?;
        let response: EventsListResponse = self
            .http
            .get(self.events_url(""))
            .bearer_auth(token)
            .query(&[
                ("timeMin", time_min.to_rfc3339()),
                ("timeMax", time_max.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let events = response
            .items
            .into_iter()
            .map(|item| {
                let ownership = match item
                    .extended_properties
                    .as_ref()
                    .and_then(|p| p.private.get(TAG_PROPERTY_KEY))
                {
                    Some(value) if self.reserved_tags.iter().any(|t| t == value) => EventOwnership::Owned,
                    _ => EventOwnership::User,
                };
                Ok(FixedEvent {
                    id: item.id,
                    start: item.start.resolve()?,
                    end: item.end.resolve()?,
                    ownership,
                })
            })
            .collect::<SchedulerResult<Vec<_>>>()?;

        Ok(events)
    }

    async fn insert_event(&self, event: &TaskEvent, tag: &str) -> SchedulerResult<String> {
        let token = self.access_token().await?;
        let mut private = std::collections::HashMap::new();
        private.insert(TAG_PROPERTY_KEY.to_string(), tag.to_string());

        let body = GoogleEvent {
            id: String::new(),
            summary: event.task_name.clone(),
            description: Some(format!("Scheduled automatically ({} minutes).", event.estimated_minutes)),
            start: GoogleDateTime::timed(event.start, &self.time_zone),
            end: GoogleDateTime::timed(event.end, &self.time_zone),
            extended_properties: Some(ExtendedProperties { private }),
        };

        let created: GoogleEvent = self
            .http
            .post(self.events_url(""))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(created.id)
    }

    async fn delete_event(&self, event_id: &str) -> SchedulerResult<()> {
        let token = self.access_token().await?;
        self.http
            .delete(self.events_url(&format!("/{event_id}")))
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
