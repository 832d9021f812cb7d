//! Monitored users and their calendar events.

mod service;
mod users;

pub use service::CalendarService;
pub use users::{load_monitored_users, parse_users_xml};

use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::google::CredentialError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredUser {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    /// Date-time (RFC 3339) or, for all-day events, a bare `YYYY-MM-DD`.
    pub start: Option<String>,
    pub end: Option<String>,
    pub all_day: bool,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Email of the event creator.
    pub creator: Option<String>,
    pub status: Option<String>,
}

/// One entry of the all-users batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEvents {
    pub email: String,
    pub name: Option<String>,
    pub events: Vec<CalendarEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

static DATE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid date regex"));

/// Strict `YYYY-MM-DD` that also names a real calendar day.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if !DATE_PARAM.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// UTC interval handed to the provider as `timeMin`/`timeMax`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
}

impl TimeWindow {
    pub fn for_date(date: NaiveDate) -> Self {
        Self::between(date, date)
    }

    /// First day 00:00:00.000 to last day 23:59:59.999 of the month.
    pub fn for_month(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let last = first
            .checked_add_months(chrono::Months::new(1))?
            .pred_opt()?;
        Some(Self::between(first, last))
    }

    fn between(first: NaiveDate, last: NaiveDate) -> Self {
        let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
        Self {
            time_min: Utc.from_utc_datetime(&first.and_time(NaiveTime::MIN)),
            time_max: Utc.from_utc_datetime(&last.and_time(end_of_day)),
        }
    }

    pub fn time_min_param(&self) -> String {
        self.time_min.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn time_max_param(&self) -> String {
        self.time_max.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("{0}")]
    ConfigurationMissing(String),
    #[error("{0}")]
    CredentialsMissing(String),
    #[error("{0}")]
    Provider(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CalendarError {
    /// Errors an operator fixes by correcting the deployment.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CalendarError::ConfigurationMissing(_) | CalendarError::CredentialsMissing(_)
        )
    }
}

impl From<CredentialError> for CalendarError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Missing(_) => CalendarError::CredentialsMissing(err.to_string()),
            CredentialError::Invalid { .. } => CalendarError::Provider(err.to_string()),
        }
    }
}

/// Where events come from. Implemented by the Google client and by
/// fakes in tests.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn list_events(
        &self,
        subject_email: &str,
        window: TimeWindow,
    ) -> Result<Vec<CalendarEvent>, CalendarError>;
}
