use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use futures::{StreamExt, stream};

use super::{
    CalendarError, CalendarEvent, EventSource, MonitoredUser, TimeWindow, UserEvents,
    load_monitored_users,
};

/// Directory of monitored users plus the event source used to read
/// their calendars.
#[derive(Clone)]
pub struct CalendarService {
    users_path: PathBuf,
    source: Arc<dyn EventSource>,
    batch_concurrency: usize,
}

impl CalendarService {
    pub fn new(
        users_path: impl Into<PathBuf>,
        source: Arc<dyn EventSource>,
        batch_concurrency: usize,
    ) -> Self {
        Self {
            users_path: users_path.into(),
            source,
            batch_concurrency: batch_concurrency.max(1),
        }
    }

    /// Re-read on every call so edits to the file apply without a restart.
    pub fn list_monitored_users(&self) -> Result<Vec<MonitoredUser>, CalendarError> {
        load_monitored_users(&self.users_path)
    }

    pub async fn events_for_user_on_date(
        &self,
        email: &str,
        date: NaiveDate,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        self.source
            .list_events(email, TimeWindow::for_date(date))
            .await
    }

    pub async fn events_for_user_in_month(
        &self,
        email: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let window = TimeWindow::for_month(year, month).ok_or_else(|| {
            CalendarError::Internal(anyhow::anyhow!("Invalid month {}-{}", year, month))
        })?;
        self.source.list_events(email, window).await
    }

    /// Events for every monitored user on one date. A failing user gets an
    /// entry with no events and the error message; the output keeps the
    /// order of the users file.
    pub async fn events_for_all_users_on_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<UserEvents>, CalendarError> {
        let users = self.list_monitored_users()?;
        tracing::debug!(
            users = users.len(),
            concurrency = self.batch_concurrency,
            %date,
            "Fetching events for all users"
        );

        let results = stream::iter(users)
            .map(|user| async move {
                match self.events_for_user_on_date(&user.email, date).await {
                    Ok(events) => UserEvents {
                        email: user.email,
                        name: user.name,
                        events,
                        error: None,
                    },
                    Err(err) => {
                        tracing::warn!(email = %user.email, "Failed to fetch events: {}", err);
                        UserEvents {
                            email: user.email,
                            name: user.name,
                            events: Vec::new(),
                            error: Some(err.to_string()),
                        }
                    }
                }
            })
            .buffered(self.batch_concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(results)
    }
}
