//! Google Calendar API client that reads a monitored user's calendar
//! through a delegated service account token.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::credentials::{CredentialProvider, FileCredentialProvider, ServiceAccountKey};
use crate::calendar::{CalendarError, CalendarEvent, EventSource, TimeWindow};
use crate::core::AppConfig;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Response structure for listing events
#[derive(Debug, Deserialize)]
struct ListEventsResponse {
    items: Option<Vec<GoogleEvent>>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

/// Calendar event as returned by Google API (intermediate structure)
#[derive(Debug, Deserialize)]
struct GoogleEvent {
    id: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    location: Option<String>,
    status: Option<String>,
    start: Option<EventDateTime>,
    end: Option<EventDateTime>,
    creator: Option<EventCreator>,
}

/// DateTime structure from Google Calendar API
#[derive(Debug, Deserialize)]
struct EventDateTime {
    date: Option<String>,
    #[serde(rename = "dateTime")]
    date_time: Option<String>,
}

impl EventDateTime {
    fn value(self) -> Option<String> {
        self.date_time.or(self.date)
    }
}

#[derive(Debug, Deserialize)]
struct EventCreator {
    email: Option<String>,
}

impl From<GoogleEvent> for CalendarEvent {
    fn from(event: GoogleEvent) -> Self {
        let all_day = event
            .start
            .as_ref()
            .is_none_or(|start| start.date_time.is_none());

        CalendarEvent {
            id: event.id.unwrap_or_default(),
            summary: event
                .summary
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| String::from("(No title)")),
            start: event.start.and_then(EventDateTime::value),
            end: event.end.and_then(EventDateTime::value),
            all_day,
            description: event.description.filter(|s| !s.is_empty()),
            location: event.location.filter(|s| !s.is_empty()),
            creator: event.creator.and_then(|c| c.email),
            status: event.status,
        }
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Clone)]
pub struct GoogleCalendar {
    client: Client,
    credentials: Arc<dyn CredentialProvider>,
    api_base: String,
    scope: String,
    calendar_id: String,
}

impl GoogleCalendar {
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        api_base: &str,
        scope: &str,
        calendar_id: &str,
    ) -> Self {
        Self {
            client: Client::new(),
            credentials,
            api_base: api_base.trim_end_matches('/').to_string(),
            scope: scope.to_string(),
            calendar_id: calendar_id.to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(FileCredentialProvider::new(&config.credentials_path)),
            &config.google_api_base,
            &config.calendar_scope,
            &config.calendar_id,
        )
    }

    /// Exchange a signed assertion impersonating `subject_email` for an
    /// access token.
    async fn delegated_token(
        &self,
        key: &ServiceAccountKey,
        subject_email: &str,
    ) -> Result<String, CalendarError> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &key.client_email,
            sub: subject_email,
            scope: &self.scope,
            aud: &key.token_uri,
            iat: now,
            exp: now + 3600,
        };
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            CalendarError::Provider(format!("Invalid service account private key: {}", e))
        })?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
            .map_err(|e| CalendarError::Provider(format!("Failed to sign assertion: {}", e)))?;

        let response = self
            .client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| CalendarError::Provider(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarError::Provider(format!(
                "Token exchange for {} failed with {}: {}",
                subject_email, status, body
            )));
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| CalendarError::Provider(e.to_string()))?;
        Ok(token.access_token)
    }

    async fn fetch_page(
        &self,
        access_token: &str,
        window: &TimeWindow,
        page_token: Option<&str>,
    ) -> Result<ListEventsResponse, CalendarError> {
        let url = format!(
            "{}/calendars/{}/events",
            self.api_base,
            urlencoding::encode(&self.calendar_id)
        );
        let mut query = vec![
            ("timeMin", window.time_min_param()),
            ("timeMax", window.time_max_param()),
            ("singleEvents", String::from("true")),
            ("orderBy", String::from("startTime")),
        ];
        if let Some(page_token) = page_token {
            query.push(("pageToken", page_token.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await
            .map_err(|e| CalendarError::Provider(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarError::Provider(format!(
                "Google Calendar API returned {}: {}",
                status, body
            )));
        }

        response
            .json::<ListEventsResponse>()
            .await
            .map_err(|e| CalendarError::Provider(e.to_string()))
    }
}

#[async_trait]
impl EventSource for GoogleCalendar {
    async fn list_events(
        &self,
        subject_email: &str,
        window: TimeWindow,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let key = self.credentials.load()?;
        let access_token = self.delegated_token(&key, subject_email).await?;

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = self
                .fetch_page(&access_token, &window, page_token.as_deref())
                .await?;
            events.extend(page.items.unwrap_or_default().into_iter().map(CalendarEvent::from));

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        tracing::debug!(
            subject = subject_email,
            count = events.len(),
            time_min = %window.time_min_param(),
            "Fetched calendar events"
        );
        Ok(events)
    }
}
