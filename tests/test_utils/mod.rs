//! Test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use axum::{Router, body::Body};
use tempfile::TempDir;

use caltrack::api::{AppState, app};
use caltrack::calendar::{CalendarError, CalendarEvent, EventSource, TimeWindow};
use caltrack::core::AppConfig;
use caltrack::web::{SESSION_COOKIE, Session};

pub const USERS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<users>
  <user><email>alice@example.com</email><name>Alice Smith</name></user>
  <user><email>fail@example.com</email><name>Broken Account</name></user>
  <user>carol@example.com</user>
</users>
"#;

/// Event source that returns one standup per requested window and fails
/// for any email starting with `fail`.
pub struct FakeSource;

#[async_trait]
impl EventSource for FakeSource {
    async fn list_events(
        &self,
        subject_email: &str,
        window: TimeWindow,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        if subject_email.starts_with("fail") {
            return Err(CalendarError::Provider(String::from("invalid_grant")));
        }
        let day = window.time_min.format("%Y-%m-%d");
        Ok(vec![CalendarEvent {
            id: format!("{}-standup", subject_email),
            summary: String::from("Standup"),
            start: Some(format!("{}T09:00:00+00:00", day)),
            end: Some(format!("{}T10:00:00+00:00", day)),
            all_day: false,
            description: None,
            location: None,
            creator: Some(String::from("lead@example.com")),
            status: Some(String::from("confirmed")),
        }])
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<RwLock<AppState>>,
    // Held so the users file outlives the test
    pub dir: TempDir,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// A signed access token for the configured admin.
    pub fn access_token(&self) -> String {
        let state = self.state.read().unwrap();
        let claims = state
            .tokens
            .login(&state.config.admin_email, None)
            .unwrap();
        state.tokens.issue_access_token(&claims).unwrap()
    }

    /// Store a session and return the `Cookie` header value for it.
    pub fn session_cookie(&self, session: Session) -> (String, String) {
        let id = self.state.write().unwrap().sessions.create(session);
        let cookie = format!("{}={}", SESSION_COOKIE, id);
        (id, cookie)
    }

    pub fn logged_in_session(&self) -> (String, String) {
        self.session_cookie(Session {
            is_login: true,
            uid: Some(1),
            display_name: Some(String::from("Admin")),
            email: Some(String::from("admin@localhost")),
            access_token: Some(String::from("old-access")),
            refresh_token: Some(String::from("old-refresh")),
            ..Session::anonymous()
        })
    }

    pub fn has_session(&self, id: &str) -> bool {
        self.state.write().unwrap().sessions.get(id).is_some()
    }
}

pub fn test_config(dir: &TempDir, api_base_url: &str) -> AppConfig {
    AppConfig {
        api_base_url: api_base_url.to_string(),
        users_config_path: dir.path().join("users.xml").display().to_string(),
        slot_config_path: dir.path().join("slot-config.xml").display().to_string(),
        credentials_path: dir.path().join("calendaraccount.json").display().to_string(),
        ..AppConfig::default()
    }
}

/// Creates a test application with a users file in a temporary directory.
/// The web tier talks to `api_base_url`, usually a mockito server.
pub fn test_app_with_api(api_base_url: &str) -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(dir.path().join("users.xml"), USERS_XML).expect("Failed to write users.xml");

    let config = test_config(&dir, api_base_url);
    let state = Arc::new(RwLock::new(AppState::with_event_source(
        config,
        Arc::new(FakeSource),
    )));
    TestApp {
        router: app(Arc::clone(&state)),
        state,
        dir,
    }
}

pub fn test_app() -> TestApp {
    test_app_with_api("http://127.0.0.1:9")
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not utf8")
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    serde_json::from_str(&body_to_string(body).await).expect("Body is not JSON")
}
