//! In-memory admin sessions keyed by a random cookie id.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use http::{HeaderMap, header};
use uuid::Uuid;

use crate::auth::TokenPair;

pub const SESSION_COOKIE: &str = "caltrack.sid";

#[derive(Debug, Clone)]
pub struct Session {
    pub is_login: bool,
    pub uid: Option<i64>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self {
            is_login: false,
            uid: None,
            display_name: None,
            email: None,
            access_token: None,
            refresh_token: None,
            created_at: Utc::now(),
        }
    }

    pub fn has_tokens(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
            || self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

pub struct SessionStore {
    sessions: HashMap<String, Session>,
    validity: Duration,
}

impl SessionStore {
    pub fn new(validity_minutes: i64) -> Self {
        Self {
            sessions: HashMap::new(),
            validity: Duration::minutes(validity_minutes),
        }
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Drop every session past its validity.
    fn purge_expired(&mut self) {
        let now = Utc::now();
        let validity = self.validity;
        self.sessions.retain(|_, session| session.created_at + validity > now);
    }

    /// Store a session and return its new id. Expired sessions are purged
    /// first.
    pub fn create(&mut self, session: Session) -> String {
        self.purge_expired();
        let id = Uuid::new_v4().to_string();
        self.sessions.insert(id.clone(), session);
        id
    }

    /// Look up a live session. Expired sessions are dropped on access.
    pub fn get(&mut self, id: &str) -> Option<Session> {
        let expired = self
            .sessions
            .get(id)
            .map(|session| session.created_at + self.validity <= Utc::now())?;
        if expired {
            self.sessions.remove(id);
            return None;
        }
        self.sessions.get(id).cloned()
    }

    pub fn set_tokens(&mut self, id: &str, tokens: TokenPair) -> bool {
        match self.sessions.get_mut(id) {
            Some(session) => {
                session.access_token = Some(tokens.access_token);
                session.refresh_token = Some(tokens.refresh_token);
                true
            }
            None => false,
        }
    }

    pub fn destroy(&mut self, id: &str) -> Option<Session> {
        self.sessions.remove(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// The session id from the request's `Cookie` header.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| cookie::Cookie::parse(pair.trim()).ok())
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

/// `Set-Cookie` value for a session that lives `max_age`.
pub fn session_cookie(id: &str, max_age: Duration) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        id,
        max_age.num_seconds()
    )
}

pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
