//! Gate in front of every `/admin` route. It re-validates the session's
//! tokens against the internal API on each request.

use std::sync::{Arc, RwLock};

use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use http::{HeaderMap, StatusCode, header};
use serde_json::json;
use thiserror::Error;

use super::session::{clear_session_cookie, session_id};
use crate::api::AppState;

type SharedState = Arc<RwLock<AppState>>;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("Session not found. Please log in again.")]
    SessionMissing,
    #[error("Please log in.")]
    NotAuthenticated,
    #[error("Access token not found. Please log in again.")]
    TokenMissing,
    #[error("{0}")]
    SessionExpired(String),
}

impl GateError {
    pub fn code(&self) -> &'static str {
        match self {
            GateError::SessionMissing => "SESSION_NOT_FOUND",
            GateError::NotAuthenticated => "NOT_LOGGED_IN",
            GateError::TokenMissing => "ACCESS_TOKEN_NOT_FOUND",
            GateError::SessionExpired(_) => "TOKEN_VALIDATION_FAILED",
        }
    }

    /// JSON 401 with a redirect hint for data requests, a redirect to the
    /// login page otherwise.
    pub fn respond(self, wants_json: bool) -> Response {
        tracing::info!(code = self.code(), "Admin gate rejected request: {}", self);
        let clear_cookie = matches!(self, GateError::SessionExpired(_));

        let mut response = if wants_json {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "status": false,
                    "message": self.to_string(),
                    "error": self.code(),
                    "redirect": "/",
                })),
            )
                .into_response()
        } else {
            Redirect::to("/").into_response()
        };

        if clear_cookie && let Ok(value) = clear_session_cookie().parse() {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        response
    }
}

/// The logged in admin, available to gated handlers as an extension.
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub session_id: String,
    pub access_token: String,
    pub display_name: String,
    pub email: Option<String>,
}

/// Whether the client asked for a data response.
pub fn wants_json(headers: &HeaderMap) -> bool {
    let accepts_json = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("json"));
    let is_xhr = headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"));
    accepts_json || is_xhr
}

async fn check(state: &SharedState, headers: &HeaderMap) -> Result<AdminContext, GateError> {
    let id = session_id(headers).ok_or(GateError::SessionMissing)?;

    let (session, api_client) = {
        let mut shared_state = state.write().expect("Unable to write share state");
        let session = shared_state
            .sessions
            .get(&id)
            .ok_or(GateError::SessionMissing)?;
        (session, shared_state.api_client.clone())
    };

    if !session.is_login {
        return Err(GateError::NotAuthenticated);
    }
    // The session is kept so the user can log in again from it.
    if !session.has_tokens() {
        return Err(GateError::TokenMissing);
    }

    let validated = api_client
        .validate_tokens(
            session.access_token.as_deref(),
            session.refresh_token.as_deref(),
        )
        .await;

    let mut shared_state = state.write().expect("Unable to write share state");
    match validated {
        Ok(pair) => {
            let access_token = pair.access_token.clone();
            if !shared_state.sessions.set_tokens(&id, pair) {
                return Err(GateError::SessionMissing);
            }
            Ok(AdminContext {
                session_id: id,
                access_token,
                display_name: session
                    .display_name
                    .or_else(|| session.email.clone())
                    .unwrap_or_default(),
                email: session.email,
            })
        }
        Err(err) => {
            shared_state.sessions.destroy(&id);
            Err(GateError::SessionExpired(
                err.message_or("Unable to validate tokens. Please log in again."),
            ))
        }
    }
}

/// Middleware for `axum::middleware::from_fn_with_state` guarding the admin
/// routes.
pub async fn admin_gate(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Response {
    let json = wants_json(request.headers());
    match check(&state, request.headers()).await {
        Ok(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(err) => err.respond(json),
    }
}
