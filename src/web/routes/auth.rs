use std::sync::{Arc, RwLock};

use axum::{
    Form, Json,
    extract::{FromRequest, Request, State},
    response::{IntoResponse, Redirect, Response},
};
use http::{HeaderMap, HeaderValue, StatusCode, header};
use serde::Deserialize;
use serde_json::json;

use super::render;
use crate::api::AppState;
use crate::api::public::ApiError;
use crate::presentation::Page;
use crate::web::session::{Session, clear_session_cookie, session_cookie, session_id};

type SharedState = Arc<RwLock<AppState>>;

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

fn with_cookie(mut response: Response, cookie: String) -> Response {
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(err) => tracing::error!("Invalid cookie header: {}", err),
    }
    response
}

fn login_view(
    state: &SharedState,
    status: StatusCode,
    email: Option<&str>,
    error: Option<&str>,
) -> Result<Response, ApiError> {
    let html = render(
        state,
        Page::Login,
        &json!({ "title": "Login", "email": email, "error": error }),
    )?;
    Ok((status, html).into_response())
}

pub async fn login_page(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let new_session = {
        let mut shared_state = state.write().expect("Unable to write share state");
        let existing = session_id(&headers).and_then(|id| shared_state.sessions.get(&id));
        match existing {
            Some(session) if session.is_login => {
                return Ok(Redirect::to("/admin").into_response());
            }
            Some(_) => None,
            None => {
                let id = shared_state.sessions.create(Session::anonymous());
                Some(session_cookie(&id, shared_state.sessions.validity()))
            }
        }
    };

    let response = login_view(&state, StatusCode::OK, None, None)?;
    Ok(match new_session {
        Some(cookie) => with_cookie(response, cookie),
        None => response,
    })
}

/// Accepts a JSON body (answered with JSON) or a form post (answered with a
/// redirect or the login page).
pub async fn login(State(state): State<SharedState>, request: Request) -> Result<Response, ApiError> {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("json"));
    let previous = session_id(request.headers());

    let form = if is_json {
        Json::<LoginForm>::from_request(request, &state)
            .await
            .map(|Json(form)| form)
            .map_err(|e| ApiError::BadRequest(e.body_text()))?
    } else {
        Form::<LoginForm>::from_request(request, &state)
            .await
            .map(|Form(form)| form)
            .map_err(|e| ApiError::BadRequest(e.body_text()))?
    };

    let email = form
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());
    let Some(email) = email else {
        return if is_json {
            Ok((
                StatusCode::BAD_REQUEST,
                Json(json!({ "status": false, "message": "Email is required." })),
            )
                .into_response())
        } else {
            login_view(&state, StatusCode::BAD_REQUEST, None, Some("Email is required."))
        };
    };

    let api_client = state
        .read()
        .expect("Unable to read share state")
        .api_client
        .clone();
    let login = match api_client.login(&email, form.password.as_deref()).await {
        Ok(login) => login,
        Err(err) => {
            let message = err.message_or("Login failed. Please try again.");
            tracing::warn!(%email, "Login rejected: {}", message);
            return if is_json {
                Ok(Json(json!({ "status": false, "message": message })).into_response())
            } else {
                login_view(
                    &state,
                    StatusCode::UNAUTHORIZED,
                    Some(email.as_str()),
                    Some(message.as_str()),
                )
            };
        }
    };

    let cookie = {
        let mut shared_state = state.write().expect("Unable to write share state");
        if let Some(id) = previous {
            shared_state.sessions.destroy(&id);
        }
        let display_name = Some(login.data.name.trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(login.data.email.as_str())
            .to_string();
        let id = shared_state.sessions.create(Session {
            is_login: true,
            uid: Some(login.data.id),
            display_name: Some(display_name),
            email: Some(login.data.email.clone()),
            access_token: Some(login.access_token.clone()),
            refresh_token: Some(login.refresh_token.clone()),
            ..Session::anonymous()
        });
        session_cookie(&id, shared_state.sessions.validity())
    };
    tracing::info!(email = %login.data.email, "Admin session started");

    let response = if is_json {
        Json(json!({
            "status": true,
            "message": login.message.unwrap_or_else(|| String::from("Login successful")),
            "data": login.data,
        }))
        .into_response()
    } else {
        Redirect::to("/admin").into_response()
    };
    Ok(with_cookie(response, cookie))
}

pub async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id(&headers) {
        state
            .write()
            .expect("Unable to write share state")
            .sessions
            .destroy(&id);
    }
    with_cookie(Redirect::to("/").into_response(), clear_session_cookie())
}
