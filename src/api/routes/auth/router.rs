//! Router for the auth API

use std::sync::{Arc, RwLock};

use axum::{Json, Router, extract::State, routing::post};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn login(
    State(state): State<SharedState>,
    Json(body): Json<public::LoginRequest>,
) -> Result<Json<public::LoginResponse>, ApiError> {
    let email = non_empty(body.email)
        .ok_or_else(|| ApiError::BadRequest(String::from("Email is required.")))?;

    let tokens = state.read().expect("Unable to read share state").tokens.clone();
    let claims = tokens.login(&email, body.password.as_deref())?;
    let pair = tokens.issue_pair(&claims)?;
    tracing::info!(email = %claims.email, "Admin logged in");

    Ok(Json(public::LoginResponse {
        status: true,
        message: String::from("Login successful"),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        data: public::AdminData {
            id: claims.user_id,
            name: tokens.admin_name().to_string(),
            email: claims.email,
        },
    }))
}

async fn validate_tokens(
    State(state): State<SharedState>,
    body: Option<Json<public::ValidateTokensRequest>>,
) -> Result<Json<public::ValidateTokensResponse>, ApiError> {
    let Json(body) = body.unwrap_or_default();
    let access_token = non_empty(body.access_token);
    let refresh_token = non_empty(body.refresh_token);
    if access_token.is_none() && refresh_token.is_none() {
        return Err(ApiError::AuthFailed(String::from("Tokens required.")));
    }

    let tokens = state.read().expect("Unable to read share state").tokens.clone();
    let pair = tokens.refresh(access_token.as_deref(), refresh_token.as_deref())?;

    Ok(Json(public::ValidateTokensResponse {
        status: true,
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// Create the auth router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/login", post(login))
        .route("/validate-tokens", post(validate_tokens))
}
