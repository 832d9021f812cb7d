//! Bearer token check for the internal API.

use std::sync::{Arc, RwLock};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::{HeaderMap, header};

use super::TokenKind;
use crate::api::AppState;
use crate::api::public::ApiError;

type SharedState = Arc<RwLock<AppState>>;

/// The token of an `Authorization: Bearer <token>` header. `Some("")` when
/// the scheme is present without a token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Middleware for `axum::middleware::from_fn_with_state` that rejects
/// requests without a valid access token and stores the verified
/// `AdminClaims` in the request extensions.
pub async fn require_bearer(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(request.headers()) {
        Some("") => {
            return ApiError::Unauthorized(String::from("Access token is required"))
                .into_response();
        }
        Some(token) => token.to_string(),
        None => {
            return ApiError::Unauthorized(String::from("Authentication required."))
                .into_response();
        }
    };

    let tokens = state.read().expect("Unable to read share state").tokens.clone();
    match tokens.verify(&token, TokenKind::Access) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}
