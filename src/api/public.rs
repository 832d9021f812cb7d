//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;
use serde_json::json;

use crate::auth::TokenError;
use crate::calendar::CalendarError;

// Errors

#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed request parameter.
    BadRequest(String),
    /// Missing, malformed or invalid bearer token.
    Unauthorized(String),
    /// Login or token refresh rejected.
    AuthFailed(String),
    /// Deployment is missing configuration or credentials.
    ServiceUnavailable(String),
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) | ApiError::AuthFailed(_) => StatusCode::UNAUTHORIZED,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ApiError::BadRequest(message) => {
                tracing::warn!("Bad request: {}", message);
                json!({ "status": "error", "message": message })
            }
            ApiError::Unauthorized(message) => {
                tracing::warn!("Unauthorized: {}", message);
                json!({ "status": false, "message": message, "error": "UNAUTHORIZED" })
            }
            ApiError::AuthFailed(message) => {
                tracing::warn!("Authentication failed: {}", message);
                json!({ "status": false, "message": message })
            }
            ApiError::ServiceUnavailable(message) => {
                tracing::error!("Service unavailable: {}", message);
                json!({ "status": "error", "message": message })
            }
            ApiError::Internal(err) => {
                // Always log the error
                tracing::error!("{:#}", err);
                json!({ "status": "error", "message": err.to_string() })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<CalendarError> for ApiError {
    fn from(err: CalendarError) -> Self {
        if err.is_configuration() {
            return Self::ServiceUnavailable(err.to_string());
        }
        match err {
            CalendarError::Internal(err) => Self::Internal(err),
            other => Self::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidToken(_) => Self::Unauthorized(err.to_string()),
            TokenError::SessionExpired | TokenError::InvalidCredentials => {
                Self::AuthFailed(err.to_string())
            }
            TokenError::Signing(_) => Self::Internal(anyhow::Error::new(err)),
        }
    }
}

/// Success envelope shared by the calendar endpoints. Extra fields such as
/// the requested date are flattened next to `data`.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize, E: Serialize = ()> {
    pub status: &'static str,
    pub message: &'static str,
    pub data: T,
    #[serde(flatten)]
    pub extra: E,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(message: &'static str, data: T) -> Self {
        Self {
            status: "success",
            message,
            data,
            extra: (),
        }
    }
}

impl<T: Serialize, E: Serialize> Envelope<T, E> {
    pub fn with<F: Serialize>(self, extra: F) -> Envelope<T, F> {
        Envelope {
            status: self.status,
            message: self.message,
            data: self.data,
            extra,
        }
    }
}

// Re-export public types from each route

pub mod auth {
    pub use crate::api::routes::auth::public::*;
}

pub mod calendar {
    pub use crate::api::routes::calendar::public::*;
}
