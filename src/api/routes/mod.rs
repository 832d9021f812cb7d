//! API routes module

pub mod auth;
pub mod calendar;

use std::sync::{Arc, RwLock};

use axum::{Json, Router, middleware, routing::get};
use serde_json::{Value, json};

use crate::api::state::AppState;
use crate::auth::require_bearer;

type SharedState = Arc<RwLock<AppState>>;

async fn health() -> Json<Value> {
    Json(json!({
        "status": true,
        "message": "API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Create the combined API router
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/health", get(health))
        // Login and token validation
        .nest("/v1/auth", auth::router())
        // Calendar routes, bearer token required
        .nest(
            "/v1/calendar",
            calendar::router().route_layer(middleware::from_fn_with_state(state, require_bearer)),
        )
}
