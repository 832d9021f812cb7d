mod auth;
mod calendar;

use std::sync::{Arc, RwLock};

use anyhow::Context;
use axum::{
    Router, middleware,
    response::{Html, Redirect},
    routing::{get, post},
};
use serde::Serialize;

use super::gate::admin_gate;
use crate::api::AppState;
use crate::api::public::ApiError;
use crate::presentation::Page;

type SharedState = Arc<RwLock<AppState>>;

fn render<T: Serialize>(
    state: &SharedState,
    page: Page,
    context: &T,
) -> Result<Html<String>, ApiError> {
    let templates = Arc::clone(&state.read().expect("Unable to read share state").templates);
    let html = templates
        .render(&page.to_string(), context)
        .with_context(|| format!("Failed to render {} page", page))?;
    Ok(Html(html))
}

async fn admin_home() -> Redirect {
    Redirect::to("/admin/calendar/page")
}

/// Login, logout and the session gated admin pages.
pub fn router(state: SharedState) -> Router<SharedState> {
    let admin = Router::new()
        .route("/admin", get(admin_home))
        .route("/admin/calendar/page", get(calendar::day_page))
        .route("/admin/calendar/detail", get(calendar::month_page))
        .route("/admin/calendar/configured-users", get(calendar::configured_users))
        .route("/admin/calendar/employees", get(calendar::employees))
        .route("/admin/calendar/events", get(calendar::events))
        .route("/admin/calendar/events-by-date", get(calendar::events_by_date))
        .route("/admin/calendar/events-month", get(calendar::events_month))
        .route_layer(middleware::from_fn_with_state(state, admin_gate));

    Router::new()
        .route("/", get(auth::login_page))
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout))
        .merge(admin)
}
