use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Query;
use chrono::{Datelike, Days, NaiveDate, Utc};
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::render;
use crate::api::AppState;
use crate::api::public::ApiError;
use crate::calendar::{CalendarEvent, UserEvents, parse_date};
use crate::presentation::month::shift_month;
use crate::presentation::{Page, SlotConfig, build_month_grid, build_slots, summarize};
use crate::web::client::{InternalApiClient, ProxyError};
use crate::web::gate::AdminContext;

type SharedState = Arc<RwLock<AppState>>;

const API_CALENDAR: &str = "/api/v1/calendar";

fn api_client(state: &SharedState) -> InternalApiClient {
    state
        .read()
        .expect("Unable to read share state")
        .api_client
        .clone()
}

async fn fetch(
    state: &SharedState,
    admin: &AdminContext,
    route: &str,
    query: &[(&str, String)],
) -> Result<Value, ProxyError> {
    api_client(state)
        .call_with_token(
            Method::GET,
            &format!("{}/{}", API_CALENDAR, route),
            query,
            None,
            &admin.access_token,
        )
        .await
}

/// Decode the `data` array of an API envelope.
fn envelope_data<T: for<'de> Deserialize<'de>>(body: &Value) -> Result<Vec<T>, ApiError> {
    serde_json::from_value(body["data"].clone())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Unexpected API response: {}", e)))
}

// JSON proxies

async fn proxy(
    state: SharedState,
    admin: AdminContext,
    route: &str,
    params: HashMap<String, String>,
    fallback: &str,
) -> Response {
    let query: Vec<(&str, String)> = params
        .iter()
        .map(|(k, v)| (k.as_str(), v.clone()))
        .collect();

    match fetch(&state, &admin, route, &query).await {
        Ok(mut body) => {
            if let Some(object) = body.as_object_mut() {
                object.insert(String::from("status"), json!("success"));
                object.remove("message");
            }
            Json(body).into_response()
        }
        Err(err) => (
            err.status(),
            Json(json!({
                "status": false,
                "message": err.message_or(fallback),
                "error": err.error_code(),
                "data": [],
            })),
        )
            .into_response(),
    }
}

pub async fn configured_users(
    State(state): State<SharedState>,
    Extension(admin): Extension<AdminContext>,
) -> Response {
    proxy(state, admin, "configured-users", HashMap::new(), "Failed to load users").await
}

pub async fn employees(
    State(state): State<SharedState>,
    Extension(admin): Extension<AdminContext>,
) -> Response {
    proxy(state, admin, "employees", HashMap::new(), "Failed to load employees").await
}

pub async fn events(
    State(state): State<SharedState>,
    Extension(admin): Extension<AdminContext>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    proxy(state, admin, "events", params, "Failed to load events").await
}

pub async fn events_by_date(
    State(state): State<SharedState>,
    Extension(admin): Extension<AdminContext>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    proxy(state, admin, "events-by-date", params, "Failed to load events").await
}

pub async fn events_month(
    State(state): State<SharedState>,
    Extension(admin): Extension<AdminContext>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    proxy(state, admin, "events-month", params, "Failed to load events").await
}

// Pages

#[derive(Debug, Deserialize)]
pub struct DayPageQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
struct DayRow {
    email: String,
    name: Option<String>,
    detail_url: String,
    busy: Vec<String>,
    busy_text: String,
    free: String,
    error: Option<String>,
}

fn detail_url(email: &str, name: Option<&str>, year_month: Option<(i32, u32)>) -> String {
    let mut url = format!(
        "/admin/calendar/detail?email={}",
        urlencoding::encode(email)
    );
    if let Some(name) = name {
        url.push_str(&format!("&name={}", urlencoding::encode(name)));
    }
    if let Some((year, month)) = year_month {
        url.push_str(&format!("&year={}&month={}", year, month));
    }
    url
}

pub async fn day_page(
    State(state): State<SharedState>,
    Extension(admin): Extension<AdminContext>,
    Query(params): Query<DayPageQuery>,
) -> Result<Response, ApiError> {
    let today = Utc::now().date_naive();
    let (day, mut error) = match params.date.as_deref().map(str::trim) {
        None | Some("") => (today, None),
        Some(value) => match parse_date(value) {
            Some(day) => (day, None),
            None => (today, Some(String::from("Invalid date format. Use YYYY-MM-DD."))),
        },
    };
    let date = day.format("%Y-%m-%d").to_string();

    let slot_path = PathBuf::from(
        &state
            .read()
            .expect("Unable to read share state")
            .config
            .slot_config_path,
    );
    let slots = build_slots(&SlotConfig::load(&slot_path));

    let rows = match fetch(&state, &admin, "events-by-date", &[("date", date.clone())]).await {
        Ok(body) => envelope_data::<UserEvents>(&body)?
            .into_iter()
            .map(|entry| {
                let summary = summarize(&entry.events, &slots, day);
                DayRow {
                    detail_url: detail_url(&entry.email, entry.name.as_deref(), None),
                    email: entry.email,
                    name: entry.name,
                    busy: summary.busy,
                    busy_text: summary.busy_text,
                    free: summary.free,
                    error: entry.error,
                }
            })
            .collect(),
        Err(err) => {
            error = Some(err.message_or("Failed to load events"));
            Vec::new()
        }
    };

    let prev_date = day.checked_sub_days(Days::new(1)).unwrap_or(day);
    let next_date = day.checked_add_days(Days::new(1)).unwrap_or(day);
    let html = render(
        &state,
        Page::Day,
        &json!({
            "title": "Calendar",
            "admin_name": admin.display_name,
            "date": date,
            "date_label": day.format("%A, %-d %B %Y").to_string(),
            "prev_date": prev_date.format("%Y-%m-%d").to_string(),
            "next_date": next_date.format("%Y-%m-%d").to_string(),
            "error": error,
            "rows": rows,
        }),
    )?;
    Ok(html.into_response())
}

#[derive(Debug, Deserialize)]
pub struct MonthPageQuery {
    pub email: Option<String>,
    pub name: Option<String>,
    pub year: Option<String>,
    pub month: Option<String>,
}

pub async fn month_page(
    State(state): State<SharedState>,
    Extension(admin): Extension<AdminContext>,
    Query(params): Query<MonthPageQuery>,
) -> Result<Response, ApiError> {
    let Some(email) = params
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
    else {
        return Ok(Redirect::to("/admin/calendar/page").into_response());
    };
    let name = params.name.filter(|n| !n.trim().is_empty());

    let today = Utc::now().date_naive();
    let year = params
        .year
        .and_then(|y| y.trim().parse::<i32>().ok())
        .unwrap_or(today.year());
    let month = params
        .month
        .and_then(|m| m.trim().parse::<u32>().ok())
        .filter(|m| (1..=12).contains(m))
        .unwrap_or(today.month());
    let (year, month) = if NaiveDate::from_ymd_opt(year, month, 1).is_some() {
        (year, month)
    } else {
        (today.year(), today.month())
    };

    let query = [
        ("email", email.clone()),
        ("year", year.to_string()),
        ("month", month.to_string()),
    ];
    let (events, error) = match fetch(&state, &admin, "events-month", &query).await {
        Ok(body) => (envelope_data::<CalendarEvent>(&body)?, None),
        Err(err) => (Vec::new(), Some(err.message_or("Failed to load events"))),
    };

    let grid = build_month_grid(year, month, &events).ok_or_else(|| {
        ApiError::Internal(anyhow::anyhow!("Invalid month {}-{}", year, month))
    })?;
    let prev = shift_month(year, month, -1).unwrap_or((year, month));
    let next = shift_month(year, month, 1).unwrap_or((year, month));

    let html = render(
        &state,
        Page::Month,
        &json!({
            "title": grid.label,
            "name": name,
            "email": email,
            "label": grid.label,
            "prev_url": detail_url(&email, name.as_deref(), Some(prev)),
            "next_url": detail_url(&email, name.as_deref(), Some(next)),
            "error": error,
            "weeks": grid.weeks(),
        }),
    )?;
    Ok(html.into_response())
}
