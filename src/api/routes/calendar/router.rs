//! Router for the calendar API

use std::sync::{Arc, RwLock};

use axum::{Json, Router, extract::State, routing::get};
use axum_extra::extract::Query;
use chrono::NaiveDate;

use super::public;
use crate::api::public::{ApiError, Envelope};
use crate::api::state::AppState;
use crate::calendar::{
    CalendarEvent, CalendarService, MonitoredUser, TimeWindow, UserEvents, parse_date,
};

type SharedState = Arc<RwLock<AppState>>;

fn calendar(state: &SharedState) -> CalendarService {
    state
        .read()
        .expect("Unable to read share state")
        .calendar
        .clone()
}

fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn valid_date(value: &str) -> Result<NaiveDate, ApiError> {
    parse_date(value)
        .ok_or_else(|| ApiError::BadRequest(String::from("Invalid date format. Use YYYY-MM-DD.")))
}

async fn configured_users(
    State(state): State<SharedState>,
) -> Result<Json<Envelope<Vec<MonitoredUser>>>, ApiError> {
    let users = calendar(&state).list_monitored_users()?;
    Ok(Json(Envelope::success("Configured users", users)))
}

// Legacy name for the configured users list
async fn employees(
    State(state): State<SharedState>,
) -> Result<Json<Envelope<Vec<MonitoredUser>>>, ApiError> {
    let users = calendar(&state).list_monitored_users()?;
    Ok(Json(Envelope::success("Employees list", users)))
}

async fn events(
    State(state): State<SharedState>,
    Query(params): Query<public::EventsQuery>,
) -> Result<Json<Envelope<Vec<CalendarEvent>, public::DateExtra>>, ApiError> {
    let (Some(email), Some(date)) = (required(params.email), required(params.date)) else {
        return Err(ApiError::BadRequest(String::from(
            "Query params email and date (YYYY-MM-DD) are required.",
        )));
    };
    let day = valid_date(&date)?;

    let events = calendar(&state).events_for_user_on_date(&email, day).await?;
    Ok(Json(
        Envelope::success("Events for date", events).with(public::DateExtra { date }),
    ))
}

async fn events_by_date(
    State(state): State<SharedState>,
    Query(params): Query<public::EventsByDateQuery>,
) -> Result<Json<Envelope<Vec<UserEvents>, public::DateExtra>>, ApiError> {
    let date = required(params.date).ok_or_else(|| {
        ApiError::BadRequest(String::from("Query param date (YYYY-MM-DD) is required."))
    })?;
    let day = valid_date(&date)?;

    let entries = calendar(&state).events_for_all_users_on_date(day).await?;
    Ok(Json(
        Envelope::success("Events by date for all users", entries)
            .with(public::DateExtra { date }),
    ))
}

async fn events_month(
    State(state): State<SharedState>,
    Query(params): Query<public::EventsMonthQuery>,
) -> Result<Json<Envelope<Vec<CalendarEvent>, public::MonthExtra>>, ApiError> {
    let (Some(email), Some(year), Some(month)) = (
        required(params.email),
        required(params.year),
        required(params.month),
    ) else {
        return Err(ApiError::BadRequest(String::from(
            "Query params email, year and month are required.",
        )));
    };
    let year: i32 = year
        .parse()
        .map_err(|_| ApiError::BadRequest(String::from("Year must be an integer.")))?;
    let month: u32 = month
        .parse()
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| {
            ApiError::BadRequest(String::from("Month must be an integer between 1 and 12."))
        })?;
    if TimeWindow::for_month(year, month).is_none() {
        return Err(ApiError::BadRequest(String::from("Year is out of range.")));
    }

    let events = calendar(&state)
        .events_for_user_in_month(&email, year, month)
        .await?;
    Ok(Json(
        Envelope::success("Events for month", events).with(public::MonthExtra { year, month }),
    ))
}

/// Create the calendar router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/configured-users", get(configured_users))
        .route("/employees", get(employees))
        .route("/events", get(events))
        .route("/events-by-date", get(events_by_date))
        .route("/events-month", get(events_month))
}
