//! Public types for the calendar API
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub email: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventsByDateQuery {
    pub date: Option<String>,
}

/// Year and month stay strings so that a non-integer value is a 400 with
/// our own message rather than an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct EventsMonthQuery {
    pub email: Option<String>,
    pub year: Option<String>,
    pub month: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DateExtra {
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct MonthExtra {
    pub year: i32,
    pub month: u32,
}
