//! Six-week month grid with events placed on their start date.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use super::availability::minute_of_day;
use super::slots::format_minutes;
use crate::calendar::CalendarEvent;

pub const GRID_CELLS: usize = 42;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellEvent {
    /// `HH:MM summary` or `All day summary`.
    pub text: String,
    pub all_day: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DayCell {
    /// `YYYY-MM-DD`, `None` for cells outside the month.
    pub date: Option<String>,
    pub day: Option<u32>,
    pub events: Vec<CellEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub cells: Vec<DayCell>,
}

impl MonthGrid {
    /// Rows of seven cells, Sunday first.
    pub fn weeks(&self) -> Vec<Vec<DayCell>> {
        self.cells.chunks(7).map(|week| week.to_vec()).collect()
    }
}

/// The first ten characters of a start value, which is the date for both
/// all-day dates and date-times.
pub fn date_key(start: &str) -> &str {
    start.get(..10).unwrap_or(start)
}

/// Such as `February 2024`.
pub fn month_label(year: i32, month: u32) -> Option<String> {
    NaiveDate::from_ymd_opt(year, month, 1).map(|first| first.format("%B %Y").to_string())
}

/// The month `delta` months away from `year`/`month`.
pub fn shift_month(year: i32, month: u32, delta: i32) -> Option<(i32, u32)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let shifted = if delta >= 0 {
        first.checked_add_months(Months::new(delta as u32))?
    } else {
        first.checked_sub_months(Months::new(delta.unsigned_abs()))?
    };
    Some((shifted.year(), shifted.month()))
}

fn cell_event(event: &CalendarEvent) -> CellEvent {
    let time = if event.all_day {
        String::from("All day")
    } else {
        event
            .start
            .as_deref()
            .and_then(minute_of_day)
            .map(format_minutes)
            .unwrap_or_default()
    };
    CellEvent {
        text: format!("{} {}", time, event.summary).trim().to_string(),
        all_day: event.all_day,
    }
}

pub fn build_month_grid(year: i32, month: u32, events: &[CalendarEvent]) -> Option<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let days_in_month = first
        .checked_add_months(Months::new(1))?
        .pred_opt()?
        .day() as usize;
    let offset = first.weekday().num_days_from_sunday() as usize;

    let mut cells = vec![DayCell::default(); GRID_CELLS];
    for day in 1..=days_in_month {
        let key = format!("{:04}-{:02}-{:02}", year, month, day);
        let events = events
            .iter()
            .filter(|event| event.start.as_deref().map(date_key) == Some(key.as_str()))
            .map(cell_event)
            .collect();
        cells[offset + day - 1] = DayCell {
            date: Some(key),
            day: Some(day as u32),
            events,
        };
    }

    Some(MonthGrid {
        year,
        month,
        label: month_label(year, month)?,
        cells,
    })
}
