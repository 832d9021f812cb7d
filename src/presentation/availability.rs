//! Busy/free summary of one user's events against the day's slots.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

use super::slots::{MINUTES_PER_DAY, TimeSlot, format_minutes};
use crate::calendar::CalendarEvent;

pub const NO_EVENTS: &str = "No events";
pub const NO_FREE_SLOTS: &str = "No free slots";

fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    DateTime::<FixedOffset>::parse_from_rfc3339(value)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Minute of the day in the timestamp's own offset.
pub fn minute_of_day(value: &str) -> Option<u32> {
    parse_date_time(value).map(|dt| minutes(&dt))
}

fn minutes(dt: &NaiveDateTime) -> u32 {
    dt.hour() * 60 + dt.minute()
}

/// Start and end minute of a timed event clamped to `day`. A start on an
/// earlier date counts from 0 and an end on a later date counts to the end
/// of the day.
fn event_minutes(event: &CalendarEvent, day: NaiveDate) -> Option<(u32, u32)> {
    let start = parse_date_time(event.start.as_deref()?)?;
    let end = parse_date_time(event.end.as_deref()?)?;
    if start.date() > day || end.date() < day {
        return None;
    }
    let start_minutes = if start.date() < day { 0 } else { minutes(&start) };
    let end_minutes = if end.date() > day {
        MINUTES_PER_DAY
    } else {
        minutes(&end)
    };
    Some((start_minutes, end_minutes))
}

/// Whether the event occupies any part of `slot` on `day`.
pub fn overlaps(event: &CalendarEvent, slot: &TimeSlot, day: NaiveDate) -> bool {
    if event.all_day {
        return true;
    }
    match event_minutes(event, day) {
        Some((start, end)) => start < slot.end_minutes && end > slot.start_minutes,
        None => false,
    }
}

/// `All day` or `HH:MM–HH:MM`.
pub fn time_label(event: &CalendarEvent) -> String {
    if event.all_day {
        return String::from("All day");
    }
    let start = event.start.as_deref().and_then(minute_of_day);
    let end = event.end.as_deref().and_then(minute_of_day);
    match (start, end) {
        (Some(start), Some(end)) => format!("{}–{}", format_minutes(start), format_minutes(end)),
        (Some(start), None) => format_minutes(start),
        _ => String::from("—"),
    }
}

/// One `time — summary (creator)` line per event, in the given order.
pub fn busy_lines(events: &[CalendarEvent]) -> Vec<String> {
    events
        .iter()
        .map(|event| match &event.creator {
            Some(creator) => format!("{} — {} ({})", time_label(event), event.summary, creator),
            None => format!("{} — {}", time_label(event), event.summary),
        })
        .collect()
}

/// Labels of the slots no event overlaps.
pub fn free_slots(events: &[CalendarEvent], slots: &[TimeSlot], day: NaiveDate) -> Vec<String> {
    slots
        .iter()
        .filter(|slot| !events.iter().any(|event| overlaps(event, slot, day)))
        .map(|slot| slot.label.clone())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub busy: Vec<String>,
    /// Display text for the free column.
    pub free: String,
    /// Display text for the busy column when there is nothing to list.
    pub busy_text: String,
}

pub fn summarize(events: &[CalendarEvent], slots: &[TimeSlot], day: NaiveDate) -> DaySummary {
    let busy = busy_lines(events);
    let free = free_slots(events, slots, day);

    DaySummary {
        busy_text: if busy.is_empty() {
            String::from(NO_EVENTS)
        } else {
            busy.join("\n")
        },
        busy,
        free: if free.is_empty() {
            String::from(NO_FREE_SLOTS)
        } else {
            free.join(", ")
        },
    }
}
