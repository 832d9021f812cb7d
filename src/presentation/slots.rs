//! Fixed time slots used to bucket a day's events.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Serialize;

pub const MINUTES_PER_DAY: u32 = 1440;
const DEFAULT_DURATION: u32 = 60;

/// Half-open `[start_minutes, end_minutes)` interval of a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    pub start_minutes: u32,
    pub end_minutes: u32,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotConfig {
    pub start_minutes: u32,
    pub end_minutes: u32,
    pub duration_minutes: u32,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            start_minutes: 0,
            end_minutes: MINUTES_PER_DAY,
            duration_minutes: DEFAULT_DURATION,
        }
    }
}

impl SlotConfig {
    /// Read `slot-config.xml`. Anything missing or unreadable falls back to
    /// the defaults.
    pub fn load(path: &Path) -> Self {
        match fs::read(path) {
            Ok(xml) => Self::from_xml(&xml),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!("No slot config at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                tracing::warn!("Failed to read {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn from_xml(xml: &[u8]) -> Self {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut current: Option<String> = None;
        let mut start = None;
        let mut end = None;
        let mut duration = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    current =
                        Some(String::from_utf8_lossy(e.local_name().as_ref()).to_lowercase());
                }
                Ok(Event::Text(ref e)) => {
                    let text = String::from_utf8_lossy(e.as_ref());
                    match current.as_deref() {
                        Some("starttime") => start = parse_time_to_minutes(&text),
                        Some("endtime") => end = parse_time_to_minutes(&text),
                        Some("slotdurationinminutes") => {
                            duration = text.trim().parse::<i64>().ok();
                        }
                        _ => {}
                    }
                }
                Ok(Event::End(_)) => current = None,
                Ok(Event::Eof) => break,
                Err(err) => {
                    tracing::warn!("Invalid slot config, using defaults: {}", err);
                    return Self::default();
                }
                _ => {}
            }
            buf.clear();
        }

        let defaults = Self::default();
        let start_minutes = start.unwrap_or(defaults.start_minutes);
        let end_minutes = end.unwrap_or(defaults.end_minutes);
        let duration_minutes = match duration {
            Some(minutes) if minutes > 0 => minutes.min(MINUTES_PER_DAY as i64) as u32,
            _ => defaults.duration_minutes,
        };

        if start_minutes >= end_minutes {
            tracing::warn!(
                start_minutes,
                end_minutes,
                "Slot config start is not before end, using full day"
            );
            return Self {
                duration_minutes,
                ..defaults
            };
        }

        Self {
            start_minutes,
            end_minutes,
            duration_minutes,
        }
    }
}

/// `HH:MM` to minutes since midnight. `23:59` means the end of the day.
pub fn parse_time_to_minutes(value: &str) -> Option<u32> {
    let (hours, minutes) = value.trim().split_once(':')?;
    let hours: u32 = hours.trim().parse().ok()?;
    let minutes: u32 = minutes.trim().parse().ok()?;

    match (hours, minutes) {
        (23, 59) => Some(MINUTES_PER_DAY),
        (0..=23, 0..=59) => Some(hours * 60 + minutes),
        _ => None,
    }
}

/// Minutes since midnight as `HH:MM`. The end of the day wraps to `00:00`.
pub fn format_minutes(minutes: u32) -> String {
    let minutes = minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

pub fn build_slots(config: &SlotConfig) -> Vec<TimeSlot> {
    let step = if config.duration_minutes == 0 {
        DEFAULT_DURATION
    } else {
        config.duration_minutes
    };

    let mut slots = Vec::new();
    let mut start = config.start_minutes;
    while start < config.end_minutes {
        let end = (start + step).min(config.end_minutes);
        slots.push(TimeSlot {
            start_minutes: start,
            end_minutes: end,
            label: format!("{}–{}", format_minutes(start), format_minutes(end)),
        });
        start = end;
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(slots: &[TimeSlot]) -> Vec<(u32, u32)> {
        slots
            .iter()
            .map(|s| (s.start_minutes, s.end_minutes))
            .collect()
    }

    #[test]
    fn it_clips_the_final_slot() {
        let slots = build_slots(&SlotConfig {
            start_minutes: 0,
            end_minutes: 120,
            duration_minutes: 50,
        });
        assert_eq!(bounds(&slots), vec![(0, 50), (50, 100), (100, 120)]);
        assert_eq!(slots[2].label, "01:40–02:00");
    }

    #[test]
    fn it_covers_the_range_contiguously() {
        for (start, end, duration) in [(0, 1440, 60), (480, 1080, 45), (540, 600, 7), (0, 1, 30)] {
            let slots = build_slots(&SlotConfig {
                start_minutes: start,
                end_minutes: end,
                duration_minutes: duration,
            });
            assert_eq!(slots.first().unwrap().start_minutes, start);
            assert_eq!(slots.last().unwrap().end_minutes, end);
            for pair in slots.windows(2) {
                assert_eq!(pair[0].end_minutes, pair[1].start_minutes);
                assert!(pair[0].start_minutes < pair[0].end_minutes);
            }
        }
    }

    #[test]
    fn it_labels_default_day() {
        let slots = build_slots(&SlotConfig::default());
        assert_eq!(slots.len(), 24);
        assert_eq!(slots[0].label, "00:00–01:00");
        assert_eq!(slots[23].label, "23:00–00:00");
    }

    #[test]
    fn it_parses_times() {
        assert_eq!(parse_time_to_minutes("09:30"), Some(570));
        assert_eq!(parse_time_to_minutes(" 9:05 "), Some(545));
        assert_eq!(parse_time_to_minutes("23:59"), Some(1440));
        assert_eq!(parse_time_to_minutes("24:00"), None);
        assert_eq!(parse_time_to_minutes("25:00"), None);
        assert_eq!(parse_time_to_minutes("noon"), None);
    }

    #[test]
    fn it_reads_slot_config_xml() {
        let config = SlotConfig::from_xml(
            b"<slotconfig><StartTime>09:00</StartTime><endtime>18:00</endtime><slotdurationinminutes>30</slotdurationinminutes></slotconfig>",
        );
        assert_eq!(
            config,
            SlotConfig {
                start_minutes: 540,
                end_minutes: 1080,
                duration_minutes: 30,
            }
        );
    }

    #[test]
    fn it_falls_back_on_invalid_values() {
        let config = SlotConfig::from_xml(
            b"<slotconfig><starttime>nine</starttime><slotdurationinminutes>-5</slotdurationinminutes></slotconfig>",
        );
        assert_eq!(config, SlotConfig::default());

        let inverted = SlotConfig::from_xml(
            b"<slotconfig><starttime>18:00</starttime><endtime>09:00</endtime></slotconfig>",
        );
        assert_eq!(inverted, SlotConfig::default());
    }

    #[test]
    fn it_uses_defaults_without_a_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            SlotConfig::load(&dir.path().join("slot-config.xml")),
            SlotConfig::default()
        );
    }
}
