//! Day and month views derived from event lists. Nothing here keeps state
//! between requests.

pub mod availability;
pub mod month;
pub mod slots;
pub mod templates;

pub use availability::{DaySummary, overlaps, summarize};
pub use month::{MonthGrid, build_month_grid};
pub use slots::{SlotConfig, TimeSlot, build_slots};
pub use templates::{Page, templates};
