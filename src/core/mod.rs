pub mod config;
pub use config::{AppConfig, parse_duration};
