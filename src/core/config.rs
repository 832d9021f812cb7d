use std::env;

use anyhow::{Context, Result, anyhow};
use chrono::Duration;

/// Process-wide configuration. Built once at startup and handed to the
/// token issuer, the calendar adapter and the web tier.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Base URL the web tier uses to reach the internal API.
    pub api_base_url: String,
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub admin_id: i64,
    pub admin_email: String,
    pub admin_name: String,
    /// When unset the login endpoint only checks the email.
    pub admin_password: Option<String>,
    pub session_validity_minutes: i64,
    pub users_config_path: String,
    pub slot_config_path: String,
    /// Google service account key with domain-wide delegation.
    pub credentials_path: String,
    pub google_api_base: String,
    pub calendar_scope: String,
    pub calendar_id: String,
    /// Number of per-user provider calls the batch endpoint runs at once.
    pub batch_concurrency: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::from("http://127.0.0.1:3002"),
            access_secret: String::from("CalendarTrackingAccessSecret"),
            refresh_secret: String::from("CalendarTrackingRefreshSecret"),
            access_ttl: Duration::hours(1),
            refresh_ttl: Duration::days(7),
            admin_id: 1,
            admin_email: String::from("admin@localhost"),
            admin_name: String::from("Admin"),
            admin_password: None,
            session_validity_minutes: 1440,
            users_config_path: String::from("config/users.xml"),
            slot_config_path: String::from("config/slot-config.xml"),
            credentials_path: String::from("calendaraccount.json"),
            google_api_base: String::from("https://www.googleapis.com/calendar/v3"),
            calendar_scope: String::from("https://www.googleapis.com/auth/calendar"),
            calendar_id: String::from("primary"),
            batch_concurrency: 1,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by any `CALTRACK_*` variables that are set.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let access_ttl = match env::var("CALTRACK_ACCESS_EXPIRATION") {
            Ok(v) => parse_duration(&v).context("Invalid CALTRACK_ACCESS_EXPIRATION")?,
            Err(_) => defaults.access_ttl,
        };
        let refresh_ttl = match env::var("CALTRACK_REFRESH_EXPIRATION") {
            Ok(v) => parse_duration(&v).context("Invalid CALTRACK_REFRESH_EXPIRATION")?,
            Err(_) => defaults.refresh_ttl,
        };
        let admin_id = match env::var("CALTRACK_ADMIN_ID") {
            Ok(v) => v.trim().parse().context("Invalid CALTRACK_ADMIN_ID")?,
            Err(_) => defaults.admin_id,
        };
        let session_validity_minutes = match env::var("CALTRACK_SESSION_VALIDITY") {
            Ok(v) => v.trim().parse().context("Invalid CALTRACK_SESSION_VALIDITY")?,
            Err(_) => defaults.session_validity_minutes,
        };
        let batch_concurrency = match env::var("CALTRACK_BATCH_CONCURRENCY") {
            Ok(v) => v
                .trim()
                .parse::<usize>()
                .context("Invalid CALTRACK_BATCH_CONCURRENCY")?
                .max(1),
            Err(_) => defaults.batch_concurrency,
        };

        Ok(Self {
            api_base_url: env::var("CALTRACK_API_URL").unwrap_or(defaults.api_base_url),
            access_secret: env::var("CALTRACK_ACCESS_SECRET").unwrap_or(defaults.access_secret),
            refresh_secret: env::var("CALTRACK_REFRESH_SECRET")
                .unwrap_or(defaults.refresh_secret),
            access_ttl,
            refresh_ttl,
            admin_id,
            admin_email: env::var("CALTRACK_ADMIN_EMAIL").unwrap_or(defaults.admin_email),
            admin_name: env::var("CALTRACK_ADMIN_NAME").unwrap_or(defaults.admin_name),
            admin_password: env::var("CALTRACK_ADMIN_PASSWORD").ok(),
            session_validity_minutes,
            users_config_path: env::var("CALTRACK_USERS_CONFIG")
                .unwrap_or(defaults.users_config_path),
            slot_config_path: env::var("CALTRACK_SLOT_CONFIG")
                .unwrap_or(defaults.slot_config_path),
            credentials_path: env::var("CALTRACK_CREDENTIALS_PATH")
                .unwrap_or(defaults.credentials_path),
            google_api_base: env::var("CALTRACK_GOOGLE_API_BASE")
                .unwrap_or(defaults.google_api_base),
            calendar_scope: env::var("CALTRACK_CALENDAR_SCOPE")
                .unwrap_or(defaults.calendar_scope),
            calendar_id: env::var("CALTRACK_CALENDAR_ID").unwrap_or(defaults.calendar_id),
            batch_concurrency,
        })
    }
}

/// Parse lifetimes written as `45s`, `30m`, `1h`, `7d` or a bare number
/// of seconds.
pub fn parse_duration(value: &str) -> Result<Duration> {
    let value = value.trim();
    let (amount, unit) = match value.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => value.split_at(idx),
        None => (value, "s"),
    };
    let amount: i64 = amount
        .parse()
        .map_err(|_| anyhow!("Expected a number followed by s, m, h or d: {}", value))?;

    match unit.trim() {
        "s" => Ok(Duration::seconds(amount)),
        "m" => Ok(Duration::minutes(amount)),
        "h" => Ok(Duration::hours(amount)),
        "d" => Ok(Duration::days(amount)),
        other => Err(anyhow!("Unknown duration unit '{}' in {}", other, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn it_parses_durations() {
        assert_eq!(parse_duration("1h").unwrap(), Duration::hours(1));
        assert_eq!(parse_duration("7d").unwrap(), Duration::days(7));
        assert_eq!(parse_duration("30m").unwrap(), Duration::minutes(30));
        assert_eq!(parse_duration("90").unwrap(), Duration::seconds(90));
        assert_eq!(parse_duration(" 45s ").unwrap(), Duration::seconds(45));
    }

    #[test]
    fn it_rejects_bad_durations() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("h").is_err());
        assert!(parse_duration("3w").is_err());
    }

    #[test]
    #[serial]
    fn it_reads_overrides_from_env() {
        unsafe {
            env::set_var("CALTRACK_ACCESS_EXPIRATION", "15m");
            env::set_var("CALTRACK_ADMIN_EMAIL", "ops@example.com");
            env::set_var("CALTRACK_BATCH_CONCURRENCY", "0");
        }

        let config = AppConfig::from_env().unwrap();

        unsafe {
            env::remove_var("CALTRACK_ACCESS_EXPIRATION");
            env::remove_var("CALTRACK_ADMIN_EMAIL");
            env::remove_var("CALTRACK_BATCH_CONCURRENCY");
        }

        assert_eq!(config.access_ttl, Duration::minutes(15));
        assert_eq!(config.refresh_ttl, Duration::days(7));
        assert_eq!(config.admin_email, "ops@example.com");
        assert_eq!(config.batch_concurrency, 1);
        assert_eq!(config.users_config_path, "config/users.xml");
    }

    #[test]
    #[serial]
    fn it_fails_on_invalid_numbers() {
        unsafe {
            env::set_var("CALTRACK_SESSION_VALIDITY", "forever");
        }
        let result = AppConfig::from_env();
        unsafe {
            env::remove_var("CALTRACK_SESSION_VALIDITY");
        }
        assert!(result.is_err());
    }
}
