use std::env;
use std::net::SocketAddr;

use chrono::{FixedOffset, Offset, Utc, Weekday};

use crate::error::AppError;

/// Display settings shared by every calendar computation. Day keys are
/// derived in `utc_offset`, never in the server's local zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalendarConfig {
    pub utc_offset: FixedOffset,
    pub week_start: Weekday,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            utc_offset: Utc.fix(),
            week_start: Weekday::Sun,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub calendar: CalendarConfig,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://courses.db".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid: {}", e)))?;

        let calendar = CalendarConfig {
            utc_offset: parse_offset(env::var("CALENDAR_UTC_OFFSET").ok().as_deref())?,
            week_start: parse_week_start(env::var("CALENDAR_WEEK_START").ok().as_deref())?,
        };

        Ok(Self {
            database_url,
            bind_addr,
            calendar,
        })
    }
}

fn parse_offset(value: Option<&str>) -> Result<FixedOffset, AppError> {
    match value {
        None => Ok(CalendarConfig::default().utc_offset),
        Some(raw) => raw
            .trim()
            .parse::<FixedOffset>()
            .map_err(|e| AppError::Config(format!("CALENDAR_UTC_OFFSET {:?} is invalid: {}", raw, e))),
    }
}

fn parse_week_start(value: Option<&str>) -> Result<Weekday, AppError> {
    let Some(raw) = value else {
        return Ok(CalendarConfig::default().week_start);
    };
    match raw.trim().parse::<Weekday>() {
        Ok(day @ (Weekday::Sun | Weekday::Mon)) => Ok(day),
        _ => Err(AppError::Config(format!(
            "CALENDAR_WEEK_START must be sunday or monday, got {:?}",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_defaults_to_utc() {
        assert_eq!(parse_offset(None).unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn offset_accepts_signed_hours_and_minutes() {
        assert_eq!(parse_offset(Some("+03:00")).unwrap().local_minus_utc(), 3 * 3600);
        assert_eq!(parse_offset(Some("-05:30")).unwrap().local_minus_utc(), -(5 * 3600 + 1800));
    }

    #[test]
    fn offset_rejects_zone_names() {
        assert!(matches!(parse_offset(Some("Asia/Riyadh")), Err(AppError::Config(_))));
    }

    #[test]
    fn week_start_only_allows_sunday_or_monday() {
        assert_eq!(parse_week_start(None).unwrap(), Weekday::Sun);
        assert_eq!(parse_week_start(Some("monday")).unwrap(), Weekday::Mon);
        assert!(parse_week_start(Some("wednesday")).is_err());
    }
}
