use crate::errors::{AppError, AppResult};
use chrono::{DateTime, FixedOffset, Local, NaiveDate};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| AppError::InvalidDate(s.to_string()))
}

/// "Mar 01, 2025 10:15 AM" in local time.
pub fn format_checkin(ts: &DateTime<FixedOffset>) -> String {
    ts.with_timezone(&Local).format("%b %d, %Y %I:%M %p").to_string()
}

/// "2025-03-01 10:15" in local time, for tables.
pub fn format_short(ts: &DateTime<FixedOffset>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_only() {
        assert_eq!(parse_date("2025-03-01").unwrap(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert!(matches!(parse_date("03/01/2025"), Err(AppError::InvalidDate(_))));
    }
}
