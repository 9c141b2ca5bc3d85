// src/date_helper.rs
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Przelicza daty wpisane przez użytkownika (w jego strefie) na UTC.
#[derive(Debug, Clone, Copy)]
pub struct DateHelper {
    user_offset: FixedOffset,
}

impl Default for DateHelper {
    fn default() -> Self {
        Self {
            user_offset: Utc.fix(),
        }
    }
}

impl DateHelper {
    pub fn new(user_offset: FixedOffset) -> Self {
        Self { user_offset }
    }

    pub fn user_offset(&self) -> FixedOffset {
        self.user_offset
    }

    pub fn user_timezone_string_to_utc(&self, value: &str) -> Option<NaiveDateTime> {
        let value = value.trim();
        let local = DATE_TIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })?;

        self.user_offset
            .from_local_datetime(&local)
            .single()
            .map(|dt| dt.naive_utc())
    }
}
