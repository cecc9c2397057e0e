//! Shared utility functions for MDP crates.

/// Date utility functions
pub mod dates {
    use crate::error::DateError;
    use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta};

    /// Calendar-day format used for prediction dates and CLI arguments.
    pub const DATE_FORMAT: &str = "%Y-%m-%d";

    /// Accepted ISO-8601 local timestamp layouts, tried in order.
    const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

    const MONTH_ABBREVIATIONS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> Result<NaiveDate, DateError> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| DateError::InvalidFormat {
            input: s.to_string(),
            expected: "YYYY-MM-DD",
        })
    }

    /// Parse an ISO-8601 local timestamp ("2016-01-05T15:20:00").
    ///
    /// A bare date is accepted and taken as midnight.
    pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, DateError> {
        let trimmed = s.trim();
        for format in TIMESTAMP_FORMATS {
            if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(ts);
            }
        }
        parse_date(trimmed)
            .map(start_of_day)
            .map_err(|_| DateError::InvalidFormat {
                input: s.to_string(),
                expected: "YYYY-MM-DDTHH:MM[:SS]",
            })
    }

    /// Midnight at the start of `date`.
    pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
        date.and_time(chrono::NaiveTime::MIN)
    }

    /// 1-based day of the year (Jan 1 = 1).
    pub fn day_of_year(date: &NaiveDate) -> u32 {
        date.ordinal()
    }

    /// First and last calendar day of the given month.
    pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), DateError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| DateError::OutOfRange(format!("{}-{:02}", year, month)))?;
        let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
        let next_first = NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .ok_or_else(|| DateError::OutOfRange(format!("{}-{:02}", next_year, next_month)))?;
        let last = next_first
            .pred_opt()
            .ok_or_else(|| DateError::OutOfRange(format!("{}-{:02}", year, month)))?;
        Ok((first, last))
    }

    /// The calendar month immediately before (year, month).
    pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
        if month == 1 {
            (year - 1, 12)
        } else {
            (year, month - 1)
        }
    }

    /// First day of every month from `start`'s month through `end`'s month.
    pub fn month_starts(start: &NaiveDate, end: &NaiveDate) -> Vec<NaiveDate> {
        let mut result = Vec::new();
        let mut cursor = NaiveDate::from_ymd_opt(start.year(), start.month(), 1);
        let last = NaiveDate::from_ymd_opt(end.year(), end.month(), 1);
        while let (Some(current), Some(last)) = (cursor, last) {
            if current > last {
                break;
            }
            result.push(current);
            cursor = current.checked_add_months(chrono::Months::new(1));
        }
        result
    }

    /// Dates `today - step_days * i` for `i = count-1 ..= 0`, oldest first.
    ///
    /// This is a fixed-day approximation of "i months ago", not calendar
    /// month arithmetic.
    pub fn stepped_dates_back(
        today: &NaiveDate,
        count: u32,
        step_days: i64,
    ) -> Result<Vec<NaiveDate>, DateError> {
        (0..count)
            .rev()
            .map(|i| {
                today
                    .checked_sub_signed(TimeDelta::days(step_days * i64::from(i)))
                    .ok_or_else(|| DateError::OutOfRange(format!("{} - {}d", today, step_days * i64::from(i))))
            })
            .collect()
    }

    /// Every calendar day from `start` through `end` (inclusive).
    #[derive(Clone, Eq, PartialEq, Copy, Debug)]
    pub struct DateRange {
        next: Option<NaiveDate>,
        end: NaiveDate,
    }

    impl DateRange {
        pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
            Self {
                next: (start <= end).then_some(start),
                end,
            }
        }
    }

    impl Iterator for DateRange {
        type Item = NaiveDate;
        fn next(&mut self) -> Option<Self::Item> {
            let current = self.next?;
            self.next = current.succ_opt().filter(|d| *d <= self.end);
            Some(current)
        }
    }

    /// Three-letter English month label ("Jan" .. "Dec").
    pub fn month_abbreviation(month: u32) -> &'static str {
        MONTH_ABBREVIATIONS
            .get(month.wrapping_sub(1) as usize)
            .copied()
            .unwrap_or("???")
    }

}

/// Error types
pub mod error {
    use thiserror::Error;

    /// A date or timestamp argument that could not be understood.
    #[derive(Debug, Error, PartialEq)]
    pub enum DateError {
        #[error("invalid date '{input}' (expected {expected})")]
        InvalidFormat { input: String, expected: &'static str },

        #[error("date out of range: {0}")]
        OutOfRange(String),
    }
}
