//! Parsing and policy checks for a caller's wind check request.
//!
//! None of this runs inside the evaluation pipeline; callers validate a
//! request here before handing its window and postal code to [`WindChecker`](crate::WindChecker).

use crate::types::date_window::DateWindow;
use chrono::{Months, NaiveDate};
use thiserror::Error;

/// Date format accepted in requests, e.g. `24.08.2023`.
pub const REQUEST_DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("Invalid date '{0}', expected DD.MM.YYYY")]
    InvalidDate(String),

    #[error("Invalid postal code '{0}', expected four digits")]
    InvalidPostalCode(String),

    #[error("End date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("Requested window spans {days} days, at most {max_days} are allowed")]
    SpanTooLong { days: i64, max_days: i64 },

    #[error("No data available before {origin}")]
    BeforeDataOrigin { origin: NaiveDate },

    #[error("Data is only available up to {latest}")]
    NotYetAvailable { latest: NaiveDate },

    #[error("Data older than {earliest} has been deleted")]
    BeyondRetention { earliest: NaiveDate },
}

/// First day the measurement store holds data for.
pub const DATA_ORIGIN_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2022, 8, 25) {
    Some(date) => date,
    None => panic!("invalid data origin date"),
};

/// Business-rule bounds on what the measurement store can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPolicy {
    /// First day the store holds data for.
    pub origin_date: NaiveDate,
    /// Days between a measurement and its arrival in the store.
    pub freshness_lag_days: u64,
    /// Data older than this many years is deleted.
    pub retention_years: u32,
    /// Longest allowed window, as the number of days between start and end.
    pub max_span_days: i64,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            origin_date: DATA_ORIGIN_DATE,
            freshness_lag_days: 1,
            retention_years: 2,
            max_span_days: 14,
        }
    }
}

impl RequestPolicy {
    /// Most recent date the store is expected to have data for.
    pub fn latest_available(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(chrono::Days::new(self.freshness_lag_days))
            .unwrap_or(today)
    }

    /// Oldest date still kept by the store.
    pub fn earliest_retained(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_months(Months::new(self.retention_years * 12))
            .unwrap_or(NaiveDate::MIN)
    }
}

/// A parsed request: the damage window and the postal code of the claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    pub window: DateWindow,
    pub postal_code: String,
    /// Place name, needed when the postal code covers several places.
    pub place: Option<String>,
}

impl CheckRequest {
    /// Parses `DD.MM.YYYY` dates and a four digit postal code.
    ///
    /// # Examples
    ///
    /// ```
    /// use windcheck::CheckRequest;
    ///
    /// let request = CheckRequest::parse("24.08.2023", "26.08.2023", "8001").unwrap();
    /// assert_eq!(request.window.num_days(), 3);
    /// assert!(CheckRequest::parse("2023-08-24", "26.08.2023", "8001").is_err());
    /// ```
    pub fn parse(start: &str, end: &str, postal_code: &str) -> Result<Self, RequestError> {
        let parse_date = |value: &str| {
            NaiveDate::parse_from_str(value.trim(), REQUEST_DATE_FORMAT)
                .map_err(|_| RequestError::InvalidDate(value.to_string()))
        };
        let start = parse_date(start)?;
        let end = parse_date(end)?;

        let postal_code = postal_code.trim();
        if postal_code.len() != 4 || !postal_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(RequestError::InvalidPostalCode(postal_code.to_string()));
        }

        Ok(Self {
            window: DateWindow::new(start, end),
            postal_code: postal_code.to_string(),
            place: None,
        })
    }

    pub fn with_place(mut self, place: impl Into<String>) -> Self {
        self.place = Some(place.into());
        self
    }

    /// Checks the window against the policy as of `today`.
    ///
    /// Checks run in a fixed order and the first failure is returned.
    pub fn validate(&self, policy: &RequestPolicy, today: NaiveDate) -> Result<(), RequestError> {
        let DateWindow { start, end } = self.window;
        if start > end {
            return Err(RequestError::EndBeforeStart { start, end });
        }
        let days = (end - start).num_days();
        if days > policy.max_span_days {
            return Err(RequestError::SpanTooLong {
                days,
                max_days: policy.max_span_days,
            });
        }
        if start < policy.origin_date || end < policy.origin_date {
            return Err(RequestError::BeforeDataOrigin {
                origin: policy.origin_date,
            });
        }
        let latest = policy.latest_available(today);
        if start > latest || end > latest {
            return Err(RequestError::NotYetAvailable { latest });
        }
        let earliest = policy.earliest_retained(today);
        if start < earliest {
            return Err(RequestError::BeyondRetention { earliest });
        }
        Ok(())
    }
}
