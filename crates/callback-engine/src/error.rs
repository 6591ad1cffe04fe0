//! Error types for callback-engine configuration and parsing.
//!
//! Evaluating a candidate slot never fails: malformed but well-typed candidates
//! are simply not bookable. Errors only surface where rules are built or where
//! text is parsed into dates and times.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid operating hours: {0}")]
    InvalidHours(String),

    #[error("Invalid slot granularity: {0} minutes (must be positive and divide a day)")]
    InvalidGranularity(u32),

    #[error("Invalid horizon: {0} days (must be at least 1)")]
    InvalidHorizon(u32),

    #[error("Date override {0} falls on a configured holiday")]
    OverrideOnHoliday(NaiveDate),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
