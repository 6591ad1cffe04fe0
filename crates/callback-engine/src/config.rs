//! Loading [`CalendarRules`] from JSON configuration.
//!
//! ```json
//! {
//!   "timezone": "Europe/London",
//!   "slot_minutes": 30,
//!   "horizon_days": 6,
//!   "lead_time_minutes": 0,
//!   "after_hours_block_minutes": 120,
//!   "hours": { "weekday": ["09:00", "20:00"], "saturday": ["09:00", "12:30"] },
//!   "overrides": { "2014-12-24": ["09:00", "18:30"] },
//!   "holidays": ["2014-12-25"]
//! }
//! ```
//!
//! Only `hours.weekday` is required. Unlike the programmatic builder, a file
//! that puts an override on a holiday is rejected outright.
//!
//! Holidays can also be taken from a GOV.UK `bank-holidays.json` document with
//! [`parse_bank_holidays`].

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::calendar::{CalendarRules, DaySchedule};
use crate::error::{Result, ScheduleError};

/// Serialized form of [`CalendarRules`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: u32,
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
    #[serde(default)]
    pub lead_time_minutes: u32,
    #[serde(default = "default_after_hours_block_minutes")]
    pub after_hours_block_minutes: u32,
    pub hours: HoursConfig,
    #[serde(default)]
    pub overrides: BTreeMap<NaiveDate, [String; 2]>,
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
}

/// Default hours as `[open, close]` pairs of `HH:MM` strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HoursConfig {
    pub weekday: [String; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturday: Option<[String; 2]>,
}

fn default_timezone() -> String {
    "Europe/London".to_string()
}

fn default_slot_minutes() -> u32 {
    30
}

fn default_horizon_days() -> u32 {
    6
}

fn default_after_hours_block_minutes() -> u32 {
    120
}

impl RulesConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ScheduleError::Config(e.to_string()))
    }

    /// Add holidays, e.g. from [`parse_bank_holidays`].
    pub fn with_holidays(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.holidays.extend(dates);
        self.holidays.sort_unstable();
        self.holidays.dedup();
        self
    }

    /// Validate and convert into [`CalendarRules`].
    ///
    /// # Errors
    /// `InvalidTimezone`, `InvalidTime`, `InvalidHours`, `InvalidGranularity`,
    /// `InvalidHorizon`, or `OverrideOnHoliday` for the first problem found.
    pub fn into_rules(self) -> Result<CalendarRules> {
        let tz: Tz = self
            .timezone
            .parse()
            .map_err(|_| ScheduleError::InvalidTimezone(self.timezone.clone()))?;

        if let Some(date) = self
            .overrides
            .keys()
            .find(|date| self.holidays.contains(*date))
        {
            return Err(ScheduleError::OverrideOnHoliday(*date));
        }

        let mut builder = CalendarRules::builder(parse_hours(&self.hours.weekday)?)
            .timezone(tz)
            .slot_minutes(self.slot_minutes)
            .horizon_days(self.horizon_days)
            .lead_time(Duration::minutes(i64::from(self.lead_time_minutes)))
            .after_hours_block(Duration::minutes(i64::from(self.after_hours_block_minutes)))
            .holidays(self.holidays.iter().copied());

        if let Some(saturday) = &self.hours.saturday {
            builder = builder.saturday(parse_hours(saturday)?);
        }
        for (date, hours) in &self.overrides {
            builder = builder.override_date(*date, parse_hours(hours)?);
        }

        let rules = builder.build()?;
        tracing::debug!(
            timezone = %rules.timezone(),
            overrides = rules.override_count(),
            holidays = rules.holiday_count(),
            "loaded call-centre calendar rules"
        );
        Ok(rules)
    }
}

impl From<&CalendarRules> for RulesConfig {
    fn from(rules: &CalendarRules) -> Self {
        let mut holidays: Vec<NaiveDate> = rules.holidays().collect();
        holidays.sort_unstable();

        Self {
            timezone: rules.timezone().name().to_string(),
            slot_minutes: rules.slot_minutes(),
            horizon_days: rules.horizon_days(),
            lead_time_minutes: whole_minutes(rules.lead_time()),
            after_hours_block_minutes: whole_minutes(rules.after_hours_block()),
            hours: HoursConfig {
                weekday: format_hours(&rules.weekday_hours()),
                saturday: rules.saturday_hours().as_ref().map(format_hours),
            },
            overrides: rules
                .overrides()
                .map(|(date, hours)| (date, format_hours(&hours)))
                .collect(),
            holidays,
        }
    }
}

impl CalendarRules {
    /// Parse and validate a JSON rules document.
    pub fn from_json(json: &str) -> Result<Self> {
        RulesConfig::from_json(json)?.into_rules()
    }
}

fn parse_hours(pair: &[String; 2]) -> Result<DaySchedule> {
    DaySchedule::new(parse_time(&pair[0])?, parse_time(&pair[1])?)
}

fn format_hours(hours: &DaySchedule) -> [String; 2] {
    [
        hours.open().format("%H:%M").to_string(),
        hours.close().format("%H:%M").to_string(),
    ]
}

fn whole_minutes(duration: Duration) -> u32 {
    u32::try_from(duration.num_minutes()).unwrap_or(0)
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| ScheduleError::InvalidTime(format!("'{}': {}", s, e)))
}

/// Parse `YYYY-MM-DD`, or the form's `YYYYMMDD` key format.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
        .map_err(|e| ScheduleError::InvalidDate(format!("'{}': {}", s, e)))
}

/// Parse a local moment such as `2015-02-13T21:00` (seconds optional, a space
/// may replace the `T`).
pub fn parse_moment(s: &str) -> Result<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| ScheduleError::InvalidDate(format!("'{}' is not a local date and time", s)))
}

#[derive(Deserialize)]
struct BankHolidayDivision {
    events: Vec<BankHolidayEvent>,
}

#[derive(Deserialize)]
struct BankHolidayEvent {
    date: NaiveDate,
}

/// Extract one division's dates (e.g. `"england-and-wales"`) from a GOV.UK
/// `bank-holidays.json` document.
pub fn parse_bank_holidays(json: &str, division: &str) -> Result<Vec<NaiveDate>> {
    let mut divisions: HashMap<String, BankHolidayDivision> = serde_json::from_str(json)
        .map_err(|e| ScheduleError::Config(format!("invalid bank holiday JSON: {}", e)))?;

    let selected = divisions.remove(division).ok_or_else(|| {
        let mut known: Vec<&String> = divisions.keys().collect();
        known.sort();
        ScheduleError::Config(format!(
            "unknown bank holiday division '{}' (available: {:?})",
            division, known
        ))
    })?;

    let mut dates: Vec<NaiveDate> = selected.events.into_iter().map(|e| e.date).collect();
    dates.sort_unstable();
    dates.dedup();
    Ok(dates)
}
