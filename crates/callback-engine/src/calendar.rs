//! Call-centre operating calendar.
//!
//! [`CalendarRules`] holds the weekday and Saturday hours, date-specific
//! overrides (shortened hours before a holiday) and the set of fully closed
//! dates. It is built once at startup and only read afterwards.
//!
//! Resolution of a date's hours follows a fixed precedence:
//!
//! 1. holiday: closed
//! 2. date override: the override's hours
//! 3. Saturday: Saturday hours (closed if none configured)
//! 4. Sunday: closed
//! 5. otherwise: weekday hours

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::{Result, ScheduleError};

/// How many days back [`CalendarRules::previous_business_day`] looks before
/// giving up.
const BUSINESS_DAY_LOOKBACK: i64 = 31;

/// Opening hours for a single date: open at `open`, closed from `close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DaySchedule {
    open: NaiveTime,
    close: NaiveTime,
}

impl DaySchedule {
    /// Create a schedule. Fails unless `open < close`.
    pub fn new(open: NaiveTime, close: NaiveTime) -> Result<Self> {
        if open >= close {
            return Err(ScheduleError::InvalidHours(format!(
                "opening time {} is not before closing time {}",
                open.format("%H:%M"),
                close.format("%H:%M")
            )));
        }
        Ok(Self { open, close })
    }

    pub fn open(&self) -> NaiveTime {
        self.open
    }

    pub fn close(&self) -> NaiveTime {
        self.close
    }

    /// Whether `time` lies in `[open, close)`.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.open <= time && time < self.close
    }
}

impl std::fmt::Display for DaySchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}",
            self.open.format("%H:%M"),
            self.close.format("%H:%M")
        )
    }
}

/// Process-wide operating calendar for the call centre.
#[derive(Debug, Clone)]
pub struct CalendarRules {
    timezone: Tz,
    weekday: DaySchedule,
    saturday: Option<DaySchedule>,
    overrides: HashMap<NaiveDate, DaySchedule>,
    holidays: HashSet<NaiveDate>,
    slot_minutes: u32,
    horizon_days: u32,
    lead_time: Duration,
    after_hours_block: Duration,
}

impl CalendarRules {
    pub fn builder(weekday: DaySchedule) -> CalendarRulesBuilder {
        CalendarRulesBuilder::new(weekday)
    }

    /// The reference call-centre calendar: weekdays 09:00-20:00, Saturdays
    /// 09:00-12:30, shortened hours on Christmas Eve and New Year's Eve 2014,
    /// 30-minute slots, a six-day horizon and a two-hour Monday-morning block.
    pub fn reference() -> Self {
        let full_day = DaySchedule {
            open: hm(9, 0),
            close: hm(20, 0),
        };
        let half_day = DaySchedule {
            open: hm(9, 0),
            close: hm(12, 30),
        };
        let eve = DaySchedule {
            open: hm(9, 0),
            close: hm(18, 30),
        };
        let overrides = [(2014, 12, 24), (2014, 12, 31)]
            .into_iter()
            .filter_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
            .map(|date| (date, eve))
            .collect();

        Self {
            timezone: chrono_tz::Europe::London,
            weekday: full_day,
            saturday: Some(half_day),
            overrides,
            holidays: HashSet::new(),
            slot_minutes: 30,
            horizon_days: 6,
            lead_time: Duration::zero(),
            after_hours_block: Duration::minutes(120),
        }
    }

    /// The hours in force on `date`, or `None` if the call centre is closed.
    pub fn schedule_for(&self, date: NaiveDate) -> Option<DaySchedule> {
        if self.holidays.contains(&date) {
            return None;
        }
        if let Some(schedule) = self.overrides.get(&date) {
            return Some(*schedule);
        }
        match date.weekday() {
            Weekday::Sat => self.saturday,
            Weekday::Sun => None,
            _ => Some(self.weekday),
        }
    }

    pub fn is_closed(&self, date: NaiveDate) -> bool {
        self.schedule_for(date).is_none()
    }

    /// Monday to Friday and open. Saturdays never count, even when open.
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.is_closed(date)
    }

    /// The most recent business day strictly before `date`.
    pub fn previous_business_day(&self, date: NaiveDate) -> Option<NaiveDate> {
        (1..=BUSINESS_DAY_LOOKBACK)
            .filter_map(|back| date.checked_sub_signed(Duration::days(back)))
            .find(|candidate| self.is_business_day(*candidate))
    }

    /// The moment `date` closes, or `None` if it is closed all day.
    pub fn closing_moment(&self, date: NaiveDate) -> Option<NaiveDateTime> {
        self.schedule_for(date).map(|s| date.and_time(s.close))
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn override_for(&self, date: NaiveDate) -> Option<DaySchedule> {
        self.overrides.get(&date).copied()
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn weekday_hours(&self) -> DaySchedule {
        self.weekday
    }

    pub fn saturday_hours(&self) -> Option<DaySchedule> {
        self.saturday
    }

    pub fn slot_minutes(&self) -> u32 {
        self.slot_minutes
    }

    pub fn slot_length(&self) -> Duration {
        Duration::minutes(i64::from(self.slot_minutes))
    }

    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    pub fn lead_time(&self) -> Duration {
        self.lead_time
    }

    pub fn after_hours_block(&self) -> Duration {
        self.after_hours_block
    }

    /// Configured date overrides, in no particular order.
    pub fn overrides(&self) -> impl Iterator<Item = (NaiveDate, DaySchedule)> + '_ {
        self.overrides.iter().map(|(date, hours)| (*date, *hours))
    }

    /// Configured holidays, in no particular order.
    pub fn holidays(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.holidays.iter().copied()
    }

    /// Number of configured holidays.
    pub fn holiday_count(&self) -> usize {
        self.holidays.len()
    }

    /// Number of configured date overrides.
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

impl Default for CalendarRules {
    fn default() -> Self {
        Self::reference()
    }
}

/// Builder for [`CalendarRules`].
///
/// Values are validated in [`CalendarRulesBuilder::build`]. An override that
/// lands on a holiday is accepted here and resolved in favour of the holiday;
/// configuration files reject it instead (see [`crate::config`]).
#[derive(Debug, Clone)]
pub struct CalendarRulesBuilder {
    timezone: Tz,
    weekday: DaySchedule,
    saturday: Option<DaySchedule>,
    overrides: HashMap<NaiveDate, DaySchedule>,
    holidays: HashSet<NaiveDate>,
    slot_minutes: u32,
    horizon_days: u32,
    lead_time: Duration,
    after_hours_block: Duration,
}

impl CalendarRulesBuilder {
    fn new(weekday: DaySchedule) -> Self {
        Self {
            timezone: chrono_tz::Europe::London,
            weekday,
            saturday: None,
            overrides: HashMap::new(),
            holidays: HashSet::new(),
            slot_minutes: 30,
            horizon_days: 6,
            lead_time: Duration::zero(),
            after_hours_block: Duration::minutes(120),
        }
    }

    pub fn timezone(mut self, tz: Tz) -> Self {
        self.timezone = tz;
        self
    }

    pub fn saturday(mut self, hours: DaySchedule) -> Self {
        self.saturday = Some(hours);
        self
    }

    pub fn override_date(mut self, date: NaiveDate, hours: DaySchedule) -> Self {
        self.overrides.insert(date, hours);
        self
    }

    pub fn holiday(mut self, date: NaiveDate) -> Self {
        self.holidays.insert(date);
        self
    }

    pub fn holidays(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.holidays.extend(dates);
        self
    }

    pub fn slot_minutes(mut self, minutes: u32) -> Self {
        self.slot_minutes = minutes;
        self
    }

    pub fn horizon_days(mut self, days: u32) -> Self {
        self.horizon_days = days;
        self
    }

    pub fn lead_time(mut self, lead: Duration) -> Self {
        self.lead_time = lead;
        self
    }

    pub fn after_hours_block(mut self, block: Duration) -> Self {
        self.after_hours_block = block;
        self
    }

    pub fn build(self) -> Result<CalendarRules> {
        if self.slot_minutes == 0 || (24 * 60) % self.slot_minutes != 0 {
            return Err(ScheduleError::InvalidGranularity(self.slot_minutes));
        }
        if self.horizon_days == 0 {
            return Err(ScheduleError::InvalidHorizon(self.horizon_days));
        }
        if self.lead_time < Duration::zero() {
            return Err(ScheduleError::Config("lead time must not be negative".into()));
        }
        if self.after_hours_block < Duration::zero() {
            return Err(ScheduleError::Config(
                "after-hours block must not be negative".into(),
            ));
        }

        check_on_grid("weekday", &self.weekday, self.slot_minutes)?;
        if let Some(saturday) = &self.saturday {
            check_on_grid("saturday", saturday, self.slot_minutes)?;
        }
        for (date, hours) in &self.overrides {
            check_on_grid(&date.to_string(), hours, self.slot_minutes)?;
            if self.holidays.contains(date) {
                tracing::warn!(%date, "date override falls on a holiday; the holiday wins");
            }
        }

        Ok(CalendarRules {
            timezone: self.timezone,
            weekday: self.weekday,
            saturday: self.saturday,
            overrides: self.overrides,
            holidays: self.holidays,
            slot_minutes: self.slot_minutes,
            horizon_days: self.horizon_days,
            lead_time: self.lead_time,
            after_hours_block: self.after_hours_block,
        })
    }
}

fn check_on_grid(label: &str, hours: &DaySchedule, slot_minutes: u32) -> Result<()> {
    let open = hours.open;
    let minute_of_day = open.num_seconds_from_midnight() / 60;
    if open.second() != 0 || open.nanosecond() != 0 || minute_of_day % slot_minutes != 0 {
        return Err(ScheduleError::InvalidHours(format!(
            "{} opening time {} is not on the {}-minute slot grid",
            label,
            open.format("%H:%M:%S"),
            slot_minutes
        )));
    }
    Ok(())
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}
