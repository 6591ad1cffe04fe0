//! The look-ahead window of bookable days and slots offered on the form.
//!
//! Starting from today, dates are walked forward and kept when at least one
//! slot survives the availability rules, until `horizon_days` dates have been
//! collected. Closed and fully blocked dates are skipped, not listed empty.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};

use crate::availability::is_bookable;
use crate::calendar::CalendarRules;
use crate::slots::{slots_for, Slot};

/// Date key format consumed by the form layer, e.g. `20150214`.
pub const DATE_KEY_FORMAT: &str = "%Y%m%d";

/// Slot value format consumed by the form layer, e.g. `0930`.
pub const SLOT_FORMAT: &str = "%H%M";

/// Upper bound on how far the walk looks for bookable dates.
pub const MAX_SCAN_DAYS: u64 = 366;

/// Bookable slots per date, both in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityWindow {
    days: BTreeMap<NaiveDate, Vec<NaiveTime>>,
}

impl AvailabilityWindow {
    /// Dates in the window, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    /// Slots on `date`, empty if the date is not in the window.
    pub fn slots_on(&self, date: NaiveDate) -> &[NaiveTime] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, date: NaiveDate, time: NaiveTime) -> bool {
        self.slots_on(date).binary_search(&time).is_ok()
    }

    /// Every slot in the window, in chronological order.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.days
            .iter()
            .flat_map(|(date, times)| times.iter().map(|time| Slot { date: *date, time: *time }))
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.keys().next_back().copied()
    }

    /// Number of dates in the window.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// The form-facing mapping: `YYYYMMDD` keys to `HHMM` slot values.
    pub fn to_choices(&self) -> BTreeMap<String, Vec<String>> {
        self.days
            .iter()
            .map(|(date, times)| {
                (
                    date.format(DATE_KEY_FORMAT).to_string(),
                    times
                        .iter()
                        .map(|t| t.format(SLOT_FORMAT).to_string())
                        .collect(),
                )
            })
            .collect()
    }
}

impl Serialize for AvailabilityWindow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_choices().serialize(serializer)
    }
}

/// The first `horizon_days` bookable dates from `now`'s date onward, each with
/// its bookable slots.
pub fn enumerate_window(
    rules: &CalendarRules,
    now: NaiveDateTime,
    horizon_days: u32,
) -> AvailabilityWindow {
    let mut days = BTreeMap::new();
    let today = now.date();

    for offset in 0..MAX_SCAN_DAYS {
        if days.len() >= horizon_days as usize {
            break;
        }
        let Some(date) = today.checked_add_days(Days::new(offset)) else {
            break;
        };
        let times: Vec<NaiveTime> = slots_for(rules, date)
            .filter(|time| is_bookable(rules, date, *time, now))
            .collect();
        if !times.is_empty() {
            days.insert(date, times);
        }
    }

    AvailabilityWindow { days }
}

/// The last date of the configured window at `now`, or `None` if nothing is
/// bookable within [`MAX_SCAN_DAYS`].
///
/// Agrees with `enumerate_window(rules, now, rules.horizon_days()).last_date()`
/// but only probes each date up to its first bookable slot.
pub fn horizon_end(rules: &CalendarRules, now: NaiveDateTime) -> Option<NaiveDate> {
    let today = now.date();
    let wanted = rules.horizon_days() as usize;

    (0..MAX_SCAN_DAYS)
        .map_while(|offset| today.checked_add_days(Days::new(offset)))
        .filter(|date| slots_for(rules, *date).any(|time| is_bookable(rules, *date, time, now)))
        .take(wanted)
        .last()
}
