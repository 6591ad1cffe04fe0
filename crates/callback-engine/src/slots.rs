//! Slot generation on the configured time grid.
//!
//! A day's slots start at its opening time and step by the slot length while
//! strictly before closing. Closed days have no slots.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::Serialize;

use crate::calendar::CalendarRules;

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// A bookable unit: one slot start on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.date, self.time.format("%H:%M"))
    }
}

/// Lazy iterator over one day's slot start times.
///
/// Cloning yields an iterator that restarts from the clone point.
#[derive(Debug, Clone)]
pub struct SlotIter {
    next: u32,
    close: u32,
    step: u32,
}

impl SlotIter {
    fn empty() -> Self {
        Self {
            next: 0,
            close: 0,
            step: 1,
        }
    }
}

impl Iterator for SlotIter {
    type Item = NaiveTime;

    fn next(&mut self) -> Option<NaiveTime> {
        if self.next >= self.close {
            return None;
        }
        let time = NaiveTime::from_num_seconds_from_midnight_opt(self.next, 0)?;
        self.next += self.step;
        Some(time)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.close.saturating_sub(self.next).div_ceil(self.step) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SlotIter {}

impl std::iter::FusedIterator for SlotIter {}

/// Every slot start time on `date`, in ascending order.
pub fn slots_for(rules: &CalendarRules, date: NaiveDate) -> SlotIter {
    match rules.schedule_for(date) {
        Some(hours) => SlotIter {
            next: hours.open().num_seconds_from_midnight(),
            close: close_seconds(hours.close()),
            step: rules.slot_minutes() * 60,
        },
        None => SlotIter::empty(),
    }
}

/// Whether `time` is one of `date`'s slot start times.
pub fn is_slot(rules: &CalendarRules, date: NaiveDate, time: NaiveTime) -> bool {
    match rules.schedule_for(date) {
        Some(hours) => hours.contains(time) && is_on_grid(time, rules.slot_minutes()),
        None => false,
    }
}

/// Whether `time` falls exactly on a slot boundary counted from midnight.
///
/// A zero slot length has no grid, so nothing is on it.
pub fn is_on_grid(time: NaiveTime, slot_minutes: u32) -> bool {
    let Some(step) = slot_minutes.checked_mul(60).filter(|step| *step > 0) else {
        return false;
    };
    time.nanosecond() == 0 && time.num_seconds_from_midnight() % step == 0
}

/// Round a number of seconds since midnight up to the next slot boundary.
///
/// The result may reach or pass `86_400` when rounding from late evening. A
/// zero slot length leaves `seconds` unchanged.
pub fn round_up_to_slot(seconds: i64, slot_minutes: u32) -> i64 {
    let step = i64::from(slot_minutes) * 60;
    if step == 0 {
        return seconds;
    }
    (seconds + step - 1).div_euclid(step) * step
}

/// `NaiveTime` cannot represent 24:00, so a 23:59:59 close is widened to the
/// end of the day.
fn close_seconds(close: NaiveTime) -> u32 {
    let secs = close.num_seconds_from_midnight();
    if secs == SECONDS_PER_DAY - 1 {
        SECONDS_PER_DAY
    } else {
        secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn round_up_keeps_boundaries() {
        assert_eq!(round_up_to_slot(9 * 3600 + 30 * 60, 30), 9 * 3600 + 30 * 60);
    }

    #[test]
    fn round_up_moves_past_boundary() {
        assert_eq!(round_up_to_slot(9 * 3600 + 31 * 60, 30), 10 * 3600);
        assert_eq!(round_up_to_slot(9 * 3600 + 30 * 60 + 1, 30), 10 * 3600);
    }

    #[test]
    fn round_up_past_midnight() {
        assert_eq!(round_up_to_slot(23 * 3600 + 45 * 60, 30), 24 * 3600);
    }

    #[test]
    fn grid_rejects_seconds_and_odd_minutes() {
        assert!(is_on_grid(t(9, 0), 30));
        assert!(is_on_grid(t(9, 30), 30));
        assert!(!is_on_grid(t(9, 15), 30));
        assert!(!is_on_grid(NaiveTime::from_hms_opt(9, 0, 1).unwrap(), 30));
    }

    #[test]
    fn zero_slot_length_is_total() {
        assert!(!is_on_grid(t(0, 0), 0));
        assert!(!is_on_grid(t(9, 30), 0));
        assert_eq!(round_up_to_slot(9 * 3600 + 17, 0), 9 * 3600 + 17);
    }

    #[test]
    fn size_hint_matches_count() {
        let rules = CalendarRules::reference();
        let date = NaiveDate::from_ymd_opt(2015, 2, 17).unwrap();
        let iter = slots_for(&rules, date);
        assert_eq!(iter.len(), 22);
        assert_eq!(iter.count(), 22);
    }

    #[test]
    fn end_of_day_close_is_widened() {
        assert_eq!(close_seconds(NaiveTime::from_hms_opt(23, 59, 59).unwrap()), SECONDS_PER_DAY);
        assert_eq!(close_seconds(t(20, 0)), 20 * 3600);
    }
}
