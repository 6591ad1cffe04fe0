//! Is a callback slot bookable at a given moment?
//!
//! Two entry points mirror the two choices offered on the booking form:
//!
//! - [`is_available_today`]: a time later today. Only slots strictly after
//!   `now + lead time` (rounded up to the slot grid) qualify, so the slot `now`
//!   falls in is never offered.
//! - [`is_available_on`]: an explicit date and time. Future dates must be open,
//!   on the grid, inside the look-ahead window, and must not be caught by the
//!   after-hours block.
//!
//! The after-hours block keeps operators from being booked first thing after a
//! weekend or holiday: once the last business day before the gap has closed,
//! the first `after_hours_block` of the next business day is withheld until
//! that day arrives.
//!
//! Both predicates are total. Off-grid times, closed dates and past dates are
//! simply `false`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::calendar::CalendarRules;
use crate::slots::{is_slot, round_up_to_slot};
use crate::window;

/// Whether `time` today (the date of `now`) can be booked.
pub fn is_available_today(rules: &CalendarRules, time: NaiveTime, now: NaiveDateTime) -> bool {
    let today = now.date();
    is_slot(rules, today, time) && is_after_same_day_threshold(rules, time, now)
}

/// Whether `time` on `date` can be booked, judged at `now`.
pub fn is_available_on(
    rules: &CalendarRules,
    date: NaiveDate,
    time: NaiveTime,
    now: NaiveDateTime,
) -> bool {
    if !is_bookable(rules, date, time, now) {
        return false;
    }
    window::horizon_end(rules, now).is_some_and(|last| date <= last)
}

/// Every rule except the look-ahead horizon.
pub(crate) fn is_bookable(
    rules: &CalendarRules,
    date: NaiveDate,
    time: NaiveTime,
    now: NaiveDateTime,
) -> bool {
    let today = now.date();
    if date < today {
        return false;
    }
    if date == today {
        return is_available_today(rules, time, now);
    }
    is_slot(rules, date, time) && !is_blocked_after_hours(rules, date, time, now)
}

/// The earliest slot boundary that is still too soon to book today, as seconds
/// since midnight. Slots strictly after it qualify.
pub fn same_day_threshold(rules: &CalendarRules, now: NaiveDateTime) -> i64 {
    let earliest = i64::from(now.time().num_seconds_from_midnight())
        + i64::from(now.time().nanosecond() > 0)
        + rules.lead_time().num_seconds();
    round_up_to_slot(earliest, rules.slot_minutes())
}

fn is_after_same_day_threshold(rules: &CalendarRules, time: NaiveTime, now: NaiveDateTime) -> bool {
    i64::from(time.num_seconds_from_midnight()) > same_day_threshold(rules, now)
}

/// Whether `date`'s opening stretch is withheld at `now` because the business
/// day before a closed gap has already shut.
pub fn is_blocked_after_hours(
    rules: &CalendarRules,
    date: NaiveDate,
    time: NaiveTime,
    now: NaiveDateTime,
) -> bool {
    if now.date() >= date || !rules.is_business_day(date) {
        return false;
    }
    let Some(hours) = rules.schedule_for(date) else {
        return false;
    };
    let Some(previous) = rules.previous_business_day(date) else {
        return false;
    };
    // Consecutive business days: no gap to protect.
    if previous.succ_opt() == Some(date) {
        return false;
    }
    let Some(previous_close) = rules.closing_moment(previous) else {
        return false;
    };
    if now < previous_close {
        return false;
    }

    let block_end = i64::from(hours.open().num_seconds_from_midnight())
        + rules.after_hours_block().num_seconds();
    i64::from(time.num_seconds_from_midnight()) < block_end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn threshold_on_boundary_is_the_boundary() {
        let rules = CalendarRules::reference();
        assert_eq!(same_day_threshold(&rules, at(2014, 11, 24, 9, 30)), 9 * 3600 + 1800);
    }

    #[test]
    fn threshold_rounds_up_partial_minutes() {
        let rules = CalendarRules::reference();
        let now = NaiveDate::from_ymd_opt(2014, 11, 24)
            .unwrap()
            .and_hms_opt(9, 30, 1)
            .unwrap();
        assert_eq!(same_day_threshold(&rules, now), 10 * 3600);
    }

    #[test]
    fn threshold_includes_lead_time() {
        let rules = CalendarRules::builder(CalendarRules::reference().weekday_hours())
            .lead_time(chrono::Duration::minutes(90))
            .build()
            .unwrap();
        assert_eq!(same_day_threshold(&rules, at(2014, 11, 24, 9, 30)), 11 * 3600);
    }
}
