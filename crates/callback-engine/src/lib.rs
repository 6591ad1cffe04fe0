//! # callback-engine
//!
//! Call-centre callback availability: decides which callback slots a member of
//! the public may book, given the current moment and the call centre's
//! operating calendar.
//!
//! Every evaluator is a pure function of `(rules, now, candidate)`. Sample the
//! clock once per decision and pass the moment through.
//!
//! ## Modules
//!
//! - [`calendar`] - operating hours, date overrides, holidays
//! - [`slots`] - per-day slot generation on the time grid
//! - [`availability`] - same-day and specific-day booking predicates
//! - [`window`] - the multi-day window of bookable slots
//! - [`clock`] - clock providers for sampling "now"
//! - [`config`] - JSON configuration and bank holiday loading
//! - [`error`] - Error types

pub mod availability;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod error;
pub mod slots;
pub mod window;

pub use availability::{is_available_on, is_available_today};
pub use calendar::{CalendarRules, CalendarRulesBuilder, DaySchedule};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{parse_bank_holidays, parse_date, parse_moment, parse_time, RulesConfig};
pub use error::ScheduleError;
pub use slots::{slots_for, Slot, SlotIter};
pub use window::{enumerate_window, AvailabilityWindow};
