//! WASM bindings for callback-engine.
//!
//! Lets the browser-side booking form render the same window and run the same
//! checks the server validates against. Rules travel as the JSON document read
//! by `callback_engine::config`; results come back as JSON strings or booleans.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p callback-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/callback-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/callback_engine_wasm.wasm
//! ```

use callback_engine::window::{DATE_KEY_FORMAT, SLOT_FORMAT};
use callback_engine::{
    enumerate_window, is_available_on, is_available_today, parse_date, parse_moment, parse_time,
    slots_for, CalendarRules, ScheduleError,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

type EngineResult<T> = callback_engine::error::Result<T>;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct DayScheduleDto {
    date: String,
    closed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    open: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    close: Option<String>,
    slots: Vec<String>,
}

// ---------------------------------------------------------------------------
// Plain Rust implementations (testable off-wasm)
// ---------------------------------------------------------------------------

fn today_impl(rules_json: &str, now: &str, time: &str) -> EngineResult<bool> {
    let rules = CalendarRules::from_json(rules_json)?;
    Ok(is_available_today(&rules, parse_time(time)?, parse_moment(now)?))
}

fn on_impl(rules_json: &str, now: &str, date: &str, time: &str) -> EngineResult<bool> {
    let rules = CalendarRules::from_json(rules_json)?;
    Ok(is_available_on(
        &rules,
        parse_date(date)?,
        parse_time(time)?,
        parse_moment(now)?,
    ))
}

fn window_impl(rules_json: &str, now: &str, days: Option<u32>) -> EngineResult<String> {
    let rules = CalendarRules::from_json(rules_json)?;
    let days = days.unwrap_or_else(|| rules.horizon_days());
    let window = enumerate_window(&rules, parse_moment(now)?, days);
    to_json(&window)
}

fn schedule_impl(rules_json: &str, date: &str) -> EngineResult<String> {
    let rules = CalendarRules::from_json(rules_json)?;
    let date = parse_date(date)?;
    let hours = rules.schedule_for(date);
    let dto = DayScheduleDto {
        date: date.format(DATE_KEY_FORMAT).to_string(),
        closed: hours.is_none(),
        open: hours.map(|h| h.open().format("%H:%M").to_string()),
        close: hours.map(|h| h.close().format("%H:%M").to_string()),
        slots: slots_for(&rules, date)
            .map(|t| t.format(SLOT_FORMAT).to_string())
            .collect(),
    };
    to_json(&dto)
}

fn to_json<T: Serialize>(value: &T) -> EngineResult<String> {
    serde_json::to_string(value)
        .map_err(|e| ScheduleError::Config(format!("Serialization error: {}", e)))
}

fn to_js(e: ScheduleError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Whether `time` (`HH:MM`) later today can be booked at `now`
/// (`YYYY-MM-DDTHH:MM`, operating timezone).
#[wasm_bindgen(js_name = "isAvailableToday")]
pub fn is_available_today_js(rules_json: &str, now: &str, time: &str) -> Result<bool, JsValue> {
    today_impl(rules_json, now, time).map_err(to_js)
}

/// Whether `time` on `date` (`YYYY-MM-DD` or `YYYYMMDD`) can be booked at `now`.
#[wasm_bindgen(js_name = "isAvailableOn")]
pub fn is_available_on_js(
    rules_json: &str,
    now: &str,
    date: &str,
    time: &str,
) -> Result<bool, JsValue> {
    on_impl(rules_json, now, date, time).map_err(to_js)
}

/// The bookable window as a JSON object of `YYYYMMDD` keys to `HHMM` slot
/// arrays. `days` defaults to the configured horizon.
#[wasm_bindgen(js_name = "enumerateWindow")]
pub fn enumerate_window_js(rules_json: &str, now: &str, days: Option<u32>) -> Result<String, JsValue> {
    window_impl(rules_json, now, days).map_err(to_js)
}

/// Opening hours and slots for `date` as a JSON object.
#[wasm_bindgen(js_name = "scheduleFor")]
pub fn schedule_for_js(rules_json: &str, date: &str) -> Result<String, JsValue> {
    schedule_impl(rules_json, date).map_err(to_js)
}
