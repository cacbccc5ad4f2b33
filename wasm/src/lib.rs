//! WebAssembly module for the Restaurant POS admin front end
//!
//! Provides client-side computation for:
//! - Usage bar tier and width on the fryer dashboard
//! - Alert previews while entering oil usage
//! - Low-stock flags and report date checks
//! - Gating dashboard polls so refreshes never overlap

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

use shared::alerts::{alert_severity, usage_percentage, AlertThresholds, UsageStat};

// Re-export shared types for use in JavaScript
pub use shared::alerts::{usage_bar_tier, usage_bar_width, UsageBarTier};
pub use shared::validation::{is_low_stock, parse_report_date};

fn to_decimal(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// CSS class for a usage bar: "normal", "warning" or "critical"
#[wasm_bindgen]
pub fn usage_bar_class(usage_pct: f64) -> String {
    usage_bar_tier(to_decimal(usage_pct)).as_str().to_string()
}

/// Bar fill in percent, clamped to 0..=100
#[wasm_bindgen]
pub fn usage_bar_fill(usage_pct: f64) -> f64 {
    to_f64(usage_bar_width(to_decimal(usage_pct)))
}

/// Usage as a percentage of target, two decimal places
#[wasm_bindgen]
pub fn calculate_usage_percentage(total_units: f64, target_units: f64) -> f64 {
    to_f64(usage_percentage(to_decimal(total_units), to_decimal(target_units)))
}

/// Whether a stock balance should be highlighted
#[wasm_bindgen]
pub fn is_stock_low(current_stock: f64, threshold: f64) -> bool {
    is_low_stock(to_decimal(current_stock), to_decimal(threshold))
}

/// Check a report date typed into the filter form
#[wasm_bindgen]
pub fn is_valid_report_date(input: &str) -> bool {
    parse_report_date(input).is_some()
}

#[derive(Deserialize)]
struct AlertPreviewInput {
    total_units: Decimal,
    target_usage_units: Decimal,
    time_elapsed_hours: Decimal,
    thresholds: Option<AlertThresholds>,
}

/// Severity an active batch would alert at: "low", "medium", "high" or "none"
#[wasm_bindgen]
pub fn preview_alert_severity(input_json: &str) -> Result<String, JsValue> {
    let input: AlertPreviewInput = serde_json::from_str(input_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid alert input JSON: {}", e)))?;

    let stat = UsageStat {
        usage_percentage: usage_percentage(input.total_units, input.target_usage_units),
        total_units: input.total_units,
        target_usage_units: input.target_usage_units,
        time_elapsed_hours: input.time_elapsed_hours,
    };
    let thresholds = input.thresholds.unwrap_or_default();

    Ok(alert_severity(&stat, &thresholds)
        .map(|s| s.as_str())
        .unwrap_or("none")
        .to_string())
}

/// Fixed-interval poll gate for the kitchen display and fryer dashboard.
///
/// A poll may start only when none is in flight and at least the refresh
/// interval has passed since the previous one started.
#[wasm_bindgen]
pub struct PollGate {
    interval_ms: f64,
    last_started_ms: Option<f64>,
    in_flight: bool,
}

#[wasm_bindgen]
impl PollGate {
    #[wasm_bindgen(constructor)]
    pub fn new(refresh_seconds: u32) -> PollGate {
        PollGate {
            interval_ms: f64::from(refresh_seconds.max(1)) * 1000.0,
            last_started_ms: None,
            in_flight: false,
        }
    }

    /// Claim the next poll at `now_ms`; false means skip this tick
    pub fn try_begin(&mut self, now_ms: f64) -> bool {
        if self.in_flight {
            return false;
        }
        if let Some(last) = self.last_started_ms {
            if now_ms - last < self.interval_ms {
                return false;
            }
        }
        self.in_flight = true;
        self.last_started_ms = Some(now_ms);
        true
    }

    /// Claim the next poll using the browser clock
    pub fn try_begin_now(&mut self) -> bool {
        let started = self.try_begin(js_sys::Date::now());
        if !started && self.in_flight {
            web_sys::console::debug_1(&JsValue::from_str("Skipping poll, previous refresh still running"));
        }
        started
    }

    /// Mark the in-flight poll as finished, successful or not
    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    #[wasm_bindgen(getter)]
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }
}
