//! Effective gain policy and control-value normalization.
//!
//! Pure functions only. The normalization rules deliberately mirror the
//! loose-typed transport they guard: a malformed percent collapses to 0
//! (silence) rather than being rejected, because silence is always a safe
//! default and amplifying on bad input is not.

use serde_json::Value;

use crate::state::ControlState;

/// Upper bound for the boost percentage (9x amplification).
pub const MAX_PERCENT: f64 = 900.0;

/// Clamp a percent value into `[0, MAX_PERCENT]`, with NaN collapsing to 0.
///
/// Applied at every mutation site - external values are never trusted
/// without re-normalization.
pub fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, MAX_PERCENT)
    }
}

/// Map the control state to the gain multiplier actually applied.
///
/// Disabled forces unity gain regardless of the stored percent (the percent
/// is remembered, just not applied). Enabled yields `percent / 100`.
pub fn effective_gain(state: &ControlState) -> f64 {
    let raw = if state.enabled { state.percent } else { 100.0 };
    clamp_percent(raw) / 100.0
}

/// Truthiness of an untyped wire value, for the `enabled` flag.
pub fn coerce_flag(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric coercion of an untyped wire value, for the `percent` field.
///
/// Numbers pass through, numeric strings parse, everything else (including
/// a missing field, i.e. `Null`) becomes NaN and is squashed to 0 by
/// [`clamp_percent`] downstream. Out-of-range values are still clamped, so
/// `"Infinity"`-style inputs cap at [`MAX_PERCENT`].
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}
