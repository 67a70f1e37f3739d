//! Domain limits for gain and metering.
//!
//! Single source of truth shared by the console and any engine implementation.

// ── Gain ────────────────────────────────────────────────────────────
pub const GAIN_MIN_DB: f64 = -60.0;
pub const GAIN_MAX_DB: f64 = 12.0;
pub const DEFAULT_GAIN: f64 = 0.0;
/// Gain change per mouse wheel tick
pub const WHEEL_STEP_DB: f64 = 3.0;
/// Slider resolution
pub const GAIN_STEP_DB: f64 = 0.1;

// ── Metering ────────────────────────────────────────────────────────
/// Linear levels at or below this are treated as silence
pub const SILENCE_THRESHOLD: f64 = 1e-5;
/// dB value assigned to silence
pub const SILENCE_DB: f64 = -100.0;
/// Bottom of the meter scale (0%)
pub const METER_FLOOR_DB: f64 = -80.0;
/// Top of the meter scale (100%)
pub const METER_CEILING_DB: f64 = 12.0;

// ── Labels ──────────────────────────────────────────────────────────
pub const UNNAMED_LABEL: &str = "Unnamed";

/// Clamp a gain value into [`GAIN_MIN_DB`, `GAIN_MAX_DB`].
///
/// NaN has no meaningful position on the fader and maps to [`DEFAULT_GAIN`].
pub fn clamp_gain(gain: f64) -> f64 {
    if gain.is_nan() {
        DEFAULT_GAIN
    } else {
        gain.clamp(GAIN_MIN_DB, GAIN_MAX_DB)
    }
}
