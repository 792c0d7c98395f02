//! Clock and progress helpers for the transport box.
//!
//! Everything here is pure: the playback controller feeds it raw seconds and
//! gets label text / a 0..=1 ratio back.

/// Shown instead of a clock when a time is not representable (NaN, infinite or negative).
pub const PLACEHOLDER: &str = "--:--";

/// Format `seconds` as a zero-padded `HH:MM:SS` clock.
///
/// The hour field is always present so elapsed and total labels line up.
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return PLACEHOLDER.to_string();
    }

    let secs = seconds.floor() as u64;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Format the time left until `duration` as `-HH:MM:SS`.
pub fn format_remaining(elapsed: f64, duration: f64) -> String {
    if !duration.is_finite() || duration < 0.0 {
        return PLACEHOLDER.to_string();
    }
    let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
    // Round the remainder up so it hits zero together with the elapsed label.
    let rem = (duration - elapsed).max(0.0).ceil();
    format!("-{}", format_clock(rem))
}

/// Ratio of `elapsed` over `duration`, clamped to `0.0..=1.0`.
///
/// Returns `None` when the duration is unknown, zero or negative; callers keep
/// the previous progress in that case.
pub fn progress_ratio(elapsed: f64, duration: f64) -> Option<f64> {
    if !duration.is_finite() || duration <= 0.0 || elapsed.is_nan() {
        return None;
    }
    Some((elapsed / duration).clamp(0.0, 1.0))
}
