//! `H:MM:SS` formatting for report timestamps and durations

/// Format seconds as `H:MM:SS`, truncating fractional seconds. Negative
/// input is clamped to zero.
pub fn hms(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };
    format!("{}:{:02}:{:02}", total / 3600, total / 60 % 60, total % 60)
}

/// Format seconds as zero-padded `HH:MM:SS`, used for video length.
pub fn hhmmss(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };
    format!("{:02}:{:02}:{:02}", total / 3600, total / 60 % 60, total % 60)
}
