//! Playback time representation.
//! Match time is carried as fractional seconds (f64), the unit media elements report.

use std::time::Duration;

/// Playback time in seconds since the start of the media
pub type Seconds = f64;

/// Time constants shared by the resolvers and the controller
pub mod constants {
    use super::Seconds;

    /// Window within which a discrete event counts as "now" for commentary
    pub const EVENT_TOLERANCE: Seconds = 0.5;
    /// Minimum change before a media tick is propagated to dependents
    pub const TIME_UPDATE_THRESHOLD: Seconds = 0.5;
    /// Skip forward / backward step
    pub const SKIP_STEP: Seconds = 10.0;
}

/// Time zero constant
pub const ZERO: Seconds = 0.0;

/// Convert a std Duration to seconds
#[inline]
pub fn from_duration(duration: Duration) -> Seconds {
    duration.as_secs_f64()
}

/// Position of `time` within `duration` as a percentage (0-100).
/// A zero or unknown duration reports 0.
pub fn to_percent(time: Seconds, duration: Seconds) -> f64 {
    if duration > 0.0 && duration.is_finite() {
        time / duration * 100.0
    } else {
        0.0
    }
}

/// Inverse of [`to_percent`]
pub fn from_percent(percent: f64, duration: Seconds) -> Seconds {
    percent / 100.0 * duration
}

/// Format time as MM:SS for the transport bar
pub fn format_clock(seconds: Seconds) -> String {
    let total = seconds.max(0.0);
    let minutes = (total / 60.0).floor() as i64;
    let secs = (total % 60.0).floor() as i64;

    format!("{:02}:{:02}", minutes, secs)
}

/// Format time as M:SS for event listings
pub fn format_match_time(seconds: Seconds) -> String {
    let total = seconds.max(0.0);
    let minutes = (total / 60.0).floor() as i64;
    let secs = (total % 60.0).floor() as i64;

    format!("{}:{:02}", minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_conversion() {
        let seconds = from_duration(Duration::from_millis(1500));
        assert!((seconds - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_percent() {
        assert!((to_percent(45.0, 90.0) - 50.0).abs() < 1e-9);
        assert!((from_percent(50.0, 90.0) - 45.0).abs() < 1e-9);
        assert_eq!(to_percent(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(65.9), "01:05");
        assert_eq!(format_clock(-4.0), "00:00");
    }

    #[test]
    fn test_format_match_time() {
        assert_eq!(format_match_time(32.4), "0:32");
        assert_eq!(format_match_time(72.6), "1:12");
    }

    #[test]
    fn test_zero() {
        assert_eq!(ZERO, 0.0);
    }
}
