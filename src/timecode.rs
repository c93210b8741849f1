//! Human time code parsing and formatting.
//!
//! Time codes arrive as `MM:SS`, `HH:MM:SS`, bare seconds, or any of those
//! with a fractional part. The canonical representation everywhere else in
//! the crate is a non-negative `f64` of seconds.

use crate::error::{MediacutError, Result};

/// Parse a time code into seconds, failing on non-numeric parts.
pub fn try_parse(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(MediacutError::TimecodeParse("empty time code".to_string()));
    }

    let parts: Vec<&str> = trimmed.split(':').collect();

    let parse_part = |part: &str| -> Result<f64> {
        part.trim()
            .parse::<f64>()
            .map_err(|_| MediacutError::TimecodeParse(text.to_string()))
    };

    let seconds = match parts.as_slice() {
        [s] => parse_part(s)?,
        [m, s] => parse_part(m)? * 60.0 + parse_part(s)?,
        [h, m, s] => parse_part(h)? * 3600.0 + parse_part(m)? * 60.0 + parse_part(s)?,
        _ => return Err(MediacutError::TimecodeParse(text.to_string())),
    };

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(MediacutError::TimecodeParse(text.to_string()));
    }

    Ok(seconds)
}

/// Lenient parse for untrusted model output: malformed input becomes 0.0.
pub fn parse(text: &str) -> f64 {
    try_parse(text).unwrap_or(0.0)
}

/// Format seconds as `MM:SS.sss`, or `HH:MM:SS.sss` from one hour up.
///
/// Callers must clamp negative values first; this rounds to milliseconds so
/// `parse(format(x))` reproduces `x` to 1 ms.
pub fn format(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
    } else {
        format!("{:02}:{:02}.{:03}", minutes, secs, millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_parts() {
        assert_eq!(try_parse("00:10").unwrap(), 10.0);
        assert_eq!(try_parse("01:30").unwrap(), 90.0);
        assert_eq!(try_parse("10:05.250").unwrap(), 605.25);
    }

    #[test]
    fn test_parse_three_parts() {
        assert_eq!(try_parse("01:00:00").unwrap(), 3600.0);
        assert_eq!(try_parse("00:01:30").unwrap(), 90.0);
        assert_eq!(try_parse("02:10:05.5").unwrap(), 7805.5);
    }

    #[test]
    fn test_parse_bare_seconds() {
        assert_eq!(try_parse("42").unwrap(), 42.0);
        assert_eq!(try_parse("12.345").unwrap(), 12.345);
    }

    #[test]
    fn test_parse_errors() {
        assert!(try_parse("").is_err());
        assert!(try_parse("abc").is_err());
        assert!(try_parse("1:2:3:4").is_err());
        assert!(try_parse("-10:00").is_err());
    }

    #[test]
    fn test_lenient_parse_defaults_to_zero() {
        assert_eq!(parse("garbage"), 0.0);
        assert_eq!(parse("00:10"), 10.0);
    }

    #[test]
    fn test_format_under_one_hour() {
        assert_eq!(format(0.0), "00:00.000");
        assert_eq!(format(90.5), "01:30.500");
        assert_eq!(format(605.25), "10:05.250");
    }

    #[test]
    fn test_format_with_hours() {
        assert_eq!(format(3600.0), "01:00:00.000");
        assert_eq!(format(7805.5), "02:10:05.500");
    }

    #[test]
    fn test_format_rounds_to_millis() {
        assert_eq!(format(59.9996), "01:00.000");
    }

    #[test]
    fn test_round_trip_within_one_millisecond() {
        for &x in &[0.0, 0.001, 1.5, 59.999, 60.0, 3599.999, 3600.0, 7805.432] {
            let back = parse(&format(x));
            assert!(
                (back - x).abs() < 0.001,
                "round trip of {} gave {}",
                x,
                back
            );
        }
    }
}
