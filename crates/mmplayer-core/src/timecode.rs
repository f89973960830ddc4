//! Timecode codec
//!
//! Converts between seconds and the two textual forms used by caption
//! sources and timeline labels:
//! - SMPTE-style clock time: `HH:MM:SS` (parsing also accepts `MM:SS.fff`,
//!   `SS.fff` and hour fields wider than two digits)
//! - Duration: `45s`, `2.5s`
//!
//! Parsing never fails. Missing input yields [`NO_TIMECODE`] and malformed
//! numeric fields yield `NaN`, so callers check [`is_valid`] before using a
//! parsed time.

/// Sentinel returned by [`parse_time`] when no timecode was supplied
pub const NO_TIMECODE: f64 = -1.0;

/// Format a number of seconds as `HH:MM:SS`.
///
/// The value is floored to whole seconds. The hours field is padded to two
/// digits but may grow wider for very long media. Negative and non-finite
/// inputs format as `00:00:00`.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Format a number of seconds as a duration: `45s`
pub fn format_duration(seconds: f64) -> String {
    format!("{}s", seconds)
}

/// Parse a clock timecode or a duration into seconds.
///
/// A trailing `s` selects duration parsing of the remainder. Otherwise the
/// text is split on `:`; the rightmost field is read as a float, every other
/// field as an integer, and field `i` (counted from the right) contributes
/// `field * 60^i`.
pub fn parse_time(text: Option<&str>) -> f64 {
    let Some(text) = text else {
        return NO_TIMECODE;
    };

    if let Some(duration) = text.strip_suffix('s') {
        return parse_float_prefix(duration);
    }

    text.split(':')
        .rev()
        .enumerate()
        .map(|(i, field)| {
            let value = if i == 0 {
                parse_float_prefix(field)
            } else {
                parse_int_prefix(field)
            };
            value * 60f64.powi(i as i32)
        })
        .sum()
}

/// Returns true if `seconds` is a usable parsed time
pub fn is_valid(seconds: f64) -> bool {
    seconds.is_finite() && seconds >= 0.0
}

/// Read the longest leading decimal number, `NaN` if there is none
fn parse_float_prefix(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return f64::NAN;
    }

    // Exponent only counts when at least one digit follows it
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}

/// Read the longest leading base-10 integer, `NaN` if there is none
fn parse_int_prefix(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }

    if end == digits_start {
        return f64::NAN;
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00:00");
        assert_eq!(format_time(59.99), "00:00:59");
        assert_eq!(format_time(90.5), "00:01:30");
        assert_eq!(format_time(3661.0), "01:01:01");
        assert_eq!(format_time(360_000.0), "100:00:00");
    }

    #[test]
    fn test_format_time_degenerate() {
        assert_eq!(format_time(-4.0), "00:00:00");
        assert_eq!(format_time(f64::NAN), "00:00:00");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_time(Some("45s")), 45.0);
        assert_eq!(parse_time(Some("2.5s")), 2.5);
        assert!(parse_time(Some("s")).is_nan());
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_time(Some("0:01:30.5")), 90.5);
        assert_eq!(parse_time(Some("01:00:00")), 3600.0);
        assert_eq!(parse_time(Some("05:30.000")), 330.0);
        assert_eq!(parse_time(Some("12")), 12.0);
    }

    #[test]
    fn test_parse_missing() {
        assert_eq!(parse_time(None), NO_TIMECODE);
        assert!(!is_valid(parse_time(None)));
    }

    #[test]
    fn test_parse_malformed_is_nan() {
        assert!(parse_time(Some("aa:bb")).is_nan());
        assert!(parse_time(Some("")).is_nan());
        assert!(!is_valid(parse_time(Some("x:10"))));
    }

    #[test]
    fn test_lenient_prefixes() {
        // Non-rightmost fields are read as integers, fractions dropped
        assert_eq!(parse_time(Some("1.9:00")), 60.0);
        assert_eq!(parse_time(Some("10abc")), 10.0);
        assert_eq!(parse_time(Some(" 3s")), 3.0);
    }

    #[test]
    fn test_round_trip_whole_seconds() {
        for t in (0..=359_999u32).step_by(7) {
            let t = t as f64;
            assert_eq!(parse_time(Some(&format_time(t))), t);
        }
        assert_eq!(parse_time(Some(&format_time(359_999.0))), 359_999.0);
    }

    #[test]
    fn test_duration_round_trip() {
        for t in [0.0, 1.0, 2.25, 45.0, 3600.125] {
            assert_eq!(parse_time(Some(&format_duration(t))), t);
        }
    }
}
