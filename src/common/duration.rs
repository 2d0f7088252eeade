//! Duration values found in manifests.
//!
//! Two notations occur in practice:
//!
//! - ISO 8601 durations (`PT1H30M`, `P1DT2.5S`), used by SCORM 2004,
//!   LOM `typicalLearningTime` and `attemptAbsoluteDurationLimit`;
//! - CMI timespans (`HHHH:MM:SS.SS`), used by SCORM 1.2
//!   `adlcp:maxtimeallowed` and the AICC `Max_Time_Allowed` column.
//!
//! Calendar components have no fixed length; a year counts as 365 days and a
//! month as 30 days.

use std::time::Duration;

const SECS_PER_MINUTE: f64 = 60.0;
const SECS_PER_HOUR: f64 = 3_600.0;
const SECS_PER_DAY: f64 = 86_400.0;

/// Parse either notation, choosing by the leading `P`.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.starts_with('P') || value.starts_with('p') {
        parse_iso8601(value)
    } else {
        parse_timespan(value)
    }
}

/// Parse an ISO 8601 duration such as `P1Y2M3DT4H5M6.5S`.
pub fn parse_iso8601(value: &str) -> Option<Duration> {
    let value = value.trim();
    let rest = value.strip_prefix('P').or_else(|| value.strip_prefix('p'))?;
    if rest.is_empty() {
        return None;
    }

    let mut seconds = 0.0f64;
    let mut in_time = false;
    let mut number = String::new();
    let mut saw_component = false;

    for ch in rest.chars() {
        match ch {
            '0'..='9' | '.' | ',' => number.push(if ch == ',' { '.' } else { ch }),
            'T' | 't' => {
                if in_time || !number.is_empty() {
                    return None;
                }
                in_time = true;
            },
            designator => {
                if number.is_empty() {
                    return None;
                }
                let amount: f64 = number.parse().ok()?;
                number.clear();
                let unit = match (in_time, designator.to_ascii_uppercase()) {
                    (false, 'Y') => 365.0 * SECS_PER_DAY,
                    (false, 'M') => 30.0 * SECS_PER_DAY,
                    (false, 'W') => 7.0 * SECS_PER_DAY,
                    (false, 'D') => SECS_PER_DAY,
                    (true, 'H') => SECS_PER_HOUR,
                    (true, 'M') => SECS_PER_MINUTE,
                    (true, 'S') => 1.0,
                    _ => return None,
                };
                seconds += amount * unit;
                saw_component = true;
            },
        }
    }

    if !number.is_empty() || !saw_component {
        return None;
    }
    Duration::try_from_secs_f64(seconds).ok()
}

/// Parse a CMI timespan `HHHH:MM:SS`, with optional fractional seconds.
pub fn parse_timespan(value: &str) -> Option<Duration> {
    let mut parts = value.trim().split(':');
    let hours = parts.next()?;
    let minutes = parts.next()?;
    let seconds = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(hours) || !all_digits(minutes) {
        return None;
    }
    let (whole, fraction) = match seconds.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (seconds, None),
    };
    if !all_digits(whole) || fraction.is_some_and(|f| !all_digits(f)) {
        return None;
    }

    let hours: u64 = hours.parse().ok()?;
    let minutes: u64 = minutes.parse().ok()?;
    let whole: u64 = whole.parse().ok()?;
    if minutes > 59 || whole > 59 {
        return None;
    }

    let nanos = match fraction {
        Some(f) => {
            let digits: String = f.chars().take(9).collect();
            let scale = 10u32.pow(9 - digits.len() as u32);
            digits.parse::<u32>().ok()? * scale
        },
        None => 0,
    };

    Some(Duration::new(hours * 3_600 + minutes * 60 + whole, nanos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso8601_time_components() {
        assert_eq!(parse_iso8601("PT1H30M"), Some(Duration::from_secs(5_400)));
        assert_eq!(parse_iso8601("PT45S"), Some(Duration::from_secs(45)));
        assert_eq!(parse_iso8601("PT0.5S"), Some(Duration::from_millis(500)));
        assert_eq!(parse_iso8601("PT2M"), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_iso8601_date_components() {
        assert_eq!(parse_iso8601("P1D"), Some(Duration::from_secs(86_400)));
        assert_eq!(parse_iso8601("P1DT1H"), Some(Duration::from_secs(90_000)));
        assert_eq!(parse_iso8601("P1W"), Some(Duration::from_secs(604_800)));
        // Month designator before T is months, after T minutes.
        assert_eq!(parse_iso8601("P1M"), Some(Duration::from_secs(30 * 86_400)));
    }

    #[test]
    fn test_iso8601_rejects_malformed() {
        assert_eq!(parse_iso8601("P"), None);
        assert_eq!(parse_iso8601("PT"), None);
        assert_eq!(parse_iso8601("1H"), None);
        assert_eq!(parse_iso8601("PT1X"), None);
        assert_eq!(parse_iso8601("P1H"), None);
        assert_eq!(parse_iso8601("PT5"), None);
    }

    #[test]
    fn test_timespan() {
        assert_eq!(parse_timespan("00:30:00"), Some(Duration::from_secs(1_800)));
        assert_eq!(parse_timespan("0001:00:05.5"), Some(Duration::from_millis(3_605_500)));
        assert_eq!(parse_timespan("10:61:00"), None);
        assert_eq!(parse_timespan("1:2"), None);
        assert_eq!(parse_timespan("aa:00:00"), None);
    }

    #[test]
    fn test_parse_duration_dispatches_on_prefix() {
        assert_eq!(parse_duration(" PT10M "), Some(Duration::from_secs(600)));
        assert_eq!(parse_duration("00:10:00"), Some(Duration::from_secs(600)));
        assert_eq!(parse_duration(""), None);
    }
}
