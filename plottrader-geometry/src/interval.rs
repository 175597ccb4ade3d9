//! Interval alignment: parsing duration strings and locating the start of the
//! current/next tick window on a fixed wall-clock cadence.
//!
//! A small table of calendar aliases (`1d`..`6d`, `1w`, `2w`, `1M`) is
//! layered in front of a base `ns|us|ms|s|m|h` grammar. Aliases cannot be
//! combined with anything else; the base grammar accepts the usual
//! compound forms (`1h30m`).

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use crate::error::GeometryError;

const SECOND: u64 = 1;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;
const MONTH: u64 = 30 * DAY;

fn aliased(s: &str) -> Option<Duration> {
    let secs = match s {
        "1d" => DAY,
        "2d" => 2 * DAY,
        "3d" => 3 * DAY,
        "4d" => 4 * DAY,
        "5d" => 5 * DAY,
        "6d" => 6 * DAY,
        "1w" => WEEK,
        "2w" => 2 * WEEK,
        "1M" => MONTH,
        _ => return None,
    };
    Some(Duration::from_secs(secs))
}

/// Parses `ns|us|ms|s|m|h` base units, including compound forms such as
/// `1h30m`. Returns `None` on anything malformed, including the calendar
/// units handled separately by [`aliased`].
fn parse_base_duration(s: &str) -> Option<Duration> {
    let mut chars = s.chars().peekable();
    let mut total_secs: f64 = 0.0;
    let mut saw_any = false;

    if chars.peek().is_none() {
        return None;
    }

    while chars.peek().is_some() {
        let mut num = String::new();
        if chars.peek() == Some(&'-') {
            num.push(chars.next().unwrap());
        }
        let mut saw_digit = false;
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                saw_digit = true;
                num.push(c);
                chars.next();
            } else {
                break;
            }
        }
        if chars.peek() == Some(&'.') {
            num.push(chars.next().unwrap());
            while let Some(&c) = chars.peek() {
                if c.is_ascii_digit() {
                    saw_digit = true;
                    num.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
        }
        if !saw_digit {
            return None;
        }

        let mut unit = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_alphabetic() || c == 'µ' {
                unit.push(c);
                chars.next();
            } else {
                break;
            }
        }
        if unit.is_empty() {
            return None;
        }

        let multiplier = match unit.as_str() {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return None,
        };

        let value: f64 = num.parse().ok()?;
        total_secs += value * multiplier;
        saw_any = true;
    }

    if !saw_any || total_secs < 0.0 {
        return None;
    }
    Some(Duration::from_secs_f64(total_secs))
}

/// Parses an interval string, checking the calendar-alias table before
/// falling back to the base duration grammar. Compound forms mixing a
/// calendar alias with anything else (`1d12h`, `1w1d`) are rejected because
/// they never match an alias table entry and the base grammar does not know
/// the `d`/`w`/`M` units.
pub fn parse_duration(s: &str) -> Result<Duration, GeometryError> {
    if let Some(d) = aliased(s) {
        return Ok(d);
    }
    parse_base_duration(s).ok_or_else(|| GeometryError::InvalidInterval(s.to_string()))
}

/// Floors `every` to at least one second: the tick loop refuses to spin
/// faster than once a second.
fn floor_secs(every: Duration) -> i64 {
    every.as_secs().max(1) as i64
}

/// Returns the start of the interval window containing `now`, i.e. the
/// largest multiple of `every` (in whole seconds, floored) not after `now`.
pub fn interval_start(now: DateTime<Utc>, every: Duration) -> DateTime<Utc> {
    let itv_secs = floor_secs(every);
    let now_secs = now.timestamp();
    let div = now_secs.div_euclid(itv_secs);
    let start_secs = div * itv_secs;
    Utc.timestamp_opt(start_secs, 0).single().unwrap_or(now)
}

/// Returns the start of the next interval window after `now`.
pub fn next_interval_start(now: DateTime<Utc>, every: Duration) -> DateTime<Utc> {
    interval_start(now, every) + chrono::Duration::seconds(floor_secs(every))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_parse() {
        assert_eq!(parse_duration("1d").unwrap(), Duration::from_secs(DAY));
        assert_eq!(parse_duration("2w").unwrap(), Duration::from_secs(2 * WEEK));
        assert_eq!(parse_duration("1M").unwrap(), Duration::from_secs(MONTH));
    }

    #[test]
    fn base_units_parse() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn compound_alias_forms_are_rejected() {
        assert!(parse_duration("1d12h").is_err());
        assert!(parse_duration("1w1d").is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("banana").is_err());
        assert!(parse_duration("10x").is_err());
    }

    #[test]
    fn interval_start_aligns_to_wall_clock() {
        let now = Utc.timestamp_opt(3_661, 0).single().unwrap();
        let start = interval_start(now, Duration::from_secs(3600));
        assert_eq!(start.timestamp(), 3600);
        let next = next_interval_start(now, Duration::from_secs(3600));
        assert_eq!(next.timestamp(), 7200);
    }

    #[test]
    fn sub_second_every_floors_to_one_second() {
        let now = Utc.timestamp_opt(10, 0).single().unwrap();
        let start = interval_start(now, Duration::from_millis(100));
        assert_eq!(start.timestamp(), 10);
    }
}
