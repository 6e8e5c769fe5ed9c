use chrono::{NaiveDateTime, NaiveTime, Timelike};

use crate::error::TimeError;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Minutes since midnight for an `HH:MM` string (`H:MM` is accepted too).
pub fn parse_hhmm(s: &str) -> Result<u32, TimeError> {
    let trimmed = s.trim();
    let malformed = || TimeError::Malformed(s.to_string());

    let (hours, minutes) = trimmed.split_once(':').ok_or_else(malformed)?;
    let digits = |part: &str, max_len: usize| {
        !part.is_empty() && part.len() <= max_len && part.bytes().all(|b| b.is_ascii_digit())
    };
    if !digits(hours, 2) || !digits(minutes, 2) || minutes.len() != 2 {
        return Err(malformed());
    }

    let h: u32 = hours.parse().map_err(|_| malformed())?;
    let m: u32 = minutes.parse().map_err(|_| malformed())?;
    if h > 23 || m > 59 {
        return Err(TimeError::OutOfRange(s.to_string()));
    }
    Ok(h * 60 + m)
}

pub fn minutes_of_day(now: &NaiveDateTime) -> u32 {
    now.hour() * 60 + now.minute()
}

pub fn to_naive_time(minutes: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}

/// Strips timezone annotations some APIs append, e.g. `"05:12 (IST)"` → `"05:12"`.
pub fn normalize_api_time(raw: &str) -> String {
    raw.split_whitespace().next().unwrap_or("").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wall_clock_times() {
        assert_eq!(parse_hhmm("05:30"), Ok(330));
        assert_eq!(parse_hhmm("5:30"), Ok(330));
        assert_eq!(parse_hhmm(" 23:59 "), Ok(1439));
        assert_eq!(parse_hhmm("00:00"), Ok(0));
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["", "0530", "5:3", "ab:cd", "12:30:00", "-1:30", "12:+5"] {
            assert!(
                matches!(parse_hhmm(bad), Err(TimeError::Malformed(_))),
                "{bad:?} should be malformed"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_times() {
        assert_eq!(parse_hhmm("24:00"), Err(TimeError::OutOfRange("24:00".into())));
        assert_eq!(parse_hhmm("12:60"), Err(TimeError::OutOfRange("12:60".into())));
    }

    #[test]
    fn strips_timezone_suffix() {
        assert_eq!(normalize_api_time("05:12 (IST)"), "05:12");
        assert_eq!(normalize_api_time("18:40"), "18:40");
        assert_eq!(normalize_api_time("  "), "");
    }
}
