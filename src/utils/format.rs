use chrono::NaiveTime;

use crate::prayer_times::tracker::Countdown;
use crate::utils::clock::{parse_hhmm, to_naive_time};

/// Format a countdown as "Xh Ym", or "Ym" under an hour
pub fn format_countdown(countdown: &Countdown) -> String {
    if countdown.total_minutes() == 0 {
        return "now".to_string();
    }
    if countdown.hours > 0 {
        format!("{}h {}m", countdown.hours, countdown.minutes)
    } else {
        format!("{}m", countdown.minutes)
    }
}

/// Format a NaiveTime to "HH:MM"
pub fn format_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// Render a stored "HH:MM" for display; malformed values show as "N/A"
pub fn format_clock(hhmm: &str, use_24h: bool) -> String {
    let Some(t) = parse_hhmm(hhmm).ok().and_then(to_naive_time) else {
        return "N/A".to_string();
    };
    if use_24h {
        format_time(t)
    } else {
        t.format("%I:%M %p").to_string()
    }
}

pub fn format_optional_clock(hhmm: Option<&str>, use_24h: bool) -> String {
    hhmm.map(|t| format_clock(t, use_24h))
        .unwrap_or_else(|| "--:--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_drops_zero_hours() {
        assert_eq!(format_countdown(&Countdown::from_minutes(390)), "6h 30m");
        assert_eq!(format_countdown(&Countdown::from_minutes(45)), "45m");
        assert_eq!(format_countdown(&Countdown::from_minutes(0)), "now");
    }

    #[test]
    fn clock_in_both_styles() {
        assert_eq!(format_clock("13:05", true), "13:05");
        assert_eq!(format_clock("13:05", false), "01:05 PM");
        assert_eq!(format_clock("05:00", false), "05:00 AM");
        assert_eq!(format_clock("garbage", false), "N/A");
        assert_eq!(format_optional_clock(None, true), "--:--");
    }
}
