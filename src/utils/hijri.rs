use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};

/// Largest moon-sighting adjustment, in days, either way.
pub const MAX_HIJRI_OFFSET: i32 = 30;
use hijri_date::HijriDate;

/// Islamic month names in English (index 0 = Muharram = month 1)
const HIJRI_MONTH_NAMES: &[&str] = &[
    "Muharram",
    "Safar",
    "Rabi' al-Awwal",
    "Rabi' al-Thani",
    "Jumada al-Awwal",
    "Jumada al-Thani",
    "Rajab",
    "Sha'ban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qi'dah",
    "Dhu al-Hijjah",
];

pub fn hijri_month_name(month: usize) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| HIJRI_MONTH_NAMES.get(i))
        .copied()
        .unwrap_or("Unknown")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HijriDay {
    pub day: usize,
    pub month: usize,
    pub year: usize,
}

impl HijriDay {
    pub fn formatted(&self) -> String {
        format!("{} {} {}", self.day, hijri_month_name(self.month), self.year)
    }

    pub fn is_ramadan(&self) -> bool {
        self.month == 9
    }
}

/// Converts a Gregorian date, shifted by `offset_days` for local moon sighting.
pub fn to_hijri(date: NaiveDate, offset_days: i32) -> Result<HijriDay> {
    let adjusted = date
        .checked_add_signed(Duration::days(offset_days as i64))
        .ok_or_else(|| anyhow::anyhow!("Hijri offset {} moves {} out of range", offset_days, date))?;
    let hd = HijriDate::from_gr(
        adjusted.year() as usize,
        adjusted.month() as usize,
        adjusted.day() as usize,
    )
    .map_err(|e| anyhow::anyhow!("Hijri conversion error: {}", e))?;

    Ok(HijriDay {
        day: hd.day(),
        month: hd.month(),
        year: hd.year(),
    })
}

/// Display string for the header; empty when the date is out of the converter's range.
pub fn hijri_string(date: NaiveDate, offset_days: i32) -> String {
    match to_hijri(date, offset_days) {
        Ok(day) => day.formatted(),
        Err(e) => {
            log::warn!("{:#}", e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_names_are_one_based() {
        assert_eq!(hijri_month_name(1), "Muharram");
        assert_eq!(hijri_month_name(9), "Ramadan");
        assert_eq!(hijri_month_name(0), "Unknown");
        assert_eq!(hijri_month_name(13), "Unknown");
    }

    #[test]
    fn offset_shifts_the_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let base = to_hijri(date, 0).unwrap();
        let behind = to_hijri(date, -1).unwrap();
        assert_ne!(base, behind);
        assert!(base.is_ramadan());
    }

    #[test]
    fn huge_offset_is_an_error_not_a_panic() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        assert!(to_hijri(date, i32::MAX).is_err());
        assert!(to_hijri(date, i32::MIN).is_err());
        assert_eq!(hijri_string(date, i32::MAX), "");
    }
}
