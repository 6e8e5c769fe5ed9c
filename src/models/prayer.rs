use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the daily prayers, plus the Friday congregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrayerSlot {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
    Jumuah,
}

impl PrayerSlot {
    /// The five daily prayers in chronological order.
    pub const CANONICAL: [PrayerSlot; 5] = [
        PrayerSlot::Fajr,
        PrayerSlot::Dhuhr,
        PrayerSlot::Asr,
        PrayerSlot::Maghrib,
        PrayerSlot::Isha,
    ];

    pub fn all() -> Vec<PrayerSlot> {
        let mut slots = Self::CANONICAL.to_vec();
        slots.push(PrayerSlot::Jumuah);
        slots
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerSlot::Fajr => "fajr",
            PrayerSlot::Dhuhr => "dhuhr",
            PrayerSlot::Asr => "asr",
            PrayerSlot::Maghrib => "maghrib",
            PrayerSlot::Isha => "isha",
            PrayerSlot::Jumuah => "jumuah",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PrayerSlot::Fajr => "Fajr",
            PrayerSlot::Dhuhr => "Dhuhr",
            PrayerSlot::Asr => "Asr",
            PrayerSlot::Maghrib => "Maghrib",
            PrayerSlot::Isha => "Isha",
            PrayerSlot::Jumuah => "Jumuah",
        }
    }

    pub fn is_canonical(&self) -> bool {
        *self != PrayerSlot::Jumuah
    }

    /// Stored-record field holding the call-to-prayer time, e.g. `FajrAzan`.
    pub fn azan_field(&self) -> String {
        format!("{}Azan", self.display_name())
    }

    /// Stored-record field holding the congregation time, e.g. `FajrPrayer`.
    pub fn prayer_field(&self) -> String {
        format!("{}Prayer", self.display_name())
    }

    /// Stored-record field holding the window close, e.g. `FajrEndTime`.
    pub fn end_field(&self) -> String {
        format!("{}EndTime", self.display_name())
    }
}

impl std::fmt::Display for PrayerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PrayerSlot {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fajr" => Ok(PrayerSlot::Fajr),
            "dhuhr" | "zuhr" | "dhuhur" => Ok(PrayerSlot::Dhuhr),
            "asr" => Ok(PrayerSlot::Asr),
            "maghrib" => Ok(PrayerSlot::Maghrib),
            "isha" => Ok(PrayerSlot::Isha),
            "jumuah" | "jummah" | "jumah" | "friday" => Ok(PrayerSlot::Jumuah),
            _ => Err(anyhow::anyhow!("Unknown prayer: {}", s)),
        }
    }
}
