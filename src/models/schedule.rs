use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::rakat::{RakatUnit, rakat_plan};
use crate::models::PrayerSlot;

/// Field → value map as stored for a masjid, e.g. `FajrAzan = "05:10"`.
pub type StoredRecord = BTreeMap<String, String>;

pub const SEHRI_FIELD: &str = "SehriTime";
pub const IFTARI_FIELD: &str = "IftariTime";

/// Window close used when no source knows where a slot ends.
pub const END_OF_DAY: &str = "23:59";

/// Wall-clock `HH:MM` strings, kept exactly as the source gave them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotTimes {
    pub azan: String,
    pub prayer: String,
    pub end: String,
}

impl SlotTimes {
    pub fn new(azan: impl Into<String>, prayer: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            azan: azan.into(),
            prayer: prayer.into(),
            end: end.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub slot: PrayerSlot,
    #[serde(flatten)]
    pub times: SlotTimes,
}

/// One calendar day of prayer times plus the Sehri and Iftari markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub entries: Vec<ScheduleEntry>,
    pub sehri: Option<String>,
    pub iftari: Option<String>,
}

impl Schedule {
    /// Builds a schedule whose markers follow Fajr and Maghrib azan.
    pub fn from_entries(entries: Vec<ScheduleEntry>) -> Self {
        let azan_of = |slot: PrayerSlot| {
            entries
                .iter()
                .find(|e| e.slot == slot)
                .map(|e| e.times.azan.clone())
        };
        let sehri = azan_of(PrayerSlot::Fajr);
        let iftari = azan_of(PrayerSlot::Maghrib);
        Self {
            entries,
            sehri,
            iftari,
        }
    }

    /// Hard-coded fallback used when neither the masjid record nor a timing source answers.
    pub fn builtin_default() -> Self {
        let entry = |slot, azan: &str, prayer: &str, end: &str| ScheduleEntry {
            slot,
            times: SlotTimes::new(azan, prayer, end),
        };
        Self::from_entries(vec![
            entry(PrayerSlot::Fajr, "05:00", "05:30", "06:30"),
            entry(PrayerSlot::Dhuhr, "12:00", "12:30", "14:30"),
            entry(PrayerSlot::Asr, "15:15", "15:45", "17:45"),
            entry(PrayerSlot::Maghrib, "18:20", "18:30", "19:30"),
            entry(PrayerSlot::Isha, "19:30", "19:45", "21:45"),
            entry(PrayerSlot::Jumuah, "13:00", "13:15", "14:15"),
        ])
    }

    pub fn get(&self, slot: PrayerSlot) -> Option<&SlotTimes> {
        self.entries.iter().find(|e| e.slot == slot).map(|e| &e.times)
    }

    pub fn contains(&self, slot: PrayerSlot) -> bool {
        self.get(slot).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Pairs every entry with the rakats prayed for it.
    pub fn with_rakats(&self) -> impl Iterator<Item = (&ScheduleEntry, &'static [RakatUnit])> {
        self.entries.iter().map(|e| (e, rakat_plan(e.slot)))
    }
}

/// A timing source's answer for one slot; any part may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiSlot {
    pub azan: Option<String>,
    pub prayer: Option<String>,
    pub end: Option<String>,
}

impl ApiSlot {
    pub fn from_times(times: SlotTimes) -> Self {
        Self {
            azan: Some(times.azan),
            prayer: Some(times.prayer),
            end: Some(times.end),
        }
    }

    /// All three parts, or nothing. Blank values count as missing.
    pub fn complete(&self) -> Option<SlotTimes> {
        Some(SlotTimes {
            azan: present(self.azan.as_deref())?.to_string(),
            prayer: present(self.prayer.as_deref())?.to_string(),
            end: present(self.end.as_deref())?.to_string(),
        })
    }

    pub fn end_time(&self) -> Option<&str> {
        present(self.end.as_deref())
    }
}

/// Times returned by an external timing source for one day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiTimings {
    pub slots: BTreeMap<PrayerSlot, ApiSlot>,
    pub sehri: Option<String>,
    pub iftari: Option<String>,
}

/// Raw daily astronomical times as most calculators report them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DayTimes {
    pub fajr: Option<String>,
    pub sunrise: Option<String>,
    pub dhuhr: Option<String>,
    pub asr: Option<String>,
    pub maghrib: Option<String>,
    pub isha: Option<String>,
}

impl ApiTimings {
    pub fn slot(&self, slot: PrayerSlot) -> Option<&ApiSlot> {
        self.slots.get(&slot)
    }

    pub fn insert(&mut self, slot: PrayerSlot, times: SlotTimes) {
        self.slots.insert(slot, ApiSlot::from_times(times));
    }

    /// Each prayer's window closes when the next one begins; Fajr closes at sunrise
    /// and Isha at the end of the day. Azan and congregation share one time.
    pub fn from_day_times(day: DayTimes) -> Self {
        let window = |start: &Option<String>, end: Option<String>| ApiSlot {
            azan: start.clone(),
            prayer: start.clone(),
            end,
        };

        let mut slots = BTreeMap::new();
        slots.insert(PrayerSlot::Fajr, window(&day.fajr, day.sunrise.clone()));
        slots.insert(PrayerSlot::Dhuhr, window(&day.dhuhr, day.asr.clone()));
        slots.insert(PrayerSlot::Asr, window(&day.asr, day.maghrib.clone()));
        slots.insert(PrayerSlot::Maghrib, window(&day.maghrib, day.isha.clone()));
        slots.insert(PrayerSlot::Isha, window(&day.isha, Some(END_OF_DAY.to_string())));

        Self {
            slots,
            sehri: day.fajr,
            iftari: day.maghrib,
        }
    }
}

/// Treats blank strings the same as a missing value.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_default_markers_follow_azan() {
        let defaults = Schedule::builtin_default();
        assert_eq!(defaults.sehri.as_deref(), Some("05:00"));
        assert_eq!(defaults.iftari.as_deref(), Some("18:20"));
        assert_eq!(defaults.len(), 6);
        assert_eq!(defaults.get(PrayerSlot::Isha).unwrap().prayer, "19:45");
    }

    #[test]
    fn incomplete_api_slot_is_not_accepted() {
        let slot = ApiSlot {
            azan: Some("05:00".into()),
            prayer: None,
            end: Some("06:00".into()),
        };
        assert!(slot.complete().is_none());

        let blank = ApiSlot {
            azan: Some("05:00".into()),
            prayer: Some("  ".into()),
            end: Some("06:00".into()),
        };
        assert!(blank.complete().is_none());
    }

    #[test]
    fn day_times_become_back_to_back_windows() {
        let timings = ApiTimings::from_day_times(DayTimes {
            fajr: Some("04:40".into()),
            sunrise: Some("06:01".into()),
            dhuhr: Some("12:15".into()),
            asr: Some("15:40".into()),
            maghrib: Some("18:22".into()),
            isha: Some("19:41".into()),
        });

        let fajr = timings.slot(PrayerSlot::Fajr).unwrap().complete().unwrap();
        assert_eq!(fajr, SlotTimes::new("04:40", "04:40", "06:01"));
        let isha = timings.slot(PrayerSlot::Isha).unwrap().complete().unwrap();
        assert_eq!(isha.end, END_OF_DAY);
        assert_eq!(timings.sehri.as_deref(), Some("04:40"));
        assert_eq!(timings.iftari.as_deref(), Some("18:22"));
    }

    #[test]
    fn with_rakats_pairs_each_entry() {
        let defaults = Schedule::builtin_default();
        let pairs: Vec<_> = defaults.with_rakats().collect();
        assert_eq!(pairs.len(), defaults.len());
        assert_eq!(pairs[0].1, rakat_plan(PrayerSlot::Fajr));
    }
}
