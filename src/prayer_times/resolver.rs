use log::debug;

use crate::models::schedule::{
    END_OF_DAY, IFTARI_FIELD, SEHRI_FIELD, ScheduleEntry, SlotTimes, present,
};
use crate::models::{ApiTimings, PrayerSlot, Schedule, StoredRecord};

/// Merges the masjid record, a timing source and the defaults into one schedule.
///
/// Per slot the stored record wins when it has the slot's azan, then a complete
/// timing-source entry, then `defaults`. Azan and congregation time always come
/// from the same tier; only a stored slot without an end time borrows one from
/// the timing source or the defaults. Jumuah is resolved when `defaults` has it.
///
/// Sehri and Iftari have their own order: timing source, stored record, then the
/// defaults' Fajr and Maghrib azan.
pub fn resolve(
    stored: Option<&StoredRecord>,
    api: Option<&ApiTimings>,
    defaults: &Schedule,
) -> Schedule {
    let mut slots = PrayerSlot::CANONICAL.to_vec();
    if defaults.contains(PrayerSlot::Jumuah) {
        slots.push(PrayerSlot::Jumuah);
    }

    let entries = slots
        .into_iter()
        .filter_map(|slot| {
            resolve_slot(slot, stored, api, defaults).map(|times| ScheduleEntry { slot, times })
        })
        .collect();

    let sehri = marker(api.and_then(|a| a.sehri.as_deref()), stored, SEHRI_FIELD)
        .or_else(|| defaults.get(PrayerSlot::Fajr).map(|t| t.azan.clone()));
    let iftari = marker(api.and_then(|a| a.iftari.as_deref()), stored, IFTARI_FIELD)
        .or_else(|| defaults.get(PrayerSlot::Maghrib).map(|t| t.azan.clone()));

    Schedule {
        entries,
        sehri,
        iftari,
    }
}

fn resolve_slot(
    slot: PrayerSlot,
    stored: Option<&StoredRecord>,
    api: Option<&ApiTimings>,
    defaults: &Schedule,
) -> Option<SlotTimes> {
    let api_slot = api.and_then(|a| a.slot(slot));
    let default = defaults.get(slot);

    if let Some(record) = stored {
        if let Some(azan) = field(record, &slot.azan_field()) {
            let prayer = field(record, &slot.prayer_field()).unwrap_or(azan);
            let end = field(record, &slot.end_field())
                .or_else(|| api_slot.and_then(|s| s.end_time()))
                .or_else(|| default.map(|d| d.end.as_str()))
                .unwrap_or(END_OF_DAY);
            debug!("{}: stored record", slot);
            return Some(SlotTimes::new(azan, prayer, end));
        }
    }

    if let Some(times) = api_slot.and_then(|s| s.complete()) {
        debug!("{}: timing source", slot);
        return Some(times);
    }

    debug!("{}: defaults", slot);
    default.cloned()
}

fn field<'a>(record: &'a StoredRecord, name: &str) -> Option<&'a str> {
    present(record.get(name).map(String::as_str))
}

fn marker(api_value: Option<&str>, stored: Option<&StoredRecord>, stored_field: &str) -> Option<String> {
    present(api_value)
        .or_else(|| stored.and_then(|r| field(r, stored_field)))
        .map(str::to_string)
}
