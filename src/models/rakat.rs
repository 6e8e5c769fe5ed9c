use serde::Serialize;

use crate::models::PrayerSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RakatKind {
    /// Obligatory.
    Fard,
    /// Emphasized optional.
    SunnahMuakkadah,
    /// Optional.
    Nafl,
    /// Closing odd prayer after Isha.
    Witr,
}

impl RakatKind {
    pub fn short(&self) -> &'static str {
        match self {
            RakatKind::Fard => "F",
            RakatKind::SunnahMuakkadah => "S",
            RakatKind::Nafl => "N",
            RakatKind::Witr => "W",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RakatUnit {
    pub kind: RakatKind,
    pub count: u8,
}

const fn unit(kind: RakatKind, count: u8) -> RakatUnit {
    RakatUnit { kind, count }
}

use RakatKind::{Fard, Nafl, SunnahMuakkadah, Witr};

const FAJR: &[RakatUnit] = &[unit(SunnahMuakkadah, 2), unit(Fard, 2)];
const DHUHR: &[RakatUnit] = &[
    unit(SunnahMuakkadah, 4),
    unit(Fard, 4),
    unit(SunnahMuakkadah, 2),
    unit(Nafl, 2),
];
const ASR: &[RakatUnit] = &[unit(Nafl, 4), unit(Fard, 4)];
const MAGHRIB: &[RakatUnit] = &[unit(Fard, 3), unit(SunnahMuakkadah, 2), unit(Nafl, 2)];
const ISHA: &[RakatUnit] = &[
    unit(Nafl, 4),
    unit(Fard, 4),
    unit(SunnahMuakkadah, 2),
    unit(Nafl, 2),
    unit(Witr, 3),
    unit(Nafl, 2),
];
const JUMUAH: &[RakatUnit] = &[
    unit(SunnahMuakkadah, 4),
    unit(Fard, 2),
    unit(SunnahMuakkadah, 4),
    unit(SunnahMuakkadah, 2),
    unit(Nafl, 2),
];

/// The rakats prayed around `slot`, in the order they are prayed.
pub fn rakat_plan(slot: PrayerSlot) -> &'static [RakatUnit] {
    match slot {
        PrayerSlot::Fajr => FAJR,
        PrayerSlot::Dhuhr => DHUHR,
        PrayerSlot::Asr => ASR,
        PrayerSlot::Maghrib => MAGHRIB,
        PrayerSlot::Isha => ISHA,
        PrayerSlot::Jumuah => JUMUAH,
    }
}

pub fn total_rakats(plan: &[RakatUnit]) -> u32 {
    plan.iter().map(|u| u.count as u32).sum()
}

pub fn fard_rakats(plan: &[RakatUnit]) -> u32 {
    plan.iter()
        .filter(|u| u.kind == RakatKind::Fard)
        .map(|u| u.count as u32)
        .sum()
}

/// Compact form such as `2S 2F`.
pub fn summarize(plan: &[RakatUnit]) -> String {
    plan.iter()
        .map(|u| format!("{}{}", u.count, u.kind.short()))
        .collect::<Vec<_>>()
        .join(" ")
}
