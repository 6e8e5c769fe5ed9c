pub mod masjid;
pub mod prayer;
pub mod quran;
pub mod rakat;
pub mod schedule;

pub use masjid::Masjid;
pub use prayer::PrayerSlot;
pub use quran::{DailyQuranLog, QuranActivity, RewardTally};
pub use rakat::{RakatKind, RakatUnit, rakat_plan};
pub use schedule::{ApiSlot, ApiTimings, DayTimes, Schedule, ScheduleEntry, SlotTimes, StoredRecord};
