//! Daily prayer times for a masjid or location, merged from the masjid's own
//! timetable, a calculated timetable and built-in defaults.

pub mod board;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod prayer_times;
pub mod utils;

pub use board::{PrayerBoard, RefreshReport, Sources};
pub use error::{RewardError, TimeError};
pub use models::{PrayerSlot, Schedule};
pub use prayer_times::{NextPrayerState, next_occurrence, resolve};
