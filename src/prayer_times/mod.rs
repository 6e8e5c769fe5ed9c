pub mod aladhan;
pub mod calculator;
pub mod qibla;
pub mod resolver;
pub mod sources;
pub mod tracker;

use anyhow::Result;

use crate::config::{AppConfig, TimingProvider};

pub use aladhan::AlAdhanClient;
pub use calculator::OfflineCalculator;
pub use qibla::{KAABA, compass_point, qibla_bearing};
pub use resolver::resolve;
pub use sources::{
    AsrSchool, CALC_METHODS, ConfiguredLocation, Coordinates, FALLBACK_PLACE_NAME,
    FALLBACK_POSITION, LocationProvider, RecordStore, TimingSource, method_name,
};
pub use tracker::{Countdown, NextPrayer, NextPrayerState, next_occurrence};

/// Builds the timing source the config asks for. Shareable with a refresh thread.
pub fn timing_source(config: &AppConfig) -> Result<Box<dyn TimingSource + Send + Sync>> {
    Ok(match config.calculation.source {
        TimingProvider::AlAdhan => Box::new(AlAdhanClient::new(&config.network)?),
        TimingProvider::Offline => {
            Box::new(OfflineCalculator::new(config.calculation.timezone_offset)?)
        }
    })
}
