use anyhow::{Result, anyhow};
use chrono::{FixedOffset, NaiveDate};
use salah::prelude::{
    Configuration, Coordinates as SalahCoordinates, Madhab, Method, Prayer, PrayerSchedule,
};

use crate::models::{ApiTimings, DayTimes};
use crate::prayer_times::{AsrSchool, Coordinates, TimingSource};

/// Computes astronomical prayer times locally, no network needed.
pub struct OfflineCalculator {
    pub tz_offset_minutes: i32,
}

impl OfflineCalculator {
    pub fn new(tz_offset_minutes: i32) -> Result<Self> {
        FixedOffset::east_opt(tz_offset_minutes * 60)
            .ok_or_else(|| anyhow!("Invalid timezone offset: {}", tz_offset_minutes))?;
        Ok(Self { tz_offset_minutes })
    }

    pub fn compute_day(
        &self,
        position: Coordinates,
        date: NaiveDate,
        method: u8,
        school: AsrSchool,
    ) -> Result<DayTimes> {
        let coords = SalahCoordinates::new(position.latitude, position.longitude);
        let params = Configuration::with(method_for(method)?, madhab_for(school));

        let times = PrayerSchedule::new()
            .on(date)
            .for_location(coords)
            .with_configuration(params)
            .calculate()
            .map_err(|e| anyhow!("Prayer calculation failed: {}", e))?;

        let offset = FixedOffset::east_opt(self.tz_offset_minutes * 60)
            .ok_or_else(|| anyhow!("Invalid timezone offset: {}", self.tz_offset_minutes))?;

        let local = |prayer: Prayer| -> Option<String> {
            Some(
                times
                    .time(prayer)
                    .with_timezone(&offset)
                    .format("%H:%M")
                    .to_string(),
            )
        };

        Ok(DayTimes {
            fajr: local(Prayer::Fajr),
            sunrise: local(Prayer::Sunrise),
            dhuhr: local(Prayer::Dhuhr),
            asr: local(Prayer::Asr),
            maghrib: local(Prayer::Maghrib),
            isha: local(Prayer::Isha),
        })
    }
}

impl TimingSource for OfflineCalculator {
    fn name(&self) -> &'static str {
        "offline"
    }

    fn fetch(
        &self,
        position: Coordinates,
        date: NaiveDate,
        method: u8,
        school: AsrSchool,
    ) -> Result<Option<ApiTimings>> {
        let day = self.compute_day(position, date, method, school)?;
        Ok(Some(ApiTimings::from_day_times(day)))
    }
}

/// Maps an AlAdhan method id onto the calculator's method.
fn method_for(id: u8) -> Result<Method> {
    match id {
        1 => Ok(Method::Karachi),
        2 => Ok(Method::NorthAmerica),
        3 => Ok(Method::MuslimWorldLeague),
        4 => Ok(Method::UmmAlQura),
        5 => Ok(Method::Egyptian),
        7 => Ok(Method::Tehran),
        8 => Ok(Method::Dubai),
        9 => Ok(Method::Kuwait),
        10 => Ok(Method::Qatar),
        11 => Ok(Method::Singapore),
        13 => Ok(Method::Turkey),
        15 => Ok(Method::MoonsightingCommittee),
        _ => Err(anyhow!("Calculation method {} is not supported offline", id)),
    }
}

fn madhab_for(school: AsrSchool) -> Madhab {
    match school {
        AsrSchool::Shafi => Madhab::Shafi,
        AsrSchool::Hanafi => Madhab::Hanafi,
    }
}
