//! Owns the day's schedule and the settings that shape it.
//!
//! A refresh queries each collaborator in turn, treats any failure as "no
//! answer", resolves a fresh schedule and swaps it in whole. Readers never see
//! a half-updated schedule, and a refresh never fails.

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info, warn};

use crate::config::AppConfig;
use crate::models::{ApiTimings, Schedule, StoredRecord};
use crate::prayer_times::{
    AsrSchool, Coordinates, FALLBACK_POSITION, LocationProvider, NextPrayerState, RecordStore,
    TimingSource, next_occurrence, resolve,
};

/// The collaborators a refresh draws on.
pub struct Sources<'a> {
    pub records: &'a dyn RecordStore,
    pub location: &'a dyn LocationProvider,
    pub timings: &'a dyn TimingSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSource {
    Masjid,
    Device,
    Fallback,
}

impl PositionSource {
    pub fn label(&self) -> &'static str {
        match self {
            PositionSource::Masjid => "masjid",
            PositionSource::Device => "configured location",
            PositionSource::Fallback => "default location",
        }
    }
}

/// What a refresh managed to use.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    pub date: NaiveDate,
    pub stored_record: bool,
    pub timing_source: Option<&'static str>,
    pub position: Coordinates,
    pub position_source: PositionSource,
}

impl RefreshReport {
    pub fn used_defaults_only(&self) -> bool {
        !self.stored_record && self.timing_source.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct PrayerBoard {
    selected_masjid: Option<String>,
    asr_school: AsrSchool,
    method: u8,
    defaults: Schedule,
    schedule: Schedule,
    last_position: Option<Coordinates>,
    last_refresh: Option<RefreshReport>,
}

impl PrayerBoard {
    /// Starts out showing `defaults` until the first refresh.
    pub fn new(defaults: Schedule, method: u8, asr_school: AsrSchool) -> Self {
        Self {
            selected_masjid: None,
            asr_school,
            method,
            schedule: defaults.clone(),
            defaults,
            last_position: None,
            last_refresh: None,
        }
    }

    /// Board with the built-in defaults and the configured method, school and masjid.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut board = Self::new(
            Schedule::builtin_default(),
            config.calculation.method,
            config.calculation.asr_school,
        );
        board.select_masjid(config.display.selected_masjid.as_deref());
        board
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn selected_masjid(&self) -> Option<&str> {
        self.selected_masjid.as_deref()
    }

    pub fn asr_school(&self) -> AsrSchool {
        self.asr_school
    }

    pub fn method(&self) -> u8 {
        self.method
    }

    pub fn last_position(&self) -> Option<Coordinates> {
        self.last_position
    }

    pub fn last_refresh(&self) -> Option<&RefreshReport> {
        self.last_refresh.as_ref()
    }

    /// Takes effect on the next refresh. Blank ids clear the selection.
    pub fn select_masjid(&mut self, id: Option<&str>) {
        self.selected_masjid = id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
    }

    /// Takes effect on the next refresh.
    pub fn set_asr_school(&mut self, school: AsrSchool) {
        self.asr_school = school;
    }

    /// Takes effect on the next refresh.
    pub fn set_method(&mut self, method: u8) {
        self.method = method;
    }

    /// Rebuilds the schedule for `date` from whatever the sources can provide.
    pub fn refresh(&mut self, sources: &Sources<'_>, date: NaiveDate) -> RefreshReport {
        let stored = self.lookup_record(sources.records);
        let (position, position_source) = self.locate(sources);
        let api = self.fetch_timings(sources.timings, position, date);

        let schedule = resolve(stored.as_ref(), api.as_ref(), &self.defaults);
        debug!("resolved {} slots for {}", schedule.len(), date);
        self.schedule = schedule;
        self.last_position = Some(position);

        let report = RefreshReport {
            date,
            stored_record: stored.is_some(),
            timing_source: api.as_ref().map(|_| sources.timings.name()),
            position,
            position_source,
        };
        if report.used_defaults_only() {
            info!("no source answered for {}, showing default times", date);
        }
        self.last_refresh = Some(report.clone());
        report
    }

    pub fn next_prayer(&self, now: NaiveDateTime) -> NextPrayerState {
        next_occurrence(&self.schedule, now)
    }

    fn lookup_record(&self, records: &dyn RecordStore) -> Option<StoredRecord> {
        let id = self.selected_masjid.as_deref()?;
        match records.get(id) {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                debug!("masjid '{}' has no stored timetable", id);
                None
            }
            Err(e) => {
                warn!("masjid '{}' timetable unavailable: {:#}", id, e);
                None
            }
        }
    }

    /// Masjid position first, then the user's, then the fallback.
    fn locate(&self, sources: &Sources<'_>) -> (Coordinates, PositionSource) {
        if let Some(id) = self.selected_masjid.as_deref() {
            match sources.records.position(id) {
                Ok(Some(position)) => return (position, PositionSource::Masjid),
                Ok(None) => {}
                Err(e) => warn!("masjid '{}' position unavailable: {:#}", id, e),
            }
        }

        match sources.location.current_position() {
            Ok(position) => (position, PositionSource::Device),
            Err(e) => {
                warn!("location unavailable, using default: {:#}", e);
                (FALLBACK_POSITION, PositionSource::Fallback)
            }
        }
    }

    fn fetch_timings(
        &self,
        timings: &dyn TimingSource,
        position: Coordinates,
        date: NaiveDate,
    ) -> Option<ApiTimings> {
        match timings.fetch(position, date, self.method, self.asr_school) {
            Ok(result) => result,
            Err(e) => {
                warn!("{} timings unavailable: {:#}", timings.name(), e);
                None
            }
        }
    }
}
