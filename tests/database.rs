//! Integration tests for the SQLite-backed masjid registry and Quran log,
//! and for refreshing a board from them.

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use miqat::board::{PositionSource, PrayerBoard, Sources};
use miqat::db::{
    self,
    repository::{MasjidRepo, MasjidStore, QuranRepo},
};
use miqat::models::{ApiTimings, Masjid, PrayerSlot, QuranActivity, Schedule, SlotTimes};
use miqat::prayer_times::{
    AsrSchool, ConfiguredLocation, Coordinates, FALLBACK_POSITION, OfflineCalculator,
    RecordStore, TimingSource,
};
use tempfile::TempDir;

fn open_db() -> (TempDir, rusqlite::Connection) {
    let dir = tempfile::tempdir().expect("tempdir");
    let conn = db::open(&dir.path().join("miqat.db")).expect("open db");
    (dir, conn)
}

fn june_12() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 12).unwrap()
}

struct Offline;

impl TimingSource for Offline {
    fn name(&self) -> &'static str {
        "unreachable"
    }

    fn fetch(
        &self,
        _position: Coordinates,
        _date: NaiveDate,
        _method: u8,
        _school: AsrSchool,
    ) -> Result<Option<ApiTimings>> {
        Err(anyhow!("connection refused"))
    }
}

fn jamia() -> Masjid {
    Masjid {
        id: "jamia".into(),
        name: "Jamia Masjid".into(),
        address: Some("1 Main Rd".into()),
        city: Some("Bangalore".into()),
        contact: None,
        latitude: Some(12.98),
        longitude: Some(77.60),
    }
}

#[test]
fn test_masjid_round_trip_and_update() {
    let (_dir, conn) = open_db();
    MasjidRepo::upsert(&conn, &jamia()).unwrap();

    let mut renamed = jamia();
    renamed.name = "Jamia Masjid (Old City)".into();
    MasjidRepo::upsert(&conn, &renamed).unwrap();

    let all = MasjidRepo::list(&conn).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0], renamed);
}

#[test]
fn test_remove_drops_timetable() {
    let (_dir, conn) = open_db();
    MasjidRepo::upsert(&conn, &jamia()).unwrap();
    MasjidRepo::set_time(&conn, "jamia", "IshaAzan", "20:00").unwrap();

    assert!(MasjidRepo::remove(&conn, "jamia").unwrap());
    assert!(MasjidRepo::get(&conn, "jamia").unwrap().is_none());
    assert!(MasjidRepo::times_for(&conn, "jamia").unwrap().is_none());
    assert!(!MasjidRepo::remove(&conn, "jamia").unwrap());
}

#[test]
fn test_board_uses_stored_times_when_timing_source_is_down() {
    let (_dir, conn) = open_db();
    MasjidRepo::upsert(&conn, &jamia()).unwrap();
    MasjidRepo::set_time(&conn, "jamia", "DhuhrAzan", "13:00").unwrap();
    MasjidRepo::set_time(&conn, "jamia", "DhuhrPrayer", "13:30").unwrap();
    MasjidRepo::set_time(&conn, "jamia", "IftariTime", "18:35").unwrap();

    let store = MasjidStore::new(&conn);
    let location = ConfiguredLocation::default();
    let sources = Sources {
        records: &store,
        location: &location,
        timings: &Offline,
    };

    let mut board = PrayerBoard::new(Schedule::builtin_default(), 1, AsrSchool::Hanafi);
    board.select_masjid(Some("jamia"));
    let report = board.refresh(&sources, june_12());

    assert!(report.stored_record);
    assert_eq!(report.timing_source, None);
    assert_eq!(report.position_source, PositionSource::Masjid);

    let schedule = board.schedule();
    assert_eq!(
        schedule.get(PrayerSlot::Dhuhr),
        Some(&SlotTimes::new("13:00", "13:30", "14:30"))
    );
    assert_eq!(schedule.get(PrayerSlot::Asr).unwrap().prayer, "15:45");
    assert_eq!(schedule.iftari.as_deref(), Some("18:35"));
    assert_eq!(schedule.sehri.as_deref(), Some("05:00"));
}

#[test]
fn test_board_with_offline_calculator_and_no_masjid() {
    let (_dir, conn) = open_db();
    let store = MasjidStore::new(&conn);
    let location = ConfiguredLocation::new(None, None);
    let calculator = OfflineCalculator::new(330).unwrap();
    let sources = Sources {
        records: &store,
        location: &location,
        timings: &calculator,
    };

    let mut board = PrayerBoard::new(Schedule::builtin_default(), 1, AsrSchool::Hanafi);
    let report = board.refresh(&sources, june_12());

    assert!(!report.stored_record);
    assert_eq!(report.timing_source, Some("offline"));
    assert_eq!(report.position, FALLBACK_POSITION);
    assert_eq!(board.last_position(), Some(FALLBACK_POSITION));

    // Calculated Isha closes at the end of the day; Jumuah still comes from defaults.
    assert_eq!(board.schedule().get(PrayerSlot::Isha).unwrap().end, "23:59");
    assert_eq!(
        board.schedule().get(PrayerSlot::Jumuah),
        Schedule::builtin_default().get(PrayerSlot::Jumuah)
    );
}

#[test]
fn test_unknown_masjid_yields_no_record() {
    let (_dir, conn) = open_db();
    let store = MasjidStore::new(&conn);
    assert!(store.get("missing").unwrap().is_none());
    assert!(store.position("missing").unwrap().is_none());
}

#[test]
fn test_quran_log_range_and_rewards() {
    let (_dir, conn) = open_db();
    QuranRepo::log_activity(&conn, "2024-06-10", QuranActivity::Read, 20).unwrap();
    QuranRepo::log_activity(&conn, "2024-06-11", QuranActivity::Listen, 12).unwrap();
    QuranRepo::log_activity(&conn, "2024-06-12", QuranActivity::Read, 5).unwrap();

    let week = QuranRepo::get_range(&conn, "2024-06-11", "2024-06-12").unwrap();
    assert_eq!(week.len(), 2);
    assert_eq!(week[0].ayahs_listened, 12);
    assert_eq!(week[1].ayahs_read, 5);

    let untouched = QuranRepo::get_day(&conn, "2024-06-01").unwrap();
    assert_eq!(untouched.total(), 0);

    let tally = QuranRepo::redeem(&conn, 30).unwrap();
    assert_eq!(tally.earned, 37);
    assert_eq!(tally.available(), 7);
    assert!(QuranRepo::redeem(&conn, 8).is_err());
}

#[test]
fn test_reopening_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("miqat.db");
    {
        let conn = db::open(&path).unwrap();
        MasjidRepo::upsert(&conn, &jamia()).unwrap();
    }
    let conn = db::open(&path).unwrap();
    assert_eq!(MasjidRepo::get(&conn, "jamia").unwrap(), Some(jamia()));
}
