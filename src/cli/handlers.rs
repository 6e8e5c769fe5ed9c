use anyhow::{Result, anyhow, bail};
use chrono::{Duration, Local, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;

use miqat::board::{PrayerBoard, RefreshReport, Sources};
use miqat::config::{AppConfig, TimingProvider};
use miqat::db::repository::{MasjidRepo, MasjidStore, QuranRepo, record_fields};
use miqat::models::rakat::summarize;
use miqat::models::{Masjid, QuranActivity, Schedule};
use miqat::prayer_times::{
    AsrSchool, ConfiguredLocation, Coordinates, FALLBACK_POSITION, NextPrayerState,
    compass_point, method_name, qibla_bearing, timing_source,
};
use miqat::utils::format::{format_clock, format_countdown, format_optional_clock};
use miqat::utils::hijri::{MAX_HIJRI_OFFSET, hijri_string};

use crate::cli::args::{MasjidCommands, QuranCommands};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

// ─── Board ───────────────────────────────────────────────────────────────────

/// Builds the board for `masjid` (or the selected one) and refreshes it for `date`.
pub fn refreshed_board(
    conn: &Connection,
    config: &AppConfig,
    masjid: Option<&str>,
    date: NaiveDate,
) -> Result<(PrayerBoard, RefreshReport)> {
    let mut board = PrayerBoard::from_config(config);
    if let Some(id) = masjid {
        if MasjidRepo::get(conn, id)?.is_none() {
            bail!("No masjid with id '{}'. See `miqat masjid list`", id);
        }
        board.select_masjid(Some(id));
    }

    let records = MasjidStore::new(conn);
    let location = ConfiguredLocation::new(config.location.latitude, config.location.longitude);
    let timings = timing_source(config)?;
    let sources = Sources {
        records: &records,
        location: &location,
        timings: timings.as_ref(),
    };

    let report = board.refresh(&sources, date);
    Ok((board, report))
}

fn place_label(conn: &Connection, config: &AppConfig, board: &PrayerBoard) -> Result<String> {
    if let Some(id) = board.selected_masjid() {
        if let Some(masjid) = MasjidRepo::get(conn, id)? {
            return Ok(masjid.name);
        }
    }
    Ok(config.location.name.clone())
}

fn describe_sources(report: &RefreshReport) -> String {
    let mut parts = Vec::new();
    if report.stored_record {
        parts.push("masjid timetable".to_string());
    }
    if let Some(name) = report.timing_source {
        parts.push(format!("{} at {}", name, report.position_source.label()));
    }
    parts.push("defaults".to_string());
    parts.join(" → ")
}

// ─── Times ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TimesExport<'a> {
    date: String,
    place: String,
    schedule: &'a Schedule,
    next: NextPrayerState,
}

pub fn handle_times(
    conn: &Connection,
    config: &AppConfig,
    masjid: Option<&str>,
    json: bool,
) -> Result<()> {
    let now = Local::now().naive_local();
    let today = now.date();
    let (board, report) = refreshed_board(conn, config, masjid, today)?;
    let place = place_label(conn, config, &board)?;
    let next = board.next_prayer(now);

    if json {
        let export = TimesExport {
            date: today.format("%Y-%m-%d").to_string(),
            place,
            schedule: board.schedule(),
            next,
        };
        println!("{}", serde_json::to_string_pretty(&export)?);
        return Ok(());
    }

    let use_24h = config.display.clock_24h;
    let clock = |t: &str| format_clock(t, use_24h);

    println!();
    println_colored!(GOLD, "  Prayer Times for {} ({})", place, today.format("%Y-%m-%d"));
    let hijri = hijri_string(today, config.display.hijri_offset);
    if !hijri.is_empty() {
        println_colored!(DIM, "  {}", hijri);
    }
    println!();
    println_colored!(
        DIM,
        "  {:<9}  {:>9}  {:>9}  {:>9}  {}",
        "Prayer",
        "Azan",
        "Iqamah",
        "Ends",
        "Rakats"
    );

    for (entry, plan) in board.schedule().with_rakats() {
        let row = format!(
            "  {:<9}  {:>9}  {:>9}  {:>9}  {}",
            entry.slot.display_name(),
            clock(&entry.times.azan),
            clock(&entry.times.prayer),
            clock(&entry.times.end),
            summarize(plan)
        );
        if next.slot() == Some(entry.slot) {
            println_colored!(BOLD, "{}  ◀", row);
        } else {
            println!("{}", row);
        }
    }

    println!();
    println!(
        "  Sehri {}   Iftari {}",
        format_optional_clock(board.schedule().sehri.as_deref(), use_24h),
        format_optional_clock(board.schedule().iftari.as_deref(), use_24h)
    );

    println!();
    print_next(&next, use_24h);
    println_colored!(DIM, "  Sources: {}", describe_sources(&report));
    println!();
    Ok(())
}

fn print_next(next: &NextPrayerState, use_24h: bool) {
    match next {
        NextPrayerState::Upcoming(next) => {
            let when = if next.tomorrow { " tomorrow" } else { "" };
            println_colored!(
                AMBER,
                "  Next: {} at {}{} (in {})",
                next.slot.display_name(),
                format_clock(&next.time, use_24h),
                when,
                format_countdown(&next.remaining)
            );
        }
        NextPrayerState::Unavailable => {
            println_colored!(RED, "  Next prayer unavailable");
        }
    }
}

// ─── Next ────────────────────────────────────────────────────────────────────

pub fn handle_next(conn: &Connection, config: &AppConfig, masjid: Option<&str>) -> Result<()> {
    let now = Local::now().naive_local();
    let (board, _) = refreshed_board(conn, config, masjid, now.date())?;
    print_next(&board.next_prayer(now), config.display.clock_24h);
    Ok(())
}

// ─── Qibla ───────────────────────────────────────────────────────────────────

pub fn handle_qibla(config: &AppConfig, lat: Option<f64>, lon: Option<f64>) -> Result<()> {
    let (position, label) = match (lat, lon) {
        (Some(lat), Some(lon)) => (Coordinates::new(lat, lon), format!("{:.4}, {:.4}", lat, lon)),
        _ => match (config.location.latitude, config.location.longitude) {
            (Some(lat), Some(lon)) => (Coordinates::new(lat, lon), config.location.name.clone()),
            _ => (FALLBACK_POSITION, config.location.name.clone()),
        },
    };

    let bearing = qibla_bearing(position);
    println!();
    println_colored!(GOLD, "  Qibla from {}", label);
    println_colored!(BOLD, "  {:.1}° {}", bearing, compass_point(bearing));
    println_colored!(DIM, "  (clockwise from true north)");
    println!();
    Ok(())
}

// ─── Settings ────────────────────────────────────────────────────────────────

pub struct SettingsUpdate {
    pub school: Option<String>,
    pub method: Option<u8>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub name: Option<String>,
    pub source: Option<String>,
    pub tz: Option<String>,
    pub hijri_offset: Option<i32>,
    pub clock_24h: Option<bool>,
}

impl SettingsUpdate {
    fn is_empty(&self) -> bool {
        self.school.is_none()
            && self.method.is_none()
            && self.lat.is_none()
            && self.lon.is_none()
            && self.name.is_none()
            && self.source.is_none()
            && self.tz.is_none()
            && self.hijri_offset.is_none()
            && self.clock_24h.is_none()
    }
}

pub fn handle_settings(config: &mut AppConfig, update: SettingsUpdate) -> Result<()> {
    if update.is_empty() {
        print_settings(config);
        return Ok(());
    }

    if let Some(school) = &update.school {
        config.calculation.asr_school = school.parse::<AsrSchool>()?;
    }
    if let Some(method) = update.method {
        if method_name(method).is_none() {
            bail!("Unknown calculation method {}. Known ids: 1-5, 7-11, 13, 15", method);
        }
        config.calculation.method = method;
    }
    if let (Some(lat), Some(lon)) = (update.lat, update.lon) {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            bail!("Coordinates out of range: {}, {}", lat, lon);
        }
        config.location.latitude = Some(lat);
        config.location.longitude = Some(lon);
    }
    if let Some(name) = update.name {
        config.location.name = name;
    }
    if let Some(source) = &update.source {
        config.calculation.source = source.parse::<TimingProvider>()?;
    }
    if let Some(tz) = &update.tz {
        config.calculation.timezone_offset =
            parse_tz_offset(tz).map_err(|_| anyhow!("Invalid UTC offset '{}'", tz))?;
    }
    if let Some(offset) = update.hijri_offset {
        config.display.hijri_offset = check_hijri_offset(offset)?;
    }
    if let Some(clock_24h) = update.clock_24h {
        config.display.clock_24h = clock_24h;
    }

    config.save()?;
    println_colored!(GREEN, "  ✓ Settings saved");
    print_settings(config);
    Ok(())
}

fn print_settings(config: &AppConfig) {
    let calc = &config.calculation;
    let position = match (config.location.latitude, config.location.longitude) {
        (Some(lat), Some(lon)) => format!("{:.4}, {:.4}", lat, lon),
        _ => "not set (using default)".to_string(),
    };
    let source = match calc.source {
        TimingProvider::AlAdhan => "aladhan",
        TimingProvider::Offline => "offline",
    };

    println!();
    println_colored!(GOLD, "  Settings");
    println!();
    println!("  Location:   {} ({})", config.location.name, position);
    println!(
        "  Method:     {} ({})",
        calc.method,
        method_name(calc.method).unwrap_or("unknown")
    );
    println!("  Asr:        {}", calc.asr_school.display_name());
    println!("  Source:     {}", source);
    println!("  UTC offset: {}", format_tz_offset(calc.timezone_offset));
    println!(
        "  Masjid:     {}",
        config.display.selected_masjid.as_deref().unwrap_or("none")
    );
    println!("  Hijri adj.: {:+}", config.display.hijri_offset);
    println!("  24h clock:  {}", config.display.clock_24h);
    println!();
}

// ─── Masjid ──────────────────────────────────────────────────────────────────

pub fn handle_masjid(conn: &Connection, config: &mut AppConfig, action: MasjidCommands) -> Result<()> {
    match action {
        MasjidCommands::Add {
            id,
            name,
            address,
            city,
            contact,
            lat,
            lon,
        } => {
            let masjid = Masjid {
                id: id.trim().to_string(),
                name,
                address,
                city,
                contact,
                latitude: lat,
                longitude: lon,
            };
            MasjidRepo::upsert(conn, &masjid)?;
            println_colored!(GREEN, "  ✓ Saved masjid '{}' ({})", masjid.name, masjid.id);
        }
        MasjidCommands::List => {
            let masjids = MasjidRepo::list(conn)?;
            println!();
            if masjids.is_empty() {
                println_colored!(DIM, "  No masjids yet. Add one with `miqat masjid add <id> <name>`");
            }
            let selected = config.display.selected_masjid.as_deref();
            for masjid in &masjids {
                let marker = if selected == Some(masjid.id.as_str()) { "●" } else { " " };
                let city = masjid.city.as_deref().unwrap_or("");
                println!("  {} {:<16} {:<30} {}", marker, masjid.id, masjid.name, city);
            }
            println!();
        }
        MasjidCommands::Show { id } => {
            let masjid = require_masjid(conn, &id)?;
            let record = MasjidRepo::times_for(conn, &id)?.unwrap_or_default();
            println!();
            println_colored!(GOLD, "  {} ({})", masjid.name, masjid.id);
            for (label, value) in [
                ("Address", &masjid.address),
                ("City", &masjid.city),
                ("Contact", &masjid.contact),
            ] {
                if let Some(value) = value {
                    println!("  {:<8} {}", label, value);
                }
            }
            if let Some(c) = masjid.coordinates() {
                println!("  {:<8} {:.4}, {:.4}", "Position", c.latitude, c.longitude);
            }
            println!();
            if record.is_empty() {
                println_colored!(DIM, "  No stored times; calculated times are used");
            }
            for field in record_fields() {
                if let Some(value) = record.get(&field) {
                    println!("  {:<16} {}", field, value);
                }
            }
            println!();
        }
        MasjidCommands::Set { id, field, time } => {
            let field = MasjidRepo::set_time(conn, &id, &field, &time)?;
            println_colored!(GREEN, "  ✓ {} {} = {}", id, field, time.trim());
        }
        MasjidCommands::Unset { id, field } => {
            if MasjidRepo::clear_time(conn, &id, &field)? {
                println_colored!(GREEN, "  ✓ Cleared {} for {}", field, id);
            } else {
                println_colored!(DIM, "  {} had no value for {}", id, field);
            }
        }
        MasjidCommands::Remove { id } => {
            if !MasjidRepo::remove(conn, &id)? {
                bail!("No masjid with id '{}'", id);
            }
            if config.display.selected_masjid.as_deref() == Some(id.as_str()) {
                config.display.selected_masjid = None;
                config.save()?;
            }
            println_colored!(AMBER, "  Removed masjid '{}'", id);
        }
        MasjidCommands::Select { id } => {
            let id = id.trim();
            if id.is_empty() || id.eq_ignore_ascii_case("none") {
                config.display.selected_masjid = None;
                config.save()?;
                println_colored!(GREEN, "  ✓ Cleared masjid selection");
            } else {
                let masjid = require_masjid(conn, id)?;
                config.display.selected_masjid = Some(masjid.id.clone());
                config.save()?;
                println_colored!(GREEN, "  ✓ Selected {}", masjid.name);
            }
        }
        MasjidCommands::Directions { id } => {
            let masjid = require_masjid(conn, &id)?;
            match masjid.directions_url() {
                Some(url) => println!("{}", url),
                None => bail!(
                    "'{}' has no position. Add one with `miqat masjid add {} \"{}\" --lat .. --lon ..`",
                    id,
                    id,
                    masjid.name
                ),
            }
        }
    }
    Ok(())
}

fn require_masjid(conn: &Connection, id: &str) -> Result<Masjid> {
    MasjidRepo::get(conn, id)?.ok_or_else(|| anyhow!("No masjid with id '{}'", id))
}

// ─── Quran ───────────────────────────────────────────────────────────────────

pub fn handle_quran(conn: &Connection, action: QuranCommands) -> Result<()> {
    let today = Local::now().date_naive();
    let today_str = today.format("%Y-%m-%d").to_string();

    match action {
        QuranCommands::Read { ayahs } => log_quran(conn, &today_str, QuranActivity::Read, ayahs)?,
        QuranCommands::Listen { ayahs } => {
            log_quran(conn, &today_str, QuranActivity::Listen, ayahs)?
        }
        QuranCommands::Stats { days } => {
            let (start, days) = stats_window(today, days);
            let start_str = start.format("%Y-%m-%d").to_string();
            let logs = QuranRepo::get_range(conn, &start_str, &today_str)?;
            let tally = QuranRepo::rewards(conn)?;

            println!();
            println_colored!(GOLD, "  Quran, last {} days", days);
            println!();
            if logs.is_empty() {
                println_colored!(DIM, "  Nothing logged yet");
            }
            for log in &logs {
                println!(
                    "  {}  read {:>4}  listened {:>4}",
                    log.date, log.ayahs_read, log.ayahs_listened
                );
            }
            let total: u32 = logs.iter().map(|l| l.total()).sum();
            println!();
            println_colored!(BOLD, "  Ayahs:   {}", total);
            println!(
                "  Rewards: {} earned, {} redeemed, {} available",
                tally.earned,
                tally.redeemed,
                tally.available()
            );
            println!();
        }
        QuranCommands::Redeem { amount } => {
            let tally = QuranRepo::redeem(conn, amount)?;
            println_colored!(GREEN, "  ✓ Redeemed {}, {} left", amount, tally.available());
        }
    }
    Ok(())
}

fn log_quran(conn: &Connection, date: &str, activity: QuranActivity, ayahs: u32) -> Result<()> {
    if ayahs == 0 {
        bail!("Nothing to log");
    }
    let earned = QuranRepo::log_activity(conn, date, activity, ayahs)?;
    let day = QuranRepo::get_day(conn, date)?;
    println_colored!(
        GREEN,
        "  ✓ Logged {} ayahs ({}), +{} rewards. Today: {} read, {} listened",
        ayahs,
        activity.as_str(),
        earned,
        day.ayahs_read,
        day.ayahs_listened
    );
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Parse a UTC offset string into total minutes.
/// Accepts: "5:30", "+5:30", "-5:30", "5", "+5", "5.5"
fn parse_tz_offset(s: &str) -> Result<i32> {
    const MAX_HOURS: i32 = 14;

    let s = s.trim().trim_start_matches('+');
    let negative = s.starts_with('-');
    let s = s.trim_start_matches('-');
    let sign = if negative { -1 } else { 1 };

    let minutes = if let Some((hours, mins)) = s.split_once(':') {
        let hours: i32 = hours.parse()?;
        let mins: i32 = mins.parse()?;
        if !(0..60).contains(&mins) {
            bail!("Minutes must be below 60");
        }
        if !(0..=MAX_HOURS).contains(&hours) {
            bail!("Offset beyond ±14 hours");
        }
        hours * 60 + mins
    } else if s.contains('.') {
        let hours: f64 = s.parse()?;
        if !(0.0..=MAX_HOURS as f64).contains(&hours) {
            bail!("Offset beyond ±14 hours");
        }
        (hours * 60.0).round() as i32
    } else {
        let hours: i32 = s.parse()?;
        if !(0..=MAX_HOURS).contains(&hours) {
            bail!("Offset beyond ±14 hours");
        }
        hours * 60
    };

    if minutes > MAX_HOURS * 60 {
        bail!("Offset beyond ±14 hours");
    }
    Ok(sign * minutes)
}

fn check_hijri_offset(offset: i32) -> Result<i32> {
    if !(-MAX_HIJRI_OFFSET..=MAX_HIJRI_OFFSET).contains(&offset) {
        bail!("Hijri adjustment must be within ±{} days", MAX_HIJRI_OFFSET);
    }
    Ok(offset)
}

/// First day of a "last N days" window ending today, and the day count it covers.
/// Windows reaching past the earliest representable date are cut short there.
fn stats_window(today: NaiveDate, days: u32) -> (NaiveDate, u32) {
    let days = days.max(1);
    match today.checked_sub_signed(Duration::days(days as i64 - 1)) {
        Some(start) => (start, days),
        None => {
            let covered = (today - NaiveDate::MIN).num_days() + 1;
            (NaiveDate::MIN, u32::try_from(covered).unwrap_or(u32::MAX))
        }
    }
}

/// Format total minutes as "+H:MM" string
fn format_tz_offset(minutes: i32) -> String {
    let sign = if minutes < 0 { "-" } else { "+" };
    let abs = minutes.abs();
    let h = abs / 60;
    let m = abs % 60;
    if m == 0 {
        format!("{}{}", sign, h)
    } else {
        format!("{}{}:{:02}", sign, h, m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tz_offsets() {
        assert_eq!(parse_tz_offset("+5:30").unwrap(), 330);
        assert_eq!(parse_tz_offset("-3").unwrap(), -180);
        assert_eq!(parse_tz_offset("5.75").unwrap(), 345);
        assert!(parse_tz_offset("15").is_err());
        assert!(parse_tz_offset("abc").is_err());
        assert!(parse_tz_offset("99999999").is_err());
        assert!(parse_tz_offset("-99999999:00").is_err());
        assert!(parse_tz_offset("5:75").is_err());
        assert!(parse_tz_offset("14:30").is_err());
        assert!(parse_tz_offset("99999999.5").is_err());
        assert_eq!(parse_tz_offset("-14").unwrap(), -840);
        assert_eq!(format_tz_offset(330), "+5:30");
        assert_eq!(format_tz_offset(-300), "-5");
    }

    #[test]
    fn hijri_adjustment_is_bounded() {
        assert_eq!(check_hijri_offset(-2).unwrap(), -2);
        assert_eq!(check_hijri_offset(30).unwrap(), 30);
        assert!(check_hijri_offset(31).is_err());
        assert!(check_hijri_offset(i32::MIN).is_err());
    }

    #[test]
    fn stats_window_covers_requested_days() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        assert_eq!(
            stats_window(today, 7),
            (NaiveDate::from_ymd_opt(2024, 6, 6).unwrap(), 7)
        );
        assert_eq!(stats_window(today, 0), (today, 1));
    }

    #[test]
    fn stats_window_stops_at_earliest_date() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let (start, days) = stats_window(today, u32::MAX);
        assert_eq!(start, NaiveDate::MIN);
        assert_eq!(
            i64::from(days),
            (today - NaiveDate::MIN).num_days() + 1
        );
    }

    #[test]
    fn source_description_lists_fallback_chain() {
        let report = RefreshReport {
            date: NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
            stored_record: true,
            timing_source: Some("aladhan"),
            position: FALLBACK_POSITION,
            position_source: miqat::board::PositionSource::Masjid,
        };
        assert_eq!(
            describe_sources(&report),
            "masjid timetable → aladhan at masjid → defaults"
        );
    }
}
