use anyhow::{Result, anyhow, bail};
use rusqlite::{Connection, OptionalExtension, params};

use crate::models::schedule::{IFTARI_FIELD, SEHRI_FIELD};
use crate::models::{DailyQuranLog, Masjid, PrayerSlot, QuranActivity, RewardTally, StoredRecord};
use crate::prayer_times::{Coordinates, RecordStore};
use crate::utils::clock::parse_hhmm;

// ─── Masjid repo ─────────────────────────────────────────────────────────────

/// Field names a masjid timetable may carry, e.g. `FajrAzan` or `SehriTime`.
pub fn record_fields() -> Vec<String> {
    let mut fields: Vec<String> = PrayerSlot::all()
        .into_iter()
        .flat_map(|slot| [slot.azan_field(), slot.prayer_field(), slot.end_field()])
        .collect();
    fields.push(SEHRI_FIELD.to_string());
    fields.push(IFTARI_FIELD.to_string());
    fields
}

/// Matches a field name case-insensitively and returns its canonical spelling.
fn canonical_field(field: &str) -> Option<String> {
    record_fields()
        .into_iter()
        .find(|f| f.eq_ignore_ascii_case(field.trim()))
}

fn row_to_masjid(row: &rusqlite::Row<'_>) -> rusqlite::Result<Masjid> {
    Ok(Masjid {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        city: row.get(3)?,
        contact: row.get(4)?,
        latitude: row.get(5)?,
        longitude: row.get(6)?,
    })
}

pub struct MasjidRepo;

impl MasjidRepo {
    pub fn upsert(conn: &Connection, masjid: &Masjid) -> Result<()> {
        if masjid.id.trim().is_empty() {
            bail!("Masjid id must not be empty");
        }
        conn.execute(
            "INSERT INTO masjids (id, name, address, city, contact, latitude, longitude)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
               name = ?2, address = ?3, city = ?4, contact = ?5, latitude = ?6, longitude = ?7",
            params![
                masjid.id,
                masjid.name,
                masjid.address,
                masjid.city,
                masjid.contact,
                masjid.latitude,
                masjid.longitude,
            ],
        )?;
        Ok(())
    }

    pub fn get(conn: &Connection, id: &str) -> Result<Option<Masjid>> {
        conn.query_row(
            "SELECT id, name, address, city, contact, latitude, longitude
             FROM masjids WHERE id = ?1",
            params![id],
            row_to_masjid,
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn list(conn: &Connection) -> Result<Vec<Masjid>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, address, city, contact, latitude, longitude
             FROM masjids ORDER BY name COLLATE NOCASE, id",
        )?;
        let rows = stmt.query_map([], row_to_masjid)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn remove(conn: &Connection, id: &str) -> Result<bool> {
        conn.execute("DELETE FROM masjid_times WHERE masjid_id = ?1", params![id])?;
        let removed = conn.execute("DELETE FROM masjids WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    /// Stores one timetable value. The field must be a known name and the value a valid `HH:MM`.
    pub fn set_time(conn: &Connection, masjid_id: &str, field: &str, value: &str) -> Result<String> {
        if Self::get(conn, masjid_id)?.is_none() {
            bail!("No masjid with id '{}'", masjid_id);
        }
        let field = canonical_field(field).ok_or_else(|| {
            anyhow!(
                "Unknown field '{}'. Expected one of: {}",
                field,
                record_fields().join(", ")
            )
        })?;
        parse_hhmm(value)?;

        conn.execute(
            "INSERT INTO masjid_times (masjid_id, field, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(masjid_id, field) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![masjid_id, field, value.trim()],
        )?;
        Ok(field)
    }

    pub fn clear_time(conn: &Connection, masjid_id: &str, field: &str) -> Result<bool> {
        let field = canonical_field(field).unwrap_or_else(|| field.to_string());
        let removed = conn.execute(
            "DELETE FROM masjid_times WHERE masjid_id = ?1 AND field = ?2",
            params![masjid_id, field],
        )?;
        Ok(removed > 0)
    }

    /// The masjid's timetable, or `None` when nothing is stored for it.
    pub fn times_for(conn: &Connection, masjid_id: &str) -> Result<Option<StoredRecord>> {
        let mut stmt =
            conn.prepare("SELECT field, value FROM masjid_times WHERE masjid_id = ?1")?;
        let rows = stmt.query_map(params![masjid_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut record = StoredRecord::new();
        for r in rows {
            let (field, value) = r?;
            record.insert(field, value);
        }
        Ok(if record.is_empty() { None } else { Some(record) })
    }
}

/// Masjid timetables served from the local database.
pub struct MasjidStore<'c> {
    conn: &'c Connection,
}

impl<'c> MasjidStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl RecordStore for MasjidStore<'_> {
    fn get(&self, place_id: &str) -> Result<Option<StoredRecord>> {
        MasjidRepo::times_for(self.conn, place_id)
    }

    fn position(&self, place_id: &str) -> Result<Option<Coordinates>> {
        Ok(MasjidRepo::get(self.conn, place_id)?.and_then(|m| m.coordinates()))
    }
}

// ─── Quran repo ──────────────────────────────────────────────────────────────

pub struct QuranRepo;

impl QuranRepo {
    /// Adds ayahs to the day's count and credits the rewards they earn.
    pub fn log_activity(
        conn: &Connection,
        date: &str,
        activity: QuranActivity,
        ayahs: u32,
    ) -> Result<u64> {
        let sql = match activity {
            QuranActivity::Read => {
                "INSERT INTO quran_log (date, ayahs_read) VALUES (?1, ?2)
                 ON CONFLICT(date) DO UPDATE SET ayahs_read = ayahs_read + ?2"
            }
            QuranActivity::Listen => {
                "INSERT INTO quran_log (date, ayahs_listened) VALUES (?1, ?2)
                 ON CONFLICT(date) DO UPDATE SET ayahs_listened = ayahs_listened + ?2"
            }
        };
        let earned = activity.rewards_for(ayahs);

        let tx = conn.unchecked_transaction()?;
        tx.execute(sql, params![date, ayahs])?;
        tx.execute(
            "UPDATE quran_rewards SET earned = earned + ?1 WHERE id = 1",
            params![earned as i64],
        )?;
        tx.commit()?;
        Ok(earned)
    }

    pub fn get_day(conn: &Connection, date: &str) -> Result<DailyQuranLog> {
        let row = conn
            .query_row(
                "SELECT ayahs_read, ayahs_listened FROM quran_log WHERE date = ?1",
                params![date],
                |row| Ok((row.get::<_, u32>(0)?, row.get::<_, u32>(1)?)),
            )
            .optional()?;
        let (ayahs_read, ayahs_listened) = row.unwrap_or((0, 0));
        Ok(DailyQuranLog {
            date: date.to_string(),
            ayahs_read,
            ayahs_listened,
        })
    }

    pub fn get_range(conn: &Connection, start: &str, end: &str) -> Result<Vec<DailyQuranLog>> {
        let mut stmt = conn.prepare(
            "SELECT date, ayahs_read, ayahs_listened FROM quran_log
             WHERE date >= ?1 AND date <= ?2 ORDER BY date",
        )?;
        let rows = stmt.query_map(params![start, end], |row| {
            Ok(DailyQuranLog {
                date: row.get(0)?,
                ayahs_read: row.get(1)?,
                ayahs_listened: row.get(2)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn rewards(conn: &Connection) -> Result<RewardTally> {
        let tally = conn
            .query_row(
                "SELECT earned, redeemed FROM quran_rewards WHERE id = 1",
                [],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?
            .map(|(earned, redeemed)| RewardTally {
                earned: earned.max(0) as u64,
                redeemed: redeemed.max(0) as u64,
            })
            .unwrap_or_default();
        Ok(tally)
    }

    /// Spends rewards; fails without touching the tally when too few are available.
    pub fn redeem(conn: &Connection, amount: u64) -> Result<RewardTally> {
        let mut tally = Self::rewards(conn)?;
        tally.redeem(amount)?;
        conn.execute(
            "UPDATE quran_rewards SET redeemed = ?1 WHERE id = 1",
            params![tally.redeemed as i64],
        )?;
        Ok(tally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn set_time_normalises_field_name_and_validates_value() {
        let conn = open();
        MasjidRepo::upsert(&conn, &Masjid::new("jamia", "Jamia Masjid")).unwrap();

        assert_eq!(
            MasjidRepo::set_time(&conn, "jamia", "fajrazan", "05:10").unwrap(),
            "FajrAzan"
        );
        assert!(MasjidRepo::set_time(&conn, "jamia", "FajrPrayer", "5.15").is_err());
        assert!(MasjidRepo::set_time(&conn, "jamia", "Brunch", "11:00").is_err());
        assert!(MasjidRepo::set_time(&conn, "nowhere", "FajrAzan", "05:00").is_err());

        let record = MasjidRepo::times_for(&conn, "jamia").unwrap().unwrap();
        assert_eq!(record.len(), 1);
        assert_eq!(record["FajrAzan"], "05:10");
    }

    #[test]
    fn empty_timetable_reads_as_none() {
        let conn = open();
        MasjidRepo::upsert(&conn, &Masjid::new("jamia", "Jamia Masjid")).unwrap();
        assert!(MasjidStore::new(&conn).get("jamia").unwrap().is_none());
    }

    #[test]
    fn store_reports_masjid_position() {
        let conn = open();
        let mut masjid = Masjid::new("jamia", "Jamia Masjid");
        masjid.latitude = Some(12.9);
        masjid.longitude = Some(77.6);
        MasjidRepo::upsert(&conn, &masjid).unwrap();

        let store = MasjidStore::new(&conn);
        assert_eq!(
            store.position("jamia").unwrap(),
            Some(Coordinates::new(12.9, 77.6))
        );
        assert_eq!(store.position("other").unwrap(), None);
    }

    #[test]
    fn quran_activity_accumulates_and_earns() {
        let conn = open();
        QuranRepo::log_activity(&conn, "2024-06-12", QuranActivity::Read, 10).unwrap();
        QuranRepo::log_activity(&conn, "2024-06-12", QuranActivity::Read, 5).unwrap();
        QuranRepo::log_activity(&conn, "2024-06-12", QuranActivity::Listen, 7).unwrap();

        let day = QuranRepo::get_day(&conn, "2024-06-12").unwrap();
        assert_eq!((day.ayahs_read, day.ayahs_listened), (15, 7));
        assert_eq!(QuranRepo::rewards(&conn).unwrap().available(), 22);
    }

    #[test]
    fn redeem_is_refused_beyond_balance() {
        let conn = open();
        QuranRepo::log_activity(&conn, "2024-06-12", QuranActivity::Listen, 3).unwrap();

        assert!(QuranRepo::redeem(&conn, 4).is_err());
        let tally = QuranRepo::redeem(&conn, 2).unwrap();
        assert_eq!(tally, RewardTally { earned: 3, redeemed: 2 });
        assert_eq!(QuranRepo::rewards(&conn).unwrap().available(), 1);
    }
}
