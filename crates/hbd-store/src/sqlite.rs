//! SQLite-backed record store for birthdays and the notification log.
//!
//! Every write autocommits, so a job interrupted halfway keeps whatever
//! per-record updates it already made.

use chrono::{DateTime, Utc};
use hbd_core::error::{HbdError, Result};
use hbd_core::traits::RecordStore;
use hbd_core::types::{BirthdayRecord, MonthDay, NewBirthday, NotificationLogEntry};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Birthday database — one connection, held for the life of the store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the database file.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)
            .map_err(|e| HbdError::store(format!("DB open {}: {e}", path.display())))?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| HbdError::store(format!("busy_timeout: {e}")))?;
        let store = Self::from_connection(conn)?;
        tracing::debug!("🗄️ Opened birthday DB at {}", path.display());
        Ok(store)
    }

    /// Fresh in-memory database (tests, dry runs).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| HbdError::store(format!("DB open (memory): {e}")))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Create tables if missing.
    fn migrate(&self) -> Result<()> {
        self.lock()?
            .execute_batch(
                "
            CREATE TABLE IF NOT EXISTS birthdays (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                date TEXT NOT NULL,             -- YYYY-MM-DD
                age INTEGER NOT NULL DEFAULT 0
            );

            -- Append-only; birthday_id is deliberately not a foreign key
            CREATE TABLE IF NOT EXISTS notifications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                birthday_id INTEGER NOT NULL,
                message TEXT NOT NULL,
                timestamp TEXT NOT NULL         -- RFC 3339, UTC
            );
            ",
            )
            .map_err(|e| HbdError::store(format!("Migration: {e}")))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| HbdError::store(format!("Lock: {e}")))
    }

    fn query_birthdays(
        &self,
        sql: &str,
        param: Option<&str>,
    ) -> Result<Vec<BirthdayRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| HbdError::store(format!("Prepare: {e}")))?;
        let rows = match param {
            Some(p) => stmt.query_map(params![p], row_to_birthday),
            None => stmt.query_map([], row_to_birthday),
        }
        .map_err(|e| HbdError::store(format!("Query: {e}")))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| HbdError::store(format!("Read row: {e}")))
    }
}

fn row_to_birthday(row: &rusqlite::Row<'_>) -> rusqlite::Result<BirthdayRecord> {
    let age: i64 = row.get(3)?;
    Ok(BirthdayRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        date: row.get(2)?,
        age: u32::try_from(age).unwrap_or(0),
    })
}

impl RecordStore for SqliteStore {
    fn list_all(&self) -> Result<Vec<BirthdayRecord>> {
        self.query_birthdays(
            "SELECT id, name, date, age FROM birthdays ORDER BY id DESC",
            None,
        )
    }

    fn list_matching_month_day(&self, month_day: MonthDay) -> Result<Vec<BirthdayRecord>> {
        self.query_birthdays(
            "SELECT id, name, date, age FROM birthdays
             WHERE strftime('%m-%d', date) = ?1 ORDER BY id ASC",
            Some(&month_day.to_string()),
        )
    }

    fn get(&self, id: i64) -> Result<Option<BirthdayRecord>> {
        self.lock()?
            .query_row(
                "SELECT id, name, date, age FROM birthdays WHERE id = ?1",
                params![id],
                row_to_birthday,
            )
            .optional()
            .map_err(|e| HbdError::store(format!("Get {id}: {e}")))
    }

    fn add(&self, birthday: &NewBirthday, age: u32) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO birthdays (name, date, age) VALUES (?1, ?2, ?3)",
            params![birthday.name, birthday.date, age],
        )
        .map_err(|e| HbdError::store(format!("Insert: {e}")))?;
        let id = conn.last_insert_rowid();
        tracing::info!("🎂 Birthday added: '{}' ({}) id={id}", birthday.name, birthday.date);
        Ok(id)
    }

    fn update(&self, id: i64, birthday: &NewBirthday, age: u32) -> Result<()> {
        let changed = self
            .lock()?
            .execute(
                "UPDATE birthdays SET name = ?1, date = ?2, age = ?3 WHERE id = ?4",
                params![birthday.name, birthday.date, age, id],
            )
            .map_err(|e| HbdError::store(format!("Update {id}: {e}")))?;
        if changed == 0 {
            return Err(HbdError::NotFound(id));
        }
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<()> {
        let changed = self
            .lock()?
            .execute("DELETE FROM birthdays WHERE id = ?1", params![id])
            .map_err(|e| HbdError::store(format!("Delete {id}: {e}")))?;
        if changed == 0 {
            return Err(HbdError::NotFound(id));
        }
        tracing::info!("🗑️ Birthday deleted: id={id}");
        Ok(())
    }

    fn update_age(&self, id: i64, age: u32) -> Result<()> {
        let changed = self
            .lock()?
            .execute(
                "UPDATE birthdays SET age = ?1 WHERE id = ?2",
                params![age, id],
            )
            .map_err(|e| HbdError::store(format!("Update age {id}: {e}")))?;
        if changed == 0 {
            return Err(HbdError::NotFound(id));
        }
        Ok(())
    }

    fn append_notification_log(
        &self,
        birthday_id: i64,
        message: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<i64> {
        let conn = self.lock().map_err(|e| HbdError::log_write(e.to_string()))?;
        conn.execute(
            "INSERT INTO notifications (birthday_id, message, timestamp) VALUES (?1, ?2, ?3)",
            params![birthday_id, message, timestamp.to_rfc3339()],
        )
        .map_err(|e| HbdError::log_write(format!("Insert notification: {e}")))?;
        Ok(conn.last_insert_rowid())
    }

    fn list_notifications(&self, limit: usize) -> Result<Vec<NotificationLogEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, birthday_id, message, timestamp FROM notifications
                 ORDER BY id DESC LIMIT ?1",
            )
            .map_err(|e| HbdError::store(format!("Prepare: {e}")))?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(params![limit], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(|e| HbdError::store(format!("Query: {e}")))?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, birthday_id, message, ts) =
                row.map_err(|e| HbdError::store(format!("Read row: {e}")))?;
            let timestamp = DateTime::parse_from_rfc3339(&ts)
                .map_err(|e| HbdError::store(format!("Bad timestamp '{ts}' on entry {id}: {e}")))?
                .with_timezone(&Utc);
            entries.push(NotificationLogEntry {
                id,
                birthday_id,
                message,
                timestamp,
            });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn add(store: &SqliteStore, name: &str, date: &str) -> i64 {
        store.add(&NewBirthday::parse(name, date).unwrap(), 0).unwrap()
    }

    fn md(month: u32, day: u32) -> MonthDay {
        MonthDay::of(NaiveDate::from_ymd_opt(2024, month, day).unwrap())
    }

    #[test]
    fn test_add_and_get() {
        let s = store();
        let id = s.add(&NewBirthday::parse("Ada", "1990-03-15").unwrap(), 34).unwrap();
        let rec = s.get(id).unwrap().unwrap();
        assert_eq!(rec.name, "Ada");
        assert_eq!(rec.date, "1990-03-15");
        assert_eq!(rec.age, 34);
        assert!(s.get(id + 100).unwrap().is_none());
    }

    #[test]
    fn test_list_all_newest_first() {
        let s = store();
        let a = add(&s, "Ada", "1990-03-15");
        let b = add(&s, "Bo", "1985-07-01");
        let ids: Vec<i64> = s.list_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![b, a]);
    }

    #[test]
    fn test_month_day_match_ignores_year_and_sorts_ascending() {
        let s = store();
        let a = add(&s, "Ada", "1990-03-15");
        add(&s, "Bo", "1990-03-16");
        let c = add(&s, "Cy", "2001-03-15");
        add(&s, "Di", "1990-04-15");

        let ids: Vec<i64> = s
            .list_matching_month_day(md(3, 15))
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![a, c]);
        assert!(s.list_matching_month_day(md(12, 31)).unwrap().is_empty());
    }

    #[test]
    fn test_update_and_delete() {
        let s = store();
        let id = add(&s, "Ada", "1990-03-15");
        s.update(id, &NewBirthday::parse("Ada L.", "1815-12-10").unwrap(), 208)
            .unwrap();
        let rec = s.get(id).unwrap().unwrap();
        assert_eq!(rec.name, "Ada L.");
        assert_eq!(rec.date, "1815-12-10");
        assert_eq!(rec.age, 208);

        s.delete(id).unwrap();
        assert!(s.get(id).unwrap().is_none());
        assert!(matches!(s.delete(id), Err(HbdError::NotFound(_))));
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let s = store();
        let nb = NewBirthday::parse("Ghost", "2000-01-01").unwrap();
        assert!(matches!(s.update(9, &nb, 1), Err(HbdError::NotFound(9))));
        assert!(matches!(s.update_age(9, 1), Err(HbdError::NotFound(9))));
    }

    #[test]
    fn test_update_age_only_touches_age() {
        let s = store();
        let id = add(&s, "Ada", "1990-03-15");
        s.update_age(id, 34).unwrap();
        let rec = s.get(id).unwrap().unwrap();
        assert_eq!(rec.age, 34);
        assert_eq!(rec.name, "Ada");
    }

    #[test]
    fn test_notification_log_survives_birthday_delete() {
        let s = store();
        let id = add(&s, "Ada", "1990-03-15");
        let ts = Utc.with_ymd_and_hms(2024, 3, 15, 7, 0, 0).unwrap();
        let first = s.append_notification_log(id, "one", ts).unwrap();
        let second = s.append_notification_log(id, "two", ts).unwrap();
        assert!(second > first);

        s.delete(id).unwrap();
        let log = s.list_notifications(10).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].message, "two");
        assert_eq!(log[0].birthday_id, id);
        assert_eq!(log[1].timestamp, ts);
    }

    #[test]
    fn test_list_notifications_limit() {
        let s = store();
        let ts = Utc::now();
        for i in 0..5 {
            s.append_notification_log(1, &format!("m{i}"), ts).unwrap();
        }
        let log = s.list_notifications(2).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].message, "m4");
    }

    #[test]
    fn test_open_file_persists() {
        let dir = std::env::temp_dir().join("hbd-test-store");
        std::fs::remove_dir_all(&dir).ok();
        let path = dir.join("nested").join("birthdays.db");
        {
            let s = SqliteStore::open(&path).unwrap();
            add(&s, "Ada", "1990-03-15");
        }
        let s = SqliteStore::open(&path).unwrap();
        assert_eq!(s.list_all().unwrap().len(), 1);
        std::fs::remove_dir_all(&dir).ok();
    }
}
