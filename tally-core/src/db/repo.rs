//! Database repository layer
//!
//! Provides query and insert operations for events and records. The
//! repository hands out point-in-time snapshots; all day-dependent
//! aggregation happens in [`crate::analytics`] so the calendar-day
//! convention lives in exactly one place.

use crate::error::{Error, Result};
use crate::types::{AttributeDefinition, Event, Record, RecordFilter};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

/// SQLite-backed store for events and records.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable foreign keys and WAL mode for better concurrency
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    /// Get the underlying connection (for advanced use)
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    // ============================================
    // Event operations
    // ============================================

    /// Insert or update an event
    pub fn upsert_event(&self, event: &Event) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO events (id, name, icon, color, category, created_at,
                                is_custom, is_quick_record, attributes, group_name)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                icon = excluded.icon,
                color = excluded.color,
                category = excluded.category,
                is_quick_record = excluded.is_quick_record,
                attributes = excluded.attributes,
                group_name = excluded.group_name
            "#,
            params![
                event.id,
                event.name,
                event.icon,
                event.color as i64,
                event.category.as_str(),
                event.created_at_ms,
                event.is_custom as i32,
                event.is_quick_record as i32,
                serde_json::to_string(&event.attributes)?,
                event.group_name,
            ],
        )?;
        Ok(())
    }

    /// Get an event by id
    pub fn get_event(&self, id: &str) -> Result<Option<Event>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT * FROM events WHERE id = ?", [id], row_to_event)
            .optional()
            .map_err(Error::from)
    }

    /// Resolve an event by id first, then by exact name.
    pub fn find_event(&self, id_or_name: &str) -> Result<Option<Event>> {
        if let Some(event) = self.get_event(id_or_name)? {
            return Ok(Some(event));
        }
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT * FROM events WHERE name = ? ORDER BY created_at ASC LIMIT 1",
            [id_or_name],
            row_to_event,
        )
        .optional()
        .map_err(Error::from)
    }

    /// List all events, oldest first
    pub fn list_events(&self) -> Result<Vec<Event>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM events ORDER BY created_at ASC, id ASC")?;
        let events = stmt
            .query_map([], row_to_event)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(events)
    }

    /// Delete an event and, via cascade, all of its records.
    ///
    /// Returns an error if the event does not exist.
    pub fn delete_event(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute("DELETE FROM events WHERE id = ?", [id])?;
        if changed == 0 {
            return Err(Error::EventNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Number of defined events
    pub fn count_events(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM events", [], |r| r.get(0))?;
        Ok(count)
    }

    // ============================================
    // Record operations
    // ============================================

    /// Insert a record, returning its assigned row id.
    ///
    /// Fails if the owning event does not exist (foreign key).
    pub fn insert_record(&self, record: &Record) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO records (event_id, timestamp, note, attributes)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                record.event_id,
                record.timestamp_ms,
                record.note,
                serde_json::to_string(&record.attributes)?,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Delete a record by id.
    ///
    /// Returns an error if the record does not exist.
    pub fn delete_record(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute("DELETE FROM records WHERE id = ?", [id])?;
        if changed == 0 {
            return Err(Error::RecordNotFound(id));
        }
        Ok(())
    }

    /// List records matching a filter, newest first.
    ///
    /// This is the snapshot the analytics layer consumes: no filter
    /// returns everything, an event id scopes to one event, and the
    /// optional bounds form an inclusive timestamp window.
    pub fn list_records(&self, filter: &RecordFilter) -> Result<Vec<Record>> {
        let conn = self.conn.lock().unwrap();

        let mut sql = String::from("SELECT * FROM records WHERE 1=1");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![];

        if let Some(event_id) = &filter.event_id {
            sql.push_str(" AND event_id = ?");
            params.push(Box::new(event_id.clone()));
        }

        if let Some(since) = filter.since_ms {
            sql.push_str(" AND timestamp >= ?");
            params.push(Box::new(since));
        }

        if let Some(until) = filter.until_ms {
            sql.push_str(" AND timestamp <= ?");
            params.push(Box::new(until));
        }

        sql.push_str(" ORDER BY timestamp DESC, id DESC");

        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_refs.as_slice(), row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Records for one event in an inclusive timestamp window.
    pub fn records_in_range(
        &self,
        event_id: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<Record>> {
        self.list_records(&RecordFilter {
            event_id: Some(event_id.to_string()),
            since_ms: Some(start_ms),
            until_ms: Some(end_ms),
            limit: None,
        })
    }

    /// Count records for one event in an inclusive timestamp window.
    pub fn record_count_in_range(&self, event_id: &str, start_ms: i64, end_ms: i64) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE event_id = ?1 AND timestamp >= ?2 AND timestamp <= ?3",
            params![event_id, start_ms, end_ms],
            |r| r.get(0),
        )?;
        Ok(count)
    }

    /// Total number of records
    pub fn count_records(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM records", [], |r| r.get(0))?;
        Ok(count)
    }

    /// Timestamp of the earliest record, if any
    pub fn first_record_ts(&self) -> Result<Option<i64>> {
        let conn = self.conn.lock().unwrap();
        let ts: Option<i64> =
            conn.query_row("SELECT MIN(timestamp) FROM records", [], |r| r.get(0))?;
        Ok(ts)
    }
}

fn row_to_event(row: &Row) -> rusqlite::Result<Event> {
    let category_str: String = row.get("category")?;
    let category = crate::types::EventCategory::from_str(&category_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            e.into(),
        )
    })?;

    let attributes_json: String = row.get("attributes")?;
    let attributes: Vec<AttributeDefinition> =
        serde_json::from_str(&attributes_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;

    Ok(Event {
        id: row.get("id")?,
        name: row.get("name")?,
        icon: row.get("icon")?,
        color: row.get::<_, i64>("color")? as u32,
        category,
        created_at_ms: row.get("created_at")?,
        is_custom: row.get::<_, i32>("is_custom")? != 0,
        is_quick_record: row.get::<_, i32>("is_quick_record")? != 0,
        attributes,
        group_name: row.get("group_name")?,
    })
}

fn row_to_record(row: &Row) -> rusqlite::Result<Record> {
    let attributes_json: String = row.get("attributes")?;
    let attributes: HashMap<String, String> =
        serde_json::from_str(&attributes_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;

    Ok(Record {
        id: row.get("id")?,
        event_id: row.get("event_id")?,
        timestamp_ms: row.get("timestamp")?,
        note: row.get("note")?,
        attributes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttributeType, EventCategory};

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn seed_event(db: &Database, name: &str) -> Event {
        let mut event = Event::new(name, EventCategory::Health, 1_700_000_000_000);
        event
            .attributes
            .push(AttributeDefinition::new("Amount", AttributeType::Number));
        db.upsert_event(&event).unwrap();
        event
    }

    #[test]
    fn test_event_roundtrip() {
        let db = test_db();
        let event = seed_event(&db, "Run");

        let loaded = db.get_event(&event.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Run");
        assert_eq!(loaded.category, EventCategory::Health);
        assert_eq!(loaded.attributes.len(), 1);
        assert_eq!(loaded.attributes[0].kind, AttributeType::Number);
    }

    #[test]
    fn test_upsert_event_updates() {
        let db = test_db();
        let mut event = seed_event(&db, "Run");
        event.name = "Morning Run".to_string();
        db.upsert_event(&event).unwrap();

        assert_eq!(db.count_events().unwrap(), 1);
        let loaded = db.get_event(&event.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Morning Run");
    }

    #[test]
    fn test_find_event_by_name() {
        let db = test_db();
        let event = seed_event(&db, "Run");
        let by_name = db.find_event("Run").unwrap().unwrap();
        assert_eq!(by_name.id, event.id);
        assert!(db.find_event("Walk").unwrap().is_none());
    }

    #[test]
    fn test_insert_and_list_records() {
        let db = test_db();
        let event = seed_event(&db, "Run");

        let mut record = Record::new(&event.id, 1_700_000_100_000);
        record.note = "5k".to_string();
        record
            .attributes
            .insert("a1".to_string(), "5".to_string());
        let id = db.insert_record(&record).unwrap();
        assert!(id > 0);

        let all = db.list_records(&RecordFilter::default()).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].note, "5k");
        assert_eq!(all[0].attributes["a1"], "5");
    }

    #[test]
    fn test_insert_record_requires_event() {
        let db = test_db();
        let record = Record::new("missing", 1_700_000_000_000);
        assert!(db.insert_record(&record).is_err());
    }

    #[test]
    fn test_list_records_filters() {
        let db = test_db();
        let run = seed_event(&db, "Run");
        let read = seed_event(&db, "Read");

        for (event, ts) in [(&run, 1000), (&run, 2000), (&read, 3000)] {
            db.insert_record(&Record::new(&event.id, ts)).unwrap();
        }

        let scoped = db
            .list_records(&RecordFilter {
                event_id: Some(run.id.clone()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(scoped.len(), 2);
        // Newest first.
        assert_eq!(scoped[0].timestamp_ms, 2000);

        let windowed = db
            .list_records(&RecordFilter {
                since_ms: Some(2000),
                until_ms: Some(3000),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(windowed.len(), 2);

        let limited = db
            .list_records(&RecordFilter {
                limit: Some(1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].timestamp_ms, 3000);
    }

    #[test]
    fn test_delete_event_cascades() {
        let db = test_db();
        let event = seed_event(&db, "Run");
        db.insert_record(&Record::new(&event.id, 1000)).unwrap();

        db.delete_event(&event.id).unwrap();
        assert_eq!(db.count_records().unwrap(), 0);
        assert!(matches!(
            db.delete_event(&event.id),
            Err(Error::EventNotFound(_))
        ));
    }

    #[test]
    fn test_delete_record() {
        let db = test_db();
        let event = seed_event(&db, "Run");
        let id = db.insert_record(&Record::new(&event.id, 1000)).unwrap();

        db.delete_record(id).unwrap();
        assert!(matches!(
            db.delete_record(id),
            Err(Error::RecordNotFound(_))
        ));
    }

    #[test]
    fn test_range_counts_and_first_ts() {
        let db = test_db();
        let event = seed_event(&db, "Run");
        for ts in [1000, 2000, 5000] {
            db.insert_record(&Record::new(&event.id, ts)).unwrap();
        }

        assert_eq!(
            db.record_count_in_range(&event.id, 1000, 2000).unwrap(),
            2
        );
        assert_eq!(db.records_in_range(&event.id, 0, 10_000).unwrap().len(), 3);
        assert_eq!(db.first_record_ts().unwrap(), Some(1000));
    }
}
