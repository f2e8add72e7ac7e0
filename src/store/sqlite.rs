//! SQLite-backed record store.
//!
//! One table, `refletters`, keyed by an auto-assigned integer id. Dates are
//! stored as ISO-8601 text. Years are stored as text so that the "ongoing"
//! end year can be the empty string.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, params};

use crate::core::record::{Record, RecordFields, RecordId};
use crate::store::{RecordStore, StoreError};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS refletters(
        id INTEGER PRIMARY KEY,
        name TEXT,
        ref_date DATE,
        start_year TEXT,
        end_year TEXT,
        target TEXT,
        how_known TEXT,
        recommendation TEXT)
";

const SELECT_COLUMNS: &str =
    "SELECT id, name, ref_date, start_year, end_year, target, how_known, recommendation FROM refletters";

/// A row exactly as SQLite returns it, before any interpretation.
struct RawRow {
    id: i64,
    name: Option<String>,
    ref_date: Option<String>,
    start_year: Option<String>,
    end_year: Option<String>,
    target: Option<String>,
    how_known: Option<String>,
    recommendation: Option<String>,
}

impl RawRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            ref_date: row.get(2)?,
            start_year: row.get(3)?,
            end_year: row.get(4)?,
            target: row.get(5)?,
            how_known: row.get(6)?,
            recommendation: row.get(7)?,
        })
    }

    fn into_record(self) -> Result<Record, StoreError> {
        let id = self.id;
        let corrupt = |reason: String| StoreError::Corrupt { id, reason };

        let ref_date = self
            .ref_date
            .ok_or_else(|| corrupt("missing ref_date".to_string()))?;
        let reference_date = ref_date
            .parse::<NaiveDate>()
            .map_err(|e| corrupt(format!("bad ref_date {ref_date:?}: {e}")))?;

        let fields = RecordFields {
            name: self.name.unwrap_or_default(),
            reference_date,
            start_year: parse_year(self.start_year.as_deref()).map_err(corrupt)?,
            end_year: parse_year(self.end_year.as_deref()).map_err(corrupt)?,
            target: self.target.unwrap_or_default(),
            how_known: self.how_known.unwrap_or_default(),
            recommendation: self.recommendation.unwrap_or_default(),
        };
        Ok(Record::persisted(RecordId(id), fields))
    }
}

/// NULL and "" both mean "no year".
fn parse_year(raw: Option<&str>) -> Result<Option<i32>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse::<i32>()
            .map(Some)
            .map_err(|e| format!("bad year {text:?}: {e}")),
    }
}

fn format_year(year: Option<i32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_default()
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`, creating parent
    /// directories as needed.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(StoreError::CreateDir)?;
            }
        }
        let conn = Connection::open(path)?;
        info!("Opened record database at {}", path.display());
        Self::with_connection(conn)
    }

    /// A private database that disappears when the store is dropped.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

impl RecordStore for SqliteStore {
    fn create(&mut self, fields: &RecordFields) -> Result<RecordId, StoreError> {
        self.conn.execute(
            "INSERT INTO refletters(name, ref_date, start_year, end_year, target, how_known, recommendation)
             VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                fields.name,
                fields.reference_date.to_string(),
                format_year(fields.start_year),
                format_year(fields.end_year),
                fields.target,
                fields.how_known,
                fields.recommendation,
            ],
        )?;
        let id = RecordId(self.conn.last_insert_rowid());
        debug!("Inserted record {}", id);
        Ok(id)
    }

    fn read(&self, id: RecordId) -> Result<Option<Record>, StoreError> {
        let raw = self
            .conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id.0],
                RawRow::from_row,
            )
            .optional()?;
        raw.map(RawRow::into_record).transpose()
    }

    fn update(&mut self, id: RecordId, fields: &RecordFields) -> Result<bool, StoreError> {
        let changed = self.conn.execute(
            "UPDATE refletters
             SET name = ?2, ref_date = ?3, start_year = ?4, end_year = ?5,
                 target = ?6, how_known = ?7, recommendation = ?8
             WHERE id = ?1",
            params![
                id.0,
                fields.name,
                fields.reference_date.to_string(),
                format_year(fields.start_year),
                format_year(fields.end_year),
                fields.target,
                fields.how_known,
                fields.recommendation,
            ],
        )?;
        Ok(changed > 0)
    }

    fn delete(&mut self, id: RecordId) -> Result<(), StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM refletters WHERE id = ?1", params![id.0])?;
        debug!("Delete {}: {} row(s) removed", id, removed);
        Ok(())
    }

    fn list(&self) -> Result<Vec<Record>, StoreError> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id"))?;
        let rows = stmt
            .query_map([], RawRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(RawRow::into_record).collect()
    }
}
