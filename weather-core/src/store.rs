//! Persistent reading history.
//!
//! Readings are append-only: there is no update or delete. History queries
//! return the newest readings first and cap the returned count, not the
//! stored count.

use chrono::{DateTime, SubsecRound, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, params};
use std::path::Path;

use crate::{City, NewReading, StoredReading, WeatherReading};

/// Number of readings returned by a history query unless asked otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored timestamp outside the range `chrono` can represent.
    #[error("Corrupt reading row {id}: {reason}")]
    Corrupt { id: i64, reason: String },
}

pub trait ReadingStore: Send + Sync {
    /// Persist a reading and assign it an id.
    fn save(&self, reading: NewReading) -> Result<StoredReading, StoreError>;

    /// Up to `limit` most recent readings for `city`, newest first.
    fn history(&self, city: City, limit: usize) -> Result<Vec<StoredReading>, StoreError>;
}

/// SQLite-backed reading store.
pub struct SqliteReadingStore {
    conn: Mutex<Connection>,
}

impl SqliteReadingStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    /// An in-memory store; contents vanish when it is dropped.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS readings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                city TEXT NOT NULL,
                temperature REAL NOT NULL,
                description TEXT NOT NULL,
                humidity INTEGER NOT NULL,
                wind_speed REAL NOT NULL,
                icon TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_readings_city_timestamp
                ON readings(city, timestamp DESC);
            "#,
        )?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Total number of stored readings across all cities.
    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 =
            self.conn.lock().query_row("SELECT COUNT(*) FROM readings", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Raw column values, converted into a [`StoredReading`] outside the row callback.
struct ReadingRow {
    id: i64,
    temperature: f64,
    description: String,
    humidity: u8,
    wind_speed: f64,
    icon: String,
    timestamp_micros: i64,
}

impl ReadingRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            temperature: row.get(1)?,
            description: row.get(2)?,
            humidity: row.get(3)?,
            wind_speed: row.get(4)?,
            icon: row.get(5)?,
            timestamp_micros: row.get(6)?,
        })
    }

    fn into_stored(self, city: City) -> Result<StoredReading, StoreError> {
        let timestamp = DateTime::<Utc>::from_timestamp_micros(self.timestamp_micros)
            .ok_or_else(|| StoreError::Corrupt {
                id: self.id,
                reason: format!("timestamp {} out of range", self.timestamp_micros),
            })?;

        Ok(StoredReading {
            id: self.id,
            reading: WeatherReading {
                city,
                temperature: self.temperature,
                description: self.description,
                humidity: self.humidity,
                wind_speed: self.wind_speed,
                icon: self.icon,
                timestamp,
            },
        })
    }
}

impl ReadingStore for SqliteReadingStore {
    fn save(&self, reading: NewReading) -> Result<StoredReading, StoreError> {
        let mut reading = reading.into_reading(Utc::now());
        // Stored with microsecond precision; return what history will return.
        reading.timestamp = reading.timestamp.trunc_subsecs(6);

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO readings (city, temperature, description, humidity, wind_speed, icon, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                reading.city.as_str(),
                reading.temperature,
                reading.description,
                reading.humidity,
                reading.wind_speed,
                reading.icon,
                reading.timestamp.timestamp_micros(),
            ],
        )?;
        let id = conn.last_insert_rowid();

        tracing::debug!(id, city = %reading.city, "Saved reading");
        Ok(StoredReading { id, reading })
    }

    fn history(&self, city: City, limit: usize) -> Result<Vec<StoredReading>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, temperature, description, humidity, wind_speed, icon, timestamp
             FROM readings
             WHERE city = ?1
             ORDER BY timestamp DESC, id DESC
             LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![city.as_str(), limit], ReadingRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(|row| row.into_stored(city)).collect()
    }
}
