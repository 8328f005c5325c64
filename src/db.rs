//! Database module for the voicebot
//!
//! Durable snapshots of finished call transcripts, keyed by call identifier.

mod schema;

pub use schema::StoredTranscript;
use schema::{SCHEMA, UPSERT_TRANSCRIPT};

use crate::transcript::Turn;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Transcript encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("Database connection lock poisoned")]
    Poisoned,
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn conn(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    fn run_migrations(&self) -> DbResult<()> {
        self.conn()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Transcript Operations ====================

    /// Store the full transcript for a call, replacing any earlier snapshot
    pub fn save_transcript(&self, call_id: &str, turns: &[Turn]) -> DbResult<()> {
        let turns_json = serde_json::to_string(turns)?;
        let turn_count = i64::try_from(turns.len()).unwrap_or(i64::MAX);
        let now = Utc::now();

        let conn = self.conn()?;
        conn.execute(
            UPSERT_TRANSCRIPT,
            params![call_id, turns_json, turn_count, now.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Get the stored transcript for a call, if any
    pub fn get_transcript(&self, call_id: &str) -> DbResult<Option<StoredTranscript>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT call_id, turns, saved_at FROM transcripts WHERE call_id = ?1",
                params![call_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(call_id, turns_json, saved_at)| {
            Ok::<_, DbError>(StoredTranscript {
                call_id,
                turns: serde_json::from_str(&turns_json)?,
                saved_at: parse_datetime(&saved_at),
            })
        })
        .transpose()
    }

    /// Number of stored transcripts
    pub fn transcript_count(&self) -> DbResult<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM transcripts", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
