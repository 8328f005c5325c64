//! Database schema and types

use crate::transcript::Turn;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS transcripts (
    call_id TEXT PRIMARY KEY,
    turns TEXT NOT NULL,
    turn_count INTEGER NOT NULL,
    saved_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_transcripts_saved ON transcripts(saved_at DESC);
";

/// Upsert that leaves the row untouched when the transcript is unchanged,
/// so saving the same transcript twice is indistinguishable from once.
pub const UPSERT_TRANSCRIPT: &str = r"
INSERT INTO transcripts (call_id, turns, turn_count, saved_at)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT(call_id) DO UPDATE SET
    turns = excluded.turns,
    turn_count = excluded.turn_count,
    saved_at = excluded.saved_at
WHERE transcripts.turns IS NOT excluded.turns
";

/// A persisted call transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredTranscript {
    pub call_id: String,
    pub turns: Vec<Turn>,
    pub saved_at: DateTime<Utc>,
}
