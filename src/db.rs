// 🗄️ History Store - diagnosis records in SQLite, CSV import/export
//
// The filter engine never talks to storage. Callers fetch records through
// `HistoryStore::list_records` and hand the slice to the engine.

use crate::entities::{DiagnosisRecord, RecordSeverity};
use crate::sample::sample_history;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::{debug, info};

// ============================================================================
// STORE CONTRACT
// ============================================================================

pub trait HistoryStore {
    /// All records, newest first
    fn list_records(&self) -> Result<Vec<DiagnosisRecord>>;
}

/// Fixed in-memory history, seeded with the demo records
#[derive(Debug, Clone)]
pub struct InMemoryHistoryStore {
    records: Vec<DiagnosisRecord>,
}

impl InMemoryHistoryStore {
    pub fn new(records: Vec<DiagnosisRecord>) -> Self {
        InMemoryHistoryStore { records }
    }

    pub fn with_sample_data() -> Self {
        Self::new(sample_history())
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn list_records(&self) -> Result<Vec<DiagnosisRecord>> {
        Ok(self.records.clone())
    }
}

pub struct SqliteHistoryStore {
    conn: Connection,
}

impl SqliteHistoryStore {
    /// Open (or create) the history database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("Failed to open history database: {:?}", path.as_ref()))?;
        setup_database(&conn)?;
        Ok(SqliteHistoryStore { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        setup_database(&conn)?;
        Ok(SqliteHistoryStore { conn })
    }

    pub fn insert(&self, records: &[DiagnosisRecord]) -> Result<usize> {
        insert_records(&self.conn, records)
    }

    pub fn count(&self) -> Result<i64> {
        verify_count(&self.conn)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn list_records(&self) -> Result<Vec<DiagnosisRecord>> {
        get_all_records(&self.conn)
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS diagnosis_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            idempotency_hash TEXT UNIQUE NOT NULL,
            record_id TEXT NOT NULL,
            date TEXT NOT NULL,
            crop TEXT NOT NULL,
            disease TEXT NOT NULL,
            severity TEXT NOT NULL,
            confidence INTEGER NOT NULL,
            location TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_records_date ON diagnosis_records(date)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_records_crop ON diagnosis_records(crop)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// WRITE
// ============================================================================

/// Insert records, skipping ones already stored. Returns the number inserted.
pub fn insert_records(conn: &Connection, records: &[DiagnosisRecord]) -> Result<usize> {
    let mut inserted = 0;
    let mut duplicates = 0;

    for record in records {
        let hash = record.compute_idempotency_hash();

        let result = conn.execute(
            "INSERT INTO diagnosis_records (
                idempotency_hash, record_id, date, crop, disease, severity, confidence, location
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                hash,
                record.id,
                record.date.to_string(),
                record.crop,
                record.disease,
                record.severity.as_str(),
                record.confidence,
                record.location,
            ],
        );

        match result {
            Ok(_) => inserted += 1,
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                debug!(record_id = %record.id, "skipping duplicate record");
                duplicates += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(inserted, duplicates, "history records stored");
    Ok(inserted)
}

// ============================================================================
// READ
// ============================================================================

pub fn get_all_records(conn: &Connection) -> Result<Vec<DiagnosisRecord>> {
    let mut stmt = conn.prepare(
        "SELECT record_id, date, crop, disease, severity, confidence, location
         FROM diagnosis_records
         ORDER BY date DESC, id ASC",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, u8>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, date, crop, disease, severity, confidence, location)| -> Result<DiagnosisRecord> {
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .with_context(|| format!("Invalid date {:?} for record {}", date, id))?;
            let severity: RecordSeverity = severity
                .parse()
                .with_context(|| format!("Invalid severity for record {}", id))?;

            Ok(DiagnosisRecord::new(id, date, crop, disease, severity, confidence, location))
        })
        .collect()
}

pub fn verify_count(conn: &Connection) -> Result<i64> {
    let count: i64 =
        conn.query_row("SELECT COUNT(*) FROM diagnosis_records", [], |row| row.get(0))?;

    Ok(count)
}

// ============================================================================
// CSV
// ============================================================================

/// Read records from a CSV file with headers
/// `id,date,crop,disease,severity,confidence,location`
pub fn load_csv(csv_path: &Path) -> Result<Vec<DiagnosisRecord>> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file: {:?}", csv_path))?;

    let mut records = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let record: DiagnosisRecord = result
            .with_context(|| format!("Failed to deserialize record on data row {}", line + 1))?;
        records.push(record);
    }

    info!(count = records.len(), path = %csv_path.display(), "loaded history CSV");
    Ok(records)
}

/// Write records to CSV (same headers as `load_csv`)
pub fn export_csv(csv_path: &Path, records: &[DiagnosisRecord]) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(csv_path)
        .with_context(|| format!("Failed to create CSV file: {:?}", csv_path))?;

    for record in records {
        wtr.serialize(record).context("Failed to serialize record")?;
    }
    wtr.flush().context("Failed to flush CSV writer")?;

    info!(count = records.len(), path = %csv_path.display(), "exported history CSV");
    Ok(records.len())
}
