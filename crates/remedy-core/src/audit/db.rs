//! Durable audit storage using redb.
//!
//! # Table design
//!
//! A single `AUDIT_RECORDS` table keyed by the insertion sequence:
//! ```text
//! key:   seq: u64          (1, 2, 3, ...)
//! value: JSON-encoded AuditRecord
//! ```
//!
//! The sequence is read from the last key and incremented inside the write
//! transaction. redb admits one write transaction at a time, so concurrent
//! appends are serialized and the sequence is strictly monotonic. Read
//! transactions see a consistent snapshot and never block on a writer.
//! Newest-first retrieval is a reverse scan over the key range.

use std::fmt::Display;
use std::path::Path;

use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};

use crate::error::{RemedyError, Result};

use super::record::{AuditRecord, AuditStats, HistoryFilter};
use super::AuditLog;

// ---------------------------------------------------------------------------
// Table definition
// ---------------------------------------------------------------------------

const AUDIT_RECORDS: TableDefinition<u64, &[u8]> = TableDefinition::new("audit_records");

fn db_err(e: impl Display) -> RemedyError {
    RemedyError::Persistence(e.to_string())
}

// ---------------------------------------------------------------------------
// AuditDb
// ---------------------------------------------------------------------------

/// Persistent, append-only store for `AuditRecord`s.
///
/// The database file is closed when the handle is dropped.
pub struct AuditDb {
    db: Database,
}

impl AuditDb {
    /// Open or create the redb database at `path`.
    ///
    /// Creates the parent directory and the `AUDIT_RECORDS` table if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(db_err)?;
        }
        let db = Database::create(path).map_err(db_err)?;
        let wt = db.begin_write().map_err(db_err)?;
        wt.open_table(AUDIT_RECORDS).map_err(db_err)?;
        wt.commit().map_err(db_err)?;
        Ok(Self { db })
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<u64> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(AUDIT_RECORDS).map_err(db_err)?;
        table.len().map_err(db_err)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn scan_newest_first(&self, mut visit: impl FnMut(AuditRecord) -> bool) -> Result<()> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(AUDIT_RECORDS).map_err(db_err)?;
        for entry in table.iter().map_err(db_err)?.rev() {
            let (_, v) = entry.map_err(db_err)?;
            let record: AuditRecord = serde_json::from_slice(v.value()).map_err(db_err)?;
            if !visit(record) {
                break;
            }
        }
        Ok(())
    }
}

impl AuditLog for AuditDb {
    fn append(&self, mut record: AuditRecord) -> Result<u64> {
        let wt = self.db.begin_write().map_err(db_err)?;
        let seq = {
            let mut table = wt.open_table(AUDIT_RECORDS).map_err(db_err)?;
            let seq = match table.last().map_err(db_err)? {
                Some((k, _)) => k.value() + 1,
                None => 1,
            };
            record.stamp(seq);
            let value = serde_json::to_vec(&record).map_err(db_err)?;
            table.insert(seq, value.as_slice()).map_err(db_err)?;
            seq
        };
        wt.commit().map_err(db_err)?;
        Ok(seq)
    }

    fn query(&self, filter: &HistoryFilter) -> Result<Vec<AuditRecord>> {
        let mut out = Vec::new();
        self.scan_newest_first(|record| {
            if filter.matches(&record) {
                out.push(record);
            }
            out.len() < filter.limit
        })?;
        Ok(out)
    }

    fn stats(&self) -> Result<AuditStats> {
        let mut stats = AuditStats::empty();
        self.scan_newest_first(|record| {
            stats.add(&record);
            true
        })?;
        Ok(stats)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
