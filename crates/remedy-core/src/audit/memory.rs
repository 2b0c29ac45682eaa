//! Process-local audit log. Contents are lost when the process exits.

use std::sync::RwLock;

use crate::error::{RemedyError, Result};

use super::record::{AuditRecord, AuditStats, HistoryFilter};
use super::AuditLog;

#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    records: RwLock<Vec<AuditRecord>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> RemedyError {
    RemedyError::Persistence("audit log lock poisoned".to_string())
}

impl AuditLog for MemoryAuditLog {
    fn append(&self, mut record: AuditRecord) -> Result<u64> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        let seq = records.len() as u64 + 1;
        record.stamp(seq);
        records.push(record);
        Ok(seq)
    }

    fn query(&self, filter: &HistoryFilter) -> Result<Vec<AuditRecord>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records
            .iter()
            .rev()
            .filter(|r| filter.matches(r))
            .take(filter.limit)
            .cloned()
            .collect())
    }

    fn stats(&self) -> Result<AuditStats> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(AuditStats::from_records(records.iter()))
    }
}
