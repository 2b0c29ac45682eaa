//! Append-only audit log for executed, rejected, and failed actions.
//!
//! Provides `AuditRecord`, `AuditStatus`, `HistoryFilter`, and `AuditStats`,
//! the `AuditLog` trait the executor writes through, and two stores: the
//! durable redb-backed `AuditDb` and the process-local `MemoryAuditLog`.

pub mod db;
pub mod memory;
pub mod record;

pub use db::AuditDb;
pub use memory::MemoryAuditLog;
pub use record::{AuditRecord, AuditStats, AuditStatus, HistoryFilter, HistoryLimits};

use crate::error::Result;

/// A shared, append-only store of audit records.
///
/// Implementations serialize physical writes; reads may run concurrently
/// with an in-flight append and observe the store as of their start.
pub trait AuditLog: Send + Sync {
    /// Persist `record` and return its insertion sequence number.
    ///
    /// Sequence numbers start at 1 and are strictly increasing.
    fn append(&self, record: AuditRecord) -> Result<u64>;

    /// Records matching `filter`, newest first, at most `filter.limit`.
    fn query(&self, filter: &HistoryFilter) -> Result<Vec<AuditRecord>>;

    fn stats(&self) -> Result<AuditStats>;
}
