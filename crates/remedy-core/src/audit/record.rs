//! Audit record data model.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::AuditConfig;
use crate::error::{RemedyError, Result};

// ---------------------------------------------------------------------------
// AuditStatus
// ---------------------------------------------------------------------------

/// Outcome of one execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    /// Allowed, validated, and the effect returned without fault.
    Success,
    /// The action is not on the allowlist. No effect was invoked.
    Rejected,
    /// Allowed and validated, but the effect raised a fault.
    Error,
}

impl AuditStatus {
    pub fn all() -> &'static [AuditStatus] {
        &[Self::Success, Self::Rejected, Self::Error]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Rejected => "rejected",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditStatus {
    type Err = RemedyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                RemedyError::InvalidFilter(format!(
                    "unknown status '{s}': expected one of success, rejected, error"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// AuditRecord
// ---------------------------------------------------------------------------

/// One execution attempt and its outcome. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,
    /// Insertion sequence, assigned by the store on append. `0` until then.
    #[serde(default)]
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    /// Requested action name. May be a name outside the allowlist.
    pub action: String,
    pub params: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Effect payload on success, error description otherwise.
    pub result: Value,
    pub status: AuditStatus,
    pub duration_ms: u64,
}

impl AuditRecord {
    pub fn new(
        id: Uuid,
        action: impl Into<String>,
        params: Map<String, Value>,
        reason: Option<String>,
        status: AuditStatus,
        result: Value,
        duration_ms: u64,
    ) -> Self {
        Self {
            id,
            seq: 0,
            timestamp: Utc::now(),
            action: action.into(),
            params,
            reason,
            result,
            status,
            duration_ms,
        }
    }

    /// Assign the insertion sequence and the write time. Stores call this
    /// while holding their write lock so `seq` order and `timestamp` order
    /// agree.
    pub fn stamp(&mut self, seq: u64) {
        self.seq = seq;
        self.timestamp = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// HistoryFilter
// ---------------------------------------------------------------------------

/// Bounds applied to history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLimits {
    pub default: usize,
    pub max: usize,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self {
            default: 50,
            max: 500,
        }
    }
}

impl From<&AuditConfig> for HistoryLimits {
    fn from(cfg: &AuditConfig) -> Self {
        let max = cfg.max_history_limit.max(1);
        Self {
            default: cfg.default_history_limit.clamp(1, max),
            max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryFilter {
    pub status: Option<AuditStatus>,
    pub limit: usize,
}

impl HistoryFilter {
    /// Build a filter from raw caller input.
    ///
    /// `limit` is clamped to `1..=limits.max`; an absent limit uses
    /// `limits.default`. An unknown `status` fails with `InvalidFilter`.
    pub fn parse(status: Option<&str>, limit: Option<usize>, limits: HistoryLimits) -> Result<Self> {
        let status = match status.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Some(s.parse::<AuditStatus>()?),
            None => None,
        };
        let limit = limit.unwrap_or(limits.default).clamp(1, limits.max.max(1));
        Ok(Self { status, limit })
    }

    /// Parse a raw `limit` query value. Blank means absent; anything that is
    /// not a non-negative integer fails with `InvalidFilter`.
    pub fn parse_limit(raw: Option<&str>) -> Result<Option<usize>> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => s.parse::<usize>().map(Some).map_err(|_| {
                RemedyError::InvalidFilter(format!(
                    "limit '{s}' must be a non-negative integer"
                ))
            }),
            None => Ok(None),
        }
    }

    pub fn matches(&self, record: &AuditRecord) -> bool {
        self.status.is_none_or(|s| s == record.status)
    }
}

// ---------------------------------------------------------------------------
// AuditStats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditStats {
    pub total: u64,
    /// Always carries all three statuses, zero-filled.
    pub by_status: BTreeMap<String, u64>,
    pub by_action: BTreeMap<String, u64>,
}

impl AuditStats {
    /// No records yet; every status present with a zero count.
    pub fn empty() -> Self {
        Self {
            by_status: AuditStatus::all()
                .iter()
                .map(|s| (s.as_str().to_string(), 0))
                .collect(),
            ..Self::default()
        }
    }

    pub fn add(&mut self, record: &AuditRecord) {
        self.total += 1;
        *self
            .by_status
            .entry(record.status.as_str().to_string())
            .or_default() += 1;
        *self.by_action.entry(record.action.clone()).or_default() += 1;
    }

    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AuditRecord>) -> Self {
        let mut stats = Self::empty();
        for record in records {
            stats.add(record);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(action: &str, status: AuditStatus) -> AuditRecord {
        AuditRecord::new(
            Uuid::new_v4(),
            action,
            Map::new(),
            None,
            status,
            json!({}),
            3,
        )
    }

    #[test]
    fn parse_limit_accepts_integers_and_blank() {
        assert_eq!(HistoryFilter::parse_limit(Some("25")).unwrap(), Some(25));
        assert_eq!(HistoryFilter::parse_limit(Some(" ")).unwrap(), None);
        assert_eq!(HistoryFilter::parse_limit(None).unwrap(), None);
    }

    #[test]
    fn parse_limit_rejects_garbage() {
        for raw in ["abc", "-5", "1.5"] {
            let err = HistoryFilter::parse_limit(Some(raw)).unwrap_err();
            assert!(matches!(err, RemedyError::InvalidFilter(_)), "{raw}");
        }
    }

    #[test]
    fn stats_accumulate_one_record_at_a_time() {
        let mut stats = AuditStats::empty();
        assert_eq!(stats.by_status.len(), 3);
        stats.add(&record("scale_pods", AuditStatus::Success));
        stats.add(&record("scale_pods", AuditStatus::Error));
        assert_eq!(stats.total, 2);
        assert_eq!(stats.by_status["rejected"], 0);
        assert_eq!(stats.by_action["scale_pods"], 2);
    }

    #[test]
    fn status_parses_known_values() {
        assert_eq!("success".parse::<AuditStatus>().unwrap(), AuditStatus::Success);
        assert_eq!("rejected".parse::<AuditStatus>().unwrap(), AuditStatus::Rejected);
        assert_eq!("error".parse::<AuditStatus>().unwrap(), AuditStatus::Error);
    }

    #[test]
    fn status_rejects_unknown_value() {
        let err = "bogus".parse::<AuditStatus>().unwrap_err();
        assert!(matches!(err, RemedyError::InvalidFilter(_)));
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(serde_json::to_value(AuditStatus::Rejected).unwrap(), json!("rejected"));
    }

    #[test]
    fn filter_clamps_limit() {
        let limits = HistoryLimits::default();
        assert_eq!(HistoryFilter::parse(None, Some(0), limits).unwrap().limit, 1);
        assert_eq!(HistoryFilter::parse(None, Some(10_000), limits).unwrap().limit, 500);
        assert_eq!(HistoryFilter::parse(None, None, limits).unwrap().limit, 50);
    }

    #[test]
    fn filter_rejects_bogus_status() {
        let err = HistoryFilter::parse(Some("bogus"), None, HistoryLimits::default()).unwrap_err();
        assert!(matches!(err, RemedyError::InvalidFilter(_)));
    }

    #[test]
    fn filter_treats_blank_status_as_absent() {
        let filter = HistoryFilter::parse(Some(""), None, HistoryLimits::default()).unwrap();
        assert!(filter.status.is_none());
    }

    #[test]
    fn limits_from_config_keep_default_within_max() {
        let cfg = AuditConfig {
            max_history_limit: 20,
            default_history_limit: 100,
            ..AuditConfig::default()
        };
        let limits = HistoryLimits::from(&cfg);
        assert_eq!(limits, HistoryLimits { default: 20, max: 20 });
    }

    #[test]
    fn stats_count_by_status_and_action() {
        let records = vec![
            record("scale_pods", AuditStatus::Success),
            record("scale_pods", AuditStatus::Success),
            record("drop_tables", AuditStatus::Rejected),
        ];
        let stats = AuditStats::from_records(&records);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_status["success"], 2);
        assert_eq!(stats.by_status["rejected"], 1);
        assert_eq!(stats.by_status["error"], 0);
        assert_eq!(stats.by_action["scale_pods"], 2);
        assert_eq!(stats.by_action["drop_tables"], 1);
    }
}
