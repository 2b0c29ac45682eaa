//! Executor: policy gate → effect → audit write.
//!
//! `Executor::execute` is the single entry point for running an action. Each
//! call invokes the effect at most once and never retries. Rejections for
//! unknown actions and every allowed attempt (success or fault) produce
//! exactly one audit record. Parameter validation failures are returned to
//! the caller and logged, but not audited.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::audit::{AuditDb, AuditLog, AuditRecord, AuditStats, AuditStatus, HistoryFilter, HistoryLimits};
use crate::config::Config;
use crate::effects::EffectContext;
use crate::error::{RemedyError, Result};
use crate::gate::{GateResult, PolicyGate};
use crate::notify::{Notifier, SlackNotifier};
use crate::registry::{ActionDefinition, ActionRegistry, Params};

// ---------------------------------------------------------------------------
// Request / outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub reason: Option<String>,
}

impl ActionRequest {
    pub fn new(action: impl Into<String>, params: Params) -> Self {
        Self {
            action: action.into(),
            params,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Result of an allowed action. `status` is `success` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub execution_id: Uuid,
    pub action: String,
    pub status: AuditStatus,
    pub result: Value,
    pub duration_ms: u64,
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Shared across request handlers. The registry is read-only; the audit log
/// is the only mutable state and serializes its own writes.
pub struct Executor {
    registry: ActionRegistry,
    audit: Arc<dyn AuditLog>,
    notifier: Option<Arc<dyn Notifier>>,
    limits: HistoryLimits,
}

impl Executor {
    pub fn new(registry: ActionRegistry, audit: Arc<dyn AuditLog>) -> Self {
        Self {
            registry,
            audit,
            notifier: None,
            limits: HistoryLimits::default(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_history_limits(mut self, limits: HistoryLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Open the configured audit database under `root` and wire up the
    /// notifier if a webhook is configured.
    pub fn open(root: &Path, config: &Config) -> Result<Self> {
        let audit = AuditDb::open(&config.audit_db_path(root))?;
        Self::with_audit_log(Arc::new(audit), config)
    }

    /// Build from config around an already-open audit log.
    pub fn with_audit_log(audit: Arc<dyn AuditLog>, config: &Config) -> Result<Self> {
        let mut executor = Self::new(ActionRegistry::builtin(), audit)
            .with_history_limits(HistoryLimits::from(&config.audit));
        if let Some(slack) = SlackNotifier::from_config(&config.notify)? {
            executor = executor.with_notifier(Arc::new(slack));
        }
        Ok(executor)
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn history_limits(&self) -> HistoryLimits {
        self.limits
    }

    pub fn list_actions(&self) -> Vec<&ActionDefinition> {
        self.registry.list()
    }

    /// Run one action request through the gate, effect, and audit log.
    ///
    /// Returns `ActionNotPermitted` for actions outside the allowlist and
    /// `ValidationFailed` for missing or invalid parameters. An effect fault
    /// is not an error: it comes back as an outcome with `status = error`.
    pub fn execute(&self, request: ActionRequest) -> Result<ExecutionOutcome> {
        let started = Instant::now();
        let execution_id = Uuid::new_v4();
        let ActionRequest {
            action,
            params,
            reason,
        } = request;

        let gate = PolicyGate::new(&self.registry);
        let def = match gate.check(&action, &params) {
            GateResult::Unknown => {
                let record = AuditRecord::new(
                    execution_id,
                    action.clone(),
                    params,
                    reason,
                    AuditStatus::Rejected,
                    json!({ "error": format!("{action} not permitted") }),
                    elapsed_ms(started),
                );
                self.record(record);
                warn!(%action, %execution_id, "rejected action outside allowlist");
                return Err(RemedyError::ActionNotPermitted {
                    action,
                    allowed: self.registry.names(),
                    execution_id,
                });
            }
            GateResult::MissingParam(name) => {
                warn!(%action, param = name, "missing required parameter");
                return Err(RemedyError::ValidationFailed {
                    action,
                    errors: vec![format!("missing required parameter '{name}'")],
                });
            }
            GateResult::Invalid(errors) => {
                warn!(%action, ?errors, "parameter validation failed");
                return Err(RemedyError::ValidationFailed { action, errors });
            }
            GateResult::Allowed(def) => def,
        };

        let ctx = EffectContext {
            notifier: self.notifier.as_deref(),
        };
        let (status, result) = match def.kind.run(&params, &ctx) {
            Ok(payload) => (AuditStatus::Success, payload),
            Err(fault) => (AuditStatus::Error, json!({ "error": fault.to_string() })),
        };
        let duration_ms = elapsed_ms(started);

        let record = AuditRecord::new(
            execution_id,
            action.clone(),
            params,
            reason,
            status,
            result.clone(),
            duration_ms,
        );
        self.record(record);

        match status {
            AuditStatus::Success => info!(%action, %execution_id, duration_ms, "action succeeded"),
            _ => warn!(%action, %execution_id, duration_ms, error = %result["error"], "action failed"),
        }

        Ok(ExecutionOutcome {
            execution_id,
            action,
            status,
            result,
            duration_ms,
        })
    }

    /// Audit records newest first, filtered by raw caller input.
    pub fn history(&self, status: Option<&str>, limit: Option<usize>) -> Result<Vec<AuditRecord>> {
        let filter = HistoryFilter::parse(status, limit, self.limits)?;
        self.audit.query(&filter)
    }

    pub fn stats(&self) -> Result<AuditStats> {
        self.audit.stats()
    }

    /// Best-effort append. The action outcome is already decided, so a
    /// storage failure is logged rather than returned.
    fn record(&self, record: AuditRecord) {
        let id = record.id;
        if let Err(e) = self.audit.append(record) {
            error!(execution_id = %id, error = %e, "failed to persist audit record");
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
