use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RemedyError {
    #[error("not initialized: run 'remedy init'")]
    NotInitialized,

    #[error("{action} not permitted")]
    ActionNotPermitted {
        action: String,
        allowed: Vec<String>,
        execution_id: Uuid,
    },

    #[error("invalid parameters for {action}: {}", errors.join("; "))]
    ValidationFailed { action: String, errors: Vec<String> },

    #[error("audit store error: {0}")]
    Persistence(String),

    #[error("invalid history filter: {0}")]
    InvalidFilter(String),

    #[error("notifier setup failed: {0}")]
    NotifierSetup(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RemedyError>;

/// A fault raised by an effect producer after the action was allowed.
///
/// Never surfaces as a [`RemedyError`]: the executor records it as an
/// `error` outcome.
#[derive(Debug, Error)]
pub enum EffectError {
    #[error("notification failed: {0}")]
    Notify(String),

    #[error("effect timed out after {0}s")]
    Timeout(u64),
}
