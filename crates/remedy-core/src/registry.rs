//! The fixed allowlist of remediation actions.
//!
//! Every permitted action is a variant of [`ActionKind`]. The registry is
//! built once by [`ActionRegistry::builtin`] and has no insertion API: request
//! input can only look actions up, never extend the set.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::effects::{self, EffectContext};
use crate::error::EffectError;

/// Caller-supplied action parameters.
pub type Params = Map<String, Value>;

pub const MIN_REPLICAS: i64 = 1;
pub const MAX_REPLICAS: i64 = 20;
pub const MAX_MESSAGE_CHARS: usize = 2000;
pub const MAX_GRACE_PERIOD_SECS: i64 = 3600;
pub const MAX_REVISION: i64 = 1_000_000;
pub const CACHE_SCOPES: &[&str] = &["all", "sessions", "queries"];

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    ScalePods,
    RestartService,
    NotifySlack,
    ClearCache,
    RollbackDeployment,
    DrainNode,
}

impl ActionKind {
    pub const ALL: [ActionKind; 6] = [
        Self::ScalePods,
        Self::RestartService,
        Self::NotifySlack,
        Self::ClearCache,
        Self::RollbackDeployment,
        Self::DrainNode,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::ScalePods => "scale_pods",
            Self::RestartService => "restart_service",
            Self::NotifySlack => "notify_slack",
            Self::ClearCache => "clear_cache",
            Self::RollbackDeployment => "rollback_deployment",
            Self::DrainNode => "drain_node",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::ScalePods => "Scale a service deployment to a fixed replica count (1-20)",
            Self::RestartService => "Perform a rolling restart of a service",
            Self::NotifySlack => "Post a message to a Slack channel",
            Self::ClearCache => "Flush a service's cache (scope: all, sessions, queries)",
            Self::RollbackDeployment => "Roll a service back to a previous revision",
            Self::DrainNode => "Cordon a node and evict its pods",
        }
    }

    /// Required parameter names, in the order they are checked.
    pub fn required_params(self) -> &'static [&'static str] {
        match self {
            Self::ScalePods => &["service", "replicas"],
            Self::RestartService | Self::ClearCache | Self::RollbackDeployment => &["service"],
            Self::NotifySlack => &["channel", "message"],
            Self::DrainNode => &["node"],
        }
    }

    /// Domain checks on parameter values. All failures are reported together.
    ///
    /// Assumes every required parameter is present.
    pub fn validate(self, params: &Params) -> Vec<String> {
        let mut errors = Vec::new();
        match self {
            Self::ScalePods => {
                check_resource_name(params, "service", &mut errors);
                match int_param(params, "replicas") {
                    Some(Ok(n)) if !(MIN_REPLICAS..=MAX_REPLICAS).contains(&n) => errors.push(
                        format!("replicas must be between {MIN_REPLICAS} and {MAX_REPLICAS} (got {n})"),
                    ),
                    Some(Err(msg)) => errors.push(msg),
                    _ => {}
                }
            }
            Self::RestartService => check_resource_name(params, "service", &mut errors),
            Self::NotifySlack => {
                match params.get("channel").and_then(Value::as_str) {
                    Some(ch) if channel_re().is_match(ch) => {}
                    Some(ch) => errors.push(format!(
                        "channel '{ch}' must be 1-80 lowercase letters, digits, '-' or '_', optionally prefixed with '#'"
                    )),
                    None => errors.push("channel must be a string".to_string()),
                }
                match params.get("message").and_then(Value::as_str) {
                    Some(msg) => {
                        let len = msg.chars().count();
                        if !(1..=MAX_MESSAGE_CHARS).contains(&len) {
                            errors.push(format!(
                                "message must be between 1 and {MAX_MESSAGE_CHARS} characters (got {len})"
                            ));
                        }
                    }
                    None => errors.push("message must be a string".to_string()),
                }
            }
            Self::ClearCache => {
                check_resource_name(params, "service", &mut errors);
                if let Some(scope) = present(params, "scope") {
                    match scope.as_str() {
                        Some(s) if CACHE_SCOPES.contains(&s) => {}
                        _ => errors.push(format!(
                            "scope must be one of {}",
                            CACHE_SCOPES.join(", ")
                        )),
                    }
                }
            }
            Self::RollbackDeployment => {
                check_resource_name(params, "service", &mut errors);
                match int_param(params, "revision") {
                    Some(Ok(n)) if !(1..=MAX_REVISION).contains(&n) => errors.push(format!(
                        "revision must be between 1 and {MAX_REVISION} (got {n})"
                    )),
                    Some(Err(msg)) => errors.push(msg),
                    _ => {}
                }
            }
            Self::DrainNode => {
                check_resource_name(params, "node", &mut errors);
                match int_param(params, "grace_period_seconds") {
                    Some(Ok(n)) if !(0..=MAX_GRACE_PERIOD_SECS).contains(&n) => errors.push(format!(
                        "grace_period_seconds must be between 0 and {MAX_GRACE_PERIOD_SECS} (got {n})"
                    )),
                    Some(Err(msg)) => errors.push(msg),
                    _ => {}
                }
            }
        }
        errors
    }

    /// Run the action's effect. Called only after validation passed.
    pub fn run(self, params: &Params, ctx: &EffectContext<'_>) -> Result<Value, EffectError> {
        match self {
            Self::ScalePods => Ok(effects::scale_pods(params)),
            Self::RestartService => Ok(effects::restart_service(params)),
            Self::NotifySlack => effects::notify_slack(params, ctx),
            Self::ClearCache => Ok(effects::clear_cache(params)),
            Self::RollbackDeployment => Ok(effects::rollback_deployment(params)),
            Self::DrainNode => Ok(effects::drain_node(params)),
        }
    }
}

// ---------------------------------------------------------------------------
// ActionDefinition / ActionRegistry
// ---------------------------------------------------------------------------

/// Introspection view of one permitted action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionDefinition {
    #[serde(skip)]
    pub kind: ActionKind,
    pub name: &'static str,
    pub description: &'static str,
    pub required_params: &'static [&'static str],
}

impl From<ActionKind> for ActionDefinition {
    fn from(kind: ActionKind) -> Self {
        Self {
            kind,
            name: kind.name(),
            description: kind.description(),
            required_params: kind.required_params(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActionRegistry {
    actions: BTreeMap<&'static str, ActionDefinition>,
}

impl ActionRegistry {
    pub fn builtin() -> Self {
        let actions = ActionKind::ALL
            .iter()
            .map(|&kind| (kind.name(), ActionDefinition::from(kind)))
            .collect();
        Self { actions }
    }

    pub fn get(&self, name: &str) -> Option<&ActionDefinition> {
        self.actions.get(name)
    }

    /// All definitions, sorted by name.
    pub fn list(&self) -> Vec<&ActionDefinition> {
        self.actions.values().collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.actions.keys().map(|n| n.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Parameter helpers
// ---------------------------------------------------------------------------

/// Absent, null, and empty-string values all count as missing.
pub fn is_missing(params: &Params, key: &str) -> bool {
    match params.get(key) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn present<'a>(params: &'a Params, key: &str) -> Option<&'a Value> {
    if is_missing(params, key) {
        None
    } else {
        params.get(key)
    }
}

/// Integer parameter. Accepts JSON integers and numeric strings.
///
/// `None` when the parameter is missing.
pub fn int_param(params: &Params, key: &str) -> Option<Result<i64, String>> {
    let value = present(params, key)?;
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Some(parsed.ok_or_else(|| format!("{key} must be an integer")))
}

/// String parameter, empty when missing or not a string.
pub fn str_param<'a>(params: &'a Params, key: &str) -> &'a str {
    params.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn resource_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$").expect("resource name regex is valid")
    })
}

fn channel_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#?[a-z0-9_-]{1,80}$").expect("channel regex is valid"))
}

fn check_resource_name(params: &Params, key: &str, errors: &mut Vec<String>) {
    match params.get(key).and_then(Value::as_str) {
        Some(name) if resource_name_re().is_match(name) => {}
        Some(name) => errors.push(format!(
            "{key} '{name}' must be lowercase alphanumeric with hyphens (max 63 chars)"
        )),
        None => errors.push(format!("{key} must be a string")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
