use crate::output::{print_json, print_outcome};
use anyhow::Context;
use remedy_core::audit::AuditStatus;
use remedy_core::registry::Params;
use remedy_core::{ActionRequest, RemedyError};
use serde_json::Value;
use std::path::Path;

pub struct ExecArgs {
    pub action: String,
    pub params: Vec<String>,
    pub params_json: Option<String>,
    pub reason: Option<String>,
}

pub fn run(root: &Path, args: ExecArgs, json: bool) -> anyhow::Result<()> {
    let params = build_params(args.params_json.as_deref(), &args.params)?;
    let mut request = ActionRequest::new(&args.action, params);
    if let Some(reason) = args.reason {
        request = request.with_reason(reason);
    }

    let executor = super::open_executor(root)?;
    let outcome = match executor.execute(request) {
        Ok(outcome) => outcome,
        Err(RemedyError::ActionNotPermitted {
            action,
            allowed,
            execution_id,
        }) => anyhow::bail!(
            "{action} not permitted (execution {execution_id})\n  allowed: {}",
            allowed.join(", ")
        ),
        Err(RemedyError::ValidationFailed { action, errors }) => {
            let lines: Vec<String> = errors.iter().map(|e| format!("  - {e}")).collect();
            anyhow::bail!("invalid parameters for {action}:\n{}", lines.join("\n"))
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        print_json(&outcome)?;
    } else {
        print_outcome(&outcome)?;
    }

    if outcome.status == AuditStatus::Error {
        anyhow::bail!("{} failed", outcome.action);
    }
    Ok(())
}

/// Merge `--params-json` and then each `key=value` pair into one object.
///
/// A value keeps its JSON type when it parses as JSON (`replicas=5`,
/// `force=true`); anything else is taken as a plain string.
fn build_params(params_json: Option<&str>, pairs: &[String]) -> anyhow::Result<Params> {
    let mut params = match params_json {
        Some(raw) => match serde_json::from_str::<Value>(raw).context("invalid --params-json")? {
            Value::Object(map) => map,
            _ => anyhow::bail!("--params-json must be a JSON object"),
        },
        None => Params::new(),
    };

    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .with_context(|| format!("invalid --param '{pair}': expected KEY=VALUE"))?;
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("invalid --param '{pair}': empty key");
        }
        let value =
            serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        params.insert(key.to_string(), value);
    }

    Ok(params)
}
