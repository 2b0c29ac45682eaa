//! Effect producers for the built-in actions.
//!
//! Infrastructure effects are simulated: they never touch a cluster and
//! return a plausible payload. `notify_slack` is the one effect with real
//! I/O, and only when a [`Notifier`] is configured.

use chrono::Utc;
use rand::Rng;
use serde_json::{json, Value};

use crate::error::EffectError;
use crate::notify::Notifier;
use crate::registry::{int_param, str_param, Params};

/// Collaborators available to effect producers.
#[derive(Clone, Copy, Default)]
pub struct EffectContext<'a> {
    pub notifier: Option<&'a dyn Notifier>,
}

pub fn scale_pods(params: &Params) -> Value {
    let service = str_param(params, "service");
    let replicas = int_param(params, "replicas").and_then(Result::ok).unwrap_or(1);
    let previous: i64 = rand::thread_rng().gen_range(1..=10);
    json!({
        "service": service,
        "previous_replicas": previous,
        "new_replicas": replicas,
        "message": format!("Scaled {service} from {previous} to {replicas} replicas"),
    })
}

pub fn restart_service(params: &Params) -> Value {
    let service = str_param(params, "service");
    let downtime: u64 = rand::thread_rng().gen_range(2..=15);
    json!({
        "service": service,
        "restarted_at": Utc::now(),
        "downtime_seconds": downtime,
        "status": "running",
    })
}

pub fn notify_slack(params: &Params, ctx: &EffectContext<'_>) -> Result<Value, EffectError> {
    let channel = str_param(params, "channel");
    let message = str_param(params, "message");
    match ctx.notifier {
        Some(notifier) => {
            notifier.send(channel, message)?;
            Ok(json!({ "delivered": true, "channel": channel }))
        }
        None => Ok(json!({
            "delivered": false,
            "simulated": true,
            "channel": channel,
            "message_length": message.chars().count(),
        })),
    }
}

pub fn clear_cache(params: &Params) -> Value {
    let scope = match str_param(params, "scope") {
        "" => "all",
        s => s,
    };
    let keys: u64 = rand::thread_rng().gen_range(100..=5000);
    json!({
        "service": str_param(params, "service"),
        "scope": scope,
        "keys_cleared": keys,
    })
}

pub fn rollback_deployment(params: &Params) -> Value {
    let requested = int_param(params, "revision").and_then(Result::ok);
    let floor = requested.unwrap_or(1).saturating_add(1);
    let current: i64 = rand::thread_rng().gen_range(floor..=floor.saturating_add(10));
    let target = requested.unwrap_or(current - 1);
    json!({
        "service": str_param(params, "service"),
        "from_revision": current,
        "to_revision": target,
        "status": "rolled_back",
    })
}

pub fn drain_node(params: &Params) -> Value {
    let grace = int_param(params, "grace_period_seconds")
        .and_then(Result::ok)
        .unwrap_or(30);
    let evicted: u64 = rand::thread_rng().gen_range(0..=30);
    json!({
        "node": str_param(params, "node"),
        "cordoned": true,
        "pods_evicted": evicted,
        "grace_period_seconds": grace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn params(v: Value) -> Params {
        v.as_object().cloned().unwrap()
    }

    #[derive(Default)]
    struct Recording {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl Notifier for Recording {
        fn send(&self, channel: &str, message: &str) -> Result<(), EffectError> {
            self.sent
                .lock()
                .unwrap()
                .push((channel.to_string(), message.to_string()));
            Ok(())
        }
    }

    #[test]
    fn scale_pods_reports_requested_replicas() {
        let out = scale_pods(&params(json!({ "service": "payment-service", "replicas": 5 })));
        assert_eq!(out["new_replicas"], 5);
        assert_eq!(out["service"], "payment-service");
        let prev = out["previous_replicas"].as_i64().unwrap();
        assert!((1..=10).contains(&prev));
    }

    #[test]
    fn notify_without_notifier_is_simulated() {
        let out = notify_slack(
            &params(json!({ "channel": "#ops", "message": "hello" })),
            &EffectContext::default(),
        )
        .unwrap();
        assert_eq!(out["delivered"], false);
        assert_eq!(out["simulated"], true);
        assert_eq!(out["message_length"], 5);
    }

    #[test]
    fn notify_with_notifier_delivers() {
        let rec = Recording::default();
        let ctx = EffectContext {
            notifier: Some(&rec),
        };
        let out = notify_slack(&params(json!({ "channel": "#ops", "message": "hi" })), &ctx).unwrap();
        assert_eq!(out["delivered"], true);
        assert_eq!(
            rec.sent.lock().unwrap().as_slice(),
            &[("#ops".to_string(), "hi".to_string())]
        );
    }

    #[test]
    fn clear_cache_defaults_scope_to_all() {
        let out = clear_cache(&params(json!({ "service": "api" })));
        assert_eq!(out["scope"], "all");
    }

    #[test]
    fn rollback_targets_requested_revision() {
        let out = rollback_deployment(&params(json!({ "service": "api", "revision": 4 })));
        assert_eq!(out["to_revision"], 4);
        assert!(out["from_revision"].as_i64().unwrap() > 4);
    }

    #[test]
    fn rollback_near_integer_limit_does_not_overflow() {
        let out = rollback_deployment(&params(json!({ "service": "api", "revision": i64::MAX - 3 })));
        assert_eq!(out["to_revision"], i64::MAX - 3);
        assert!(out["from_revision"].as_i64().unwrap() > i64::MAX - 3);
    }

    #[test]
    fn rollback_without_revision_goes_back_one() {
        let out = rollback_deployment(&params(json!({ "service": "api" })));
        let from = out["from_revision"].as_i64().unwrap();
        assert_eq!(out["to_revision"].as_i64().unwrap(), from - 1);
    }

    #[test]
    fn drain_node_uses_default_grace_period() {
        let out = drain_node(&params(json!({ "node": "worker-1" })));
        assert_eq!(out["grace_period_seconds"], 30);
        assert_eq!(out["cordoned"], true);
    }
}
