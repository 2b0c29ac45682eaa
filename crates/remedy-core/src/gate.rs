//! Policy gate: decides whether a requested action may run.
//!
//! Checks are staged. The action must be on the allowlist, then every
//! required parameter must be present, then the action's own validator must
//! accept the values. Nothing executes until all three pass.

use crate::registry::{is_missing, ActionDefinition, ActionRegistry, Params};

#[derive(Debug, Clone, PartialEq)]
pub enum GateResult<'a> {
    /// The action is not in the registry.
    Unknown,
    /// The first required parameter (in declared order) that is absent,
    /// null, or an empty string.
    MissingParam(&'static str),
    /// Every validator error for the supplied values.
    Invalid(Vec<String>),
    Allowed(&'a ActionDefinition),
}

pub struct PolicyGate<'a> {
    registry: &'a ActionRegistry,
}

impl<'a> PolicyGate<'a> {
    pub fn new(registry: &'a ActionRegistry) -> Self {
        Self { registry }
    }

    pub fn check(&self, action: &str, params: &Params) -> GateResult<'a> {
        let Some(def) = self.registry.get(action) else {
            return GateResult::Unknown;
        };
        if let Some(name) = def.required_params.iter().copied().find(|p| is_missing(params, p)) {
            return GateResult::MissingParam(name);
        }
        let errors = def.kind.validate(params);
        if !errors.is_empty() {
            return GateResult::Invalid(errors);
        }
        GateResult::Allowed(def)
    }
}
