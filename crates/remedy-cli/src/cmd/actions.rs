use crate::output::{print_json, print_table};
use remedy_core::registry::ActionRegistry;
use std::path::Path;

pub fn run(_root: &Path, json: bool) -> anyhow::Result<()> {
    let registry = ActionRegistry::builtin();
    let actions = registry.list();

    if json {
        return print_json(&actions);
    }

    let rows = actions
        .iter()
        .map(|a| {
            vec![
                a.name.to_string(),
                a.required_params.join(", "),
                a.description.to_string(),
            ]
        })
        .collect();
    print_table(&["ACTION", "REQUIRED", "DESCRIPTION"], rows);
    Ok(())
}
