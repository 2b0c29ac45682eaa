use crate::output::{print_json, print_table};
use std::path::Path;

pub fn run(root: &Path, status: Option<&str>, limit: Option<usize>, json: bool) -> anyhow::Result<()> {
    let executor = super::open_executor(root)?;
    let records = executor.history(status, limit)?;

    if json {
        return print_json(&records);
    }

    if records.is_empty() {
        println!("No audit records.");
        return Ok(());
    }

    let rows = records
        .iter()
        .map(|r| {
            vec![
                r.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                r.action.clone(),
                r.status.to_string(),
                format!("{}ms", r.duration_ms),
                serde_json::Value::Object(r.params.clone()).to_string(),
                r.reason.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print_table(
        &["TIME", "ACTION", "STATUS", "DURATION", "PARAMS", "REASON"],
        rows,
    );
    Ok(())
}

pub fn stats(root: &Path, json: bool) -> anyhow::Result<()> {
    let executor = super::open_executor(root)?;
    let stats = executor.stats()?;

    if json {
        return print_json(&stats);
    }

    println!("Total records: {}", stats.total);
    println!();
    let rows = stats
        .by_status
        .iter()
        .map(|(status, n)| vec![status.clone(), n.to_string()])
        .collect();
    print_table(&["STATUS", "COUNT"], rows);

    if !stats.by_action.is_empty() {
        println!();
        let rows = stats
            .by_action
            .iter()
            .map(|(action, n)| vec![action.clone(), n.to_string()])
            .collect();
        print_table(&["ACTION", "COUNT"], rows);
    }
    Ok(())
}
