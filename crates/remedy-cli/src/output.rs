use remedy_core::ExecutionOutcome;
use serde::Serialize;

/// Widest a single table cell may render before it is cut with `...`.
const MAX_CELL_CHARS: usize = 60;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print left-aligned columns. Long cells (params JSON, reasons) are
/// truncated so one record stays on one line.
pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let rows: Vec<Vec<String>> = rows
        .into_iter()
        .map(|row| row.into_iter().map(|c| truncate(&c, MAX_CELL_CHARS)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    println!("{}", render_row(headers, &widths));
    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", render_row(&sep, &widths));
    for row in &rows {
        println!("{}", render_row(row, &widths));
    }
}

fn render_row<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{:<w$}", cell.as_ref()))
        .collect();
    padded.join("  ").trim_end().to_string()
}

/// Human summary of one execution: a header line, then the result payload.
pub fn print_outcome(outcome: &ExecutionOutcome) -> anyhow::Result<()> {
    println!(
        "{} {} ({}ms)  id={}",
        outcome.action, outcome.status, outcome.duration_ms, outcome.execution_id
    );
    println!("{}", serde_json::to_string_pretty(&outcome.result)?);
    Ok(())
}

fn truncate(cell: &str, max: usize) -> String {
    if cell.chars().count() <= max {
        return cell.to_string();
    }
    let kept: String = cell.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
