use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use remedy_core::config::{Config, WarnLevel};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective config (file + environment overrides)
    Show,

    /// Validate the config for common mistakes
    Validate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;

    if json {
        return print_json(&config);
    }

    println!("Audit database:   {}", config.audit_db_path(root).display());
    println!(
        "History limit:    {} (max {})",
        config.audit.default_history_limit, config.audit.max_history_limit
    );
    let webhook = if config.notify.slack_webhook_url.is_some() {
        "configured"
    } else {
        "(none, notifications are simulated)"
    };
    println!("Slack webhook:    {webhook}");
    println!("Notify timeout:   {}s", config.notify.timeout_seconds);
    println!("Server port:      {}", config.server.port);
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root)
        .context("failed to load config")?
        .with_env_overrides();
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
    if has_errors {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}
