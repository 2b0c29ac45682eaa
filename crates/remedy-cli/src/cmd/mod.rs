pub mod actions;
pub mod config;
pub mod exec;
pub mod history;
pub mod init;
pub mod serve;

use anyhow::Context;
use remedy_core::{config::Config, Executor};
use std::path::Path;

/// Load config (defaults when absent) with environment overrides applied.
pub fn load_config(root: &Path) -> anyhow::Result<Config> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    Ok(config.with_env_overrides())
}

/// Open the executor against the configured audit database.
pub fn open_executor(root: &Path) -> anyhow::Result<Executor> {
    let config = load_config(root)?;
    Executor::open(root, &config).with_context(|| {
        format!(
            "failed to open audit log at {}",
            config.audit_db_path(root).display()
        )
    })
}
