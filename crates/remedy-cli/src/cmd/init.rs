use anyhow::Context;
use remedy_core::{config::Config, io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing remedy in: {}", root.display());

    let dir = paths::remedy_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    if Config::write_default(root).context("failed to write config.yaml")? {
        println!("  created: .remedy/config.yaml");
    } else {
        println!("  exists:  .remedy/config.yaml");
    }

    Ok(())
}
