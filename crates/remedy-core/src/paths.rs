use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const REMEDY_DIR: &str = ".remedy";
pub const CONFIG_FILE: &str = ".remedy/config.yaml";
pub const AUDIT_DB_FILE: &str = ".remedy/audit.db";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn remedy_dir(root: &Path) -> PathBuf {
    root.join(REMEDY_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve a configured path against the project root.
///
/// Absolute paths are returned unchanged.
pub fn resolve(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}
