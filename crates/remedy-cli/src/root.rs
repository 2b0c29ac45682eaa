use std::path::{Path, PathBuf};

/// Resolve the project root directory.
///
/// Priority:
/// 1. `--root` flag / `REMEDY_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.remedy/`
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_upward(&cwd).unwrap_or(cwd)
}

fn find_upward(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(remedy_core::paths::REMEDY_DIR).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_remedy_dir_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".remedy")).unwrap();
        let subdir = dir.path().join("ops/runbooks");
        std::fs::create_dir_all(&subdir).unwrap();

        assert_eq!(find_upward(&subdir).unwrap(), dir.path());
    }

    #[test]
    fn no_remedy_dir_finds_nothing() {
        let dir = TempDir::new().unwrap();
        let subdir = dir.path().join("a/b");
        std::fs::create_dir_all(&subdir).unwrap();
        // Only assert on the temp subtree; an ancestor of the temp dir could
        // legitimately contain .remedy/.
        let found = find_upward(&subdir);
        assert!(found.map_or(true, |p| !p.starts_with(dir.path())));
    }
}
