//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /home/user/project/app/styles/  ← cwd
/// /home/user/project/assetpipe.toml  ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_from(&cwd, config_name)
}

/// Search upward from `start` for `config_name`.
pub fn find_config_from(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_parent() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("assetpipe.toml");
        fs::write(&config, "").unwrap();
        let nested = dir.path().join("app/styles");
        fs::create_dir_all(&nested).unwrap();

        let found = find_config_from(&nested, Path::new("assetpipe.toml"));
        assert_eq!(found, Some(config));
    }

    #[test]
    fn test_find_config_missing() {
        let dir = TempDir::new().unwrap();
        let found = find_config_from(dir.path(), Path::new("no-such-config-7f3a.toml"));
        assert!(found.is_none());
    }
}
