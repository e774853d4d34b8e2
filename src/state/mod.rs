//! Persistent state locations, following XDG Base Directory standards.
//!
//! Cached prayer timings live under `XDG_STATE_HOME/salat/{namespace}` so that
//! configuration and state stay separated. The namespace is:
//! - "default" for the default config directory
//! - "custom_<hash>" for custom config directories (via --config)

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::config::default_config_dir;

fn state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".local/state")
        })
}

/// Get the state directory for a given configuration directory.
pub fn get_state_dir(config_dir: Option<&Path>) -> Result<PathBuf> {
    let state_base = state_home().join("salat");

    let namespace = match config_dir {
        None => "default".to_string(),
        Some(path) => {
            if path == default_config_dir()? {
                "default".to_string()
            } else {
                get_state_namespace(path)
            }
        }
    };

    Ok(state_base.join(namespace))
}

/// Generate a stable namespace for a custom config directory.
fn get_state_namespace(config_path: &Path) -> String {
    let canonical = config_path
        .canonicalize()
        .unwrap_or_else(|_| config_path.to_path_buf());

    // SHA256 truncated to 16 chars keeps the name short and stable
    let hash = sha256::digest(canonical.to_string_lossy().as_bytes());
    format!("custom_{}", &hash[..16])
}

/// Directory holding cached provider responses.
pub fn get_timings_dir(config_dir: Option<&Path>) -> Result<PathBuf> {
    Ok(get_state_dir(config_dir)?.join("timings"))
}

/// Remove state namespaces that have not been touched in 90 days.
pub fn cleanup_orphaned_state_dirs() -> Result<()> {
    let salat_state = state_home().join("salat");
    if !salat_state.exists() {
        return Ok(());
    }

    let ninety_days_ago = SystemTime::now()
        .checked_sub(Duration::from_secs(90 * 24 * 60 * 60))
        .unwrap_or(UNIX_EPOCH);

    if let Ok(entries) = fs::read_dir(&salat_state) {
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() || entry.file_name() == "default" {
                continue;
            }

            if let Ok(metadata) = entry.metadata()
                && let Ok(modified) = metadata.modified()
                && modified < ninety_days_ago
            {
                let _ = fs::remove_dir_all(&path);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn test_default_namespace() {
        let state_home = tempdir().unwrap();
        unsafe {
            std::env::set_var("XDG_STATE_HOME", state_home.path());
        }

        let dir = get_state_dir(None).unwrap();
        assert_eq!(dir, state_home.path().join("salat").join("default"));
        assert_eq!(
            get_timings_dir(None).unwrap(),
            state_home.path().join("salat/default/timings")
        );

        unsafe {
            std::env::remove_var("XDG_STATE_HOME");
        }
    }

    #[test]
    #[serial]
    fn test_custom_namespace_is_stable() {
        let state_home = tempdir().unwrap();
        let config_dir = tempdir().unwrap();
        unsafe {
            std::env::set_var("XDG_STATE_HOME", state_home.path());
        }

        let first = get_state_dir(Some(config_dir.path())).unwrap();
        let second = get_state_dir(Some(config_dir.path())).unwrap();

        assert_eq!(first, second);
        let name = first.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("custom_"));
        assert_eq!(name.len(), "custom_".len() + 16);

        unsafe {
            std::env::remove_var("XDG_STATE_HOME");
        }
    }

    #[test]
    #[serial]
    fn test_cleanup_keeps_recent_dirs() {
        let state_home = tempdir().unwrap();
        unsafe {
            std::env::set_var("XDG_STATE_HOME", state_home.path());
        }

        let recent = state_home.path().join("salat/custom_0123456789abcdef");
        fs::create_dir_all(&recent).unwrap();
        cleanup_orphaned_state_dirs().unwrap();
        assert!(recent.exists());

        unsafe {
            std::env::remove_var("XDG_STATE_HOME");
        }
    }
}
