//! Lock file management for single-instance enforcement.
//!
//! Only one monitor runs at a time. The lock file in the runtime directory
//! holds the owner's PID and, on a second line, its custom config directory
//! (empty for the default). A lock left behind by a dead process is removed
//! and acquisition is retried once.

use anyhow::{Result, bail};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::utils;

/// An acquired lock. Dropping it releases the lock and removes the file.
pub struct LockFile {
    file: File,
    path: PathBuf,
}

impl LockFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = fs::remove_file(&self.path);
    }
}

/// Path of the monitor lock file.
pub fn get_main_lock_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(runtime_dir).join("salat.lock")
}

/// Acquire the monitor lock at `lock_path`.
///
/// Fails when another live monitor holds it.
pub fn acquire_lock(lock_path: &Path, config_dir: Option<&Path>) -> Result<LockFile> {
    if let Some(lock) = try_lock(lock_path, config_dir)? {
        return Ok(lock);
    }

    // Locked: either a live instance or a stale file we can clear
    handle_lock_conflict(lock_path)?;

    match try_lock(lock_path, config_dir)? {
        Some(lock) => Ok(lock),
        None => bail!("Failed to acquire lock after cleanup attempt"),
    }
}

fn try_lock(lock_path: &Path, config_dir: Option<&Path>) -> Result<Option<LockFile>> {
    // Open without truncating so a held lock keeps its content
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)?;

    if file.try_lock_exclusive().is_err() {
        return Ok(None);
    }

    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    writeln!(&file, "{}", std::process::id())?;
    match config_dir {
        Some(dir) => writeln!(&file, "{}", dir.display())?,
        None => writeln!(&file)?,
    }
    file.flush()?;

    Ok(Some(LockFile {
        file,
        path: lock_path.to_path_buf(),
    }))
}

/// Read the PID recorded in a lock file.
pub fn read_lock_pid(lock_path: &Path) -> Option<u32> {
    let content = fs::read_to_string(lock_path).ok()?;
    content.lines().next()?.trim().parse().ok()
}

/// Clear a stale lock, or fail if its owner is still running.
fn handle_lock_conflict(lock_path: &Path) -> Result<()> {
    let Some(pid) = read_lock_pid(lock_path) else {
        log_warning!("Lock file format invalid, removing");
        let _ = fs::remove_file(lock_path);
        return Ok(());
    };

    if pid == std::process::id() || !utils::is_process_running(pid) {
        log_warning!("Removing stale lock file (process {pid} no longer running)");
        let _ = fs::remove_file(lock_path);
        return Ok(());
    }

    bail!(
        "salat is already running (PID: {pid}); send SIGHUP to reload it or stop it with SIGTERM"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_lock_records_pid_and_is_removed_on_drop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("salat.lock");

        let lock = acquire_lock(&path, Some(Path::new("/srv/salat"))).unwrap();
        let content = fs::read_to_string(lock.path()).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some(std::process::id().to_string().as_str()));
        assert_eq!(lines.next(), Some("/srv/salat"));

        drop(lock);
        assert!(!path.exists());
    }

    #[test]
    fn test_stale_lock_is_replaced() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("salat.lock");
        fs::write(&path, format!("{}\n\n", u32::MAX)).unwrap();

        let lock = acquire_lock(&path, None).unwrap();
        assert_eq!(read_lock_pid(lock.path()), Some(std::process::id()));
    }

    #[test]
    fn test_garbage_lock_is_replaced() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("salat.lock");
        fs::write(&path, "not a pid\n").unwrap();

        assert!(acquire_lock(&path, None).is_ok());
    }
}
