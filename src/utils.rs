//! Shared utilities: path privacy, process checks and terminal state.

use anyhow::Result;
use crossterm::{cursor, execute};
use nix::sys::signal;
use nix::unistd::Pid;
use std::io::{IsTerminal, stdout};
use std::path::Path;

/// Display a path with the home directory replaced by `~`.
///
/// Log output is often pasted into bug reports, so usernames stay out of it.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(relative) = path.strip_prefix(&home)
    {
        if relative.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~/{}", relative.display());
    }
    path.display().to_string()
}

/// Check whether a process with `pid` exists (signal 0 probe).
pub fn is_process_running(pid: u32) -> bool {
    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    signal::kill(Pid::from_raw(raw), None).is_ok()
}

/// Whether stdout is an interactive terminal.
pub fn stdout_is_terminal() -> bool {
    stdout().is_terminal()
}

/// Hides the cursor while the live countdown is drawn and restores it on drop.
pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    pub fn new() -> Result<Self> {
        let active = stdout_is_terminal() && !crate::logger::is_logging_to_file();
        if active {
            execute!(stdout(), cursor::Hide)?;
        }
        Ok(Self { active })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = execute!(stdout(), cursor::Show);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_path_hides_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(private_path(&home), "~");
        assert_eq!(
            private_path(&home.join(".config/salat/salat.toml")),
            "~/.config/salat/salat.toml"
        );
        assert_eq!(private_path(Path::new("/etc/salat.toml")), "/etc/salat.toml");
    }

    #[test]
    fn test_current_process_is_running() {
        assert!(is_process_running(std::process::id()));
        assert!(!is_process_running(u32::MAX));
    }
}
