//! File watching module for hot config reloading.
//!
//! Watches the configuration directory and sends [`SignalMessage::Reload`]
//! to the monitor when `salat.toml` or `geo.toml` change. A reload that moves
//! the location is what triggers a new schedule fetch.

use anyhow::{Context, Result};
use notify::{
    Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use super::loading::{CONFIG_FILE_NAME, GEO_FILE_NAME};
use crate::signals::SignalMessage;
use crate::utils::private_path;

/// Debounce window; editors often write a file in several steps.
const DEBOUNCE_MS: u64 = 500;

/// Whether a change to `path` should reload the configuration.
fn is_config_event(path: &Path, config_dir: &Path) -> bool {
    if path.parent() != Some(config_dir) {
        return false;
    }

    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| {
            // Also match editor temp files such as "salat.toml~" or "salat.toml.swp"
            [CONFIG_FILE_NAME, GEO_FILE_NAME]
                .iter()
                .any(|watched| name == *watched || name.starts_with(watched))
        })
}

/// Configuration file watcher that monitors for changes and triggers reloads.
pub struct ConfigWatcher {
    signal_sender: Sender<SignalMessage>,
    config_dir: PathBuf,
    debug_enabled: bool,
}

impl ConfigWatcher {
    pub fn new(signal_sender: Sender<SignalMessage>, config_dir: PathBuf, debug_enabled: bool) -> Self {
        Self {
            signal_sender,
            config_dir,
            debug_enabled,
        }
    }

    /// Spawn the background watcher thread.
    pub fn start(self) -> Result<()> {
        if !self.config_dir.is_dir() {
            if self.debug_enabled {
                log_pipe!();
                log_debug!("No configuration directory to watch for hot reload");
            }
            return Ok(());
        }

        if self.debug_enabled {
            log_pipe!();
            log_debug!("Starting config file watcher for hot reload:");
            log_indented!("Watching: {}", private_path(&self.config_dir));
        }

        let (tx, rx) = std::sync::mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res
                    && matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    )
                {
                    let _ = tx.send(event);
                }
            },
            NotifyConfig::default(),
        )
        .context("Failed to create file watcher")?;

        // Watching the directory also catches editors that replace the file
        watcher
            .watch(&self.config_dir, RecursiveMode::NonRecursive)
            .with_context(|| {
                format!(
                    "Failed to watch directory: {}",
                    private_path(&self.config_dir)
                )
            })?;

        let ConfigWatcher {
            signal_sender,
            config_dir,
            debug_enabled,
        } = self;

        thread::spawn(move || {
            // The watcher must live as long as the thread
            let _watcher = watcher;
            let mut last_reload: Option<Instant> = None;

            for event in rx {
                let affects_config = event
                    .paths
                    .iter()
                    .any(|path| is_config_event(path, &config_dir));
                if !affects_config {
                    continue;
                }

                if last_reload.is_some_and(|at| at.elapsed() < Duration::from_millis(DEBOUNCE_MS)) {
                    continue;
                }

                if debug_enabled {
                    log_pipe!();
                    log_info!("Configuration file change detected");
                }

                if signal_sender.send(SignalMessage::Reload).is_err() {
                    // Monitor has shut down
                    break;
                }
                last_reload = Some(Instant::now());
            }
        });

        Ok(())
    }
}

/// Start the configuration file watcher for `config_dir`.
pub fn start_config_watcher(
    signal_sender: Sender<SignalMessage>,
    config_dir: PathBuf,
    debug_enabled: bool,
) -> Result<()> {
    ConfigWatcher::new(signal_sender, config_dir, debug_enabled).start()
}
