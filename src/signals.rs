//! Signal handling for the salat monitor.
//!
//! A background thread turns process signals into [`SignalMessage`]s on a
//! channel the monitor loop drains between ticks:
//! - SIGINT, SIGTERM: shut down
//! - SIGHUP, SIGUSR2: reload the configuration
//!
//! The config file watcher sends `Reload` on the same channel.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR2},
    iterator::Signals,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, mpsc};
use std::thread;

/// Unified message type for everything that interrupts the monitor loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    /// Re-read the configuration (SIGHUP, SIGUSR2, file watcher)
    Reload,
    /// Stop the monitor (SIGINT, SIGTERM)
    Shutdown,
}

/// Signal handling state shared between threads.
pub struct SignalState {
    /// Cleared when the application should stop
    pub running: Arc<AtomicBool>,
    pub signal_receiver: Receiver<SignalMessage>,
    /// Cloned by the config watcher
    pub signal_sender: Sender<SignalMessage>,
}

impl SignalState {
    /// State without OS signal registration, for simulations and tests.
    pub fn detached() -> Self {
        let (signal_sender, signal_receiver) = mpsc::channel();
        Self {
            running: Arc::new(AtomicBool::new(true)),
            signal_receiver,
            signal_sender,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn request_shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Map a raw signal number to a message.
fn message_for(signal: i32) -> Option<SignalMessage> {
    match signal {
        SIGINT | SIGTERM => Some(SignalMessage::Shutdown),
        SIGHUP | SIGUSR2 => Some(SignalMessage::Reload),
        _ => None,
    }
}

/// Register OS signal handlers and spawn the forwarding thread.
pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    let state = SignalState::detached();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR2])
        .context("failed to register signal handlers")?;

    let running = state.running.clone();
    let sender = state.signal_sender.clone();

    thread::spawn(move || {
        for sig in signals.forever() {
            let Some(message) = message_for(sig) else {
                continue;
            };

            if debug_enabled {
                log_pipe!();
                log_debug!("Received signal {sig}: {message:?}");
            }

            if message == SignalMessage::Shutdown {
                // Flag first so a sleeping loop notices even if the channel is full
                running.store(false, Ordering::SeqCst);
            }

            if sender.send(message).is_err() {
                break;
            }
        }
    });

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_mapping() {
        assert_eq!(message_for(SIGINT), Some(SignalMessage::Shutdown));
        assert_eq!(message_for(SIGTERM), Some(SignalMessage::Shutdown));
        assert_eq!(message_for(SIGHUP), Some(SignalMessage::Reload));
        assert_eq!(message_for(SIGUSR2), Some(SignalMessage::Reload));
        assert_eq!(message_for(0), None);
    }

    #[test]
    fn test_detached_state_channel() {
        let state = SignalState::detached();
        assert!(state.is_running());

        state.signal_sender.send(SignalMessage::Reload).unwrap();
        assert_eq!(state.signal_receiver.try_recv(), Ok(SignalMessage::Reload));

        state.request_shutdown();
        assert!(!state.is_running());
    }
}
