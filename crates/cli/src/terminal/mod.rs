//! Terminal capability detection and raw mode handling.

pub mod capabilities;

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use log::{debug, warn};

pub use capabilities::{OsFamily, TerminalCapabilities};

/// Holds the terminal in raw mode; the previous mode is restored on drop.
pub struct RawModeGuard;

impl RawModeGuard {
    /// Switches the terminal to raw mode.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the mode switch fails.
    pub fn acquire() -> std::io::Result<Self> {
        enable_raw_mode()?;
        debug!("Raw mode enabled");
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        // Disable raw mode on drop
        if let Err(e) = disable_raw_mode() {
            warn!("Could not restore terminal mode: {e}");
        } else {
            debug!("Raw mode disabled");
        }
    }
}
