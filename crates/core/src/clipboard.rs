//! Copying text to the system clipboard through platform utilities.
//!
//! # Key Features
//!
//! - **Utility selection**: WSL, Wayland, X11, macOS and Windows utilities,
//!   checked on `PATH` with the `which` crate
//! - **Diagnostics**: a structured report used to explain failed copies
//!
//! Copy failures are reported as `false`, never as errors.

use std::io::{self, Write};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use log::{debug, info, warn};
use wait_timeout::ChildExt;

use crate::shell;

const COPY_TIMEOUT: Duration = Duration::from_secs(3);

pub trait Clipboard {
    /// Copies `text`; false when nothing was copied.
    fn copy(&self, text: &str) -> bool;

    fn diagnostics(&self) -> ClipboardDiagnostics;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Other
        }
    }
}

/// A clipboard utility and the arguments that make it read stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardUtility {
    pub program: &'static str,
    pub args: &'static [&'static str],
}

impl ClipboardUtility {
    const CLIP: Self = Self {
        program: "clip.exe",
        args: &[],
    };
    const WL_COPY: Self = Self {
        program: "wl-copy",
        args: &[],
    };
    const XCLIP: Self = Self {
        program: "xclip",
        args: &["-selection", "clipboard"],
    };
    const XSEL: Self = Self {
        program: "xsel",
        args: &["--clipboard", "--input"],
    };
    const PBCOPY: Self = Self {
        program: "pbcopy",
        args: &[],
    };
}

/// Everything utility selection depends on.
#[derive(Debug, Clone)]
pub struct ClipboardContext {
    pub platform: Platform,
    pub is_wsl: bool,
    pub display: Option<String>,
    pub wayland_display: Option<String>,
}

impl ClipboardContext {
    pub fn detect() -> Self {
        let platform = Platform::current();
        Self {
            platform,
            is_wsl: platform == Platform::Linux && shell::is_wsl(),
            display: std::env::var("DISPLAY").ok().filter(|v| !v.is_empty()),
            wayland_display: std::env::var("WAYLAND_DISPLAY").ok().filter(|v| !v.is_empty()),
        }
    }
}

/// Picks the clipboard utility for `context`, given which programs exist.
pub fn select_utility(
    context: &ClipboardContext,
    exists: impl Fn(&str) -> bool,
) -> Option<ClipboardUtility> {
    match context.platform {
        Platform::Linux if context.is_wsl => Some(ClipboardUtility::CLIP),
        Platform::Linux => {
            if context.wayland_display.is_some() && exists("wl-copy") {
                return Some(ClipboardUtility::WL_COPY);
            }

            // X11 first when a display is set; the same order is the headless fallback
            [
                ClipboardUtility::XCLIP,
                ClipboardUtility::XSEL,
                ClipboardUtility::WL_COPY,
            ]
            .into_iter()
            .find(|utility| exists(utility.program))
        }
        Platform::MacOs => exists("pbcopy").then_some(ClipboardUtility::PBCOPY),
        Platform::Windows => Some(ClipboardUtility::CLIP),
        Platform::Other => None,
    }
}

/// Report on clipboard support, for user-facing guidance only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardDiagnostics {
    pub platform: Platform,
    pub available_utilities: Vec<String>,
    pub selected_utility: Option<String>,
    pub display: Option<String>,
    pub wayland_display: Option<String>,
    pub is_wsl: bool,
    pub issues: Vec<String>,
}

/// Builds diagnostics for `context`, given which programs exist.
pub fn diagnose(context: &ClipboardContext, exists: impl Fn(&str) -> bool) -> ClipboardDiagnostics {
    let mut available_utilities = Vec::new();
    let mut issues = Vec::new();

    match context.platform {
        Platform::Linux if context.is_wsl => {
            if exists("clip.exe") {
                available_utilities.push("clip.exe".to_string());
            } else {
                issues.push("clip.exe not found (required for WSL)".to_string());
            }
        }
        Platform::Linux => {
            for program in ["xclip", "xsel", "wl-copy"] {
                if exists(program) {
                    available_utilities.push(program.to_string());
                }
            }
            if context.display.is_none() && context.wayland_display.is_none() {
                issues.push("No DISPLAY or WAYLAND_DISPLAY environment variable set".to_string());
            }
            if available_utilities.is_empty() {
                issues.push("No clipboard utilities installed (xclip, xsel, wl-copy)".to_string());
            }
        }
        Platform::MacOs => {
            if exists("pbcopy") {
                available_utilities.push("pbcopy".to_string());
            } else {
                issues.push("pbcopy not found".to_string());
            }
        }
        Platform::Windows => {
            if exists("clip.exe") {
                available_utilities.push("clip.exe".to_string());
            } else {
                issues.push("clip.exe not found".to_string());
            }
        }
        Platform::Other => issues.push("Unsupported platform".to_string()),
    }

    ClipboardDiagnostics {
        platform: context.platform,
        available_utilities,
        selected_utility: select_utility(context, &exists).map(|u| u.program.to_string()),
        display: context.display.clone(),
        wayland_display: context.wayland_display.clone(),
        is_wsl: context.is_wsl,
        issues,
    }
}

fn program_exists(program: &str) -> bool {
    which::which(program).is_ok()
}

/// Clipboard backed by the platform's command-line utilities.
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    context: ClipboardContext,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self {
            context: ClipboardContext::detect(),
        }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard for SystemClipboard {
    fn copy(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }

        let Some(utility) = select_utility(&self.context, program_exists) else {
            warn!("No clipboard utility available");
            return false;
        };
        info!("Copying with {}", utility.program);

        match pipe_to(&utility, text) {
            Ok(success) => success,
            Err(e) => {
                warn!("Clipboard utility {} failed: {e}", utility.program);
                false
            }
        }
    }

    fn diagnostics(&self) -> ClipboardDiagnostics {
        diagnose(&self.context, program_exists)
    }
}

fn pipe_to(utility: &ClipboardUtility, text: &str) -> io::Result<bool> {
    let mut child = Command::new(utility.program)
        .args(utility.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    feed(&mut child, text, COPY_TIMEOUT)
}

/// Writes `text` to the child's stdin, closes it, and waits up to `timeout`.
///
/// The child is always reaped before returning; it is killed first when the
/// write fails or the timeout passes.
fn feed(child: &mut Child, text: &str, timeout: Duration) -> io::Result<bool> {
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(text.as_bytes()),
        None => Ok(()),
    };
    if let Err(e) = written {
        let _ = child.kill();
        let _ = child.wait();
        return Err(e);
    }

    match child.wait_timeout(timeout)? {
        Some(status) => {
            debug!("Clipboard utility exited with {status}");
            Ok(status.success())
        }
        None => {
            warn!("Clipboard utility timed out after {timeout:?}");
            let _ = child.kill();
            child.wait()?;
            Ok(false)
        }
    }
}
