use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::io::IsTerminal;

use crossterm::terminal;
use log::debug;

const DEFAULT_WIDTH: u16 = 80;
const DEFAULT_HEIGHT: u16 = 24;

/// Terminal families known to understand ANSI color sequences.
const COLOR_TERM_FAMILIES: &[&str] = &[
    "color", "xterm", "screen", "tmux", "linux", "vt100", "vt220", "rxvt", "ansi", "cygwin",
    "konsole", "alacritty", "kitty", "putty", "foot", "wezterm",
];

const UNICODE_SHELLS: &[&str] = &["bash", "zsh", "fish"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Linux,
    MacOs,
    Windows,
    Other,
}

impl OsFamily {
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            OsFamily::Linux
        } else if cfg!(target_os = "macos") {
            OsFamily::MacOs
        } else if cfg!(windows) {
            OsFamily::Windows
        } else {
            OsFamily::Other
        }
    }
}

impl Display for OsFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OsFamily::Linux => "Linux",
            OsFamily::MacOs => "macOS",
            OsFamily::Windows => "Windows",
            OsFamily::Other => "Other",
        })
    }
}

/// Snapshot of what the terminal can do, taken once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalCapabilities {
    pub width: u16,
    pub height: u16,
    pub color: bool,
    pub unicode: bool,
    pub mouse: bool,
    /// Standard input and output are both terminals.
    pub interactive: bool,
    pub os: OsFamily,
    pub is_wsl: bool,
}

/// Raw observations capability detection is computed from.
#[derive(Debug, Clone)]
pub struct TerminalFacts {
    pub vars: HashMap<String, String>,
    pub stdin_is_tty: bool,
    pub stdout_is_tty: bool,
    pub size: Option<(u16, u16)>,
    pub os: OsFamily,
    pub is_wsl: bool,
}

impl TerminalFacts {
    /// Observes the current process. Never fails; unknowns are left empty.
    pub fn current() -> Self {
        let os = OsFamily::current();
        Self {
            vars: std::env::vars().collect(),
            stdin_is_tty: std::io::stdin().is_terminal(),
            stdout_is_tty: std::io::stdout().is_terminal(),
            size: terminal::size().ok(),
            os,
            is_wsl: os == OsFamily::Linux && cli_ai_core::shell::is_wsl(),
        }
    }

    fn var(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    fn term(&self) -> String {
        self.var("TERM").unwrap_or_default().to_lowercase()
    }
}

impl TerminalCapabilities {
    /// Detects the capabilities of the current process's terminal.
    pub fn detect() -> Self {
        let capabilities = Self::from_facts(&TerminalFacts::current());
        debug!("Terminal capabilities: {capabilities:?}");
        capabilities
    }

    /// Conservative defaults: no color, no Unicode, 80x24, no mouse.
    pub fn conservative() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            color: false,
            unicode: false,
            mouse: false,
            interactive: false,
            os: OsFamily::current(),
            is_wsl: false,
        }
    }

    pub fn from_facts(facts: &TerminalFacts) -> Self {
        let (width, height) = facts
            .size
            .filter(|(w, h)| *w > 0 && *h > 0)
            .unwrap_or((DEFAULT_WIDTH, DEFAULT_HEIGHT));

        Self {
            width,
            height,
            color: supports_color(facts),
            unicode: supports_unicode(facts),
            mouse: facts.stdout_is_tty && supports_mouse(facts),
            interactive: facts.stdin_is_tty && facts.stdout_is_tty,
            os: facts.os,
            is_wsl: facts.is_wsl,
        }
    }
}

fn supports_color(facts: &TerminalFacts) -> bool {
    if !facts.stdout_is_tty || facts.var("NO_COLOR").is_some() {
        return false;
    }

    let term = facts.term();
    if term == "dumb" {
        return forced_color(facts);
    }

    let color_family = COLOR_TERM_FAMILIES.iter().any(|family| term.contains(family));
    let windows_terminal = facts.os == OsFamily::Windows
        && (facts.var("WT_SESSION").is_some()
            || facts.var("TERM_PROGRAM") == Some("vscode")
            || facts.var("ConEmuANSI") == Some("ON")
            || facts.var("ANSICON").is_some());

    color_family || windows_terminal || forced_color(facts)
}

fn forced_color(facts: &TerminalFacts) -> bool {
    facts.var("COLORTERM").is_some()
        || facts.var("FORCE_COLOR").is_some_and(|v| v != "0")
        || facts.var("CLICOLOR_FORCE").is_some_and(|v| v != "0")
}

fn supports_unicode(facts: &TerminalFacts) -> bool {
    let encoding = ["LC_ALL", "LC_CTYPE", "LANG"]
        .iter()
        .find_map(|name| facts.var(name))
        .unwrap_or_default()
        .to_lowercase();
    let windows_utf8 = facts.os == OsFamily::Windows
        && (facts.var("WT_SESSION").is_some() || facts.var("TERM_PROGRAM") == Some("vscode"));
    let utf8 = encoding.contains("utf-8") || encoding.contains("utf8") || windows_utf8;

    utf8 && modern_terminal(facts)
}

fn modern_terminal(facts: &TerminalFacts) -> bool {
    let term = facts.term();
    let shell = facts.var("SHELL").unwrap_or_default();

    term.contains("256color")
        || term.contains("kitty")
        || term.contains("alacritty")
        || term.starts_with("xterm")
        || facts.var("TERM_PROGRAM").is_some()
        || facts.var("WT_SESSION").is_some()
        || facts.is_wsl
        || UNICODE_SHELLS.iter().any(|name| shell.ends_with(name))
}

fn supports_mouse(facts: &TerminalFacts) -> bool {
    let term = facts.term();
    term.contains("xterm") || term.contains("kitty") || facts.var("WT_SESSION").is_some()
}
