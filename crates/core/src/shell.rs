//! Detection of the shell environment commands are generated for and run in.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::fs;

use log::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEnvironment {
    Wsl(String),
    Msys2(String),
    Cygwin,
    PowerShell,
    Cmd,
    /// Linux with the distribution id from `/etc/os-release`.
    Linux(String),
    Unix,
}

impl Display for ShellEnvironment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ShellEnvironment::Wsl(distro) => write!(f, "WSL {distro}"),
            ShellEnvironment::Msys2(system) => write!(f, "MSYS2 {system}"),
            ShellEnvironment::Cygwin => f.write_str("Cygwin"),
            ShellEnvironment::PowerShell => f.write_str("PowerShell"),
            ShellEnvironment::Cmd => f.write_str("Windows CMD"),
            ShellEnvironment::Linux(distro) => write!(f, "Linux {distro}"),
            ShellEnvironment::Unix => f.write_str("Unix Shell"),
        }
    }
}

impl ShellEnvironment {
    /// Detects the environment of the current process.
    pub fn detect() -> Self {
        let vars: HashMap<String, String> = std::env::vars().collect();
        let os_release = if cfg!(windows) {
            None
        } else {
            fs::read_to_string("/etc/os-release").ok()
        };

        let environment = Self::from_parts(cfg!(windows), &vars, os_release.as_deref());
        debug!("Shell environment: {environment}");
        environment
    }

    /// Pure detection from a Windows flag, environment variables and `/etc/os-release` text.
    pub fn from_parts(
        is_windows: bool,
        vars: &HashMap<String, String>,
        os_release: Option<&str>,
    ) -> Self {
        if is_windows {
            if let Some(distro) = vars.get("WSL_DISTRO_NAME") {
                return ShellEnvironment::Wsl(distro.clone());
            }
            if let Some(system) = vars.get("MSYSTEM") {
                return ShellEnvironment::Msys2(system.clone());
            }
            if vars.contains_key("CYGWIN") {
                return ShellEnvironment::Cygwin;
            }
            if vars.contains_key("PSModulePath") {
                return ShellEnvironment::PowerShell;
            }
            return ShellEnvironment::Cmd;
        }

        os_release
            .and_then(distribution_id)
            .map(ShellEnvironment::Linux)
            .unwrap_or(ShellEnvironment::Unix)
    }

    /// Program and leading arguments used to run one command line.
    pub fn invocation(&self, command: &str) -> (String, Vec<String>) {
        match self {
            ShellEnvironment::Cmd => ("cmd".to_string(), vec!["/C".to_string(), command.to_string()]),
            ShellEnvironment::PowerShell => (
                "powershell".to_string(),
                vec!["-Command".to_string(), command.to_string()],
            ),
            ShellEnvironment::Wsl(_) if cfg!(windows) => (
                "wsl".to_string(),
                vec!["sh".to_string(), "-c".to_string(), command.to_string()],
            ),
            _ => ("sh".to_string(), vec!["-c".to_string(), command.to_string()]),
        }
    }

    /// Command that lists the working directory for prompt context.
    pub fn listing_command(&self) -> &'static str {
        match self {
            ShellEnvironment::Cmd => "dir /b",
            ShellEnvironment::PowerShell => "Get-ChildItem -Force",
            _ => "ls -l",
        }
    }
}

/// True when running under the Windows Subsystem for Linux.
pub fn is_wsl() -> bool {
    if !cfg!(target_os = "linux") {
        return false;
    }
    let proc_version = fs::read_to_string("/proc/version").unwrap_or_default();
    wsl_indicated(
        std::env::var_os("WSL_DISTRO_NAME").is_some() || std::env::var_os("WSL_INTEROP").is_some(),
        &proc_version,
    )
}

fn wsl_indicated(has_wsl_variables: bool, proc_version: &str) -> bool {
    let proc_version = proc_version.to_lowercase();
    has_wsl_variables || proc_version.contains("microsoft") || proc_version.contains("wsl")
}

fn distribution_id(os_release: &str) -> Option<String> {
    os_release
        .lines()
        .find_map(|line| line.strip_prefix("ID="))
        .map(|id| id.trim().trim_matches('"'))
        .filter(|id| !id.is_empty())
        .map(capitalize)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
