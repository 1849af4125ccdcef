use std::process::{Command, Stdio};

use log::{info, warn};

use crate::error::{Error, Result};
use crate::shell::ShellEnvironment;

/// Captured result of a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub status: i32,
}

/// Runs `command` through the platform shell and captures its output.
///
/// # Errors
///
/// Returns [`Error::Spawn`] if the shell cannot be started, and
/// [`Error::NonZeroExit`] with the captured stderr if the command fails.
pub fn execute(shell: &ShellEnvironment, command: &str) -> Result<CommandOutput> {
    let (program, args) = shell.invocation(command);
    info!("Executing `{command}` with {program}");

    let output = Command::new(&program)
        .args(&args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|original| Error::Spawn {
            program: program.clone(),
            original,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();

    if output.status.success() {
        info!("Command exited successfully");
        Ok(CommandOutput {
            stdout,
            status: output.status.code().unwrap_or(0),
        })
    } else {
        warn!("Command exited with {:?}", output.status.code());
        Err(Error::NonZeroExit {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Lists the working directory for prompt context; empty when the listing fails.
pub fn directory_listing(shell: &ShellEnvironment) -> String {
    match execute(shell, shell.listing_command()) {
        Ok(output) => output.stdout,
        Err(e) => {
            warn!("Could not list the working directory: {e}");
            String::new()
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_execute_captures_stdout() {
        let output = execute(&ShellEnvironment::Unix, "echo hello && echo world").unwrap();
        assert_eq!(output.stdout, "hello\nworld");
        assert_eq!(output.status, 0);
    }

    #[test]
    fn test_execute_non_zero_exit_keeps_stderr() {
        let result = execute(&ShellEnvironment::Unix, "echo broken >&2; exit 3");
        let Err(Error::NonZeroExit { code, stderr }) = result else {
            panic!("expected non-zero exit");
        };
        assert_eq!(code, Some(3));
        assert_eq!(stderr, "broken");
    }
}
