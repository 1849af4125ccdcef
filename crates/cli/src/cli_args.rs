//! Command-line argument parsing.
//!
//! This module defines the command-line interface of the `s` binary using
//! the `clap` crate.

use clap::{Parser, Subcommand};

/// Command-line arguments for the `s` binary.
///
/// Everything that is not an option or a subcommand is the natural-language
/// request, e.g. `s find files larger than 100MB`.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use cli_ai_cli::cli_args::Args;
///
/// let args = Args::parse_from(["s", "list", "open", "ports"]);
/// assert_eq!(args.request(), "list open ports");
/// ```
#[derive(Parser, Debug)]
#[command(name = "s", version, term_width = 0)] // Just to make testing across clap features easier
pub struct Args {
    /// Path to the settings file YAML.
    ///
    /// If not provided, defaults to `~/.cli-ai/config.yml`.
    #[arg(long, short = 'c', global = true)]
    pub config_path: Option<String>,

    /// Path to the file that stores recent requests and commands.
    ///
    /// If not provided, defaults to `~/.cli-ai/history.yml`.
    #[arg(long, short = 'l', global = true)]
    pub history_path: Option<String>,

    /// Review the suggestion, but print the command instead of executing it.
    #[arg(long, short = 'd', action)]
    pub dry_run: bool,

    /// Print and copy the suggestion without the review screen.
    ///
    /// Overrides the `simple_mode` setting for this run.
    #[arg(long, short = 's', action)]
    pub simple: bool,

    /// Print the version and the detected terminal capabilities, then exit.
    #[arg(long, visible_alias = "info", action)]
    pub capabilities: bool,

    #[command(subcommand)]
    pub command: Option<Action>,

    /// The request, in plain words.
    #[arg(trailing_var_arg = true)]
    pub request: Vec<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Set a configuration value, e.g. `config-set max_alternatives=2`.
    ConfigSet {
        /// `key=value` assignment.
        assignment: String,
    },
    /// Show all configuration values, or a single one.
    ConfigShow {
        /// Only show this key.
        key: Option<String>,
    },
}

impl Args {
    /// The request words joined by single spaces.
    pub fn request(&self) -> String {
        self.request.join(" ").trim().to_string()
    }
}
