//! CLI AI Core Library
//!
//! This crate provides the terminal-independent parts of cli-ai, an assistant
//! that translates natural-language requests into shell commands and lets the
//! user review them before anything runs.
//!
//! # Key Features
//!
//! - **Suggestions**: Build a [`suggestion::CommandSuggestion`] from language model replies
//! - **Risk Assessment**: Classify commands as LOW, MEDIUM or HIGH risk
//! - **Settings & History**: YAML-backed settings and a bounded command history
//! - **Collaborators**: Shell environment detection, command execution, clipboard access
//! - **Error Handling**: One error type covering every failure mode
//!
//! # Examples
//!
//! Assessing a command:
//!
//! ```
//! use cli_ai_core::risk::{assess, RiskLevel};
//!
//! assert_eq!(assess("rm -rf /tmp/x"), (RiskLevel::High, true));
//! assert_eq!(assess("ls -la"), (RiskLevel::Low, false));
//! ```

pub mod assistant;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod execution;
pub mod file_handling;
pub mod history;
pub mod interpolation;
pub mod llm;
pub mod risk;
pub mod shell;
pub mod suggestion;
