//! cli-ai CLI Library
//!
//! This crate provides the terminal side of cli-ai, an assistant that turns a
//! plain-language request into a shell command. It detects what the terminal
//! can do, reads keys in raw mode, and runs the review screen on which the
//! suggested command is executed, accepted, copied, edited or dismissed.
//!
//! # Key Features
//!
//! - **Capability Detection**: Color, Unicode and size, detected once per process
//! - **Raw Keyboard Input**: Escape-sequence decoding with a line-mode fallback
//! - **Gesture Review**: Single-key actions on a suggested command
//! - **Command Editing**: In-place editor with history and syntax highlighting
//! - **Panels**: Bordered blocks with Unicode or ASCII glyphs
//!
//! # Architecture
//!
//! - [`cli_args`]: Command-line argument parsing
//! - [`terminal`]: Capability detection and raw mode
//! - [`input`]: Keys and the keyboard reader
//! - [`editor`]: The command-line editor and highlighter
//! - [`render`]: Colors and panels
//! - [`review`]: The gesture-based review interface
//! - [`spinner`]: Progress indicator shown while waiting for a suggestion
//! - [`settings_view`]: Panels for `config-show`
//!
//! # Examples
//!
//! ```bash
//! # Ask for a command and review it
//! s find files larger than 100MB
//!
//! # Print and copy the suggestion without the review screen
//! s --simple show disk usage
//!
//! # Change a setting
//! s config-set max_alternatives=2
//! ```

pub mod cli_args;
pub mod editor;
pub mod input;
pub mod render;
pub mod review;
pub mod settings_view;
pub mod spinner;
pub mod terminal;
