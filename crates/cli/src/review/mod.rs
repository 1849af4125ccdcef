//! Gesture-based review of a suggested command.
//!
//! # Key Features
//!
//! - **Suggestion panel**: highlighted command, explanation, risk banner and hints
//! - **Single-key gestures**: execute, accept, copy, alternatives, edit, cancel, help
//! - **Line-mode fallback**: typed words stand in for gestures when input is not a terminal
//!
//! The interface is a small state machine (see [`ReviewState`]) that runs until it
//! reaches a terminal action or is cancelled.

pub mod types;
pub mod ui;

pub use types::{Gesture, ReviewAction, ReviewState, ACCEPT_PREFIX};
pub use ui::{explain_locally, ReviewInterface};
