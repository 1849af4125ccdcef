//! Gestures, review states and the actions a review ends with.

use std::fmt::{Display, Formatter};

use crate::input::Key;

/// Prefix marking an accepted command in its action string.
pub const ACCEPT_PREFIX: &str = "ACCEPT:";

/// A single keypress mapped to a review action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Execute,
    Accept,
    Copy,
    Alternatives,
    Edit,
    Cancel,
    Help,
}

impl Gesture {
    /// The gesture bound to `key`, if any.
    ///
    /// Whole lines from line-mode input are matched as words.
    pub fn from_key(key: &Key) -> Option<Self> {
        match key {
            Key::Enter => Some(Gesture::Execute),
            Key::Tab => Some(Gesture::Accept),
            Key::Ctrl('c') => Some(Gesture::Copy),
            Key::Ctrl('a') => Some(Gesture::Alternatives),
            Key::Ctrl('e') => Some(Gesture::Edit),
            Key::Escape => Some(Gesture::Cancel),
            Key::Char('?') | Key::Ctrl('/') => Some(Gesture::Help),
            Key::Line(line) => Self::from_word(line),
            _ => None,
        }
    }

    fn from_word(word: &str) -> Option<Self> {
        match word.trim().to_lowercase().as_str() {
            "" => Some(Gesture::Execute),
            "?" | "help" => Some(Gesture::Help),
            "tab" | "accept" => Some(Gesture::Accept),
            "esc" | "cancel" | "q" => Some(Gesture::Cancel),
            "copy" => Some(Gesture::Copy),
            "alt" => Some(Gesture::Alternatives),
            "edit" => Some(Gesture::Edit),
            _ => None,
        }
    }
}

/// How a review ended, when it did not end in cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    /// Run the command now.
    Execute(String),
    /// Hand the command back to the user without running it.
    Accept(String),
}

impl ReviewAction {
    pub fn command(&self) -> &str {
        match self {
            ReviewAction::Execute(command) | ReviewAction::Accept(command) => command,
        }
    }

    /// Parses an action string as produced by [`Display`].
    pub fn parse(action: &str) -> Self {
        match action.strip_prefix(ACCEPT_PREFIX) {
            Some(command) => ReviewAction::Accept(command.to_string()),
            None => ReviewAction::Execute(action.to_string()),
        }
    }
}

impl Display for ReviewAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewAction::Execute(command) => f.write_str(command),
            ReviewAction::Accept(command) => write!(f, "{ACCEPT_PREFIX}{command}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewState {
    Displaying,
    AwaitingGesture,
    ShowingAlternatives,
    ShowingHelp,
    Editing,
    Cancelled,
    Terminal(ReviewAction),
}
