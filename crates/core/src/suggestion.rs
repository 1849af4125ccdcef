use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::assistant::context_hints;
use crate::risk::{self, RiskLevel};

/// A command proposed by the language model for one user request.
///
/// Built once per model response. Consumers only read it, except that
/// picking an alternative or editing replaces the command text.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CommandSuggestion {
    command: String,
    explanation: String,
    risk_level: Option<RiskLevel>,
    alternatives: Vec<String>,
    context_hints: Vec<String>,
    requires_sudo: bool,
    is_destructive: bool,
}

impl CommandSuggestion {
    pub fn new(command: impl Into<String>) -> Self {
        let command = command.into();
        let (_, is_destructive) = risk::assess(&command);
        Self {
            requires_sudo: risk::requires_elevation(&command),
            is_destructive,
            command,
            explanation: String::new(),
            risk_level: None,
            alternatives: Vec::new(),
            context_hints: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    #[must_use]
    pub fn with_alternatives(mut self, alternatives: Vec<String>) -> Self {
        self.alternatives = alternatives;
        self
    }

    #[must_use]
    pub fn with_context_hints(mut self, context_hints: Vec<String>) -> Self {
        self.context_hints = context_hints;
        self
    }

    /// Assesses the current command and records its risk level.
    pub fn assess(&mut self) -> RiskLevel {
        let level = risk::assess(&self.command).0;
        self.risk_level = Some(level);
        level
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// `None` until the suggestion has been assessed.
    pub fn risk_level(&self) -> Option<RiskLevel> {
        self.risk_level
    }

    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    pub fn context_hints(&self) -> &[String] {
        &self.context_hints
    }

    pub fn requires_sudo(&self) -> bool {
        self.requires_sudo
    }

    pub fn is_destructive(&self) -> bool {
        self.is_destructive
    }

    /// Swaps in a new command text. The previous risk tag no longer applies;
    /// the privilege and destructiveness flags and the hints follow the new text.
    pub fn replace_command(&mut self, command: impl Into<String>) {
        self.command = command.into();
        self.risk_level = None;
        self.requires_sudo = risk::requires_elevation(&self.command);
        self.is_destructive = risk::assess(&self.command).1;
        self.context_hints = context_hints(&self.command);
    }
}

impl Display for CommandSuggestion {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.command)
    }
}
