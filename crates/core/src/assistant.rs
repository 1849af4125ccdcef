//! Turns a natural-language request into a [`CommandSuggestion`].
//!
//! The primary command request is the only call whose failure is surfaced.
//! Alternatives and explanations are optional extras: when their requests
//! fail the suggestion is still returned, without them.

use itertools::Itertools;
use log::{debug, warn};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::history::CommandHistory;
use crate::interpolation;
use crate::llm::{CompletionClient, CompletionRequest};
use crate::suggestion::CommandSuggestion;

const RECENT_COMMAND_COUNT: usize = 5;

/// Context gathered by the caller for one request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Display name of the shell environment.
    pub shell: String,
    pub directory_listing: Option<String>,
}

pub struct SuggestionService<'a, C: CompletionClient> {
    client: &'a C,
    settings: &'a Settings,
    history: &'a CommandHistory,
}

impl<'a, C: CompletionClient> SuggestionService<'a, C> {
    pub fn new(client: &'a C, settings: &'a Settings, history: &'a CommandHistory) -> Self {
        Self {
            client,
            settings,
            history,
        }
    }

    /// Requests a command for `request` and decorates it with alternatives,
    /// an explanation and locally derived hints.
    ///
    /// # Errors
    ///
    /// Returns the classified model error if the primary request fails, or a
    /// `MalformedResponse` error if the model replies with no command.
    pub fn suggest(&self, request: &str, context: &RequestContext) -> Result<CommandSuggestion> {
        let recent = self.recent_commands_json();
        let prompt = interpolation::command_prompt(
            &context.shell,
            request,
            context.directory_listing.as_deref(),
            recent.as_deref(),
        )?;

        let reply = self.client.complete(
            &CompletionRequest::new(prompt, 100, 0.0).with_system(interpolation::SYSTEM_PROMPT),
        )?;
        let command = strip_code_fences(&reply);
        if command.is_empty() {
            return Err(Error::MalformedResponse(
                "the model returned an empty command".to_string(),
            ));
        }
        debug!("Primary command: {command}");

        let alternatives = self.alternatives(request, &command);
        let explanation = self.explanation(&command);
        let hints = context_hints(&command);

        Ok(CommandSuggestion::new(command)
            .with_explanation(explanation)
            .with_alternatives(alternatives)
            .with_context_hints(hints))
    }

    fn recent_commands_json(&self) -> Option<String> {
        if !self.settings.enable_command_history || self.history.is_empty() {
            return None;
        }

        serde_json::to_string_pretty(self.history.recent(RECENT_COMMAND_COUNT))
            .map_err(|e| warn!("Could not serialize recent commands: {e}"))
            .ok()
    }

    fn alternatives(&self, request: &str, command: &str) -> Vec<String> {
        let count = self.settings.max_alternatives;
        if count == 0 {
            return Vec::new();
        }

        let reply = interpolation::alternatives_prompt(request, command, count).and_then(|prompt| {
            self.client
                .complete(&CompletionRequest::new(prompt, 200, 0.3))
        });

        match reply {
            Ok(reply) => parse_alternatives(&reply, command, count),
            Err(e) => {
                warn!("Could not generate alternatives: {e}");
                Vec::new()
            }
        }
    }

    fn explanation(&self, command: &str) -> String {
        if !self.settings.show_explanations {
            return String::new();
        }

        let reply = interpolation::explanation_prompt(command).and_then(|prompt| {
            self.client
                .complete(&CompletionRequest::new(prompt, 150, 0.0))
        });

        reply.unwrap_or_else(|e| {
            warn!("Could not generate explanation: {e}");
            String::new()
        })
    }
}

/// Removes surrounding code fences or backticks from a model reply.
pub fn strip_code_fences(reply: &str) -> String {
    let trimmed = reply.trim();

    if let Some(body) = trimmed.strip_prefix("```") {
        // Drop the info string on the opening fence line
        let body = match body.split_once('\n') {
            Some((_, rest)) => rest,
            None => body,
        };
        let body = body.trim_end();
        let body = body.strip_suffix("```").unwrap_or(body);
        return body.trim().to_string();
    }

    trimmed.trim_matches('`').trim().to_string()
}

/// Parses an alternatives reply: a JSON array of strings, or failing that,
/// one command per line. The primary command and duplicates are dropped.
pub fn parse_alternatives(reply: &str, primary: &str, limit: usize) -> Vec<String> {
    let candidates: Vec<String> = match serde_json::from_str::<Vec<String>>(&strip_code_fences(reply)) {
        Ok(parsed) => parsed,
        Err(_) => {
            debug!("Alternatives reply is not a JSON array, splitting lines");
            reply
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .filter(|line| !line.starts_with(['•', '-', '*', '#']) && !line.starts_with("```"))
                .map(|line| line.trim_matches(['"', '\'', '`', ',']).trim().to_string())
                .collect()
        }
    };

    candidates
        .into_iter()
        .map(|candidate| candidate.trim().to_string())
        .filter(|candidate| !candidate.is_empty() && candidate != primary)
        .unique()
        .take(limit)
        .collect()
}

/// Hints derived from the command text alone.
pub fn context_hints(command: &str) -> Vec<String> {
    let lowered = command.to_lowercase();
    let mut hints = Vec::new();

    if crate::risk::requires_elevation(command) {
        hints.push("This command requires administrator privileges".to_string());
    }

    if ["rm ", "rmdir", "dd ", "mkfs", "shred"]
        .iter()
        .any(|signature| lowered.contains(signature))
    {
        hints.push("This command can permanently delete data".to_string());
    }

    if lowered.contains('>') && !lowered.contains(">>") {
        hints.push("This will overwrite the target file".to_string());
    }

    if lowered.contains("find") && lowered.contains("-exec") {
        hints.push("This will execute commands on found files".to_string());
    }

    if lowered.contains("find / ") || lowered.ends_with("find /") || lowered.contains("find /home") {
        hints.push("This search may take a long time".to_string());
    }

    hints
}
