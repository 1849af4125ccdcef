//! Prompt templates sent to the language model.
//!
//! Templates use `leon` placeholders. Optional context blocks are rendered
//! separately and appended to the base prompt only when they have content.

use std::collections::HashMap;

use leon::Template;

use crate::error::Result;

pub const SYSTEM_PROMPT: &str =
    "You are an expert command-line assistant. Provide only the command as your response.";

const COMMAND_TEMPLATE: &str = "Your Role: You are an expert AI assistant for {shell}, \
specializing in translating natural language into precise, safe commands.

Your Task: Translate the following natural language input into an appropriate command for {shell}:

<natural_language_input>
{request}
</natural_language_input>

Requirements:
1. Provide ONLY the command as your primary response
2. Ensure the command is correct and will work in {shell}
3. Consider safety and best practices
4. If the request is ambiguous, choose the most common/safe interpretation

Context Information:";

const DIRECTORY_TEMPLATE: &str = "
<current_directory_tree>
{listing}
</current_directory_tree>";

const RECENT_COMMANDS_TEMPLATE: &str = "
<recent_commands>
{recent}
</recent_commands>";

const ALTERNATIVES_TEMPLATE: &str = "Given the user input: \"{request}\" and the primary command: \"{command}\"

Generate {count} alternative commands that accomplish the same goal but with different approaches or options.

Respond with a JSON array of command strings only.
Example: [\"command1\", \"command2\", \"command3\"]";

const EXPLANATION_TEMPLATE: &str = "Explain what this command does in clear, concise terms:

Command: {command}

Provide a brief explanation focusing on:
1. What the command accomplishes
2. Key options/flags used
3. Any important warnings or considerations

Keep it under 3 sentences and use bullet points for multiple aspects.";

/// Renders `template` with values from `context`.
///
/// # Errors
///
/// Returns an error if the template does not parse or references a missing key.
pub fn render(template: &str, context: &HashMap<&str, String>) -> Result<String> {
    let template = Template::parse(template)?;
    Ok(template.render(context)?)
}

/// Builds the primary request prompt.
///
/// `directory_listing` and `recent_commands` are appended as tagged blocks
/// when present and non-empty.
///
/// # Errors
///
/// Returns an error if rendering fails.
pub fn command_prompt(
    shell: &str,
    request: &str,
    directory_listing: Option<&str>,
    recent_commands: Option<&str>,
) -> Result<String> {
    let context = HashMap::from([
        ("shell", shell.to_string()),
        ("request", request.to_string()),
    ]);
    let mut prompt = render(COMMAND_TEMPLATE, &context)?;

    if let Some(listing) = directory_listing.filter(|l| !l.trim().is_empty()) {
        let context = HashMap::from([("listing", listing.trim_end().to_string())]);
        prompt.push_str(&render(DIRECTORY_TEMPLATE, &context)?);
    }

    if let Some(recent) = recent_commands.filter(|r| !r.trim().is_empty()) {
        let context = HashMap::from([("recent", recent.to_string())]);
        prompt.push_str(&render(RECENT_COMMANDS_TEMPLATE, &context)?);
    }

    Ok(prompt)
}

/// Builds the prompt asking for `count` alternatives to `command`.
///
/// # Errors
///
/// Returns an error if rendering fails.
pub fn alternatives_prompt(request: &str, command: &str, count: usize) -> Result<String> {
    let context = HashMap::from([
        ("request", request.to_string()),
        ("command", command.to_string()),
        ("count", count.to_string()),
    ]);
    render(ALTERNATIVES_TEMPLATE, &context)
}

/// Builds the prompt asking for an explanation of `command`.
///
/// # Errors
///
/// Returns an error if rendering fails.
pub fn explanation_prompt(command: &str) -> Result<String> {
    let context = HashMap::from([("command", command.to_string())]);
    render(EXPLANATION_TEMPLATE, &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_command_prompt_without_context() {
        let prompt = command_prompt("Linux ubuntu", "list files", None, None).unwrap();
        assert!(prompt.contains("expert AI assistant for Linux ubuntu"));
        assert!(prompt.contains("<natural_language_input>\nlist files\n"));
        assert!(prompt.ends_with("Context Information:"));
    }

    #[test]
    fn test_command_prompt_with_context_blocks() {
        let prompt = command_prompt(
            "Unix Shell",
            "show disk usage",
            Some("total 0\n"),
            Some("[\"ls\"]"),
        )
        .unwrap();
        assert!(prompt.contains("<current_directory_tree>\ntotal 0\n</current_directory_tree>"));
        assert!(prompt.contains("<recent_commands>\n[\"ls\"]\n</recent_commands>"));
    }

    #[test]
    fn test_blank_context_blocks_are_skipped() {
        let prompt = command_prompt("Unix Shell", "pwd", Some("  "), Some("")).unwrap();
        assert!(!prompt.contains("current_directory_tree"));
        assert!(!prompt.contains("recent_commands"));
    }

    #[test]
    fn test_request_text_with_braces_is_not_interpreted() {
        // Values are substituted verbatim, never parsed as templates
        let prompt = command_prompt("Unix Shell", "echo {HOME}", None, None).unwrap();
        assert!(prompt.contains("echo {HOME}"));
    }

    #[test]
    fn test_alternatives_prompt() {
        let prompt = alternatives_prompt("list files", "ls", 3).unwrap();
        assert!(prompt.contains("primary command: \"ls\""));
        assert!(prompt.contains("Generate 3 alternative commands"));
    }

    #[test]
    fn test_render_missing_key() {
        let result = render("{missing}", &HashMap::new());
        assert!(matches!(result, Err(Error::Render(_))));
    }
}
