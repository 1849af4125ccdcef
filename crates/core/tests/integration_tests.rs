//! Integration tests for cli-ai-core
//!
//! These tests verify that the core functionality works together correctly
//! by testing complete workflows end-to-end.

use std::cell::RefCell;
use std::io::Write;

use cli_ai_core::assistant::{RequestContext, SuggestionService};
use cli_ai_core::config::{get_config_path, get_history_path, parse_assignment, Settings};
use cli_ai_core::error::{Error, Result};
use cli_ai_core::file_handling::{load_history, load_settings, save_history, save_settings};
use cli_ai_core::history::{CommandHistory, HistoryEntry, HISTORY_CAPACITY};
use cli_ai_core::llm::{CompletionClient, CompletionRequest};
use cli_ai_core::risk::RiskLevel;
use tempfile::NamedTempFile;

struct CannedClient {
    replies: RefCell<Vec<String>>,
}

impl CannedClient {
    fn new(replies: &[&str]) -> Self {
        Self {
            // Stored in reverse so pop() hands them out in order
            replies: RefCell::new(replies.iter().rev().map(|r| (*r).to_string()).collect()),
        }
    }
}

impl CompletionClient for CannedClient {
    fn complete(&self, _request: &CompletionRequest) -> Result<String> {
        self.replies
            .borrow_mut()
            .pop()
            .ok_or_else(|| Error::Network("exhausted".to_string()))
    }
}

/// Test the `config-set` workflow: parse, validate, persist, reload
#[test]
fn test_config_set_workflow() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("cli-ai").join("config.yml");
    let config_path = config_path.to_str().unwrap().to_string();

    // Missing file means defaults
    let mut settings = load_settings(&config_path).unwrap();
    assert_eq!(settings, Settings::default());

    let (key, value) = parse_assignment("max_alternatives=2").unwrap();
    settings.set(&key, &value).unwrap();
    let (key, value) = parse_assignment("directory_tree_context=true").unwrap();
    settings.set(&key, &value).unwrap();
    save_settings(&config_path, &settings).unwrap();

    let reloaded = load_settings(&config_path).unwrap();
    assert_eq!(reloaded.max_alternatives, 2);
    assert!(reloaded.directory_tree_context);
    assert!(!reloaded.is_default("max_alternatives").unwrap());
    assert!(reloaded.is_default("model").unwrap());
}

/// Test that a typo in a key is reported with close matches
#[test]
fn test_config_set_unknown_key_workflow() {
    let mut settings = Settings::default();
    let (key, value) = parse_assignment("max_alt=1").unwrap();

    let error = settings.set(&key, &value).unwrap_err();
    assert!(matches!(error, Error::UnknownSetting { .. }));
    assert!(error.to_string().contains("max_alternatives"));
}

/// Test that a hand-written settings file is read with defaults filled in
#[test]
fn test_hand_written_settings_file() {
    let yaml_content = r#"
model: "claude-custom"
show_explanations: false
"#;

    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "{yaml_content}").unwrap();
    let temp_path = temp_file.path().to_str().unwrap().to_string();

    let settings = load_settings(&temp_path).unwrap();
    assert_eq!(settings.model, "claude-custom");
    assert!(!settings.show_explanations);
    assert_eq!(settings.max_alternatives, 3);
}

/// Test history persistence across runs, including the capacity cap
#[test]
fn test_history_persistence_workflow() {
    let temp_dir = tempfile::tempdir().unwrap();
    let history_path = temp_dir.path().join("history.yml");
    let history_path = history_path.to_str().unwrap().to_string();

    for n in 0..HISTORY_CAPACITY + 2 {
        let mut history = load_history(&history_path).unwrap();
        history.push(HistoryEntry {
            request: format!("request {n}"),
            command: format!("echo {n}"),
            executed: true,
        });
        save_history(&history_path, &history).unwrap();
    }

    let history = load_history(&history_path).unwrap();
    assert_eq!(history.entries().len(), HISTORY_CAPACITY);
    assert_eq!(history.commands().first().map(String::as_str), Some("echo 2"));
    assert_eq!(
        history.commands().last().map(String::as_str),
        Some("echo 11")
    );
}

/// Test building a suggestion end-to-end from canned model replies
#[test]
fn test_suggestion_workflow() {
    let client = CannedClient::new(&[
        "rm -rf /var/log/old",
        "- option\n\"rm -rf /var/log/old*\"\nrm -rf /var/log/old",
        "",
    ]);
    let settings = Settings {
        max_alternatives: 1,
        ..Settings::default()
    };
    let history = CommandHistory::default();
    let service = SuggestionService::new(&client, &settings, &history);

    let mut suggestion = service
        .suggest(
            "remove old logs",
            &RequestContext {
                shell: "Unix Shell".to_string(),
                directory_listing: None,
            },
        )
        .unwrap();

    assert_eq!(suggestion.command(), "rm -rf /var/log/old");
    assert_eq!(suggestion.alternatives(), ["rm -rf /var/log/old*".to_string()]);
    assert!(suggestion.is_destructive());
    assert!(!suggestion.requires_sudo());

    assert_eq!(suggestion.assess(), RiskLevel::High);
    assert_eq!(suggestion.risk_level(), Some(RiskLevel::High));
}

/// Test configuration path resolution workflow
#[test]
fn test_configuration_path_workflow() {
    let default_config = get_config_path(&None);
    assert!(default_config.ends_with("config.yml"));
    assert!(!default_config.starts_with('~')); // Should be expanded

    let default_history = get_history_path(&None);
    assert!(default_history.ends_with("history.yml"));
    assert!(!default_history.starts_with('~'));

    assert_eq!(
        get_history_path(&Some("/custom/history.yml".to_string())),
        "/custom/history.yml"
    );
}
