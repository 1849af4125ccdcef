//! Settings and path resolution for cli-ai.
//!
//! Settings live in a YAML file (by default `~/.cli-ai/config.yml`). They are
//! loaded once at startup into a [`Settings`] value that is passed explicitly to
//! whatever needs it. Every key is described by a [`SettingSpec`] so the
//! `config-set` and `config-show` commands can validate and document them.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default path for the settings file
const DEFAULT_CONFIG_PATH: &str = "~/.cli-ai/config.yml";
/// Default path for the persisted command history
const DEFAULT_HISTORY_PATH: &str = "~/.cli-ai/history.yml";

/// Environment variable holding the language model API key
pub const API_KEY_VARIABLE: &str = "ANTHROPIC_API_KEY";

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Upper bound for `max_alternatives`
pub const MAX_ALTERNATIVES_LIMIT: usize = 5;

/// Resolves the settings file path, expanding `~`.
///
/// # Arguments
///
/// * `config_path_arg` - Optional custom settings file path
///
/// # Examples
///
/// ```
/// use cli_ai_core::config::get_config_path;
///
/// let custom_path = get_config_path(&Some("/path/to/config.yml".to_string()));
/// assert_eq!(custom_path, "/path/to/config.yml");
/// ```
pub fn get_config_path(config_path_arg: &Option<String>) -> String {
    let config_path = match config_path_arg {
        Some(config_path) => config_path,
        None => DEFAULT_CONFIG_PATH,
    };

    shellexpand::tilde(config_path).to_string()
}

/// Resolves the command history file path, expanding `~`.
pub fn get_history_path(history_path_arg: &Option<String>) -> String {
    let history_path = match history_path_arg {
        Some(history_path) => history_path,
        None => DEFAULT_HISTORY_PATH,
    };

    shellexpand::tilde(history_path).to_string()
}

/// Returns the API key from the process environment.
///
/// # Errors
///
/// Returns [`Error::MissingApiKey`] if the variable is unset or blank.
pub fn get_api_key() -> Result<String> {
    api_key_from(std::env::var(API_KEY_VARIABLE).ok())
}

fn api_key_from(value: Option<String>) -> Result<String> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(Error::MissingApiKey),
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub model: String,
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub show_explanations: bool,
    pub max_alternatives: usize,
    pub directory_tree_context: bool,
    pub enable_syntax_highlighting: bool,
    pub enable_command_history: bool,
    pub simple_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 30,
            show_explanations: true,
            max_alternatives: 3,
            directory_tree_context: false,
            enable_syntax_highlighting: true,
            enable_command_history: true,
            simple_mode: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Flag,
    Number { min: u64, max: u64 },
    Text,
}

impl SettingKind {
    fn accepted(&self) -> String {
        match self {
            SettingKind::Flag => "true, false".to_string(),
            SettingKind::Number { min, max } => format!("{min}-{max}"),
            SettingKind::Text => "any non-empty text".to_string(),
        }
    }
}

/// Schema entry for one settings key.
#[derive(Debug, Clone, Copy)]
pub struct SettingSpec {
    pub key: &'static str,
    pub description: &'static str,
    pub kind: SettingKind,
}

pub const SETTING_SPECS: &[SettingSpec] = &[
    SettingSpec {
        key: "model",
        description: "Language model used for suggestions",
        kind: SettingKind::Text,
    },
    SettingSpec {
        key: "api_url",
        description: "Messages API endpoint",
        kind: SettingKind::Text,
    },
    SettingSpec {
        key: "request_timeout_secs",
        description: "Seconds to wait for the language model",
        kind: SettingKind::Number { min: 1, max: 300 },
    },
    SettingSpec {
        key: "show_explanations",
        description: "Show an explanation under the suggested command",
        kind: SettingKind::Flag,
    },
    SettingSpec {
        key: "max_alternatives",
        description: "Number of alternative commands to request",
        kind: SettingKind::Number {
            min: 0,
            max: MAX_ALTERNATIVES_LIMIT as u64,
        },
    },
    SettingSpec {
        key: "directory_tree_context",
        description: "Send the current directory listing as context",
        kind: SettingKind::Flag,
    },
    SettingSpec {
        key: "enable_syntax_highlighting",
        description: "Color command tokens by kind",
        kind: SettingKind::Flag,
    },
    SettingSpec {
        key: "enable_command_history",
        description: "Remember recent requests and commands",
        kind: SettingKind::Flag,
    },
    SettingSpec {
        key: "simple_mode",
        description: "Print and copy suggestions without the review screen",
        kind: SettingKind::Flag,
    },
];

/// Looks up the schema entry for `key`.
///
/// # Errors
///
/// Returns [`Error::UnknownSetting`] carrying close matches when the key does not exist.
pub fn find_spec(key: &str) -> Result<&'static SettingSpec> {
    let key = key.trim();
    if let Some(spec) = SETTING_SPECS.iter().find(|spec| spec.key == key) {
        return Ok(spec);
    }

    Err(Error::UnknownSetting {
        key: key.to_string(),
        suggestions: similar_keys(key),
    })
}

fn similar_keys(key: &str) -> Vec<String> {
    let matcher = SkimMatcherV2::default();
    let lowered = key.to_lowercase();

    SETTING_SPECS
        .iter()
        .filter_map(|spec| {
            matcher
                .fuzzy_match(spec.key, &lowered)
                .or_else(|| matcher.fuzzy_match(&lowered, spec.key))
                .map(|score| (score, spec.key))
        })
        .sorted_by(|a, b| b.0.cmp(&a.0))
        .take(3)
        .map(|(_, key)| key.to_string())
        .collect()
}

fn parse_flag(spec: &SettingSpec, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid_value(spec, value)),
    }
}

fn parse_number(spec: &SettingSpec, value: &str, min: u64, max: u64) -> Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(number) if (min..=max).contains(&number) => Ok(number),
        _ => Err(invalid_value(spec, value)),
    }
}

fn invalid_value(spec: &SettingSpec, value: &str) -> Error {
    Error::InvalidSettingValue {
        key: spec.key.to_string(),
        value: value.to_string(),
        accepted: spec.kind.accepted(),
    }
}

/// Splits a `key=value` argument.
///
/// # Errors
///
/// Returns [`Error::InvalidAssignment`] when there is no `=` or the key is empty.
pub fn parse_assignment(assignment: &str) -> Result<(String, String)> {
    match assignment.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(Error::InvalidAssignment(assignment.to_string())),
    }
}

impl Settings {
    /// Returns the value of `key` formatted the way `config-set` accepts it.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys.
    pub fn get(&self, key: &str) -> Result<String> {
        let spec = find_spec(key)?;
        Ok(match spec.key {
            "model" => self.model.clone(),
            "api_url" => self.api_url.clone(),
            "request_timeout_secs" => self.request_timeout_secs.to_string(),
            "show_explanations" => self.show_explanations.to_string(),
            "max_alternatives" => self.max_alternatives.to_string(),
            "directory_tree_context" => self.directory_tree_context.to_string(),
            "enable_syntax_highlighting" => self.enable_syntax_highlighting.to_string(),
            "enable_command_history" => self.enable_command_history.to_string(),
            "simple_mode" => self.simple_mode.to_string(),
            other => return Err(Error::Misc(format!("setting `{other}` has no field"))),
        })
    }

    /// Validates and stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys or values outside the accepted range.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let spec = find_spec(key)?;

        match spec.kind {
            SettingKind::Flag => {
                let flag = parse_flag(spec, value)?;
                match spec.key {
                    "show_explanations" => self.show_explanations = flag,
                    "directory_tree_context" => self.directory_tree_context = flag,
                    "enable_syntax_highlighting" => self.enable_syntax_highlighting = flag,
                    "enable_command_history" => self.enable_command_history = flag,
                    "simple_mode" => self.simple_mode = flag,
                    _ => return Err(invalid_value(spec, value)),
                }
            }
            SettingKind::Number { min, max } => {
                let number = parse_number(spec, value, min, max)?;
                match spec.key {
                    "request_timeout_secs" => self.request_timeout_secs = number,
                    "max_alternatives" => self.max_alternatives = number as usize,
                    _ => return Err(invalid_value(spec, value)),
                }
            }
            SettingKind::Text => {
                let text = value.trim();
                if text.is_empty() {
                    return Err(invalid_value(spec, value));
                }
                match spec.key {
                    "model" => self.model = text.to_string(),
                    "api_url" => self.api_url = text.to_string(),
                    _ => return Err(invalid_value(spec, value)),
                }
            }
        }

        Ok(())
    }

    /// True when `key` still holds its default value.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys.
    pub fn is_default(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)? == Settings::default().get(key)?)
    }

    /// Checks values that serde alone cannot constrain.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range value found.
    pub fn validate(&self) -> Result<()> {
        for spec in SETTING_SPECS {
            if let SettingKind::Number { min, max } = spec.kind {
                parse_number(spec, &self.get(spec.key)?, min, max)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_config_path_with_custom_path() {
        let custom_path = Some("/custom/path/config.yml".to_string());
        assert_eq!(get_config_path(&custom_path), "/custom/path/config.yml");
    }

    #[test]
    fn test_get_config_path_with_none() {
        let result = get_config_path(&None);
        // Should expand the tilde in the default path
        assert!(result.ends_with(".cli-ai/config.yml"));
        assert!(!result.starts_with('~'));
    }

    #[test]
    fn test_get_history_path_with_tilde() {
        let result = get_history_path(&Some("~/my-history.yml".to_string()));
        assert!(!result.starts_with('~'));
        assert!(result.ends_with("my-history.yml"));
    }

    #[test]
    fn test_api_key_from_value() {
        assert_eq!(api_key_from(Some(" sk-test ".to_string())).unwrap(), "sk-test");
        assert!(matches!(api_key_from(None), Err(Error::MissingApiKey)));
        assert!(matches!(
            api_key_from(Some("   ".to_string())),
            Err(Error::MissingApiKey)
        ));
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.max_alternatives, 3);
        assert!(settings.show_explanations);
        assert!(!settings.simple_mode);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_every_spec_key_is_readable() {
        let settings = Settings::default();
        for spec in SETTING_SPECS {
            assert!(settings.get(spec.key).is_ok(), "{}", spec.key);
            assert!(settings.is_default(spec.key).unwrap());
        }
    }

    #[test]
    fn test_set_flag_and_number() {
        let mut settings = Settings::default();
        settings.set("show_explanations", "off").unwrap();
        settings.set("max_alternatives", "5").unwrap();
        assert!(!settings.show_explanations);
        assert_eq!(settings.max_alternatives, 5);
        assert!(!settings.is_default("max_alternatives").unwrap());
    }

    #[test]
    fn test_set_rejects_out_of_range_number() {
        let mut settings = Settings::default();
        let result = settings.set("max_alternatives", "9");
        assert!(matches!(result, Err(Error::InvalidSettingValue { .. })));
        assert_eq!(settings.max_alternatives, 3);
    }

    #[test]
    fn test_set_rejects_bad_flag() {
        let mut settings = Settings::default();
        let result = settings.set("simple_mode", "sometimes");
        let Err(Error::InvalidSettingValue { accepted, .. }) = result else {
            panic!("expected invalid value");
        };
        assert_eq!(accepted, "true, false");
    }

    #[test]
    fn test_unknown_key_suggests_close_matches() {
        let result = find_spec("explanations");
        let Err(Error::UnknownSetting { suggestions, .. }) = result else {
            panic!("expected unknown setting");
        };
        assert_eq!(suggestions.first().map(String::as_str), Some("show_explanations"));
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("model = claude-x").unwrap(),
            ("model".to_string(), "claude-x".to_string())
        );
        assert!(matches!(
            parse_assignment("model"),
            Err(Error::InvalidAssignment(_))
        ));
        assert!(matches!(
            parse_assignment("=true"),
            Err(Error::InvalidAssignment(_))
        ));
    }

    #[test]
    fn test_validate_catches_hand_edited_values() {
        let settings = Settings {
            max_alternatives: 12,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
