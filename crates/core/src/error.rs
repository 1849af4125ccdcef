use leon::{ParseError, RenderError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("The command exited with status {}: {}", exit_code(.code), .stderr)]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("Could not start `{}`: {}", .program, .original)]
    Spawn {
        program: String,
        original: std::io::Error,
    },

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    Yaml {
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    },

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("Error parsing prompt template: {}", .0)]
    Parse(#[from] ParseError),

    #[error("Error rendering prompt template: {}", .0)]
    Render(#[from] RenderError),

    #[error("Unknown configuration key `{}`.{}", .key, did_you_mean(.suggestions))]
    UnknownSetting { key: String, suggestions: Vec<String> },

    #[error("Invalid value `{}` for `{}`. Valid values: {}", .value, .key, .accepted)]
    InvalidSettingValue {
        key: String,
        value: String,
        accepted: String,
    },

    #[error("Invalid format `{}`: use `key=value`", .0)]
    InvalidAssignment(String),

    #[error("API key not found. Set the ANTHROPIC_API_KEY environment variable.")]
    MissingApiKey,

    #[error("Could not reach the language model API: {}", .0)]
    Network(String),

    #[error("The language model API rejected the API key (HTTP {})", .0)]
    Authentication(u16),

    #[error("Malformed response from the language model API: {}", .0)]
    MalformedResponse(String),

    #[error("The language model API returned HTTP {}: {}", .status, .body)]
    Api { status: u16, body: String },

    #[error("STDIO error: {}", .0)]
    Stdio(#[from] std::io::Error),

    #[error("Misc error: {}", .0)]
    Misc(String),
}

fn exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
}

fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" Did you mean: {}?", suggestions.join(" | "))
    }
}

impl Error {
    pub fn yaml_error(
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    ) -> Self {
        Self::Yaml {
            action,
            file_description,
            path,
            original,
        }
    }

    pub fn io_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description,
            path,
            original,
        }
    }

    /// True for failures that originate from the language model collaborator.
    pub fn is_model_failure(&self) -> bool {
        matches!(
            self,
            Self::Network(_)
                | Self::Authentication(_)
                | Self::MalformedResponse(_)
                | Self::Api { .. }
                | Self::MissingApiKey
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_setting_lists_suggestions() {
        let error = Error::UnknownSetting {
            key: "modle".to_string(),
            suggestions: vec!["model".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "Unknown configuration key `modle`. Did you mean: model?"
        );
    }

    #[test]
    fn test_unknown_setting_without_suggestions() {
        let error = Error::UnknownSetting {
            key: "zzz".to_string(),
            suggestions: vec![],
        };
        assert_eq!(error.to_string(), "Unknown configuration key `zzz`.");
    }

    #[test]
    fn test_non_zero_exit_message() {
        let error = Error::NonZeroExit {
            code: Some(2),
            stderr: "no such file".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "The command exited with status 2: no such file"
        );
    }

    #[test]
    fn test_model_failure_classification() {
        assert!(Error::Network("timeout".to_string()).is_model_failure());
        assert!(Error::Authentication(401).is_model_failure());
        assert!(!Error::Misc("other".to_string()).is_model_failure());
    }
}
