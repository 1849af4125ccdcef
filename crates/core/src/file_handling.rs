//! Reading and writing the settings and history YAML files.
//!
//! A missing file is never an error: settings fall back to their defaults and
//! history starts empty. Writes create the parent directory first.

use std::fs::{self, File};
use std::path::Path;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::history::CommandHistory;

fn get_reader(file_description: &str, path: &str) -> Result<File> {
    File::open(path).map_err(|e| Error::io_error(file_description.to_string(), path.to_string(), e))
}

fn read_optional<T: DeserializeOwned>(file_description: &str, path: &str) -> Result<Option<T>> {
    if !Path::new(path).exists() {
        debug!("No {file_description} file at `{path}`");
        return Ok(None);
    }

    let reader = get_reader(file_description, path)?;
    if reader.metadata().map(|m| m.len() == 0).unwrap_or(false) {
        return Ok(None);
    }

    // This can't be shortcut with ? as serde_yaml's error needs its context attached
    let parsed: serde_yaml::Result<T> = serde_yaml::from_reader(reader);

    match parsed {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => Err(Error::yaml_error(
            "reading".to_string(),
            file_description.to_string(),
            path.to_string(),
            e,
        )),
    }
}

fn write_yaml<T: Serialize>(file_description: &str, path: &str, value: &T) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::io_error(file_description.to_string(), path.to_string(), e)
            })?;
        }
    }

    let f = File::create(path)
        .map_err(|e| Error::io_error(file_description.to_string(), path.to_string(), e))?;

    serde_yaml::to_writer(f, value).map_err(|e| {
        Error::yaml_error(
            "writing".to_string(),
            file_description.to_string(),
            path.to_string(),
            e,
        )
    })
}

/// Loads settings from `config_path`, or the defaults if the file does not exist.
///
/// # Errors
///
/// Returns an error if:
/// - The file exists but cannot be read
/// - The file contains invalid YAML or values of the wrong type
/// - A numeric value is outside its accepted range
pub fn load_settings(config_path: &str) -> Result<Settings> {
    let settings = read_optional::<Settings>("settings", config_path)?.unwrap_or_default();
    settings.validate()?;
    Ok(settings)
}

/// Writes `settings` to `config_path`, creating the directory if needed.
///
/// # Errors
///
/// Returns an error if the file cannot be created or serialization fails.
pub fn save_settings(config_path: &str, settings: &Settings) -> Result<()> {
    write_yaml("settings", config_path, settings)
}

/// Loads the command history, or an empty one if the file does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_history(history_path: &str) -> Result<CommandHistory> {
    Ok(read_optional::<CommandHistory>("history", history_path)?
        .map(|history| CommandHistory::new(history.entries().to_vec()))
        .unwrap_or_default())
}

/// Writes the command history to `history_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or serialization fails.
pub fn save_history(history_path: &str, history: &CommandHistory) -> Result<()> {
    write_yaml("history", history_path, history)
}
