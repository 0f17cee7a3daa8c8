use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

const STATE_VERSION: i64 = 1;

/// Wizard state that outlives a single run: the welcome preference and the
/// last written step location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    pub show_welcome_card: bool,
    pub location_query: Option<String>,
    pub updated_at: Option<String>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            show_welcome_card: true,
            location_query: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read state at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse state at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to write state at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize state: {0}")]
    Serialize(toml::ser::Error),
    #[error("failed to format timestamp: {0}")]
    Timestamp(time::error::Format),
    #[error("{message}")]
    InvalidSchema { message: String },
}

pub fn state_path(config_dir: &Path) -> PathBuf {
    config_dir.join("state.toml")
}

/// Loads the state file, returning defaults when it does not exist yet.
pub fn load_state(path: &Path) -> Result<WizardState, StateError> {
    if !path.exists() {
        return Ok(WizardState::default());
    }

    let raw = fs::read_to_string(path).map_err(|source| StateError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let value: toml::Value = toml::from_str(&raw).map_err(|source| StateError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_state_schema(&value)?;

    let parsed: StateFile = value.try_into().map_err(|source| StateError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parsed.into())
}

/// Writes `state` with a fresh `updated_at`, replacing the file atomically.
pub fn save_state(path: &Path, state: &WizardState) -> Result<WizardState, StateError> {
    let mut saved = state.clone();
    saved.updated_at = Some(
        OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(StateError::Timestamp)?,
    );

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StateError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let serialized = toml::to_string(&StateFile::from(&saved)).map_err(StateError::Serialize)?;
    let temp_path = path.with_extension("toml.tmp");

    fs::write(&temp_path, serialized).map_err(|source| StateError::Write {
        path: temp_path.clone(),
        source,
    })?;

    fs::rename(&temp_path, path).map_err(|source| StateError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(saved)
}

/// Loads, applies `change`, and saves in one step.
pub fn update_state(
    path: &Path,
    change: impl FnOnce(&mut WizardState),
) -> Result<WizardState, StateError> {
    let mut state = load_state(path)?;
    change(&mut state);
    save_state(path, &state)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StateFile {
    version: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
    #[serde(default)]
    prefs: StatePrefs,
    #[serde(default)]
    location: StateLocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StatePrefs {
    #[serde(default = "show_welcome_by_default")]
    show_welcome_card: bool,
}

impl Default for StatePrefs {
    fn default() -> Self {
        Self {
            show_welcome_card: show_welcome_by_default(),
        }
    }
}

fn show_welcome_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StateLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    query: Option<String>,
}

impl From<&WizardState> for StateFile {
    fn from(state: &WizardState) -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: state.updated_at.clone(),
            prefs: StatePrefs {
                show_welcome_card: state.show_welcome_card,
            },
            location: StateLocation {
                query: state.location_query.clone(),
            },
        }
    }
}

impl From<StateFile> for WizardState {
    fn from(file: StateFile) -> Self {
        Self {
            show_welcome_card: file.prefs.show_welcome_card,
            location_query: file.location.query,
            updated_at: file.updated_at,
        }
    }
}

fn validate_state_schema(value: &toml::Value) -> Result<(), StateError> {
    let Some(root) = value.as_table() else {
        return Err(schema_error(
            "invalid state file: missing required top-level field 'version'",
        ));
    };

    match root.get("version").map(toml::Value::as_integer) {
        None => {
            return Err(schema_error(
                "invalid state file: missing required top-level field 'version'",
            ));
        }
        Some(Some(STATE_VERSION)) => {}
        Some(Some(found)) => {
            return Err(schema_error(format!(
                "invalid state file: unsupported version (expected {STATE_VERSION}, found {found})"
            )));
        }
        Some(None) => {
            return Err(schema_error(
                "invalid state file: unsupported version (expected integer)",
            ));
        }
    }

    for section in ["prefs", "location"] {
        if root.get(section).is_some_and(|value| !value.is_table()) {
            return Err(schema_error(format!(
                "invalid state file: [{section}] must be a table"
            )));
        }
    }

    Ok(())
}

fn schema_error(message: impl Into<String>) -> StateError {
    StateError::InvalidSchema {
        message: message.into(),
    }
}
