use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::signals::{CookiePrimarySetting, ExternalSnapshot};

const CONFIG_VERSION: u32 = 1;
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PrivreviewConfig {
    pub version: u32,
    #[serde(default)]
    pub signals: SignalsConfig,
    #[serde(default)]
    pub wizard: WizardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Initial values of the external signals when no live collaborator exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SignalsConfig {
    #[serde(default)]
    pub sync_enabled: bool,
    #[serde(default)]
    pub cookie_primary_setting: CookiePrimarySetting,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct WizardConfig {
    #[serde(default)]
    pub strict_invariants: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PrivreviewConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            signals: SignalsConfig::default(),
            wizard: WizardConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl PrivreviewConfig {
    /// External snapshot seeded from `[signals]` and the persisted welcome flag.
    pub fn initial_snapshot(&self, show_welcome_card: bool) -> ExternalSnapshot {
        ExternalSnapshot {
            sync_enabled: self.signals.sync_enabled,
            cookie_primary_setting: self.signals.cookie_primary_setting,
            show_welcome_card,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not resolve home directory for config path")]
    HomeDirectoryUnavailable,
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {message}")]
    Validation { message: String },
}

pub fn resolve_config_dir() -> Result<PathBuf, ConfigError> {
    let base_dirs = BaseDirs::new().ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(base_dirs.home_dir().join(".config").join("privreview"))
}

pub fn load_config(path: &Path) -> Result<PrivreviewConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed: PrivreviewConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&parsed)?;
    Ok(parsed)
}

/// A missing file means defaults. Anything present must parse and validate.
pub fn load_config_or_default(path: &Path) -> Result<PrivreviewConfig, ConfigError> {
    if !path.exists() {
        return Ok(PrivreviewConfig::default());
    }
    load_config(path)
}

pub fn validate_config(config: &PrivreviewConfig) -> Result<(), ConfigError> {
    if config.version != CONFIG_VERSION {
        return Err(ConfigError::Validation {
            message: format!("version must be {CONFIG_VERSION}"),
        });
    }

    let level = config.logging.level.trim();
    if !LOG_LEVELS.contains(&level) {
        return Err(ConfigError::Validation {
            message: format!(
                "logging.level '{level}' must be one of: {}",
                LOG_LEVELS.join(", ")
            ),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_config_from_toml(raw: &str) -> Result<PrivreviewConfig, ConfigError> {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        fs::write(file.path(), raw).expect("write temp config");
        load_config(file.path())
    }

    #[test]
    fn accepts_full_config() {
        let raw = r#"
version = 1

[signals]
sync_enabled = true
cookie_primary_setting = "allow-all"

[wizard]
strict_invariants = true

[logging]
level = "debug"
"#;

        let config = load_config_from_toml(raw).expect("valid config");
        assert!(config.signals.sync_enabled);
        assert_eq!(
            config.signals.cookie_primary_setting,
            CookiePrimarySetting::AllowAll
        );
        assert!(config.wizard.strict_invariants);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn sections_are_optional() {
        let config = load_config_from_toml("version = 1\n").expect("valid config");
        assert_eq!(config, PrivreviewConfig::default());

        let snapshot = config.initial_snapshot(false);
        assert!(!snapshot.sync_enabled);
        assert!(!snapshot.show_welcome_card);
        assert_eq!(
            snapshot.cookie_primary_setting,
            CookiePrimarySetting::BlockThirdParty
        );
    }

    #[test]
    fn rejects_unsupported_version() {
        let error = load_config_from_toml("version = 2\n").expect_err("config should fail");
        assert!(error.to_string().contains("version must be 1"));
    }

    #[test]
    fn rejects_unknown_log_level() {
        let raw = r#"
version = 1

[logging]
level = "loud"
"#;
        let error = load_config_from_toml(raw).expect_err("config should fail");
        assert!(error.to_string().contains("logging.level 'loud'"));
    }

    #[test]
    fn rejects_unknown_cookie_setting() {
        let raw = r#"
version = 1

[signals]
cookie_primary_setting = "block-some"
"#;
        let error = load_config_from_toml(raw).expect_err("config should fail");
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config =
            load_config_or_default(&dir.path().join("config.toml")).expect("default config");
        assert_eq!(config, PrivreviewConfig::default());
    }
}
