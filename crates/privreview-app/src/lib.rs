use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use privreview_core::config::{PrivreviewConfig, load_config_or_default, resolve_config_dir};
use privreview_core::doctor::{DoctorReport, run_doctor_in};
use privreview_core::state::{WizardState, state_path, update_state};

mod persist;
mod session;
mod steps;
mod walk;

pub use persist::{PersistedLocation, PersistedWelcomeFlag};
pub use session::{SessionRequest, SessionView, WizardSession};
pub use steps::{SignalOverrides, StepRow, StepsResult};
pub use walk::{WalkAction, WalkActionError, WalkRecord, WalkRequest};

pub struct App {
    config_dir: PathBuf,
}

impl App {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// App rooted at `~/.config/privreview`.
    pub fn from_home() -> Result<Self> {
        let config_dir = resolve_config_dir().context("failed to resolve config directory")?;
        Ok(Self::new(config_dir))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn doctor(&self) -> Result<DoctorReport> {
        Ok(run_doctor_in(&self.config_dir))
    }

    pub fn load_config(&self) -> Result<PrivreviewConfig> {
        let config_path = self.config_dir.join("config.toml");
        load_config_or_default(&config_path).map_err(|error| {
            anyhow!(
                "invalid config at {}: {error}\nFix the config or run `privreview doctor` for details.",
                config_path.display()
            )
        })
    }

    /// Shows the welcome card again and forgets the saved step.
    pub fn reset(&self) -> Result<WizardState> {
        let path = state_path(&self.config_dir);
        update_state(&path, |state| {
            state.show_welcome_card = true;
            state.location_query = None;
        })
        .with_context(|| format!("failed to reset wizard state at {}", path.display()))
    }
}
