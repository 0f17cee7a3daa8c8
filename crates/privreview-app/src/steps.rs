use anyhow::{Context, Result};
use privreview_core::signals::{CookiePrimarySetting, ExternalSnapshot};
use privreview_core::state::{load_state, state_path};
use privreview_core::step::{StepKind, StepRegistry};

use crate::App;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalOverrides {
    pub sync_enabled: Option<bool>,
    pub cookie_primary_setting: Option<CookiePrimarySetting>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRow {
    pub order: u32,
    pub id: &'static str,
    pub kind: &'static str,
    pub counted: bool,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepsResult {
    pub snapshot: ExternalSnapshot,
    pub rows: Vec<StepRow>,
}

impl App {
    pub fn steps(&self, overrides: SignalOverrides) -> Result<StepsResult> {
        let config = self.load_config()?;
        let path = state_path(&self.config_dir);
        let state = load_state(&path)
            .with_context(|| format!("failed to load wizard state at {}", path.display()))?;

        let mut snapshot = config.initial_snapshot(state.show_welcome_card);
        if let Some(enabled) = overrides.sync_enabled {
            snapshot.sync_enabled = enabled;
        }
        if let Some(setting) = overrides.cookie_primary_setting {
            snapshot.cookie_primary_setting = setting;
        }

        let rows = StepRegistry::privacy_review()
            .steps_in_order()
            .iter()
            .map(|step| StepRow {
                order: step.order,
                id: step.id,
                kind: match step.kind {
                    StepKind::Welcome => "welcome",
                    StepKind::Setting => "setting",
                    StepKind::Completion => "completion",
                },
                counted: step.counts_in_indicator,
                available: step.is_available(&snapshot),
            })
            .collect();

        Ok(StepsResult { snapshot, rows })
    }
}
