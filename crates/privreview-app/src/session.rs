use std::sync::Arc;

use anyhow::{Context, Result};
use privreview_core::controller::{
    ControllerOptions, ExitReason, WizardController, WizardPosition,
};
use privreview_core::indicator::StepIndicator;
use privreview_core::location::StepLocation;
use privreview_core::signals::{
    CookiePrimarySetting, ExternalSnapshot, ManualSignalSource, SignalName, SignalUpdate,
};
use privreview_core::state::state_path;
use privreview_core::step::{Step, StepRegistry};
use privreview_core::watcher::ExternalStateWatcher;
use privreview_core::welcome::WelcomeFlag;
use tracing::info;

use crate::App;
use crate::persist::{PersistedLocation, PersistedWelcomeFlag};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRequest {
    /// Step id to open, as if the location carried `step=<id>`.
    pub step: Option<String>,
}

/// Everything a host needs to draw the wizard.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub position: WizardPosition,
    pub step: Option<Step>,
    pub indicator: StepIndicator,
    pub snapshot: ExternalSnapshot,
    pub location: Option<String>,
}

/// One wizard run against the persisted state. Sync and cookie settings are
/// owned by an in-process source seeded from config.
pub struct WizardSession {
    controller: WizardController,
    settings: Arc<ManualSignalSource>,
    location: Arc<PersistedLocation>,
}

impl App {
    pub fn open_session(&self, request: SessionRequest) -> Result<WizardSession> {
        let config = self.load_config()?;
        let state_path = state_path(&self.config_dir);

        let welcome = Arc::new(PersistedWelcomeFlag::open(&state_path)?);
        let incoming = request
            .step
            .as_deref()
            .map(privreview_core::location::encode);
        let location = Arc::new(PersistedLocation::new(&state_path, incoming));

        let snapshot = config.initial_snapshot(welcome.get()?);
        let settings = Arc::new(ManualSignalSource::new(snapshot));

        let controller = WizardController::new(
            StepRegistry::privacy_review(),
            ExternalStateWatcher::new(snapshot),
            Arc::clone(&welcome) as Arc<dyn WelcomeFlag>,
            Arc::clone(&location) as Arc<dyn StepLocation>,
            ControllerOptions {
                strict_invariants: config.wizard.strict_invariants,
            },
        );
        controller
            .watch(
                settings.as_ref(),
                &[SignalName::SyncEnabled, SignalName::CookiePrimarySetting],
            )
            .context("failed to watch settings signals")?;
        controller
            .watch(welcome.as_ref(), &[SignalName::ShowWelcomeCard])
            .context("failed to watch welcome preference")?;

        Ok(WizardSession {
            controller,
            settings,
            location,
        })
    }
}

impl WizardSession {
    pub fn start(&mut self) -> Result<()> {
        self.controller.start().context("failed to start wizard")
    }

    pub fn next(&mut self) -> Result<()> {
        self.controller.next().context("failed to advance wizard")?;
        self.forget_finished_run()
    }

    pub fn back(&mut self) -> Result<()> {
        self.controller.back().context("failed to go back")?;
        self.forget_finished_run()
    }

    pub fn navigate_to(&mut self, step_id: &str) -> Result<()> {
        self.controller
            .navigate_to(step_id)
            .with_context(|| format!("failed to open step '{step_id}'"))
    }

    pub fn dismiss(&mut self) -> Result<()> {
        self.controller.dismiss().context("failed to dismiss wizard")
    }

    /// Applies pending external changes. Returns whether anything changed.
    pub fn tick(&mut self) -> Result<bool> {
        self.controller
            .tick()
            .context("failed to apply external changes")
    }

    pub fn set_sync(&mut self, enabled: bool) -> Result<()> {
        info!(enabled, "sync setting changed");
        self.settings.set(SignalUpdate::SyncEnabled(enabled));
        self.tick().map(|_| ())
    }

    pub fn toggle_sync(&mut self) -> Result<()> {
        let enabled = !self.settings.current().sync_enabled;
        self.set_sync(enabled)
    }

    pub fn set_cookies(&mut self, setting: CookiePrimarySetting) -> Result<()> {
        info!(%setting, "cookie setting changed");
        self.settings
            .set(SignalUpdate::CookiePrimarySetting(setting));
        self.tick().map(|_| ())
    }

    pub fn cycle_cookies(&mut self) -> Result<()> {
        let setting = self.settings.current().cookie_primary_setting.cycled();
        self.set_cookies(setting)
    }

    pub fn position(&self) -> WizardPosition {
        self.controller.position()
    }

    pub fn view(&self) -> Result<SessionView> {
        Ok(SessionView {
            position: self.controller.position(),
            step: self.controller.current_step().copied(),
            indicator: self.controller.indicator(),
            snapshot: self.controller.snapshot(),
            location: self.location.read()?,
        })
    }

    /// A run that completed or backed out resumes from the default step next
    /// time. A dismissed run keeps its location.
    fn forget_finished_run(&self) -> Result<()> {
        if let WizardPosition::Exited(ExitReason::Completed | ExitReason::BackAtRoot) =
            self.controller.position()
        {
            self.location.clear()?;
        }
        Ok(())
    }
}
