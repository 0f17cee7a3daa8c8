use std::sync::Arc;

use privreview_core::controller::{ControllerOptions, WizardController, WizardPosition};
use privreview_core::location::MemoryLocation;
use privreview_core::signals::{
    CookiePrimarySetting, ExternalSnapshot, ManualSignalSource, SignalName, SignalUpdate,
};
use privreview_core::step::StepRegistry;
use privreview_core::watcher::ExternalStateWatcher;
use privreview_core::welcome::{MemoryWelcomeFlag, WelcomeFlag};

/// Controller wired to in-memory collaborators that tests can poke.
pub struct Harness {
    pub wizard: WizardController,
    pub settings: Arc<ManualSignalSource>,
    pub welcome: Arc<MemoryWelcomeFlag>,
    pub location: Arc<MemoryLocation>,
}

impl Harness {
    pub fn new(sync_enabled: bool, cookies: CookiePrimarySetting, show_welcome: bool) -> Self {
        Self::with_location(sync_enabled, cookies, show_welcome, None)
    }

    pub fn with_location(
        sync_enabled: bool,
        cookies: CookiePrimarySetting,
        show_welcome: bool,
        query: Option<&str>,
    ) -> Self {
        let snapshot = ExternalSnapshot {
            sync_enabled,
            cookie_primary_setting: cookies,
            show_welcome_card: show_welcome,
        };
        let settings = Arc::new(ManualSignalSource::new(snapshot));
        let welcome = Arc::new(MemoryWelcomeFlag::new(show_welcome));
        let location = Arc::new(MemoryLocation::new(query));

        let wizard = WizardController::new(
            StepRegistry::privacy_review(),
            ExternalStateWatcher::new(snapshot),
            Arc::clone(&welcome) as Arc<dyn WelcomeFlag>,
            location.clone(),
            ControllerOptions {
                strict_invariants: true,
            },
        );
        wizard
            .watch(
                settings.as_ref(),
                &[SignalName::SyncEnabled, SignalName::CookiePrimarySetting],
            )
            .expect("watch settings");
        wizard
            .watch(welcome.as_ref(), &[SignalName::ShowWelcomeCard])
            .expect("watch welcome flag");

        Self {
            wizard,
            settings,
            welcome,
            location,
        }
    }

    pub fn set(&self, update: SignalUpdate) {
        self.settings.set(update);
    }

    pub fn current(&self) -> String {
        match self.wizard.position() {
            WizardPosition::Active(step) => step,
            other => panic!("expected an active step, found {other:?}"),
        }
    }
}
