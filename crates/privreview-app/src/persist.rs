use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use privreview_core::location::StepLocation;
use privreview_core::signals::{
    ExternalSnapshot, ManualSignalSource, SignalCallback, SignalName, SignalSource, SignalUpdate,
};
use privreview_core::state::{load_state, update_state};
use privreview_core::welcome::WelcomeFlag;
use tracing::debug;

/// `show_welcome_card` backed by the state file. Writes are also published as
/// a signal so a running wizard sees the flag change.
pub struct PersistedWelcomeFlag {
    path: PathBuf,
    source: ManualSignalSource,
}

impl PersistedWelcomeFlag {
    pub fn open(path: &Path) -> Result<Self> {
        let state = load_state(path)
            .with_context(|| format!("failed to load wizard state at {}", path.display()))?;
        let initial = ExternalSnapshot {
            show_welcome_card: state.show_welcome_card,
            ..ExternalSnapshot::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            source: ManualSignalSource::new(initial),
        })
    }
}

impl WelcomeFlag for PersistedWelcomeFlag {
    fn get(&self) -> Result<bool> {
        let state = load_state(&self.path)
            .with_context(|| format!("failed to load wizard state at {}", self.path.display()))?;
        Ok(state.show_welcome_card)
    }

    fn set(&self, value: bool) -> Result<()> {
        update_state(&self.path, |state| state.show_welcome_card = value)
            .with_context(|| format!("failed to save wizard state at {}", self.path.display()))?;
        debug!(value, "saved show_welcome_card");
        self.source.set(SignalUpdate::ShowWelcomeCard(value));
        Ok(())
    }
}

impl SignalSource for PersistedWelcomeFlag {
    fn subscribe(&self, signal: SignalName, callback: SignalCallback) -> Result<()> {
        if signal != SignalName::ShowWelcomeCard {
            anyhow::bail!("wizard state does not provide signal '{signal}'");
        }
        self.source.subscribe(signal, callback)
    }
}

/// Step location saved in the state file. An explicit query (from `--step`)
/// shadows the saved one until the wizard writes its first location.
pub struct PersistedLocation {
    path: PathBuf,
    incoming: Mutex<Option<String>>,
}

impl PersistedLocation {
    pub fn new(path: &Path, incoming: Option<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            incoming: Mutex::new(incoming),
        }
    }

    /// Forgets the saved location so the next run starts from the default step.
    pub fn clear(&self) -> Result<()> {
        self.incoming
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        update_state(&self.path, |state| state.location_query = None)
            .with_context(|| format!("failed to save wizard state at {}", self.path.display()))?;
        Ok(())
    }
}

impl StepLocation for PersistedLocation {
    fn read(&self) -> Result<Option<String>> {
        if let Some(query) = self
            .incoming
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Ok(Some(query));
        }

        let state = load_state(&self.path)
            .with_context(|| format!("failed to load wizard state at {}", self.path.display()))?;
        Ok(state.location_query)
    }

    fn write(&self, query: &str) -> Result<()> {
        self.incoming
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let state = load_state(&self.path)
            .with_context(|| format!("failed to load wizard state at {}", self.path.display()))?;
        if state.location_query.as_deref() == Some(query) {
            return Ok(());
        }

        update_state(&self.path, |state| {
            state.location_query = Some(query.to_string())
        })
        .with_context(|| format!("failed to save wizard state at {}", self.path.display()))?;
        debug!(query, "saved step location");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use privreview_core::state::state_path;

    use super::*;

    #[test]
    fn welcome_flag_persists_and_notifies() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = state_path(dir.path());
        let flag = PersistedWelcomeFlag::open(&path).expect("open");
        assert!(flag.get().expect("default flag"));

        let notified = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&notified);
        flag.subscribe(
            SignalName::ShowWelcomeCard,
            Box::new(move |update: SignalUpdate| {
                seen.store(update == SignalUpdate::ShowWelcomeCard(false), Ordering::SeqCst);
            }),
        )
        .expect("subscribe");

        flag.set(false).expect("clear flag");
        assert!(notified.load(Ordering::SeqCst));

        let reopened = PersistedWelcomeFlag::open(&path).expect("reopen");
        assert!(!reopened.get().expect("saved flag"));
    }

    #[test]
    fn incoming_query_shadows_saved_location_until_first_write() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = state_path(dir.path());
        update_state(&path, |state| {
            state.location_query = Some("step=msbb".to_string())
        })
        .expect("seed state");

        let location = PersistedLocation::new(&path, Some("step=cookies".to_string()));
        assert_eq!(
            location.read().expect("read"),
            Some("step=cookies".to_string())
        );

        location.write("step=clearOnExit").expect("write");
        assert_eq!(
            location.read().expect("read"),
            Some("step=clearOnExit".to_string())
        );
        assert_eq!(
            load_state(&path).expect("state").location_query.as_deref(),
            Some("step=clearOnExit")
        );

        location.clear().expect("clear");
        assert_eq!(location.read().expect("read"), None);
    }
}
