use crate::signals::{
    ExternalSnapshot, ManualSignalSource, SignalCallback, SignalName, SignalSource, SignalUpdate,
};

/// Persisted "show welcome card" preference.
pub trait WelcomeFlag {
    fn get(&self) -> anyhow::Result<bool>;
    fn set(&self, value: bool) -> anyhow::Result<()>;
}

/// Welcome flag kept in memory. Also a signal source, so a watcher sees the
/// flag being cleared like any other external change.
pub struct MemoryWelcomeFlag {
    source: ManualSignalSource,
}

impl MemoryWelcomeFlag {
    pub fn new(show_welcome_card: bool) -> Self {
        let initial = ExternalSnapshot {
            show_welcome_card,
            ..ExternalSnapshot::default()
        };
        Self {
            source: ManualSignalSource::new(initial),
        }
    }
}

impl WelcomeFlag for MemoryWelcomeFlag {
    fn get(&self) -> anyhow::Result<bool> {
        Ok(self.source.current().show_welcome_card)
    }

    fn set(&self, value: bool) -> anyhow::Result<()> {
        self.source.set(SignalUpdate::ShowWelcomeCard(value));
        Ok(())
    }
}

impl SignalSource for MemoryWelcomeFlag {
    fn subscribe(&self, signal: SignalName, callback: SignalCallback) -> anyhow::Result<()> {
        if signal != SignalName::ShowWelcomeCard {
            anyhow::bail!("welcome preference does not provide signal '{signal}'");
        }
        self.source.subscribe(signal, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_flag_round_trips_value() {
        let flag = MemoryWelcomeFlag::new(true);
        assert!(flag.get().expect("get"));
        flag.set(false).expect("set");
        assert!(!flag.get().expect("get"));
    }

    #[test]
    fn memory_flag_only_provides_welcome_signal() {
        let flag = MemoryWelcomeFlag::new(true);
        let error = flag
            .subscribe(SignalName::SyncEnabled, Box::new(|_: SignalUpdate| {}))
            .expect_err("unsupported signal");
        assert!(error.to_string().contains("sync-enabled"));
    }
}
