use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, warn};

use crate::signals::{ALL_SIGNALS, ExternalSnapshot, SignalName, SignalSource, SignalUpdate};

/// Observes external signals and publishes coalesced snapshots.
///
/// Subscription callbacks only enqueue updates. `drain` applies everything
/// queued so far in one step, so any number of signals changing within one
/// synchronous update surfaces as a single snapshot.
pub struct ExternalStateWatcher {
    snapshot: ExternalSnapshot,
    sender: Sender<SignalUpdate>,
    receiver: Receiver<SignalUpdate>,
}

impl ExternalStateWatcher {
    pub fn new(initial: ExternalSnapshot) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            snapshot: initial,
            sender,
            receiver,
        }
    }

    pub fn snapshot(&self) -> ExternalSnapshot {
        self.snapshot
    }

    /// Registers one callback for `signal` on `source`.
    pub fn watch(&self, source: &dyn SignalSource, signal: SignalName) -> anyhow::Result<()> {
        let sender = self.sender.clone();
        source.subscribe(
            signal,
            Box::new(move |update: SignalUpdate| {
                if update.name() != signal {
                    warn!(
                        expected = %signal,
                        received = %update.name(),
                        "ignoring update delivered to the wrong signal subscription"
                    );
                    return;
                }
                // The watcher may already be gone when a collaborator outlives it.
                let _ = sender.send(update);
            }),
        )
    }

    pub fn watch_all(
        &self,
        source: &dyn SignalSource,
        signals: &[SignalName],
    ) -> anyhow::Result<()> {
        for signal in signals {
            self.watch(source, *signal)?;
        }
        Ok(())
    }

    /// Queues every value of `snapshot` as if its sources had reported them.
    /// The next `drain` publishes it, coalesced with anything already pending.
    pub fn publish(&self, snapshot: ExternalSnapshot) {
        for signal in ALL_SIGNALS {
            let _ = self.sender.send(snapshot.value_of(signal));
        }
    }

    /// Applies all queued updates and returns the new snapshot when anything
    /// changed.
    pub fn drain(&mut self) -> Option<ExternalSnapshot> {
        let mut next = self.snapshot;
        let mut applied = 0usize;

        // The watcher keeps its own sender, so the channel never disconnects.
        while let Ok(update) = self.receiver.try_recv() {
            next.apply(update);
            applied += 1;
        }

        if next == self.snapshot {
            if applied > 0 {
                debug!(applied, "external signal updates left the snapshot unchanged");
            }
            return None;
        }

        debug!(applied, ?next, "publishing external snapshot");
        self.snapshot = next;
        Some(next)
    }
}
