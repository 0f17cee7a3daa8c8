use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::error::WizardError;
use crate::indicator::{StepIndicator, compute_indicator};
use crate::location::{self, Decoded, StepLocation};
use crate::navigation::NavigationStore;
use crate::signals::{ExternalSnapshot, SignalName, SignalSource};
use crate::step::{Step, StepKind, StepRegistry};
use crate::watcher::ExternalStateWatcher;
use crate::welcome::WelcomeFlag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// `next` from the completion step.
    Completed,
    /// `back` with no valid history left.
    BackAtRoot,
    /// The host tore the wizard down.
    Dismissed,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::BackAtRoot => write!(f, "back-at-root"),
            Self::Dismissed => write!(f, "dismissed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardPosition {
    NotStarted,
    Active(String),
    Exited(ExitReason),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Surface invariant violations as errors instead of re-resolving.
    pub strict_invariants: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Start,
    Next,
    Back,
    NavigateTo(String),
    NavigateToLocation(Option<String>),
    ExternalChange(ExternalSnapshot),
    Dismiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommitMode {
    Push,
    Restore,
}

/// Drives the wizard: resolves the initial step, validates every move against
/// the step predicates, and keeps history, location and indicator in step.
///
/// Commands are applied one at a time from a queue. Snapshots published by the
/// watcher while a command is being applied are queued behind it, never
/// interleaved with it.
pub struct WizardController {
    registry: StepRegistry,
    store: NavigationStore,
    watcher: ExternalStateWatcher,
    snapshot: ExternalSnapshot,
    welcome: Arc<dyn WelcomeFlag>,
    location: Arc<dyn StepLocation>,
    options: ControllerOptions,
    indicator: StepIndicator,
    exited: Option<ExitReason>,
    pending: VecDeque<Command>,
}

impl WizardController {
    pub fn new(
        registry: StepRegistry,
        watcher: ExternalStateWatcher,
        welcome: Arc<dyn WelcomeFlag>,
        location: Arc<dyn StepLocation>,
        options: ControllerOptions,
    ) -> Self {
        let snapshot = watcher.snapshot();
        Self {
            registry,
            store: NavigationStore::new(),
            watcher,
            snapshot,
            welcome,
            location,
            options,
            indicator: StepIndicator::default(),
            exited: None,
            pending: VecDeque::new(),
        }
    }

    pub fn watch(&self, source: &dyn SignalSource, signals: &[SignalName]) -> anyhow::Result<()> {
        self.watcher.watch_all(source, signals)
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn snapshot(&self) -> ExternalSnapshot {
        self.snapshot
    }

    pub fn indicator(&self) -> StepIndicator {
        self.indicator
    }

    pub fn history(&self) -> &[String] {
        self.store.history()
    }

    pub fn position(&self) -> WizardPosition {
        if let Some(reason) = self.exited {
            return WizardPosition::Exited(reason);
        }
        match self.store.current() {
            Some(id) => WizardPosition::Active(id.to_string()),
            None => WizardPosition::NotStarted,
        }
    }

    pub fn current_step(&self) -> Option<&Step> {
        if self.exited.is_some() {
            return None;
        }
        self.store
            .current()
            .and_then(|id| self.registry.step_by_id(id).ok())
    }

    pub fn start(&mut self) -> Result<(), WizardError> {
        self.dispatch(Command::Start)
    }

    pub fn next(&mut self) -> Result<(), WizardError> {
        self.dispatch(Command::Next)
    }

    pub fn back(&mut self) -> Result<(), WizardError> {
        self.dispatch(Command::Back)
    }

    /// Explicit jump. Unknown ids fail and leave the wizard untouched.
    pub fn navigate_to(&mut self, step_id: &str) -> Result<(), WizardError> {
        self.dispatch(Command::NavigateTo(step_id.to_string()))
    }

    /// Jump driven by a changed location. Bad values resolve to the default
    /// step instead of failing.
    pub fn navigate_to_location(&mut self, query: Option<&str>) -> Result<(), WizardError> {
        self.dispatch(Command::NavigateToLocation(query.map(str::to_string)))
    }

    /// Reports a new external snapshot. It goes through the watcher so later
    /// signal updates build on it.
    pub fn on_external_change(&mut self, snapshot: ExternalSnapshot) -> Result<(), WizardError> {
        self.watcher.publish(snapshot);
        self.tick().map(|_| ())
    }

    pub fn dismiss(&mut self) -> Result<(), WizardError> {
        self.dispatch(Command::Dismiss)
    }

    /// Applies external changes published since the last command. Returns
    /// whether a new snapshot was observed.
    pub fn tick(&mut self) -> Result<bool, WizardError> {
        let Some(snapshot) = self.watcher.drain() else {
            return Ok(false);
        };
        self.dispatch(Command::ExternalChange(snapshot))?;
        Ok(true)
    }

    fn dispatch(&mut self, command: Command) -> Result<(), WizardError> {
        // A stale displayed step is corrected before the command runs.
        if let Some(snapshot) = self.watcher.drain() {
            self.pending.push_back(Command::ExternalChange(snapshot));
        }
        self.pending.push_back(command);

        let mut first_error = None;
        while let Some(command) = self.pending.pop_front() {
            debug!(?command, "applying wizard command");
            if let Err(error) = self.apply(command)
                && first_error.is_none()
            {
                first_error = Some(error);
            }

            if let Some(snapshot) = self.watcher.drain() {
                self.pending.push_back(Command::ExternalChange(snapshot));
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn apply(&mut self, command: Command) -> Result<(), WizardError> {
        match command {
            Command::Start => self.apply_start(),
            Command::Next => self.apply_next(),
            Command::Back => self.apply_back(),
            Command::NavigateTo(step_id) => self.apply_navigate_to(&step_id),
            Command::NavigateToLocation(query) => self.apply_navigate_to_location(query.as_deref()),
            Command::ExternalChange(snapshot) => self.apply_external_change(snapshot),
            Command::Dismiss => {
                self.exit(ExitReason::Dismissed);
                self.store.reset();
                Ok(())
            }
        }
    }

    fn apply_start(&mut self) -> Result<(), WizardError> {
        if self.exited.take().is_some() {
            self.store.reset();
        }

        let show_welcome = self.read_welcome_flag()?;
        let query = self
            .location
            .read()
            .map_err(|source| WizardError::collaborator("failed to read step location", source))?;
        let param = query.as_deref().and_then(location::step_param);

        let target = self.resolve_initial(param.as_deref(), show_welcome);
        info!(step = %target, show_welcome, "starting wizard");
        self.commit(&target, CommitMode::Push)
    }

    fn apply_next(&mut self) -> Result<(), WizardError> {
        let current = self.require_current()?;
        let step = *self.registry.step_by_id(&current)?;

        if step.kind == StepKind::Completion {
            self.exit(ExitReason::Completed);
            return Ok(());
        }

        let target = self
            .registry
            .next_available_after(&current, &self.snapshot)?
            .id;
        debug!(from = %current, to = target, "next");
        self.commit(target, CommitMode::Push)
    }

    fn apply_back(&mut self) -> Result<(), WizardError> {
        let current = self.require_current()?;

        loop {
            let previous = match self.store.pop_history() {
                Ok(previous) => previous,
                Err(WizardError::EmptyHistory) => {
                    self.exit(ExitReason::BackAtRoot);
                    return Ok(());
                }
                Err(error) => return Err(error),
            };

            if previous == current {
                continue;
            }

            if let Err(error) = self.registry.step_by_id(&previous) {
                warn!(%error, "dropping unknown history entry");
                continue;
            }
            if !self.is_available(&previous) {
                debug!(step = %previous, "skipping history entry that is no longer valid");
                continue;
            }

            debug!(from = %current, to = %previous, "back");
            return self.commit(&previous, CommitMode::Restore);
        }
    }

    fn apply_navigate_to(&mut self, step_id: &str) -> Result<(), WizardError> {
        let step = *self.registry.step_by_id(step_id)?;
        if step.is_available(&self.snapshot) {
            debug!(to = step.id, "navigate");
            return self.commit(step.id, CommitMode::Push);
        }

        let show_welcome = self.read_welcome_flag()?;
        let target = self.resolve_initial(None, show_welcome);
        debug!(requested = step.id, to = %target, "requested step is unreachable");
        self.commit(&target, CommitMode::Push)
    }

    fn apply_navigate_to_location(&mut self, query: Option<&str>) -> Result<(), WizardError> {
        let param = query.and_then(location::step_param);
        let show_welcome = self.read_welcome_flag()?;
        let target = self.resolve_initial(param.as_deref(), show_welcome);
        self.commit(&target, CommitMode::Push)
    }

    fn apply_external_change(&mut self, snapshot: ExternalSnapshot) -> Result<(), WizardError> {
        self.snapshot = snapshot;

        if self.exited.is_some() {
            return Ok(());
        }
        let Some(current) = self.store.current().map(str::to_string) else {
            return Ok(());
        };

        if self.is_available(&current) {
            self.refresh(&current)?;
            return Ok(());
        }

        // Earlier steps were already passed, so invalidation only moves forward.
        let target = self
            .registry
            .next_available_after(&current, &self.snapshot)?
            .id;
        info!(from = %current, to = target, "current step became unavailable; skipping forward");
        self.commit(target, CommitMode::Push)
    }

    /// Initial-step resolution shared by start, unreachable jumps and
    /// location changes.
    fn resolve_initial(&self, param: Option<&str>, show_welcome: bool) -> String {
        if let Decoded::Step(step_id) = location::decode(&self.registry, param, &self.snapshot) {
            if self.is_available(&step_id) {
                return step_id;
            }
            debug!(step = %step_id, "step parameter names an unreachable step");
        }

        if show_welcome
            && let Some(welcome) = self.registry.welcome()
            && welcome.is_available(&self.snapshot)
        {
            return welcome.id.to_string();
        }

        self.first_substantive().id.to_string()
    }

    fn first_substantive(&self) -> &Step {
        self.registry
            .steps_in_order()
            .iter()
            .filter(|step| step.kind != StepKind::Welcome)
            .find(|step| step.is_available(&self.snapshot))
            .unwrap_or_else(|| self.registry.completion())
    }

    fn commit(&mut self, step_id: &str, mode: CommitMode) -> Result<(), WizardError> {
        if self.is_available(step_id) {
            return self.commit_unchecked(step_id, mode);
        }

        let error = WizardError::InvalidStepState {
            id: step_id.to_string(),
        };
        if self.options.strict_invariants {
            return Err(error);
        }

        error!(%error, "re-resolving wizard position");
        let show_welcome = self.read_welcome_flag()?;
        let target = self.resolve_initial(None, show_welcome);
        if !self.is_available(&target) {
            error!(step = %target, "fallback step is unavailable as well");
        }
        self.commit_unchecked(&target, CommitMode::Push)
    }

    fn commit_unchecked(&mut self, step_id: &str, mode: CommitMode) -> Result<(), WizardError> {
        let leaving_welcome = self.store.current().is_some_and(|current| {
            current != step_id
                && self
                    .registry
                    .step_by_id(current)
                    .is_ok_and(|step| step.kind == StepKind::Welcome)
        });

        match mode {
            CommitMode::Push => self.store.set_current(step_id),
            CommitMode::Restore => self.store.restore(step_id),
        }
        self.exited = None;
        self.refresh(step_id)?;

        // Welcome is shown once per flag lifetime, however it is left.
        if leaving_welcome {
            self.clear_welcome_flag()?;
        }
        Ok(())
    }

    /// Writes the location and recomputes the indicator for `step_id`.
    fn refresh(&mut self, step_id: &str) -> Result<(), WizardError> {
        self.location
            .write(&location::encode(step_id))
            .map_err(|source| WizardError::collaborator("failed to write step location", source))?;
        self.indicator = compute_indicator(&self.registry, step_id, &self.snapshot);
        Ok(())
    }

    fn exit(&mut self, reason: ExitReason) {
        info!(%reason, "wizard exited");
        self.exited = Some(reason);
    }

    fn require_current(&self) -> Result<String, WizardError> {
        if self.exited.is_some() {
            return Err(WizardError::Exited);
        }
        self.store
            .current()
            .map(str::to_string)
            .ok_or(WizardError::NotStarted)
    }

    fn is_available(&self, step_id: &str) -> bool {
        self.registry
            .step_by_id(step_id)
            .map(|step| step.is_available(&self.snapshot))
            .unwrap_or(false)
    }

    fn read_welcome_flag(&self) -> Result<bool, WizardError> {
        self.welcome.get().map_err(|source| {
            WizardError::collaborator("failed to read welcome preference", source)
        })
    }

    fn clear_welcome_flag(&self) -> Result<(), WizardError> {
        if !self.read_welcome_flag()? {
            return Ok(());
        }
        self.welcome.set(false).map_err(|source| {
            WizardError::collaborator("failed to clear welcome preference", source)
        })
    }
}
