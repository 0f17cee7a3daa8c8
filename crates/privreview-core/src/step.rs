use std::collections::HashSet;

use crate::error::WizardError;
use crate::signals::ExternalSnapshot;

pub const WELCOME: &str = "welcome";
pub const MSBB: &str = "msbb";
pub const CLEAR_ON_EXIT: &str = "clearOnExit";
pub const HISTORY_SYNC: &str = "historySync";
pub const COOKIES: &str = "cookies";
pub const COMPLETION: &str = "completion";

pub type StepPredicate = fn(&ExternalSnapshot) -> bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Welcome,
    Setting,
    Completion,
}

#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub id: &'static str,
    pub order: u32,
    pub kind: StepKind,
    pub counts_in_indicator: bool,
    predicate: StepPredicate,
}

impl Step {
    pub const fn new(
        id: &'static str,
        order: u32,
        kind: StepKind,
        counts_in_indicator: bool,
        predicate: StepPredicate,
    ) -> Self {
        Self {
            id,
            order,
            kind,
            counts_in_indicator,
            predicate,
        }
    }

    pub fn is_available(&self, snapshot: &ExternalSnapshot) -> bool {
        (self.predicate)(snapshot)
    }
}

fn always(_: &ExternalSnapshot) -> bool {
    true
}

fn welcome_pending(snapshot: &ExternalSnapshot) -> bool {
    snapshot.show_welcome_card
}

fn sync_enabled(snapshot: &ExternalSnapshot) -> bool {
    snapshot.sync_enabled
}

fn cookies_block_third_party(snapshot: &ExternalSnapshot) -> bool {
    snapshot.cookie_primary_setting.blocks_third_party()
}

const PRIVACY_REVIEW_STEPS: [Step; 6] = [
    Step::new(WELCOME, 0, StepKind::Welcome, false, welcome_pending),
    Step::new(MSBB, 1, StepKind::Setting, true, always),
    Step::new(CLEAR_ON_EXIT, 2, StepKind::Setting, true, always),
    Step::new(HISTORY_SYNC, 3, StepKind::Setting, true, sync_enabled),
    Step::new(COOKIES, 4, StepKind::Setting, true, cookies_block_third_party),
    Step::new(COMPLETION, 5, StepKind::Completion, false, always),
];

/// Ordered, validated catalog of wizard steps.
#[derive(Debug, Clone)]
pub struct StepRegistry {
    steps: Vec<Step>,
}

impl StepRegistry {
    pub fn new(steps: Vec<Step>) -> Result<Self, WizardError> {
        validate_steps(&steps)?;
        Ok(Self { steps })
    }

    pub fn privacy_review() -> Self {
        Self {
            steps: PRIVACY_REVIEW_STEPS.to_vec(),
        }
    }

    pub fn steps_in_order(&self) -> &[Step] {
        &self.steps
    }

    pub fn step_by_id(&self, id: &str) -> Result<&Step, WizardError> {
        self.steps
            .iter()
            .find(|step| step.id == id)
            .ok_or_else(|| WizardError::unknown_step(id))
    }

    pub fn welcome(&self) -> Option<&Step> {
        self.steps
            .iter()
            .find(|step| step.kind == StepKind::Welcome)
    }

    pub fn completion(&self) -> &Step {
        // Construction guarantees a trailing completion step.
        &self.steps[self.steps.len() - 1]
    }

    pub fn first_available(&self, snapshot: &ExternalSnapshot) -> &Step {
        self.steps
            .iter()
            .find(|step| step.is_available(snapshot))
            .unwrap_or_else(|| self.completion())
    }

    /// First step after `id` in registry order whose predicate holds, falling
    /// back to the completion step.
    pub fn next_available_after(
        &self,
        id: &str,
        snapshot: &ExternalSnapshot,
    ) -> Result<&Step, WizardError> {
        let current = self.step_by_id(id)?;
        Ok(self
            .steps
            .iter()
            .filter(|step| step.order > current.order)
            .find(|step| step.is_available(snapshot))
            .unwrap_or_else(|| self.completion()))
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::privacy_review()
    }
}

fn validate_steps(steps: &[Step]) -> Result<(), WizardError> {
    let Some(last) = steps.last() else {
        return Err(registry_error("registry must contain at least one step"));
    };

    if last.kind != StepKind::Completion {
        return Err(registry_error(format!(
            "last step '{}' must be the completion step",
            last.id
        )));
    }

    let mut ids = HashSet::new();
    for (index, step) in steps.iter().enumerate() {
        if step.id.trim().is_empty() {
            return Err(registry_error(format!("step[{index}] id must be non-empty")));
        }

        if !ids.insert(step.id) {
            return Err(registry_error(format!("duplicate step id '{}'", step.id)));
        }

        if index > 0 && step.order <= steps[index - 1].order {
            return Err(registry_error(format!(
                "step '{}' must have a higher order than '{}'",
                step.id,
                steps[index - 1].id
            )));
        }

        match step.kind {
            StepKind::Welcome if index != 0 => {
                return Err(registry_error(format!(
                    "welcome step '{}' must come first",
                    step.id
                )));
            }
            StepKind::Completion if index + 1 != steps.len() => {
                return Err(registry_error(format!(
                    "completion step '{}' must come last",
                    step.id
                )));
            }
            StepKind::Welcome | StepKind::Completion if step.counts_in_indicator => {
                return Err(registry_error(format!(
                    "step '{}' cannot count in the indicator",
                    step.id
                )));
            }
            _ => {}
        }
    }

    Ok(())
}

fn registry_error(message: impl Into<String>) -> WizardError {
    WizardError::InvalidRegistry {
        message: message.into(),
    }
}
