use crate::error::WizardError;

/// Current step plus the linear stack of previously visited steps.
///
/// Pure state container: callers validate steps before committing them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationStore {
    current: Option<String>,
    history: Vec<String>,
}

impl NavigationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Commits `step_id`, pushing the previous step onto history.
    pub fn set_current(&mut self, step_id: &str) {
        if self.current.as_deref() == Some(step_id) {
            return;
        }

        if let Some(previous) = self.current.take()
            && self.history.last() != Some(&previous)
        {
            self.history.push(previous);
        }
        self.current = Some(step_id.to_string());
    }

    /// Commits `step_id` without recording the step being left.
    pub fn restore(&mut self, step_id: &str) {
        self.current = Some(step_id.to_string());
    }

    pub fn pop_history(&mut self) -> Result<String, WizardError> {
        self.history.pop().ok_or(WizardError::EmptyHistory)
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.history.clear();
    }
}
