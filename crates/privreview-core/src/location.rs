use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::signals::ExternalSnapshot;
use crate::step::StepRegistry;

pub const STEP_PARAM: &str = "step";

/// Addressable location holding the `step` query parameter.
pub trait StepLocation {
    /// Current query string, if any.
    fn read(&self) -> anyhow::Result<Option<String>>;
    /// Replaces the query string. Writing the current value is a no-op.
    fn write(&self, query: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// The parameter named a registered step.
    Step(String),
    /// The parameter was missing or unknown; carries the first available step.
    Default(String),
}

impl Decoded {
    pub fn step_id(&self) -> &str {
        match self {
            Self::Step(id) | Self::Default(id) => id,
        }
    }
}

pub fn encode(step_id: &str) -> String {
    format!("{STEP_PARAM}={}", urlencoding::encode(step_id))
}

/// Extracts and percent-decodes the `step` parameter from a query string.
pub fn step_param(query: &str) -> Option<String> {
    let query = query.trim().trim_start_matches('?');
    query
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .filter(|(key, _)| *key == STEP_PARAM)
        .filter_map(|(_, value)| {
            let value = value.replace('+', " ");
            urlencoding::decode(&value).ok().map(|value| value.into_owned())
        })
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Maps a parameter value to a registered step, degrading to the first
/// available step instead of failing.
pub fn decode(
    registry: &StepRegistry,
    param: Option<&str>,
    snapshot: &ExternalSnapshot,
) -> Decoded {
    match param {
        Some(value) => match registry.step_by_id(value) {
            Ok(step) => Decoded::Step(step.id.to_string()),
            Err(error) => {
                warn!(%error, "ignoring step parameter");
                Decoded::Default(registry.first_available(snapshot).id.to_string())
            }
        },
        None => Decoded::Default(registry.first_available(snapshot).id.to_string()),
    }
}

/// In-memory location that also keeps the list of pushed entries, the way a
/// browser session history would.
#[derive(Debug, Default)]
pub struct MemoryLocation {
    entries: Mutex<Vec<String>>,
}

impl MemoryLocation {
    pub fn new(initial: Option<&str>) -> Self {
        Self {
            entries: Mutex::new(initial.map(str::to_string).into_iter().collect()),
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StepLocation for MemoryLocation {
    fn read(&self) -> anyhow::Result<Option<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned())
    }

    fn write(&self, query: &str) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.last().map(String::as_str) != Some(query) {
            entries.push(query.to_string());
        }
        Ok(())
    }
}
