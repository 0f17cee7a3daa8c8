use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// Primary cookie setting as exposed by the cookie settings collaborator.
///
/// Ordinals follow the settings page: allow-all is 0, block-all is 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CookiePrimarySetting {
    AllowAll,
    BlockThirdPartyIncognito,
    #[default]
    BlockThirdParty,
    BlockAll,
}

pub const COOKIE_PRIMARY_SETTINGS: [CookiePrimarySetting; 4] = [
    CookiePrimarySetting::AllowAll,
    CookiePrimarySetting::BlockThirdPartyIncognito,
    CookiePrimarySetting::BlockThirdParty,
    CookiePrimarySetting::BlockAll,
];

impl CookiePrimarySetting {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllowAll => "allow-all",
            Self::BlockThirdPartyIncognito => "block-third-party-incognito",
            Self::BlockThirdParty => "block-third-party",
            Self::BlockAll => "block-all",
        }
    }

    pub fn ordinal(self) -> u8 {
        match self {
            Self::AllowAll => 0,
            Self::BlockThirdPartyIncognito => 1,
            Self::BlockThirdParty => 2,
            Self::BlockAll => 3,
        }
    }

    pub fn blocks_third_party(self) -> bool {
        matches!(self, Self::BlockThirdParty | Self::BlockThirdPartyIncognito)
    }

    /// Next value in ordinal order, wrapping around.
    pub fn cycled(self) -> Self {
        let index = (usize::from(self.ordinal()) + 1) % COOKIE_PRIMARY_SETTINGS.len();
        COOKIE_PRIMARY_SETTINGS[index]
    }
}

impl fmt::Display for CookiePrimarySetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CookiePrimarySetting {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        COOKIE_PRIMARY_SETTINGS
            .into_iter()
            .find(|setting| {
                setting.as_str() == trimmed || setting.ordinal().to_string() == trimmed
            })
            .ok_or_else(|| {
                format!(
                    "unknown cookie setting '{trimmed}' (expected one of: allow-all, block-third-party-incognito, block-third-party, block-all)"
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalName {
    SyncEnabled,
    CookiePrimarySetting,
    ShowWelcomeCard,
}

pub const ALL_SIGNALS: [SignalName; 3] = [
    SignalName::SyncEnabled,
    SignalName::CookiePrimarySetting,
    SignalName::ShowWelcomeCard,
];

impl SignalName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SyncEnabled => "sync-enabled",
            Self::CookiePrimarySetting => "cookie-primary-setting",
            Self::ShowWelcomeCard => "show-welcome-card",
        }
    }
}

impl fmt::Display for SignalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalUpdate {
    SyncEnabled(bool),
    CookiePrimarySetting(CookiePrimarySetting),
    ShowWelcomeCard(bool),
}

impl SignalUpdate {
    pub fn name(self) -> SignalName {
        match self {
            Self::SyncEnabled(_) => SignalName::SyncEnabled,
            Self::CookiePrimarySetting(_) => SignalName::CookiePrimarySetting,
            Self::ShowWelcomeCard(_) => SignalName::ShowWelcomeCard,
        }
    }
}

/// Last-seen values of every watched external signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExternalSnapshot {
    pub sync_enabled: bool,
    pub cookie_primary_setting: CookiePrimarySetting,
    pub show_welcome_card: bool,
}

impl Default for ExternalSnapshot {
    fn default() -> Self {
        Self {
            sync_enabled: false,
            cookie_primary_setting: CookiePrimarySetting::default(),
            show_welcome_card: true,
        }
    }
}

impl ExternalSnapshot {
    /// Applies one update and reports whether any value changed.
    pub fn apply(&mut self, update: SignalUpdate) -> bool {
        match update {
            SignalUpdate::SyncEnabled(value) => replace_if_changed(&mut self.sync_enabled, value),
            SignalUpdate::CookiePrimarySetting(value) => {
                replace_if_changed(&mut self.cookie_primary_setting, value)
            }
            SignalUpdate::ShowWelcomeCard(value) => {
                replace_if_changed(&mut self.show_welcome_card, value)
            }
        }
    }

    pub fn with(mut self, update: SignalUpdate) -> Self {
        self.apply(update);
        self
    }

    pub fn value_of(&self, signal: SignalName) -> SignalUpdate {
        match signal {
            SignalName::SyncEnabled => SignalUpdate::SyncEnabled(self.sync_enabled),
            SignalName::CookiePrimarySetting => {
                SignalUpdate::CookiePrimarySetting(self.cookie_primary_setting)
            }
            SignalName::ShowWelcomeCard => SignalUpdate::ShowWelcomeCard(self.show_welcome_card),
        }
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

pub type SignalCallback = Box<dyn Fn(SignalUpdate) + Send + 'static>;

/// Collaborator owning one or more external signals.
pub trait SignalSource {
    fn subscribe(&self, signal: SignalName, callback: SignalCallback) -> anyhow::Result<()>;
}

/// In-process signal owner. Every `set` notifies the subscribers of that signal.
#[derive(Default)]
pub struct ManualSignalSource {
    values: Mutex<ExternalSnapshot>,
    subscribers: Mutex<Vec<(SignalName, SignalCallback)>>,
}

impl ManualSignalSource {
    pub fn new(initial: ExternalSnapshot) -> Self {
        Self {
            values: Mutex::new(initial),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn current(&self) -> ExternalSnapshot {
        *self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, update: SignalUpdate) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(update);

        let subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for (signal, callback) in subscribers.iter() {
            if *signal == update.name() {
                callback(update);
            }
        }
    }

    pub fn set_many(&self, updates: &[SignalUpdate]) {
        for update in updates {
            self.set(*update);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl SignalSource for ManualSignalSource {
    fn subscribe(&self, signal: SignalName, callback: SignalCallback) -> anyhow::Result<()> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((signal, callback));
        Ok(())
    }
}
