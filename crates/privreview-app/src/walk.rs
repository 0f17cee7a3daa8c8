use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use privreview_core::controller::WizardPosition;
use privreview_core::signals::CookiePrimarySetting;
use thiserror::Error;

use crate::App;
use crate::session::{SessionRequest, WizardSession};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkAction {
    Next,
    Back,
    Goto(String),
    Sync(bool),
    Cookies(CookiePrimarySetting),
    Dismiss,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalkActionError {
    #[error(
        "unknown walk action '{value}' (expected next, back, goto:<step>, sync:on|off, cookies:<setting>, dismiss)"
    )]
    Unknown { value: String },
    #[error("walk action '{value}' is missing a value after ':'")]
    MissingValue { value: String },
    #[error("invalid value in walk action '{value}': {message}")]
    InvalidValue { value: String, message: String },
}

impl FromStr for WalkAction {
    type Err = WalkActionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (verb, argument) = match trimmed.split_once(':') {
            Some((verb, argument)) => (verb, Some(argument.trim())),
            None => (trimmed, None),
        };

        let require = |argument: Option<&str>| match argument {
            Some(argument) if !argument.is_empty() => Ok(argument.to_string()),
            _ => Err(WalkActionError::MissingValue {
                value: trimmed.to_string(),
            }),
        };

        match verb {
            "next" if argument.is_none() => Ok(Self::Next),
            "back" if argument.is_none() => Ok(Self::Back),
            "dismiss" if argument.is_none() => Ok(Self::Dismiss),
            "goto" => Ok(Self::Goto(require(argument)?)),
            "sync" => match require(argument)?.as_str() {
                "on" => Ok(Self::Sync(true)),
                "off" => Ok(Self::Sync(false)),
                other => Err(WalkActionError::InvalidValue {
                    value: trimmed.to_string(),
                    message: format!("expected on or off, found '{other}'"),
                }),
            },
            "cookies" => require(argument)?
                .parse::<CookiePrimarySetting>()
                .map(Self::Cookies)
                .map_err(|message| WalkActionError::InvalidValue {
                    value: trimmed.to_string(),
                    message,
                }),
            _ => Err(WalkActionError::Unknown {
                value: trimmed.to_string(),
            }),
        }
    }
}

impl fmt::Display for WalkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => write!(f, "next"),
            Self::Back => write!(f, "back"),
            Self::Goto(step) => write!(f, "goto:{step}"),
            Self::Sync(true) => write!(f, "sync:on"),
            Self::Sync(false) => write!(f, "sync:off"),
            Self::Cookies(setting) => write!(f, "cookies:{setting}"),
            Self::Dismiss => write!(f, "dismiss"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkRequest {
    pub step: Option<String>,
    pub actions: Vec<WalkAction>,
}

/// Wizard state observed after one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkRecord {
    pub action: String,
    pub position: String,
    pub indicator: String,
    pub location: String,
}

impl App {
    /// Runs a session headlessly, recording the state after start and after
    /// every action.
    pub fn walk(&self, request: WalkRequest) -> Result<Vec<WalkRecord>> {
        let mut session = self.open_session(SessionRequest { step: request.step })?;
        session.start()?;

        let mut records = vec![record("start", &session)?];
        for action in request.actions {
            apply(&mut session, &action).with_context(|| format!("walk action '{action}' failed"))?;
            records.push(record(&action.to_string(), &session)?);
        }

        Ok(records)
    }
}

fn apply(session: &mut WizardSession, action: &WalkAction) -> Result<()> {
    match action {
        WalkAction::Next => session.next(),
        WalkAction::Back => session.back(),
        WalkAction::Goto(step) => session.navigate_to(step),
        WalkAction::Sync(enabled) => session.set_sync(*enabled),
        WalkAction::Cookies(setting) => session.set_cookies(*setting),
        WalkAction::Dismiss => session.dismiss(),
    }
}

fn record(action: &str, session: &WizardSession) -> Result<WalkRecord> {
    let view = session.view()?;
    let position = match &view.position {
        WizardPosition::NotStarted => "not started".to_string(),
        WizardPosition::Active(step) => step.clone(),
        WizardPosition::Exited(reason) => format!("exited ({reason})"),
    };
    let indicator = if matches!(view.position, WizardPosition::Active(_)) {
        view.indicator.label()
    } else {
        "-".to_string()
    };

    Ok(WalkRecord {
        action: action.to_string(),
        position,
        indicator,
        location: view.location.unwrap_or_else(|| "-".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_action_form() {
        assert_eq!("next".parse(), Ok(WalkAction::Next));
        assert_eq!(" back ".parse(), Ok(WalkAction::Back));
        assert_eq!(
            "goto:cookies".parse(),
            Ok(WalkAction::Goto("cookies".to_string()))
        );
        assert_eq!("sync:on".parse(), Ok(WalkAction::Sync(true)));
        assert_eq!(
            "cookies:0".parse(),
            Ok(WalkAction::Cookies(CookiePrimarySetting::AllowAll))
        );
        assert_eq!("dismiss".parse(), Ok(WalkAction::Dismiss));
    }

    #[test]
    fn rejects_malformed_actions() {
        assert!(matches!(
            "jump".parse::<WalkAction>(),
            Err(WalkActionError::Unknown { .. })
        ));
        assert!(matches!(
            "goto:".parse::<WalkAction>(),
            Err(WalkActionError::MissingValue { .. })
        ));
        assert!(matches!(
            "next:now".parse::<WalkAction>(),
            Err(WalkActionError::Unknown { .. })
        ));

        let error = "sync:maybe".parse::<WalkAction>().expect_err("invalid");
        assert!(error.to_string().contains("expected on or off"));
    }

    #[test]
    fn display_matches_parse_input() {
        for raw in ["next", "goto:msbb", "sync:off", "cookies:block-all", "dismiss"] {
            let action: WalkAction = raw.parse().expect("action");
            assert_eq!(action.to_string(), raw);
        }
    }
}
