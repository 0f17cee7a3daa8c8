use std::fmt;
use std::path::Path;

use crate::config::load_config;
use crate::location;
use crate::state::{load_state, state_path};
use crate::step::StepRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Pass,
    Fail,
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorCheck {
    pub name: String,
    pub state: CheckState,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    pub checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    pub fn summary(&self) -> String {
        let passed = self
            .checks
            .iter()
            .filter(|check| check.state == CheckState::Pass)
            .count();
        let failed = self.checks.len().saturating_sub(passed);
        format!("{passed} passed, {failed} failed")
    }
}

pub fn run_doctor_in(config_dir: &Path) -> DoctorReport {
    let mut checks = vec![check_step_registry()];

    let config_path = config_dir.join("config.toml");
    if config_path.exists() {
        checks.push(match load_config(&config_path) {
            Ok(_) => pass_check(
                "config parses and validates",
                format!("loaded {}", config_path.display()),
            ),
            Err(error) => fail_check("config parses and validates", error.to_string()),
        });
    } else {
        checks.push(pass_check(
            "config parses and validates",
            format!("no file at {}; using defaults", config_path.display()),
        ));
    }

    let state_path = state_path(config_dir);
    match load_state(&state_path) {
        Ok(state) => {
            checks.push(pass_check(
                "state file is readable",
                if state_path.exists() {
                    format!("loaded {}", state_path.display())
                } else {
                    "no saved state yet".to_string()
                },
            ));
            checks.push(check_saved_location(state.location_query.as_deref()));
        }
        Err(error) => {
            checks.push(fail_check("state file is readable", error.to_string()));
            checks.push(fail_check(
                "saved location names a known step",
                "skipped because state file is invalid",
            ));
        }
    }

    DoctorReport { checks }
}

fn check_step_registry() -> DoctorCheck {
    let steps = StepRegistry::privacy_review().steps_in_order().to_vec();
    let count = steps.len();
    match StepRegistry::new(steps) {
        Ok(_) => pass_check(
            "step registry validates",
            format!("{count} steps in order"),
        ),
        Err(error) => fail_check("step registry validates", error.to_string()),
    }
}

fn check_saved_location(query: Option<&str>) -> DoctorCheck {
    let name = "saved location names a known step";
    let Some(query) = query else {
        return pass_check(name, "no saved location");
    };

    match location::step_param(query) {
        Some(step_id) => match StepRegistry::privacy_review().step_by_id(&step_id) {
            Ok(step) => pass_check(name, format!("resumes at '{}'", step.id)),
            Err(error) => fail_check(name, format!("{error}; the default step will be used")),
        },
        None => fail_check(
            name,
            format!("'{query}' has no step parameter; the default step will be used"),
        ),
    }
}

fn pass_check(name: &str, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck {
        name: name.to_string(),
        state: CheckState::Pass,
        details: details.into(),
    }
}

fn fail_check(name: &str, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck {
        name: name.to_string(),
        state: CheckState::Fail,
        details: details.into(),
    }
}
