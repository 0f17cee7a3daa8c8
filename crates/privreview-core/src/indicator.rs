use serde::Serialize;

use crate::signals::ExternalSnapshot;
use crate::step::StepRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StepIndicator {
    pub active: usize,
    pub total: usize,
}

impl StepIndicator {
    /// Human-facing "Step N of M" label, clamped for the post-final position.
    pub fn label(&self) -> String {
        if self.total == 0 {
            return "No steps".to_string();
        }
        let shown = (self.active + 1).min(self.total);
        format!("Step {shown} of {}", self.total)
    }

    pub fn is_finished(&self) -> bool {
        self.active >= self.total
    }
}

/// Progress for `current_id` among the counted steps that are available under
/// `snapshot`.
///
/// A step that is not counted (welcome, completion) or not currently available
/// reports the position of the nearest later counted step, or `total` when
/// none is left.
pub fn compute_indicator(
    registry: &StepRegistry,
    current_id: &str,
    snapshot: &ExternalSnapshot,
) -> StepIndicator {
    let counted: Vec<_> = registry
        .steps_in_order()
        .iter()
        .filter(|step| step.counts_in_indicator && step.is_available(snapshot))
        .collect();
    let total = counted.len();

    if let Some(active) = counted.iter().position(|step| step.id == current_id) {
        return StepIndicator { active, total };
    }

    let active = match registry.step_by_id(current_id) {
        Ok(current) => counted
            .iter()
            .position(|step| step.order > current.order)
            .unwrap_or(total),
        Err(_) => total,
    };

    StepIndicator { active, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{CookiePrimarySetting, SignalUpdate};
    use crate::step::{CLEAR_ON_EXIT, COMPLETION, COOKIES, HISTORY_SYNC, MSBB, WELCOME};

    fn sync_off_blocking() -> ExternalSnapshot {
        ExternalSnapshot {
            sync_enabled: false,
            cookie_primary_setting: CookiePrimarySetting::BlockThirdParty,
            show_welcome_card: true,
        }
    }

    #[test]
    fn counted_steps_report_their_position() {
        let registry = StepRegistry::privacy_review();
        let snapshot = sync_off_blocking();

        assert_eq!(
            compute_indicator(&registry, MSBB, &snapshot),
            StepIndicator { active: 0, total: 3 }
        );
        assert_eq!(
            compute_indicator(&registry, CLEAR_ON_EXIT, &snapshot),
            StepIndicator { active: 1, total: 3 }
        );
        assert_eq!(
            compute_indicator(&registry, COOKIES, &snapshot),
            StepIndicator { active: 2, total: 3 }
        );
    }

    #[test]
    fn welcome_reports_about_to_start_and_completion_reports_finished() {
        let registry = StepRegistry::privacy_review();
        let snapshot = sync_off_blocking();

        let welcome = compute_indicator(&registry, WELCOME, &snapshot);
        assert_eq!(welcome, StepIndicator { active: 0, total: 3 });
        assert!(!welcome.is_finished());

        let completion = compute_indicator(&registry, COMPLETION, &snapshot);
        assert_eq!(completion, StepIndicator { active: 3, total: 3 });
        assert!(completion.is_finished());
        assert_eq!(completion.label(), "Step 3 of 3");
    }

    #[test]
    fn unavailable_current_step_reports_next_counted_position() {
        let registry = StepRegistry::privacy_review();
        let snapshot = sync_off_blocking();
        assert_eq!(
            compute_indicator(&registry, HISTORY_SYNC, &snapshot),
            StepIndicator { active: 2, total: 3 }
        );
    }

    #[test]
    fn total_shrinks_when_counted_predicate_fails() {
        let registry = StepRegistry::privacy_review();
        let with_sync = sync_off_blocking().with(SignalUpdate::SyncEnabled(true));
        let before = compute_indicator(&registry, MSBB, &with_sync);
        let after = compute_indicator(&registry, MSBB, &sync_off_blocking());
        assert_eq!(before.total, 4);
        assert!(after.total <= before.total);
        assert_eq!(after.total, 3);
    }

    #[test]
    fn total_ignores_non_counted_predicate_changes() {
        let registry = StepRegistry::privacy_review();
        let shown = sync_off_blocking();
        let hidden = shown.with(SignalUpdate::ShowWelcomeCard(false));

        for id in [WELCOME, MSBB, COOKIES, COMPLETION] {
            assert_eq!(
                compute_indicator(&registry, id, &shown).total,
                compute_indicator(&registry, id, &hidden).total
            );
        }
    }

    #[test]
    fn label_for_empty_flow() {
        assert_eq!(StepIndicator::default().label(), "No steps");
    }
}
