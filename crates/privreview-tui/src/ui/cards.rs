use privreview_core::signals::ExternalSnapshot;
use privreview_core::step::{
    CLEAR_ON_EXIT, COMPLETION, COOKIES, HISTORY_SYNC, MSBB, Step, WELCOME,
};
use ratatui::text::{Line, Span, Text};

use crate::theme;
use crate::ui::text::{focus_line, label_value_line, on_off};

pub(crate) struct Card {
    pub(crate) title: &'static str,
    pub(crate) body: Text<'static>,
}

pub(crate) fn card_for(step: &Step, snapshot: &ExternalSnapshot) -> Card {
    match step.id {
        WELCOME => Card {
            title: "Welcome",
            body: Text::from(vec![
                focus_line("Review your key privacy and security settings"),
                Line::from(""),
                Line::from(
                    "This review walks through a few settings that control what data is kept and shared.",
                ),
                Line::from("Nothing changes unless you change it."),
            ]),
        },
        MSBB => Card {
            title: "Make searches and browsing better",
            body: Text::from(vec![
                focus_line("Improve suggestions with the pages you visit"),
                Line::from(""),
                Line::from(
                    "When on, visited URLs are sent to your search engine to improve suggestions.",
                ),
                Line::from("Turn it off to keep page addresses local."),
            ]),
        },
        CLEAR_ON_EXIT => Card {
            title: "Clear cookies on exit",
            body: Text::from(vec![
                focus_line("Sign out of most sites when you close all windows"),
                Line::from(""),
                Line::from(
                    "Cookies and site data are deleted on exit. Sites you choose to keep are not affected.",
                ),
            ]),
        },
        HISTORY_SYNC => Card {
            title: "History sync",
            body: Text::from(vec![
                focus_line("Choose whether browsing history is synced"),
                Line::from(""),
                label_value_line("Sync", on_off(snapshot.sync_enabled)),
                Line::from("Synced history is available on your other signed-in devices."),
            ]),
        },
        COOKIES => Card {
            title: "Cookies",
            body: Text::from(vec![
                focus_line("Choose how third-party cookies are handled"),
                Line::from(""),
                label_value_line("Current setting", snapshot.cookie_primary_setting.as_str()),
                Line::from(
                    "Blocking third-party cookies limits how sites follow you across the web.",
                ),
            ]),
        },
        COMPLETION => Card {
            title: "Review complete",
            body: Text::from(vec![
                Line::from(Span::styled(
                    "You reviewed your privacy settings",
                    theme::success_prompt(),
                )),
                Line::from(""),
                Line::from("Press Enter to finish. You can run the review again at any time."),
            ]),
        },
        other => Card {
            title: "Step",
            body: Text::from(vec![focus_line(other.to_string())]),
        },
    }
}

#[cfg(test)]
mod tests {
    use privreview_core::signals::CookiePrimarySetting;
    use privreview_core::step::StepRegistry;

    use super::*;

    fn body_text(card: &Card) -> String {
        card.body
            .lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn every_registered_step_has_a_dedicated_card() {
        let snapshot = ExternalSnapshot::default();
        for step in StepRegistry::privacy_review().steps_in_order() {
            assert_ne!(card_for(step, &snapshot).title, "Step", "{}", step.id);
        }
    }

    #[test]
    fn setting_cards_show_live_signal_values() {
        let registry = StepRegistry::privacy_review();
        let snapshot = ExternalSnapshot {
            sync_enabled: true,
            cookie_primary_setting: CookiePrimarySetting::BlockThirdPartyIncognito,
            show_welcome_card: false,
        };

        let sync = card_for(registry.step_by_id(HISTORY_SYNC).expect("step"), &snapshot);
        assert!(body_text(&sync).contains("Sync: On"));

        let cookies = card_for(registry.step_by_id(COOKIES).expect("step"), &snapshot);
        assert!(body_text(&cookies).contains("block-third-party-incognito"));
    }
}
