use anyhow::Result;
use crossterm::event::KeyEvent;
use privreview_app::{SessionView, WizardSession};
use privreview_core::controller::{ExitReason, WizardPosition};
use privreview_core::indicator::StepIndicator;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::text::{Line, Span, Text};

use crate::UiExit;
use crate::keymap;
use crate::theme;
use crate::ui::cards::{Card, card_for};
use crate::ui::modal::render_error_modal;
use crate::ui::text::{
    compact_hint, key_hint_height, key_hint_paragraph, label_value_line, on_off,
    wrapped_paragraph,
};

pub(crate) trait WizardOps {
    fn next(&mut self) -> Result<()>;
    fn back(&mut self) -> Result<()>;
    fn toggle_sync(&mut self) -> Result<()>;
    fn cycle_cookies(&mut self) -> Result<()>;
    fn dismiss(&mut self) -> Result<()>;
    fn tick(&mut self) -> Result<bool>;
    fn position(&self) -> WizardPosition;
}

impl WizardOps for WizardSession {
    fn next(&mut self) -> Result<()> {
        WizardSession::next(self)
    }

    fn back(&mut self) -> Result<()> {
        WizardSession::back(self)
    }

    fn toggle_sync(&mut self) -> Result<()> {
        WizardSession::toggle_sync(self)
    }

    fn cycle_cookies(&mut self) -> Result<()> {
        WizardSession::cycle_cookies(self)
    }

    fn dismiss(&mut self) -> Result<()> {
        WizardSession::dismiss(self)
    }

    fn tick(&mut self) -> Result<bool> {
        WizardSession::tick(self)
    }

    fn position(&self) -> WizardPosition {
        WizardSession::position(self)
    }
}

#[derive(Debug, Default)]
pub(crate) struct WizardScreen {
    error: Option<String>,
}

impl WizardScreen {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_key(&mut self, key: KeyEvent, ops: &mut dyn WizardOps) -> Option<UiExit> {
        if self.error.is_some() {
            if keymap::is_dismiss_error(key) {
                self.error = None;
            }
            return None;
        }

        let outcome = if keymap::is_quit(key) {
            ops.dismiss()
        } else if keymap::is_next(key) {
            ops.next()
        } else if keymap::is_back(key) {
            ops.back()
        } else if keymap::is_toggle_sync(key) {
            ops.toggle_sync()
        } else if keymap::is_cycle_cookies(key) {
            ops.cycle_cookies()
        } else {
            return None;
        };

        if let Err(error) = outcome {
            self.error = Some(format!("{error:#}"));
            return None;
        }
        exit_for(&ops.position())
    }

    pub(crate) fn on_tick(&mut self, ops: &mut dyn WizardOps) -> Option<UiExit> {
        if let Err(error) = ops.tick() {
            self.error = Some(format!("{error:#}"));
            return None;
        }
        exit_for(&ops.position())
    }

    pub(crate) fn render(&self, frame: &mut Frame<'_>, view: &SessionView) {
        let area = frame.area();
        let key_text = compact_hint(
            area.width,
            "Enter/n: next    Esc/b: back    s: toggle sync    c: cycle cookies    q: quit",
            "Enter: next    Esc: back    s: sync    c: cookies    q: quit",
            "Enter next | Esc back | s | c | q",
        );
        let footer_height = key_hint_height(area.width, key_text);
        let [header, body, status, footer] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(6),
                Constraint::Length(3),
                Constraint::Length(footer_height),
            ])
            .areas(area);

        let progress = match view.step {
            Some(step) if step.counts_in_indicator => progress_lines(view.indicator),
            Some(_) | None => vec![Line::from(""), Line::from("")],
        };
        frame.render_widget(
            wrapped_paragraph(Text::from(progress)).block(theme::chrome("Privacy review")),
            header,
        );

        let card = match view.step {
            Some(step) => card_for(&step, &view.snapshot),
            None => Card {
                title: "Privacy review",
                body: Text::from("The review has ended."),
            },
        };
        frame.render_widget(
            wrapped_paragraph(card.body).block(theme::chrome(card.title)),
            body,
        );

        let status_line = Line::from(vec![
            Span::styled("Signals  ", theme::secondary_text()),
            Span::raw(format!(
                "sync {}  cookies {}",
                on_off(view.snapshot.sync_enabled),
                view.snapshot.cookie_primary_setting
            )),
        ]);
        let location = label_value_line(
            "Location",
            view.location.clone().unwrap_or_else(|| "-".to_string()),
        );
        frame.render_widget(
            wrapped_paragraph(Text::from(vec![status_line, location])).block(theme::chrome("")),
            status,
        );

        frame.render_widget(key_hint_paragraph(key_text).block(theme::key_block()), footer);

        if let Some(message) = self.error.as_deref() {
            render_error_modal(frame, message, "Enter/Esc: continue");
        }
    }
}

fn progress_lines(indicator: StepIndicator) -> Vec<Line<'static>> {
    let dots: Vec<Span<'static>> = (0..indicator.total)
        .map(|index| {
            if index <= indicator.active {
                Span::styled("● ", theme::indicator_done())
            } else {
                Span::styled("○ ", theme::secondary_text())
            }
        })
        .collect();
    vec![
        Line::from(Span::styled(indicator.label(), theme::focus_prompt())),
        Line::from(dots),
    ]
}

pub(crate) fn exit_for(position: &WizardPosition) -> Option<UiExit> {
    match position {
        WizardPosition::Exited(ExitReason::Completed) => Some(UiExit::Completed),
        WizardPosition::Exited(ExitReason::BackAtRoot) => Some(UiExit::BackAtRoot),
        WizardPosition::Exited(ExitReason::Dismissed) => Some(UiExit::Canceled),
        WizardPosition::NotStarted | WizardPosition::Active(_) => None,
    }
}
