mod keymap;
mod theme;
mod ui;
mod wizard_screen;

use std::io::{Stdout, stdout};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use privreview_app::{App, SessionRequest};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::info;

use crate::wizard_screen::{WizardScreen, exit_for};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiExit {
    Completed,
    BackAtRoot,
    Canceled,
}

const TICK_RATE: Duration = Duration::from_millis(120);

pub(crate) struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    pub(crate) fn enter() -> Result<Self> {
        let terminal = enter_with_ops(
            || enable_raw_mode().context("failed to enable raw mode"),
            || {
                let mut out = stdout();
                execute!(out, EnterAlternateScreen, Hide)
                    .context("failed to enter alternate screen")
            },
            || {
                let backend = CrosstermBackend::new(stdout());
                Terminal::new(backend).context("failed to create terminal backend")
            },
            || {
                let mut out = stdout();
                execute!(out, Show, LeaveAlternateScreen)
                    .context("failed to restore terminal screen during rollback")
            },
            || disable_raw_mode().context("failed to disable raw mode during rollback"),
        )?;
        Ok(Self { terminal })
    }

    pub(crate) fn draw<F>(&mut self, draw_fn: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame<'_>),
    {
        self.terminal
            .draw(draw_fn)
            .context("failed to render terminal")?;
        Ok(())
    }

    pub(crate) fn autoresize(&mut self) -> Result<()> {
        self.terminal
            .autoresize()
            .context("failed to autoresize terminal")?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(self.terminal.backend_mut(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Prepares the terminal in order: raw mode, alternate screen, backend.
/// A failing stage undoes only the stages that already succeeded.
fn enter_with_ops<T, Raw, Alt, Create, Leave, Restore>(
    mut raw_mode: Raw,
    mut alt_screen: Alt,
    mut create: Create,
    mut leave_alt_screen: Leave,
    mut restore_raw_mode: Restore,
) -> Result<T>
where
    Raw: FnMut() -> Result<()>,
    Alt: FnMut() -> Result<()>,
    Create: FnMut() -> Result<T>,
    Leave: FnMut() -> Result<()>,
    Restore: FnMut() -> Result<()>,
{
    raw_mode()?;

    if let Err(error) = alt_screen() {
        return Err(rolled_back(error, [None, Some(restore_raw_mode())]));
    }

    create().map_err(|error| {
        rolled_back(error, [Some(leave_alt_screen()), Some(restore_raw_mode())])
    })
}

fn rolled_back(setup_error: anyhow::Error, cleanup: [Option<Result<()>>; 2]) -> anyhow::Error {
    let failures: Vec<String> = cleanup
        .into_iter()
        .flatten()
        .filter_map(|result| result.err())
        .map(|error| format!("{error:#}"))
        .collect();

    if failures.is_empty() {
        return setup_error;
    }
    anyhow!(
        "{setup_error:#}\nterminal rollback cleanup failed: {}",
        failures.join("\n")
    )
}

/// Runs the wizard in the terminal until it completes, backs out, or is
/// canceled.
pub fn run_wizard(app: &App, request: SessionRequest) -> Result<UiExit> {
    let mut wizard = app.open_session(request)?;
    wizard.start()?;

    let mut terminal = TerminalSession::enter()?;
    let mut screen = WizardScreen::new();

    loop {
        if let Some(exit) = exit_for(&wizard.position()) {
            return Ok(finish(exit));
        }

        let view = wizard.view()?;
        terminal.draw(|frame| screen.render(frame, &view))?;

        let has_event = event::poll(TICK_RATE).context("failed to poll terminal event")?;
        if !has_event {
            if let Some(exit) = screen.on_tick(&mut wizard) {
                return Ok(finish(exit));
            }
            continue;
        }

        let key = match event::read().context("failed to read terminal event")? {
            Event::Resize(_, _) => {
                terminal.autoresize()?;
                continue;
            }
            Event::Key(key) if matches!(key.kind, KeyEventKind::Press) => key,
            _ => continue,
        };

        if keymap::is_ctrl_c(key) {
            wizard.dismiss()?;
            return Ok(finish(UiExit::Canceled));
        }

        if let Some(exit) = screen.on_key(key, &mut wizard) {
            return Ok(finish(exit));
        }
    }
}

fn finish(exit: UiExit) -> UiExit {
    info!(?exit, "wizard ui closed");
    exit
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use anyhow::{Result, anyhow};

    use super::enter_with_ops;

    type Calls = RefCell<Vec<&'static str>>;

    fn op<'a>(
        calls: &'a Calls,
        name: &'static str,
        failure: Option<&'static str>,
    ) -> impl FnMut() -> Result<()> + 'a {
        move || {
            calls.borrow_mut().push(name);
            match failure {
                Some(message) => Err(anyhow!(message)),
                None => Ok(()),
            }
        }
    }

    fn enter(calls: &Calls, failures: [Option<&'static str>; 5]) -> Result<()> {
        let [raw, alt, create, leave, disable] = failures;
        enter_with_ops(
            op(calls, "raw", raw),
            op(calls, "alt", alt),
            op(calls, "create", create),
            op(calls, "leave", leave),
            op(calls, "disable", disable),
        )
    }

    #[test]
    fn alt_screen_failure_only_undoes_raw_mode() {
        let calls = Calls::default();
        let error = enter(&calls, [None, Some("no alt screen"), None, None, None])
            .expect_err("enter should fail");

        assert_eq!(calls.into_inner(), vec!["raw", "alt", "disable"]);
        assert_eq!(format!("{error:#}"), "no alt screen");
    }

    #[test]
    fn cleanup_failures_are_appended_to_setup_error() {
        let calls = Calls::default();
        let error = enter(
            &calls,
            [
                None,
                None,
                Some("no backend"),
                Some("leave failed"),
                Some("disable failed"),
            ],
        )
        .expect_err("enter should fail");

        assert_eq!(
            calls.into_inner(),
            vec!["raw", "alt", "create", "leave", "disable"]
        );
        let message = format!("{error:#}");
        assert!(message.starts_with("no backend\nterminal rollback cleanup failed"));
        assert!(message.contains("leave failed\ndisable failed"));
    }

    #[test]
    fn successful_setup_skips_rollback() {
        let calls = Calls::default();
        enter(&calls, [None; 5]).expect("enter should succeed");
        assert_eq!(calls.into_inner(), vec!["raw", "alt", "create"]);
    }

    #[test]
    fn raw_mode_failure_stops_before_any_rollback() {
        let calls = Calls::default();
        enter(&calls, [Some("no tty"), None, None, None, None]).expect_err("enter should fail");
        assert_eq!(calls.into_inner(), vec!["raw"]);
    }
}
