pub mod cli;
pub mod diagnostics;
pub mod dispatch;

use anyhow::Result;
use clap::Parser;
use privreview_app::App;

use crate::cli::Cli;
use crate::diagnostics::{DiagnosticsSession, LoggingOptions};

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let app = App::from_home()?;

    // A broken config is reported by the command itself; logging falls back.
    let level = app
        .load_config()
        .map(|config| config.logging.level)
        .unwrap_or_else(|_| "info".to_string());
    let diagnostics = DiagnosticsSession::initialize(
        app.config_dir(),
        &LoggingOptions {
            diagnostics: cli.diagnostics,
            interactive: cli.is_interactive(),
            level,
        },
    )?;
    if let Some(path) = diagnostics.path() {
        eprintln!("Diagnostics enabled: {}", path.display());
    }

    dispatch::run_with_deps(cli, &app)
}
