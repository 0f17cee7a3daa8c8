use anyhow::Result;
use comfy_table::{Cell, ContentArrangement, Table};
use privreview_app::{App, SessionRequest, SignalOverrides, StepsResult, WalkRecord, WalkRequest};
use privreview_core::doctor::DoctorReport;
use privreview_tui::UiExit;
use tracing::debug;

use crate::cli::{Cli, Command};

pub fn run_with_deps(cli: Cli, app: &App) -> Result<()> {
    match cli.command {
        None => run_wizard_command(app, cli.step),
        Some(Command::Doctor) => run_doctor_command(app),
        Some(Command::Steps { sync, cookies }) => run_steps_command(
            app,
            SignalOverrides {
                sync_enabled: sync,
                cookie_primary_setting: cookies,
            },
        ),
        Some(Command::Walk { actions }) => run_walk_command(
            app,
            WalkRequest {
                step: cli.step,
                actions,
            },
        ),
        Some(Command::Reset) => run_reset_command(app),
    }
}

fn run_wizard_command(app: &App, step: Option<String>) -> Result<()> {
    let exit = privreview_tui::run_wizard(app, SessionRequest { step })?;
    debug!(?exit, "wizard finished");

    match exit {
        UiExit::Completed => println!("Privacy review complete."),
        UiExit::BackAtRoot => {}
        UiExit::Canceled => println!("Privacy review paused. Run `privreview` to resume."),
    }
    Ok(())
}

fn run_doctor_command(app: &App) -> Result<()> {
    let report = app.doctor()?;
    print_doctor_report(&report);
    Ok(())
}

fn print_doctor_report(report: &DoctorReport) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Check", "Status", "Details"]);

    for check in &report.checks {
        table.add_row(vec![
            Cell::new(check.name.as_str()),
            Cell::new(check.state),
            Cell::new(check.details.as_str()),
        ]);
    }

    println!("{table}");
    println!("{}", report.summary());
}

fn run_steps_command(app: &App, overrides: SignalOverrides) -> Result<()> {
    let result = app.steps(overrides)?;
    print_steps(&result);
    Ok(())
}

fn print_steps(result: &StepsResult) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Order", "Step", "Kind", "Counted", "Available"]);

    for row in &result.rows {
        table.add_row(vec![
            Cell::new(row.order),
            Cell::new(row.id),
            Cell::new(row.kind),
            Cell::new(yes_no(row.counted)),
            Cell::new(yes_no(row.available)),
        ]);
    }

    println!("{table}");
    println!(
        "sync {}, cookies {}, welcome card {}",
        if result.snapshot.sync_enabled { "on" } else { "off" },
        result.snapshot.cookie_primary_setting,
        if result.snapshot.show_welcome_card {
            "shown"
        } else {
            "hidden"
        }
    );
}

fn run_walk_command(app: &App, request: WalkRequest) -> Result<()> {
    let records = app.walk(request)?;
    print_walk(&records);
    Ok(())
}

fn print_walk(records: &[WalkRecord]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Action", "Position", "Indicator", "Location"]);

    for record in records {
        table.add_row(vec![
            Cell::new(record.action.as_str()),
            Cell::new(record.position.as_str()),
            Cell::new(record.indicator.as_str()),
            Cell::new(record.location.as_str()),
        ]);
    }

    println!("{table}");
}

fn run_reset_command(app: &App) -> Result<()> {
    let state = app.reset()?;
    println!(
        "Reset wizard state in {} (welcome card {}, saved step cleared).",
        app.config_dir().display(),
        if state.show_welcome_card {
            "shown"
        } else {
            "hidden"
        }
    );
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
