use clap::{Parser, Subcommand};
use privreview_app::WalkAction;
use privreview_core::signals::CookiePrimarySetting;

#[derive(Debug, Parser)]
#[command(name = "privreview")]
#[command(bin_name = "privreview")]
#[command(version)]
#[command(about = "Guided review of privacy and security settings")]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "Write a diagnostics log under ~/.config/privreview/diagnostics"
    )]
    pub diagnostics: bool,

    #[arg(
        long,
        global = true,
        value_name = "STEP",
        help = "Open the review at this step when it is reachable"
    )]
    pub step: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn is_interactive(&self) -> bool {
        self.command.is_none()
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Run configuration and state checks")]
    Doctor,
    #[command(about = "List review steps and whether each is available")]
    Steps {
        #[arg(long, value_name = "on|off", value_parser = parse_on_off)]
        sync: Option<bool>,
        #[arg(long, value_name = "SETTING")]
        cookies: Option<CookiePrimarySetting>,
    },
    #[command(about = "Run the review headlessly and print the state after each action")]
    Walk {
        #[arg(
            required = true,
            value_name = "ACTION",
            help = "next, back, goto:<step>, sync:on|off, cookies:<setting>, dismiss"
        )]
        actions: Vec<WalkAction>,
    },
    #[command(about = "Show the welcome card again and forget the saved step")]
    Reset,
}

fn parse_on_off(value: &str) -> Result<bool, String> {
    match value {
        "on" => Ok(true),
        "off" => Ok(false),
        other => Err(format!("expected on or off, found '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn no_subcommand_runs_interactive_wizard() {
        let cli = Cli::try_parse_from(["privreview", "--step", "cookies"]).expect("parse");
        assert!(cli.is_interactive());
        assert_eq!(cli.step.as_deref(), Some("cookies"));
        assert!(!cli.diagnostics);
    }

    #[test]
    fn walk_parses_actions_and_global_flags() {
        let cli = Cli::try_parse_from([
            "privreview",
            "walk",
            "--step",
            "msbb",
            "next",
            "sync:on",
            "--diagnostics",
        ])
        .expect("parse");

        assert!(cli.diagnostics);
        assert_eq!(cli.step.as_deref(), Some("msbb"));
        match cli.command {
            Some(Command::Walk { actions }) => {
                assert_eq!(actions, vec![WalkAction::Next, WalkAction::Sync(true)]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn steps_rejects_unknown_sync_value() {
        let error = Cli::try_parse_from(["privreview", "steps", "--sync", "maybe"])
            .expect_err("invalid sync");
        assert!(error.to_string().contains("expected on or off"));
    }

    #[test]
    fn walk_requires_an_action() {
        assert!(Cli::try_parse_from(["privreview", "walk"]).is_err());
    }
}
