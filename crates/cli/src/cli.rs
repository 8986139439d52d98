use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand, builder::BoolishValueParser};

#[derive(Parser)]
#[command(name = "tmuxup")]
#[command(about = "Declaratively provision tmux windows, panes and pane actions")]
#[command(version)]
pub struct Cli {
    /// Tmux server socket name (passed as `tmux -L`)
    #[arg(
        short = 'L',
        long = "socket-name",
        value_name = "NAME",
        env = "TMUXUP_SOCKET",
        global = true
    )]
    pub socket_name: Option<String>,

    /// Print every tmux command before running it
    #[arg(
        long,
        env = "TMUXUP_DEBUG",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub debug: bool,

    /// Seconds an `expect` action waits for its pattern
    #[arg(
        long,
        value_name = "SECS",
        env = "TMUXUP_EXPECT_TIMEOUT",
        default_value = "60",
        value_parser = parse_seconds,
        global = true
    )]
    pub expect_timeout: Duration,

    /// Seconds between two captures of an `expect` action
    #[arg(
        long,
        value_name = "SECS",
        env = "TMUXUP_EXPECT_INTERVAL",
        default_value = "0.5",
        value_parser = parse_seconds,
        global = true
    )]
    pub expect_interval: Duration,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create missing windows and panes, then run every pane's commands
    Up {
        /// Workspace spec file, or `-` for stdin
        #[arg(value_name = "SPEC")]
        spec: String,

        /// Don't select the first window
        #[arg(long = "no-focus")]
        no_focus: bool,
    },

    /// Kill the windows of a workspace spec
    #[command(visible_alias = "kill")]
    Down {
        /// Workspace spec file, or `-` for stdin
        #[arg(value_name = "SPEC")]
        spec: String,
    },

    /// Show how a spec resolves against the running tmux server
    Plan {
        /// Workspace spec file, or `-` for stdin
        #[arg(value_name = "SPEC")]
        spec: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Parse a positive number of seconds, fractions allowed
fn parse_seconds(value: &str) -> Result<Duration, String> {
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", value))?;
    if secs <= 0.0 {
        return Err(format!("'{}' must be a positive number of seconds", value));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| format!("'{}' is out of range", value))
}
