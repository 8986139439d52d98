//! Tmuxup CLI - declarative tmux workspaces.
//!
//! Tmuxup reads a YAML workspace spec describing windows, panes and the
//! commands to run in each pane, and brings a running tmux server in line
//! with it. Windows and panes that already exist (matched by window name and
//! pane title) are reused; the rest are created.
//!
//! # Workflow
//!
//! 1. The spec is read (file or stdin), `{{ $VAR }}` references substituted
//!    and the YAML validated
//! 2. The spec is resolved against `tmux list-panes`
//! 3. Missing windows are created and missing panes split off
//! 4. Every pane's command list runs concurrently with the others
//!
//! Core functionality (interpretation, reconciliation, actions, the tmux
//! driver) is in `tmuxup-core`.

mod cli;
mod commands;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tmuxup_core::{ExpectSettings, Registry, TmuxDriver, Workspace, actions};

/// Entry point for the tmuxup CLI.
///
/// Installs the action registry with the configured `expect` timing, builds
/// the tmux driver and dispatches to the subcommand handler.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let registry = actions::install(Registry::builtin(ExpectSettings {
        timeout: cli.expect_timeout,
        interval: cli.expect_interval,
    }));

    let mut driver = TmuxDriver::new().debug(cli.debug);
    if let Some(socket) = cli.socket_name {
        driver = driver.socket_name(socket);
    }
    let workspace = Workspace::with_registry(Arc::new(driver), registry);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        match cli.command {
            Commands::Up { spec, no_focus } => {
                commands::workspace::up(&workspace, &spec, !no_focus).await
            }
            Commands::Down { spec } => commands::workspace::down(&workspace, &spec).await,
            Commands::Plan { spec, json } => commands::plan::show(&workspace, &spec, json).await,
        }
    })
}
