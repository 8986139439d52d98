//! `up` and `down`: apply or tear down a workspace.

use anyhow::{Result, bail};
use colored::Colorize;
use tmuxup_core::{AppliedWindow, ApplyReport, Error, Workspace};

use super::load;

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

fn report_window(window: &AppliedWindow) {
    let verb = if window.created { "Created" } else { "Found" };
    let new_panes = window.panes.iter().filter(|p| p.created).count();
    let mut panes = plural(window.panes.len(), "pane");
    if new_panes > 0 {
        panes = format!("{}, {} new", panes, new_panes);
    }
    eprintln!(
        "{} {} {} {}",
        "✔".green(),
        verb.dimmed(),
        format!("{} (:{})", window.name, window.index).blue(),
        panes.dimmed()
    );
}

/// One-line totals, e.g. `2 windows (1 new), 5 panes (3 new)`
fn summary(windows: usize, new_windows: usize, panes: usize, new_panes: usize) -> String {
    format!(
        "{} ({} new), {} ({} new)",
        plural(windows, "window"),
        new_windows,
        plural(panes, "pane"),
        new_panes
    )
}

fn report_summary(report: &ApplyReport) {
    let line = summary(
        report.windows.len(),
        report.created_windows(),
        report.pane_count(),
        report.created_panes(),
    );
    eprintln!("{} {}", "✔".green(), line.bold());
}

/// Create what is missing and run every pane's commands
pub async fn up(workspace: &Workspace, path: &str, focus: bool) -> Result<()> {
    let spec = load(path)?;

    match workspace.apply(&spec, focus).await {
        Ok(report) => {
            if report.windows.is_empty() {
                eprintln!("{} {}", "!".yellow(), "Spec has no windows".dimmed());
                return Ok(());
            }
            for window in &report.windows {
                report_window(window);
            }
            report_summary(&report);
            Ok(())
        }
        Err(Error::PaneFailures(failures)) => {
            for failure in &failures {
                eprintln!("{} {}", "✘".red(), failure);
            }
            bail!("{} failed", plural(failures.len(), "pane"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Kill the windows of a spec that currently exist
pub async fn down(workspace: &Workspace, path: &str) -> Result<()> {
    let spec = load(path)?;
    let killed = workspace.teardown(&spec).await?;

    if killed.is_empty() {
        eprintln!("{}", "No matching windows running".dimmed());
        return Ok(());
    }
    for index in killed {
        eprintln!("{} {} :{}", "✔".green(), "Killed window".dimmed(), index);
    }
    Ok(())
}
