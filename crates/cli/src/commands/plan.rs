//! `plan`: show how a spec resolves without touching anything.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use tmuxup_core::{PaneDescriptor, Plan, WindowDescriptor, WindowOptions, Workspace};

use super::load;

/// JSON output format for one planned pane
#[derive(Serialize)]
pub struct PaneRow {
    pub window: String,
    /// Resolved window index, `None` when the window will be created
    pub window_index: Option<u32>,
    pub pane: String,
    pub pane_index: Option<u32>,
    pub item: Option<String>,
}

fn rows(window: &WindowDescriptor) -> Vec<PaneRow> {
    let row = |pane: Option<&PaneDescriptor>| PaneRow {
        window: window.name.clone(),
        window_index: window.index,
        pane: pane.map(|p| p.title.clone()).unwrap_or_default(),
        pane_index: pane.and_then(|p| p.index),
        item: pane.and_then(|p| p.item.clone()),
    };
    if window.panes.is_empty() {
        vec![row(None)]
    } else {
        window.panes.iter().map(|p| row(Some(p))).collect()
    }
}

fn index_cell(index: Option<u32>) -> String {
    match index {
        Some(index) => index.to_string(),
        None => "new".green().to_string(),
    }
}

fn print_table(plan: &Plan) {
    use comfy_table::{Table, presets::NOTHING};

    if plan.windows.is_empty() {
        println!("{}", "Spec has no windows".dimmed());
        return;
    }

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec!["WINDOW", "INDEX", "PANE", "INDEX", "ITEM"]);

    for row in plan.windows.iter().flat_map(rows) {
        let pane_index = if row.pane.is_empty() {
            "-".dimmed().to_string()
        } else {
            index_cell(row.pane_index)
        };
        table.add_row(vec![
            row.window.blue().to_string(),
            index_cell(row.window_index),
            row.pane,
            pane_index,
            row.item.unwrap_or_default().dimmed().to_string(),
        ]);
    }

    println!("{table}");
}

/// Print the interpreted plan as a table or JSON
pub async fn show(workspace: &Workspace, path: &str, json: bool) -> Result<()> {
    let spec = load(path)?;
    let plan = workspace.plan(&spec).await?;

    if json {
        #[derive(Serialize)]
        struct Output<'a> {
            panes: Vec<PaneRow>,
            options: &'a WindowOptions,
        }
        let output = Output {
            panes: plan.windows.iter().flat_map(rows).collect(),
            options: &plan.options,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_table(&plan);
    }

    Ok(())
}
