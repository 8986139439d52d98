//! Subcommand handlers for the tmuxup CLI.

pub mod plan;
pub mod workspace;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tmuxup_core::{Spec, load_spec};

/// Expand a leading `~/` to the home directory
pub fn expand_path(path: &str) -> PathBuf {
    path.strip_prefix("~/")
        .and_then(|stripped| dirs::home_dir().map(|home| home.join(stripped)))
        .unwrap_or_else(|| PathBuf::from(path))
}

/// Load a spec file, or stdin for `-`
pub fn load(path: &str) -> Result<Spec> {
    let expanded = expand_path(path);
    load_spec(&expanded).with_context(|| format!("Failed to load {}", display_path(&expanded)))
}

/// Convert absolute path to display path (replace home with ~)
fn display_path(path: &Path) -> String {
    if path == Path::new("-") {
        return "stdin".to_string();
    }
    dirs::home_dir()
        .and_then(|home| {
            path.strip_prefix(&home)
                .ok()
                .map(|rel| Path::new("~").join(rel).display().to_string())
        })
        .unwrap_or_else(|| path.display().to_string())
}
