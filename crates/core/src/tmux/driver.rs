//! The interface between the reconciliation engine and tmux.

use std::fmt;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::Result;

// =============================================================================
// Tmux option keys and values
// =============================================================================

const OPT_AUTOMATIC_RENAME: &str = "automatic-rename";
const OPT_ALLOW_RENAME: &str = "allow-rename";
const OPT_PANE_BASE_INDEX: &str = "pane-base-index";
const OPT_PANE_BORDER_STATUS: &str = "pane-border-status";
const OPT_PANE_BORDER_FORMAT: &str = "pane-border-format";

const VAL_OFF: &str = "off";
const VAL_BOTTOM: &str = "bottom";

/// Pane border format template
const PANE_BORDER_FORMAT: &str = "#{pane_title}";

/// Index of the first pane of every window created by tmuxup.
pub const PANE_BASE_INDEX: u32 = 0;

/// One live pane, as reported by `list-panes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingPane {
    pub window_index: u32,
    pub window_name: String,
    pub pane_index: u32,
    pub pane_title: String,
}

/// Value of a tmux window option.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Flag(bool),
    Number(i64),
    Text(String),
}

impl OptionValue {
    /// Convert a scalar spec value. Sequences, mappings and null are rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Flag(*b)),
            Value::Number(n) => Some(
                n.as_i64()
                    .map(Self::Number)
                    .unwrap_or_else(|| Self::Text(n.to_string())),
            ),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Tagged(tagged) => Self::from_value(&tagged.value),
            Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
        }
    }
}

/// Renders the way tmux expects it: booleans become `on`/`off`.
impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Flag(true) => write!(f, "on"),
            OptionValue::Flag(false) => write!(f, "off"),
            OptionValue::Number(n) => write!(f, "{}", n),
            OptionValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Flag(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Number(value)
    }
}

/// Window options in the order they are applied.
pub type WindowOptions = IndexMap<String, OptionValue>;

/// Options applied to every window tmuxup creates.
pub fn default_window_options() -> WindowOptions {
    let mut options = WindowOptions::new();
    options.insert(OPT_AUTOMATIC_RENAME.to_string(), VAL_OFF.into());
    options.insert(OPT_ALLOW_RENAME.to_string(), VAL_OFF.into());
    options.insert(
        OPT_PANE_BASE_INDEX.to_string(),
        OptionValue::Number(i64::from(PANE_BASE_INDEX)),
    );
    options.insert(OPT_PANE_BORDER_STATUS.to_string(), VAL_BOTTOM.into());
    options.insert(OPT_PANE_BORDER_FORMAT.to_string(), PANE_BORDER_FORMAT.into());
    options
}

/// Operations the engine requests from a terminal multiplexer.
///
/// Implementations are shared by every pane task of an apply call and must
/// run each invocation atomically with respect to the others.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Snapshot of every live pane.
    async fn list_panes(&self) -> Result<Vec<ExistingPane>>;

    /// Create a detached window, apply `options`, and title its first pane.
    ///
    /// Returns the index of the new window.
    async fn create_window(
        &self,
        name: &str,
        first_pane_title: Option<&str>,
        options: &WindowOptions,
    ) -> Result<u32>;

    /// Split a window, title the new pane, and return its index.
    async fn split_window(&self, window: u32, pane_title: &str) -> Result<u32>;

    async fn set_window_options(&self, window: u32, options: &WindowOptions) -> Result<()>;

    async fn select_layout(&self, window: u32, layout: &str) -> Result<()>;

    async fn select_window(&self, window: u32) -> Result<()>;

    async fn kill_window(&self, window: u32) -> Result<()>;

    /// Visible text of a pane. Fails with [`Error::Capture`](crate::Error::Capture).
    async fn capture_pane(&self, window: u32, pane: u32) -> Result<String>;

    /// Paste `text` into a pane as buffered input.
    async fn send_text(&self, window: u32, pane: u32, text: &str) -> Result<()>;

    /// Send each token as a discrete key press.
    async fn send_keys(&self, window: u32, pane: u32, keys: &[String]) -> Result<()>;
}
