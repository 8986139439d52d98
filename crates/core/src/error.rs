//! Error types for tmuxup.
//!
//! Validation failures ([`Error::InvalidSpec`], [`Error::MissingVariable`]) are
//! raised before any window or pane is touched. The remaining variants come
//! out of the tmux driver or out of pane actions while a workspace is applied.

use std::{fmt, time::Duration};

use thiserror::Error;

/// All possible errors that can occur in tmuxup.
#[derive(Error, Debug)]
pub enum Error {
    /// The workspace spec has the wrong shape, or names an unknown action.
    #[error("Invalid spec: {0}")]
    InvalidSpec(String),

    /// `{{ $NAME }}` referenced an unset variable without a default.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),

    /// Tmux could not capture the content of a pane.
    #[error("Failed to capture pane :{window}.{pane}: {reason}")]
    Capture {
        window: u32,
        pane: u32,
        reason: String,
    },

    /// An `expect` action did not see its pattern in time.
    #[error("Timed out after {:.1}s waiting for /{pattern}/", .waited.as_secs_f64())]
    Timeout { pattern: String, waited: Duration },

    /// Any other tmux failure (non-zero exit, unexpected output).
    #[error("Tmux error: {0}")]
    Driver(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// One or more pane tasks failed while the workspace was applied.
    #[error("{} pane(s) failed", .0.len())]
    PaneFailures(Vec<PaneFailure>),
}

/// The outcome of a pane task that did not run to completion.
#[derive(Debug)]
pub struct PaneFailure {
    pub window_name: String,
    pub window_index: u32,
    pub pane_title: String,
    pub pane_index: u32,
    pub error: Error,
}

impl fmt::Display for PaneFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (:{}) / {} (.{}): {}",
            self.window_name, self.window_index, self.pane_title, self.pane_index, self.error
        )
    }
}

/// Convenient Result type alias for tmuxup operations.
pub type Result<T> = std::result::Result<T, Error>;
