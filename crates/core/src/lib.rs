//! Tmuxup Core - Core library for the tmuxup workspace provisioner
//!
//! This crate provides the core functionality for tmuxup including:
//! - Spec loading, environment substitution and validation
//! - Interpretation of a spec against the live tmux panes
//! - Window/pane reconciliation and concurrent pane actions
//! - The tmux driver

pub mod actions;
pub mod env;
pub mod error;
pub mod indexer;
pub mod interpret;
pub mod reconcile;
pub mod spec;
pub mod tmux;
pub mod validate;
pub mod workspace;

// Re-export commonly used types at crate root
pub use actions::{ExpectSettings, PaneAction, PaneContext, Registry};
pub use error::{Error, PaneFailure, Result};
pub use interpret::{PaneDescriptor, WindowDescriptor};
pub use spec::{Spec, load_spec, parse_spec};
pub use tmux::{Driver, ExistingPane, OptionValue, TmuxDriver, WindowOptions};
pub use workspace::{AppliedPane, AppliedWindow, ApplyReport, Plan, Workspace};
