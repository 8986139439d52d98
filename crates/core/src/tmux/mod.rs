//! Tmux integration for tmuxup workspaces.
//!
//! # Submodules
//!
//! - [`driver`]: The [`Driver`] trait the engine talks to, plus the live pane
//!   snapshot and window option types it exchanges
//! - [`commands`]: [`TmuxDriver`], the implementation that shells out to tmux
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use tmuxup_core::{Workspace, tmux::TmuxDriver};
//!
//! let workspace = Workspace::new(Arc::new(TmuxDriver::new().socket_name("dev")));
//! workspace.apply(&spec, true).await?;
//! ```

mod commands;
mod driver;

pub use commands::*;
pub use driver::*;
