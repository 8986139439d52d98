//! In-memory tmux stand-in for workspace tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tmuxup_core::{Driver, Error, ExistingPane, Result, WindowOptions};
use tokio::sync::Mutex;

/// State of a single fake pane.
#[derive(Debug, Clone, Default)]
pub struct FakePane {
    pub title: String,
    /// Accumulated screen text
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct FakeWindow {
    pub name: String,
    pub panes: BTreeMap<u32, FakePane>,
    pub options: WindowOptions,
    pub layout: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    windows: BTreeMap<u32, FakeWindow>,
    calls: Vec<String>,
    failing_captures: HashSet<(u32, u32)>,
}

/// Simulates windows and panes, and records every driver call.
///
/// Pasted text shows up on the pane's screen after a `$ ` prompt. Commands
/// starting with `echo ` also print their argument with shell quotes removed.
#[derive(Debug, Default)]
pub struct FakeDriver {
    state: Mutex<State>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the server with `(window_index, window_name, pane_index, pane_title)`.
    pub fn with_panes(panes: &[(u32, &str, u32, &str)]) -> Self {
        let mut state = State::default();
        for &(window_index, window_name, pane_index, pane_title) in panes {
            let window = state.windows.entry(window_index).or_default();
            window.name = window_name.to_string();
            window.panes.insert(
                pane_index,
                FakePane {
                    title: pane_title.to_string(),
                    content: String::new(),
                },
            );
        }
        Self {
            state: Mutex::new(state),
        }
    }

    /// Make every capture of the pane fail.
    pub async fn fail_capture(&self, window: u32, pane: u32) {
        self.state.lock().await.failing_captures.insert((window, pane));
    }

    pub async fn calls(&self) -> Vec<String> {
        self.state.lock().await.calls.clone()
    }

    pub async fn window(&self, index: u32) -> Option<FakeWindow> {
        self.state.lock().await.windows.get(&index).cloned()
    }

    pub async fn windows(&self) -> BTreeMap<u32, FakeWindow> {
        self.state.lock().await.windows.clone()
    }
}

fn echo_output(text: &str) -> Option<String> {
    let argument = text.strip_prefix("echo ")?;
    Some(argument.chars().filter(|c| *c != '"' && *c != '\'').collect())
}

fn missing(what: String) -> Error {
    Error::Driver(format!("can't find {}", what))
}

impl State {
    fn window_mut(&mut self, index: u32) -> Result<&mut FakeWindow> {
        self.windows
            .get_mut(&index)
            .ok_or_else(|| missing(format!("window :{}", index)))
    }

    fn pane_mut(&mut self, window: u32, pane: u32) -> Result<&mut FakePane> {
        self.window_mut(window)?
            .panes
            .get_mut(&pane)
            .ok_or_else(|| missing(format!("pane :{}.{}", window, pane)))
    }
}

#[async_trait]
impl Driver for FakeDriver {
    async fn list_panes(&self) -> Result<Vec<ExistingPane>> {
        let mut state = self.state.lock().await;
        state.calls.push("list_panes".to_string());
        Ok(state
            .windows
            .iter()
            .flat_map(|(&window_index, window)| {
                window.panes.iter().map(move |(&pane_index, pane)| ExistingPane {
                    window_index,
                    window_name: window.name.clone(),
                    pane_index,
                    pane_title: pane.title.clone(),
                })
            })
            .collect())
    }

    async fn create_window(
        &self,
        name: &str,
        first_pane_title: Option<&str>,
        options: &WindowOptions,
    ) -> Result<u32> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("create_window {}", name));
        let index = state.windows.keys().next_back().map_or(1, |last| last + 1);

        let mut panes = BTreeMap::new();
        panes.insert(
            0,
            FakePane {
                title: first_pane_title.unwrap_or_default().to_string(),
                content: String::new(),
            },
        );
        state.windows.insert(
            index,
            FakeWindow {
                name: name.to_string(),
                panes,
                options: options.clone(),
                layout: None,
            },
        );
        Ok(index)
    }

    async fn split_window(&self, window: u32, pane_title: &str) -> Result<u32> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("split_window {} {}", window, pane_title));
        let panes = &mut state.window_mut(window)?.panes;
        let index = panes.keys().next_back().map_or(0, |last| last + 1);
        panes.insert(
            index,
            FakePane {
                title: pane_title.to_string(),
                content: String::new(),
            },
        );
        Ok(index)
    }

    async fn set_window_options(&self, window: u32, options: &WindowOptions) -> Result<()> {
        let mut state = self.state.lock().await;
        let keys: Vec<&str> = options.keys().map(String::as_str).collect();
        state
            .calls
            .push(format!("set_window_options {} {}", window, keys.join(",")));
        let target = &mut state.window_mut(window)?.options;
        target.extend(options.clone());
        Ok(())
    }

    async fn select_layout(&self, window: u32, layout: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("select_layout {} {}", window, layout));
        state.window_mut(window)?.layout = Some(layout.to_string());
        Ok(())
    }

    async fn select_window(&self, window: u32) -> Result<()> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("select_window {}", window));
        state.window_mut(window).map(drop)
    }

    async fn kill_window(&self, window: u32) -> Result<()> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("kill_window {}", window));
        state
            .windows
            .remove(&window)
            .map(drop)
            .ok_or_else(|| missing(format!("window :{}", window)))
    }

    async fn capture_pane(&self, window: u32, pane: u32) -> Result<String> {
        let mut state = self.state.lock().await;
        if state.failing_captures.contains(&(window, pane)) {
            return Err(Error::Capture {
                window,
                pane,
                reason: "capture refused".to_string(),
            });
        }
        Ok(state.pane_mut(window, pane)?.content.trim().to_string())
    }

    async fn send_text(&self, window: u32, pane: u32, text: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .calls
            .push(format!("send_text {}.{} {}", window, pane, text));
        let pane = state.pane_mut(window, pane)?;
        pane.content.push_str(&format!("$ {}\n", text));
        if let Some(output) = echo_output(text) {
            pane.content.push_str(&format!("{}\n", output));
        }
        Ok(())
    }

    async fn send_keys(&self, window: u32, pane: u32, keys: &[String]) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .calls
            .push(format!("send_keys {}.{} {}", window, pane, keys.join(" ")));
        state.pane_mut(window, pane).map(drop)
    }
}
