//! Tmux command wrappers
//!
//! [`TmuxDriver`] runs the `tmux` binary for every [`Driver`] operation. All
//! invocations go through one async mutex so concurrent pane tasks never
//! interleave their commands.

use std::process::{Output, Stdio};

use async_trait::async_trait;
use colored::Colorize;
use tokio::{io::AsyncWriteExt, process::Command, sync::Mutex};

use super::driver::{Driver, ExistingPane, PANE_BASE_INDEX, WindowOptions};
use crate::error::{Error, Result};

/// Field separator for `list-panes` output
const LIST_DELIMITER: &str = "::::";
/// Paste buffer used for `send_text`
const PASTE_BUFFER: &str = "tmuxup";

/// Driver backed by the `tmux` command line client.
#[derive(Debug, Default)]
pub struct TmuxDriver {
    socket: Option<String>,
    debug: bool,
    lock: Mutex<()>,
}

impl TmuxDriver {
    /// Create a driver for the default tmux server
    pub fn new() -> Self {
        Self::default()
    }

    /// Talk to the server listening on socket `name` (`tmux -L name`)
    pub fn socket_name(mut self, name: impl Into<String>) -> Self {
        self.socket = Some(name.into());
        self
    }

    /// Echo every tmux command to stderr before running it
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Execute a tmux command and return its output, optionally feeding stdin
    async fn tmux(&self, args: &[&str], input: Option<&str>) -> Result<Output> {
        let _guard = self.lock.lock().await;

        if self.debug {
            eprintln!("{} {}", "tmux".dimmed(), args.join(" ").dimmed());
        }

        let mut command = Command::new("tmux");
        if let Some(socket) = &self.socket {
            command.args(["-L", socket]);
        }
        command
            .args(args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command
            .spawn()
            .map_err(|e| Error::Driver(format!("failed to execute tmux: {}", e)))?;

        if let Some(text) = input
            && let Some(mut stdin) = child.stdin.take()
        {
            stdin.write_all(text.as_bytes()).await?;
        }

        Ok(child.wait_with_output().await?)
    }

    /// Execute a tmux command, returning an error if it fails
    async fn tmux_run(&self, args: &[&str]) -> Result<String> {
        let output = self.tmux(args, None).await?;
        check(args, &output)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }

    async fn set_pane_title(&self, window: u32, pane: u32, title: &str) -> Result<()> {
        let target = target(window, Some(pane));
        self.tmux_run(&["select-pane", "-t", &target, "-T", title])
            .await
            .map(drop)
    }
}

/// Target identifier for tmux commands in the current session
fn target(window: u32, pane: Option<u32>) -> String {
    match pane {
        Some(pane) => format!(":{}.{}", window, pane),
        None => format!(":{}", window),
    }
}

fn check(args: &[&str], output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(Error::Driver(format!(
        "tmux {} failed: {}",
        args.join(" "),
        stderr.trim()
    )))
}

fn parse_index(output: &str) -> Result<u32> {
    output
        .trim()
        .parse()
        .map_err(|_| Error::Driver(format!("expected an index, got {:?}", output)))
}

fn parse_pane_line(line: &str) -> Result<ExistingPane> {
    let parts: Vec<&str> = line.splitn(4, LIST_DELIMITER).collect();
    let [window_index, window_name, pane_index, pane_title] = parts.as_slice() else {
        return Err(Error::Driver(format!("unexpected list-panes line: {:?}", line)));
    };
    Ok(ExistingPane {
        window_index: parse_index(window_index)?,
        window_name: window_name.to_string(),
        pane_index: parse_index(pane_index)?,
        pane_title: pane_title.to_string(),
    })
}

/// Build the chained `set-window-option` invocation for `options`
fn window_option_args(window: u32, options: &WindowOptions) -> Vec<String> {
    let target = target(window, None);
    let mut args = Vec::new();
    for (key, value) in options {
        if !args.is_empty() {
            args.push(";".to_string());
        }
        args.extend([
            "set-window-option".to_string(),
            "-t".to_string(),
            target.clone(),
            key.clone(),
            value.to_string(),
        ]);
    }
    args
}

#[async_trait]
impl Driver for TmuxDriver {
    async fn list_panes(&self) -> Result<Vec<ExistingPane>> {
        let format = ["window_index", "window_name", "pane_index", "pane_title"]
            .map(|field| format!("#{{{}}}", field))
            .join(LIST_DELIMITER);
        let args = ["list-panes", "-s", "-F", format.as_str()];
        let output = self.tmux(&args, None).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // Nothing exists yet
            if stderr.contains("no server running") || stderr.contains("no current") {
                return Ok(Vec::new());
            }
            check(&args, &output)?;
        }

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.is_empty())
            .map(parse_pane_line)
            .collect()
    }

    async fn create_window(
        &self,
        name: &str,
        first_pane_title: Option<&str>,
        options: &WindowOptions,
    ) -> Result<u32> {
        let stdout = self
            .tmux_run(&["new-window", "-d", "-P", "-F", "#{window_index}", "-n", name])
            .await?;
        let index = parse_index(&stdout)?;

        self.set_window_options(index, options).await?;
        if let Some(title) = first_pane_title {
            self.set_pane_title(index, PANE_BASE_INDEX, title).await?;
        }

        Ok(index)
    }

    async fn split_window(&self, window: u32, pane_title: &str) -> Result<u32> {
        let window_target = target(window, None);
        let stdout = self
            .tmux_run(&[
                "split-window",
                "-d",
                "-P",
                "-F",
                "#{pane_index}",
                "-t",
                &window_target,
            ])
            .await?;
        let pane = parse_index(&stdout)?;

        self.set_pane_title(window, pane, pane_title).await?;
        self.tmux_run(&["select-pane", "-t", &target(window, Some(pane))])
            .await?;

        Ok(pane)
    }

    async fn set_window_options(&self, window: u32, options: &WindowOptions) -> Result<()> {
        let args = window_option_args(window, options);
        if args.is_empty() {
            return Ok(());
        }
        let args_ref: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
        self.tmux_run(&args_ref).await.map(drop)
    }

    async fn select_layout(&self, window: u32, layout: &str) -> Result<()> {
        self.tmux_run(&["select-layout", "-t", &target(window, None), layout])
            .await
            .map(drop)
    }

    async fn select_window(&self, window: u32) -> Result<()> {
        self.tmux_run(&["select-window", "-t", &target(window, None)])
            .await
            .map(drop)
    }

    async fn kill_window(&self, window: u32) -> Result<()> {
        self.tmux_run(&["kill-window", "-t", &target(window, None)])
            .await
            .map(drop)
    }

    async fn capture_pane(&self, window: u32, pane: u32) -> Result<String> {
        let output = self
            .tmux(&["capture-pane", "-p", "-t", &target(window, Some(pane))], None)
            .await?;

        if !output.status.success() {
            return Err(Error::Capture {
                window,
                pane,
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn send_text(&self, window: u32, pane: u32, text: &str) -> Result<()> {
        let pane_target = target(window, Some(pane));
        let args = [
            "load-buffer",
            "-b",
            PASTE_BUFFER,
            "-",
            ";",
            "paste-buffer",
            "-d",
            "-b",
            PASTE_BUFFER,
            "-t",
            pane_target.as_str(),
        ];
        let output = self.tmux(&args, Some(&format!("{}\n", text))).await?;
        check(&args, &output)
    }

    async fn send_keys(&self, window: u32, pane: u32, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let pane_target = target(window, Some(pane));
        let mut args = vec!["send-keys", "-t", pane_target.as_str()];
        args.extend(keys.iter().map(|k| k.as_str()));
        self.tmux_run(&args).await.map(drop)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmux::OptionValue;

    #[test]
    fn test_target() {
        assert_eq!(target(3, None), ":3");
        assert_eq!(target(3, Some(1)), ":3.1");
    }

    #[test]
    fn test_parse_pane_line() {
        let pane = parse_pane_line("2::::editor::::1::::build:: all").unwrap();
        assert_eq!(
            pane,
            ExistingPane {
                window_index: 2,
                window_name: "editor".to_string(),
                pane_index: 1,
                pane_title: "build:: all".to_string(),
            }
        );
        assert!(parse_pane_line("garbage").is_err());
        assert!(parse_pane_line("x::::w::::1::::t").is_err());
    }

    #[test]
    fn test_window_option_args_are_chained() {
        let mut options = WindowOptions::new();
        options.insert("synchronize-panes".to_string(), OptionValue::Flag(true));
        options.insert("pane-base-index".to_string(), OptionValue::Number(0));

        assert_eq!(
            window_option_args(4, &options),
            vec![
                "set-window-option",
                "-t",
                ":4",
                "synchronize-panes",
                "on",
                ";",
                "set-window-option",
                "-t",
                ":4",
                "pane-base-index",
                "0",
            ]
        );
        assert!(window_option_args(4, &WindowOptions::new()).is_empty());
    }
}
