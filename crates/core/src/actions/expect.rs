//! Wait for a pattern to appear in the pane.
//!
//! The pane is captured every [`ExpectSettings::interval`] until its visible
//! text matches or [`ExpectSettings::timeout`] has elapsed. A failing capture
//! ends the wait immediately; it is never treated as a non-match.
//!
//! The pane's item is escaped before it is placed into the pattern, so an
//! item always matches literally.

use std::time::Duration;

use async_trait::async_trait;
use fancy_regex::Regex;
use serde_yaml::Value;
use tokio::time::Instant;

use super::{PaneAction, PaneContext};
use crate::{
    error::{Error, Result},
    spec::{has_item_token, scalar_to_string, substitute_item},
};

/// Default time to wait for a match
pub const EXPECT_TIMEOUT: Duration = Duration::from_secs(60);
/// Default delay between two captures
pub const EXPECT_INTERVAL: Duration = Duration::from_millis(500);

/// Timing of the `expect` poll loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpectSettings {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for ExpectSettings {
    fn default() -> Self {
        Self {
            timeout: EXPECT_TIMEOUT,
            interval: EXPECT_INTERVAL,
        }
    }
}

/// `expect`: a regular expression matched against the captured pane
pub struct ExpectAction {
    settings: ExpectSettings,
}

impl ExpectAction {
    pub fn new(settings: ExpectSettings) -> Self {
        Self { settings }
    }
}

/// `^` and `$` anchor at line boundaries of the captured screen.
fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("(?m){}", pattern))
        .map_err(|e| Error::InvalidSpec(format!("Invalid pattern /{}/: {}", pattern, e)))
}

fn condition(body: &Value) -> Result<String> {
    scalar_to_string(body)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| Error::InvalidSpec("Expect condition is empty".to_string()))
}

/// The pattern for a pane bound to `item`, with the item escaped
fn render_pattern(body: &Value, item: Option<&str>) -> Result<String> {
    let pattern = condition(body)?;
    Ok(match item {
        Some(item) => substitute_item(&pattern, &fancy_regex::escape(item)),
        None => pattern,
    })
}

#[async_trait]
impl PaneAction for ExpectAction {
    fn validate(&self, body: &Value) -> Result<()> {
        let pattern = condition(body)?;
        // Templated patterns are only complete once the item is known
        if !has_item_token(&pattern) {
            compile(&pattern)?;
        }
        Ok(())
    }

    fn validate_for_item(&self, body: &Value, item: &str) -> Result<()> {
        compile(&render_pattern(body, Some(item))?).map(drop)
    }

    async fn execute(&self, ctx: &PaneContext<'_>, body: &Value) -> Result<()> {
        let pattern = render_pattern(body, ctx.item)?;
        let regex = compile(&pattern)?;

        let started = Instant::now();
        let deadline = started + self.settings.timeout;
        loop {
            tokio::time::sleep(self.settings.interval).await;

            let content = ctx.driver.capture_pane(ctx.window, ctx.pane).await?;
            let matched = regex.is_match(&content).map_err(|e| {
                Error::InvalidSpec(format!("Failed to match /{}/: {}", pattern, e))
            })?;
            if matched {
                return Ok(());
            }
            if Instant::now() > deadline {
                return Err(Error::Timeout {
                    pattern,
                    waited: started.elapsed(),
                });
            }
        }
    }
}
