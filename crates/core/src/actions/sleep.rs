//! Pause the pane's command list.

use std::time::Duration;

use async_trait::async_trait;
use serde_yaml::Value;

use super::{PaneAction, PaneContext};
use crate::{
    error::{Error, Result},
    spec::scalar_to_string,
};

/// `sleep`: a positive number of seconds, given as a number or a string
pub struct SleepAction;

fn duration(body: &Value) -> Result<Duration> {
    scalar_to_string(body)
        .and_then(|text| text.trim().parse::<f64>().ok())
        .filter(|secs| *secs > 0.0)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| Error::InvalidSpec("Sleep expects positive number".to_string()))
}

#[async_trait]
impl PaneAction for SleepAction {
    fn validate(&self, body: &Value) -> Result<()> {
        duration(body).map(drop)
    }

    async fn execute(&self, _ctx: &PaneContext<'_>, body: &Value) -> Result<()> {
        tokio::time::sleep(duration(body)?).await;
        Ok(())
    }
}
