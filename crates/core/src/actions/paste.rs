//! Paste a command into the pane as buffered input.

use async_trait::async_trait;
use serde_yaml::Value;

use super::{PaneAction, PaneContext};
use crate::{
    error::{Error, Result},
    spec::{describe, is_scalar},
};

/// Default action for bare string commands
pub struct PasteAction;

#[async_trait]
impl PaneAction for PasteAction {
    fn validate(&self, body: &Value) -> Result<()> {
        if is_scalar(body) {
            Ok(())
        } else {
            Err(Error::InvalidSpec(format!(
                "Invalid command: {}",
                describe(body)
            )))
        }
    }

    async fn execute(&self, ctx: &PaneContext<'_>, body: &Value) -> Result<()> {
        let text = ctx.substitute(body);
        ctx.driver.send_text(ctx.window, ctx.pane, &text).await
    }
}
