//! Send key presses with `send-keys`.

use async_trait::async_trait;
use serde_yaml::Value;

use super::{PaneAction, PaneContext};
use crate::{
    error::{Error, Result},
    spec::scalar_to_string,
};

/// `keys` (alias `key`): a single key or a list of keys, sent unmodified
pub struct KeysAction;

/// Tokens of a keys body. Null entries carry no key.
fn tokens(body: &Value) -> Result<Vec<String>> {
    let entries = match body {
        Value::Sequence(seq) => seq.iter().collect(),
        single => vec![single],
    };
    entries
        .into_iter()
        .filter(|entry| !entry.is_null())
        .map(|entry| {
            scalar_to_string(entry).ok_or_else(|| {
                Error::InvalidSpec("Keys must be given as a string or a list".to_string())
            })
        })
        .collect()
}

#[async_trait]
impl PaneAction for KeysAction {
    fn validate(&self, body: &Value) -> Result<()> {
        tokens(body).map(drop)
    }

    async fn execute(&self, ctx: &PaneContext<'_>, body: &Value) -> Result<()> {
        let keys = tokens(body)?;
        ctx.driver.send_keys(ctx.window, ctx.pane, &keys).await
    }
}
