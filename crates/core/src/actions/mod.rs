//! Pane actions
//!
//! This module provides the [`PaneAction`] trait and the built-in actions a
//! pane's command list can name. A command entry is either a bare scalar,
//! which is pasted, or a one-entry mapping `label: body` naming a registered
//! action explicitly.
//!
//! The [`Registry`] maps labels to action instances. One registry is
//! installed per process before any spec is processed and is read-only from
//! then on.

mod expect;
mod keys;
mod paste;
mod sleep;

use std::{
    collections::HashMap,
    sync::{Arc, OnceLock},
};

use async_trait::async_trait;
use serde_yaml::Value;

pub use expect::{EXPECT_INTERVAL, EXPECT_TIMEOUT, ExpectAction, ExpectSettings};
pub use keys::KeysAction;
pub use paste::PasteAction;
pub use sleep::SleepAction;

use crate::{
    error::{Error, Result},
    spec::{describe, is_scalar, name_of, scalar_to_string, substitute_item},
    tmux::Driver,
};

/// Label used for bare scalar commands
pub const DEFAULT_ACTION: &str = "paste";

/// Trait for actions applied to a single pane
#[async_trait]
pub trait PaneAction: Send + Sync {
    /// Check the shape of `body`. Runs before anything is touched.
    fn validate(&self, _body: &Value) -> Result<()> {
        Ok(())
    }

    /// Check `body` as it will run on a pane bound to `item`.
    fn validate_for_item(&self, _body: &Value, _item: &str) -> Result<()> {
        Ok(())
    }

    /// Perform the action on the pane described by `ctx`
    async fn execute(&self, ctx: &PaneContext<'_>, body: &Value) -> Result<()>;
}

/// The pane an action runs against.
pub struct PaneContext<'a> {
    pub driver: &'a dyn Driver,
    pub window: u32,
    pub pane: u32,
    /// Item the pane was expanded from, if any
    pub item: Option<&'a str>,
}

impl PaneContext<'_> {
    /// Render a scalar body and replace the item placeholder with the pane's
    /// item. Without an item the text is returned unchanged.
    pub fn substitute(&self, body: &Value) -> String {
        let text = scalar_to_string(body).unwrap_or_default();
        match self.item {
            Some(item) => substitute_item(&text, item),
            None => text,
        }
    }
}

/// Label to action table.
#[derive(Default, Clone)]
pub struct Registry {
    actions: HashMap<String, Arc<dyn PaneAction>>,
}

impl Registry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in actions, with `expect` timing taken from `expect`
    pub fn builtin(expect: ExpectSettings) -> Self {
        let mut registry = Self::new();
        registry.register(&[DEFAULT_ACTION], Arc::new(PasteAction));
        registry.register(&["keys", "key"], Arc::new(KeysAction));
        registry.register(&["sleep"], Arc::new(SleepAction));
        registry.register(&["expect"], Arc::new(ExpectAction::new(expect)));
        registry
    }

    /// Associate one action instance with every label in `labels`
    pub fn register(&mut self, labels: &[&str], action: Arc<dyn PaneAction>) {
        for label in labels {
            self.actions.insert(label.to_string(), Arc::clone(&action));
        }
    }

    pub fn get(&self, label: &str) -> Option<&Arc<dyn PaneAction>> {
        self.actions.get(label)
    }

    fn lookup(&self, label: &str) -> Result<&Arc<dyn PaneAction>> {
        self.get(label)
            .ok_or_else(|| Error::InvalidSpec(format!("Unsupported action: {}", label)))
    }

    /// Validate every entry of a pane's command list
    pub fn validate_commands(&self, commands: &Value) -> Result<()> {
        for (label, body) in parse_commands(commands)? {
            self.lookup(&label)?.validate(body)?;
        }
        Ok(())
    }

    /// Check a pane's command list against the item the pane is bound to
    pub fn validate_commands_for_item(&self, commands: &Value, item: &str) -> Result<()> {
        for (label, body) in parse_commands(commands)? {
            self.lookup(&label)?.validate_for_item(body, item)?;
        }
        Ok(())
    }

    /// Run a pane's command list in order, stopping at the first failure
    pub async fn run_commands(&self, ctx: &PaneContext<'_>, commands: &Value) -> Result<()> {
        for (label, body) in parse_commands(commands)? {
            self.lookup(&label)?.execute(ctx, body).await?;
        }
        Ok(())
    }
}

/// Split a command list into `(label, body)` pairs.
///
/// Null entries are skipped and bare scalars map to [`DEFAULT_ACTION`].
pub fn parse_commands(commands: &Value) -> Result<Vec<(String, &Value)>> {
    let entries = match commands {
        Value::Sequence(seq) => seq.iter().collect(),
        single => vec![single],
    };

    let mut parsed = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            Value::Null => {}
            Value::Mapping(map) if map.len() == 1 => {
                let Some((key, body)) = map.iter().next() else {
                    continue;
                };
                let label = name_of(key).filter(|_| is_scalar(key)).ok_or_else(|| {
                    Error::InvalidSpec(format!("Invalid action: {}", describe(entry)))
                })?;
                parsed.push((label, body));
            }
            Value::Mapping(_) | Value::Sequence(_) => {
                return Err(Error::InvalidSpec(format!(
                    "Invalid command: {}",
                    describe(entry)
                )));
            }
            scalar => parsed.push((DEFAULT_ACTION.to_string(), scalar)),
        }
    }
    Ok(parsed)
}

static REGISTRY: OnceLock<Arc<Registry>> = OnceLock::new();

/// Install the process-wide registry. The first call wins; later calls
/// return the registry already in place.
pub fn install(registry: Registry) -> Arc<Registry> {
    Arc::clone(REGISTRY.get_or_init(|| Arc::new(registry)))
}

/// The process-wide registry, defaulting to the built-in actions
pub fn registry() -> Arc<Registry> {
    Arc::clone(REGISTRY.get_or_init(|| Arc::new(Registry::builtin(ExpectSettings::default()))))
}
