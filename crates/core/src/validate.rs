//! Shape checks run on a spec before anything is touched.
//!
//! Every failure is an [`Error::InvalidSpec`] naming the offending fragment.
//! Command lists are checked through the [`Registry`], so an unknown action
//! label is caught here rather than halfway through an apply.

use serde_yaml::{Mapping, Value};

use crate::{
    actions::Registry,
    error::{Error, Result},
    spec::{
        ITEMS_KEY, LAYOUT_KEY, PANES_KEY, WINDOWS_KEY, describe, has_item_token, is_scalar,
        name_of, scalar_to_string,
    },
};

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidSpec(message.into())
}

/// Validate a whole spec.
pub fn validate(spec: &Value, registry: &Registry) -> Result<()> {
    let windows = match spec {
        Value::Mapping(map) => {
            let windows = map
                .get(WINDOWS_KEY)
                .ok_or_else(|| invalid("windows key is not found"))?;
            validate_options(map, &[WINDOWS_KEY])?;
            windows
        }
        Value::Sequence(_) => spec,
        other => return Err(invalid(format!("Not a valid spec: {}", describe(other)))),
    };

    let Value::Sequence(windows) = windows else {
        return Err(invalid("windows must be given as a list"));
    };
    for window in windows {
        validate_window(window, registry)?;
    }
    Ok(())
}

/// Check option entries of a root or window mapping, skipping `reserved` keys.
fn validate_options(map: &Mapping, reserved: &[&str]) -> Result<()> {
    for (key, value) in map {
        if key.as_str().is_some_and(|k| reserved.contains(&k)) {
            continue;
        }
        if name_of(key).is_none() || !is_scalar(key) {
            return Err(invalid(format!("Invalid option name: {}", describe(key))));
        }
        if key.as_str() == Some(LAYOUT_KEY) {
            if !value.is_string() {
                return Err(invalid(format!(
                    "layout must be a string: {}",
                    describe(value)
                )));
            }
        } else if value.is_null() || !is_scalar(value) {
            return Err(invalid(format!(
                "Option {} must be a string, number or boolean: {}",
                describe(key),
                describe(value)
            )));
        }
    }
    Ok(())
}

/// The single `(key, value)` of a one-entry mapping with a usable name.
fn single_entry(map: &Mapping) -> Option<(&Value, &Value)> {
    let mut entries = map.iter();
    match (entries.next(), entries.next()) {
        (Some((key, value)), None) if is_scalar(key) && name_of(key).is_some() => {
            Some((key, value))
        }
        _ => None,
    }
}

/// Check an `items` list and return its values as strings
fn validate_items(items: &Value) -> Result<Vec<String>> {
    match items {
        Value::Sequence(seq) if !seq.is_empty() => seq
            .iter()
            .map(scalar_to_string)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| invalid("'items' must be a non-empty array of scalars")),
        _ => Err(invalid("'items' must be a non-empty array")),
    }
}

/// Validate one window entry:
///
/// - `name`
/// - `{name: [panes...]}`
/// - `{name: {panes: [panes...], layout: ..., items: [...], option: value}}`
pub fn validate_window(window: &Value, registry: &Registry) -> Result<()> {
    let message = || invalid(format!("Not a valid window spec: {}", describe(window)));

    let Value::Mapping(map) = window else {
        return match name_of(window) {
            Some(_) if is_scalar(window) => Ok(()),
            _ => Err(message()),
        };
    };

    let (_, body) = single_entry(map).ok_or_else(message)?;
    let mut items = None;
    let panes = match body {
        Value::Sequence(panes) => panes,
        Value::Mapping(body) => {
            items = body.get(ITEMS_KEY).map(validate_items).transpose()?;
            validate_options(body, &[PANES_KEY, ITEMS_KEY])?;
            match body.get(PANES_KEY) {
                None => return Ok(()),
                Some(Value::Sequence(panes)) => panes,
                Some(other) => {
                    return Err(invalid(format!(
                        "panes must be given as a list: {}",
                        describe(other)
                    )));
                }
            }
        }
        _ => return Err(message()),
    };

    for pane in panes {
        validate_pane(pane, items.as_deref(), registry)?;
    }
    Ok(())
}

/// The YAML parse of an unquoted `{{ item }}` title is a nested mapping.
fn unquoted_item_title(map: &Mapping) -> bool {
    map.keys()
        .filter(|key| key.is_mapping())
        .any(|key| describe(key).to_lowercase().contains(r#"{"item""#))
}

/// Validate one pane entry:
///
/// - `title`
/// - `{title: command}`
/// - `{title: [commands...]}`
/// - `{"title {{ item }}": commands, items: [...]}`
///
/// `window_items` are the items of the enclosing window. Commands are checked
/// once for every item the pane will be expanded with.
pub fn validate_pane(
    pane: &Value,
    window_items: Option<&[String]>,
    registry: &Registry,
) -> Result<()> {
    let message = || invalid(format!("Not a valid pane spec: {}", describe(pane)));

    let Value::Mapping(map) = pane else {
        return match name_of(pane) {
            Some(_) if is_scalar(pane) => Ok(()),
            _ => Err(message()),
        };
    };

    let items = map.get(ITEMS_KEY);
    let mut rest = map.clone();
    if items.is_some() {
        rest.remove(ITEMS_KEY);
    }

    let Some((title, commands)) = single_entry(&rest) else {
        if unquoted_item_title(&rest) {
            return Err(invalid(
                "Invalid pane title. Make sure to quote pane titles that start with {{ item }}.",
            ));
        }
        return Err(message());
    };

    let has_token = name_of(title).is_some_and(|title| has_item_token(&title));
    let own_items = items.map(validate_items).transpose()?;
    if own_items.is_some() && !has_token {
        return Err(invalid(
            "Pane title must contain {{ item }} when 'items' is given",
        ));
    }

    validate_commands(commands, registry)?;
    if has_token {
        for item in own_items.as_deref().or(window_items).unwrap_or_default() {
            registry.validate_commands_for_item(commands, item)?;
        }
    }
    Ok(())
}

/// Validate a pane's command list and each action body.
pub fn validate_commands(commands: &Value, registry: &Registry) -> Result<()> {
    registry.validate_commands(commands)
}
