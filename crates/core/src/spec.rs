//! Workspace spec tree and loading.
//!
//! A spec is the parsed YAML document as a [`serde_yaml::Value`]. The rest of
//! the crate reads it through the helpers in this module so that scalar keys
//! and values (numbers, booleans) are treated the same way everywhere.

use std::{
    io::Read,
    path::Path,
    sync::LazyLock,
};

use fancy_regex::Regex;
use serde_yaml::Value;

use crate::{
    env::substitute_env,
    error::{Error, Result},
};

// =============================================================================
// Reserved keys
// =============================================================================

pub const WINDOWS_KEY: &str = "windows";
pub const LAYOUT_KEY: &str = "layout";
pub const PANES_KEY: &str = "panes";
pub const ITEMS_KEY: &str = "items";

/// Parsed workspace spec.
pub type Spec = Value;

/// `{{ item }}`, case-insensitive, spaces allowed inside the braces.
static ITEM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{\{ *item *\}\}").expect("item pattern is valid"));

/// Check whether a pane title or command contains the item placeholder.
pub fn has_item_token(text: &str) -> bool {
    ITEM_PATTERN.is_match(text).unwrap_or(false)
}

/// Replace every item placeholder in `text` with `item`, taken literally.
pub fn substitute_item(text: &str, item: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for found in ITEM_PATTERN.find_iter(text).flatten() {
        out.push_str(&text[last..found.start()]);
        out.push_str(item);
        last = found.end();
    }
    out.push_str(&text[last..]);
    out
}

/// Render a scalar as a string. Returns `None` for sequences and mappings.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// A non-empty scalar usable as a window name, pane title or action label.
pub fn name_of(value: &Value) -> Option<String> {
    if value.is_null() {
        return None;
    }
    scalar_to_string(value).filter(|s| !s.is_empty())
}

pub fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Sequence(_) | Value::Mapping(_))
}

/// Compact flow-style rendering of a spec fragment for error messages.
pub fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => format!("{:?}", s),
        Value::Bool(_) | Value::Number(_) => scalar_to_string(value).unwrap_or_default(),
        Value::Sequence(seq) => {
            let parts: Vec<String> = seq.iter().map(describe).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Mapping(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", describe(k), describe(v)))
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
        Value::Tagged(tagged) => format!("{} {}", tagged.tag, describe(&tagged.value)),
    }
}

/// Parse a raw spec document: environment pre-pass first, then YAML.
pub fn parse_spec(raw: &str) -> Result<Spec> {
    let substituted = substitute_env(raw)?;
    serde_yaml::from_str(&substituted).map_err(|e| Error::InvalidSpec(e.to_string()))
}

/// Load a spec from a file, or from stdin when the path is `-`.
pub fn load_spec(path: &Path) -> Result<Spec> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    parse_spec(&raw)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_token_variants() {
        assert!(has_item_token("pane-{{item}}"));
        assert!(has_item_token("pane-{{  ITEM }}"));
        assert!(!has_item_token("pane-{{ items }}"));
        assert!(!has_item_token("pane-{ item }"));
    }

    #[test]
    fn test_substitute_item_is_literal() {
        assert_eq!(substitute_item("echo {{ item }} {{item}}", "a"), "echo a a");
        assert_eq!(substitute_item("x-{{ item }}", "$1.*\\0"), "x-$1.*\\0");
        assert_eq!(substitute_item("no token", "a"), "no token");
    }

    #[test]
    fn test_scalar_rendering() {
        assert_eq!(scalar_to_string(&Value::from(1)), Some("1".to_string()));
        assert_eq!(scalar_to_string(&Value::from(true)), Some("true".to_string()));
        assert_eq!(scalar_to_string(&Value::Null), Some(String::new()));
        assert_eq!(scalar_to_string(&Value::Sequence(vec![])), None);
        assert_eq!(name_of(&Value::Null), None);
        assert_eq!(name_of(&Value::from("")), None);
    }

    #[test]
    fn test_describe_is_flow_style() {
        let value: Value = serde_yaml::from_str("{foo: [1, bar], baz: null}").unwrap();
        assert_eq!(describe(&value), r#"{"foo": [1, "bar"], "baz": null}"#);
    }

    #[test]
    fn test_parse_spec_reports_yaml_errors_as_invalid() {
        let err = parse_spec("windows: [unclosed").unwrap_err();
        assert!(matches!(err, Error::InvalidSpec(_)));
    }
}
