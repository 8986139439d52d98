//! Environment variable substitution for raw spec documents.
//!
//! Runs over the document text before it is parsed, so variables can appear
//! anywhere: window names, option values, commands.
//!
//! ```
//! use tmuxup_core::env::substitute_env_with;
//!
//! let lookup = |name: &str| (name == "USER").then(|| "admin".to_string());
//! let out = substitute_env_with("ssh {{ $USER }}@{{ $HOST | localhost }}", lookup).unwrap();
//! assert_eq!(out, "ssh admin@localhost");
//! ```

use std::sync::LazyLock;

use fancy_regex::Regex;

use crate::error::{Error, Result};

/// `{{ $NAME }}` or `{{ $NAME | default }}`.
static ENV_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\{\{ *\$([a-z0-9_]+) *(?:\| *(.*?) *)?\}\}").expect("env pattern is valid")
});

/// Substitute variables from the process environment.
pub fn substitute_env(raw: &str) -> Result<String> {
    substitute_env_with(raw, |name| std::env::var(name).ok())
}

/// Substitute variables using `lookup`; the default after `|` is used when
/// `lookup` has no value, and [`Error::MissingVariable`] when neither exists.
pub fn substitute_env_with<F>(raw: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(raw.len());
    let mut last = 0;

    for captures in ENV_PATTERN.captures_iter(raw) {
        let captures = captures.map_err(|e| Error::InvalidSpec(e.to_string()))?;
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let name = name.as_str();
        let value = lookup(name)
            .or_else(|| captures.get(2).map(|d| d.as_str().to_string()))
            .ok_or_else(|| Error::MissingVariable(name.to_string()))?;

        out.push_str(&raw[last..whole.start()]);
        out.push_str(&value);
        last = whole.end();
    }

    out.push_str(&raw[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "A" => Some("foo".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_replace_env_vars() {
        assert_eq!(
            substitute_env_with("{{ $A }} / {{ $B | bar }}", lookup).unwrap(),
            "foo / bar"
        );
        assert_eq!(
            substitute_env_with("{{$A|ignored}}", lookup).unwrap(),
            "foo"
        );
    }

    #[test]
    fn test_missing_variable_names_the_variable() {
        let err = substitute_env_with("{{ $A }} / {{ $B }}", lookup).unwrap_err();
        match err {
            Error::MissingVariable(name) => assert_eq!(name, "B"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_default_is_allowed() {
        assert_eq!(substitute_env_with("x{{ $B | }}y", lookup).unwrap(), "xy");
    }

    #[test]
    fn test_item_placeholder_is_left_alone() {
        assert_eq!(
            substitute_env_with("echo {{ item }}", lookup).unwrap(),
            "echo {{ item }}"
        );
    }
}
