//! Spec interpretation against a live snapshot.
//!
//! Turns a validated spec plus the output of `list-panes` into window and
//! pane descriptors. Descriptors that matched something already running carry
//! its index; the rest have `index: None` and are created later.
//!
//! Windows are matched by name through one [`Indexer`] shared by the whole
//! spec, so repeated names claim existing windows oldest-first. Panes are
//! matched by title through a separate indexer per window.

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::{
    error::{Error, Result},
    indexer::Indexer,
    spec::{
        ITEMS_KEY, LAYOUT_KEY, PANES_KEY, WINDOWS_KEY, describe, has_item_token, is_scalar, name_of,
        scalar_to_string, substitute_item,
    },
    tmux::{ExistingPane, OptionValue, WindowOptions},
};

/// A desired window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowDescriptor {
    pub name: String,
    pub index: Option<u32>,
    pub panes: Vec<PaneDescriptor>,
    pub layout: Option<String>,
    pub options: WindowOptions,
}

/// A desired pane, possibly one of several expanded from a templated entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaneDescriptor {
    pub title: String,
    /// Raw command value: scalar, or a list of scalars and action mappings
    pub command: Value,
    /// Item value this pane was expanded from
    pub item: Option<String>,
    pub index: Option<u32>,
}

/// Interpret `spec` against the `existing` panes.
///
/// Returns the windows in spec order and the root options (every root key
/// except `windows`, `layout` included).
pub fn interpret(
    spec: &Value,
    existing: &[ExistingPane],
) -> Result<(Vec<WindowDescriptor>, WindowOptions)> {
    let mut window_indexer = Indexer::build(
        existing,
        |p| p.window_name.as_str(),
        |p| p.window_index,
    );

    let windows = window_entries(spec)?
        .into_iter()
        .map(|(name, body)| interpret_window(name, body, existing, &mut window_indexer))
        .collect::<Result<Vec<_>>>()?;

    Ok((windows, root_options(spec)?))
}

/// The window list is either the top-level sequence or the `windows` key.
fn window_entries(spec: &Value) -> Result<Vec<(String, Option<&Value>)>> {
    let windows = match spec {
        Value::Sequence(seq) => seq,
        Value::Mapping(map) => match map.get(WINDOWS_KEY) {
            Some(Value::Sequence(seq)) => seq,
            _ => return Err(Error::InvalidSpec("windows must be given as a list".into())),
        },
        other => {
            return Err(Error::InvalidSpec(format!(
                "Not a valid spec: {}",
                describe(other)
            )));
        }
    };

    windows
        .iter()
        .map(|window| match window {
            Value::Mapping(map) => {
                let mut entries = map.iter();
                match (entries.next(), entries.next()) {
                    (Some((key, body)), None) => name_of(key)
                        .filter(|_| is_scalar(key))
                        .map(|name| (name, Some(body)))
                        .ok_or_else(|| invalid_window(window)),
                    _ => Err(invalid_window(window)),
                }
            }
            _ => name_of(window)
                .filter(|_| is_scalar(window))
                .map(|name| (name, None))
                .ok_or_else(|| invalid_window(window)),
        })
        .collect()
}

fn invalid_window(window: &Value) -> Error {
    Error::InvalidSpec(format!("Not a valid window spec: {}", describe(window)))
}

fn root_options(spec: &Value) -> Result<WindowOptions> {
    let Value::Mapping(map) = spec else {
        return Ok(WindowOptions::new());
    };
    map.iter()
        .filter(|(key, _)| key.as_str() != Some(WINDOWS_KEY))
        .map(|(key, value)| option_entry(key, value))
        .collect()
}

fn option_entry(key: &Value, value: &Value) -> Result<(String, OptionValue)> {
    let name = name_of(key)
        .ok_or_else(|| Error::InvalidSpec(format!("Invalid option name: {}", describe(key))))?;
    let value = OptionValue::from_value(value).ok_or_else(|| {
        Error::InvalidSpec(format!(
            "Option {} must be a string, number or boolean: {}",
            name,
            describe(value)
        ))
    })?;
    Ok((name, value))
}

/// Interpret one window entry; `body` is `None` for a bare window name.
fn interpret_window(
    name: String,
    body: Option<&Value>,
    existing: &[ExistingPane],
    window_indexer: &mut Indexer,
) -> Result<WindowDescriptor> {
    let index = window_indexer.next(&name);
    let window_panes: Vec<ExistingPane> = existing
        .iter()
        .filter(|p| Some(p.window_index) == index)
        .cloned()
        .collect();
    let mut pane_indexer = Indexer::build(
        &window_panes,
        |p| p.pane_title.as_str(),
        |p| p.pane_index,
    );

    // A bare list is shorthand for {panes: [...]}
    let empty = Mapping::new();
    let (body, pane_list) = match body {
        None | Some(Value::Null) => (&empty, None),
        Some(Value::Sequence(panes)) => (&empty, Some(panes)),
        Some(Value::Mapping(map)) => (map, None),
        Some(other) => {
            return Err(Error::InvalidSpec(format!(
                "Not a valid window spec: {}",
                describe(other)
            )));
        }
    };

    let mut layout = None;
    let mut items = None;
    let mut panes = pane_list;
    let mut options = WindowOptions::new();

    for (key, value) in body {
        match key.as_str() {
            Some(LAYOUT_KEY) => layout = Some(string_value(LAYOUT_KEY, value)?),
            Some(ITEMS_KEY) => items = Some(item_values(value)?),
            Some(PANES_KEY) => match value {
                Value::Sequence(seq) => panes = Some(seq),
                Value::Null => {}
                other => {
                    return Err(Error::InvalidSpec(format!(
                        "panes must be given as a list: {}",
                        describe(other)
                    )));
                }
            },
            _ => {
                let (key, value) = option_entry(key, value)?;
                options.insert(key, value);
            }
        }
    }

    let mut descriptors = Vec::new();
    for pane in panes.into_iter().flatten() {
        descriptors.extend(interpret_and_expand_pane(
            pane,
            items.as_deref(),
            &mut pane_indexer,
        )?);
    }

    Ok(WindowDescriptor {
        name,
        index,
        panes: descriptors,
        layout,
        options,
    })
}

fn string_value(key: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidSpec(format!("{} must be a string: {}", key, describe(value))))
}

fn item_values(value: &Value) -> Result<Vec<String>> {
    let invalid = || {
        Error::InvalidSpec(format!(
            "'items' must be a non-empty list of scalars: {}",
            describe(value)
        ))
    };
    let Value::Sequence(seq) = value else {
        return Err(invalid());
    };
    if seq.is_empty() {
        return Err(invalid());
    }
    seq.iter()
        .map(|item| scalar_to_string(item).ok_or_else(invalid))
        .collect()
}

/// Expand one pane entry into one descriptor per item when its title holds
/// the item placeholder, or a single descriptor otherwise.
///
/// `items` are the window-level items; a pane mapping may override them with
/// its own `items` key.
pub fn interpret_and_expand_pane(
    pane: &Value,
    items: Option<&[String]>,
    pane_indexer: &mut Indexer,
) -> Result<Vec<PaneDescriptor>> {
    let invalid = || Error::InvalidSpec(format!("Not a valid pane spec: {}", describe(pane)));

    let (title, command, own_items) = match pane {
        Value::Mapping(map) => {
            let own_items = map.get(ITEMS_KEY).map(item_values).transpose()?;
            let mut entries = map.iter().filter(|(k, _)| k.as_str() != Some(ITEMS_KEY));
            let (Some((key, command)), None) = (entries.next(), entries.next()) else {
                return Err(invalid());
            };
            let title = name_of(key).filter(|_| is_scalar(key));
            (title.ok_or_else(invalid)?, command.clone(), own_items)
        }
        Value::Sequence(_) => return Err(invalid()),
        scalar => {
            let title = name_of(scalar).ok_or_else(invalid)?;
            (title.replace('\n', " "), scalar.clone(), None)
        }
    };

    let items = own_items.as_deref().or(items);
    match items {
        Some(items) if has_item_token(&title) => Ok(items
            .iter()
            .map(|item| {
                let title = substitute_item(&title, item);
                let index = pane_indexer.next(&title);
                PaneDescriptor {
                    title,
                    command: command.clone(),
                    item: Some(item.clone()),
                    index,
                }
            })
            .collect()),
        _ => {
            let index = pane_indexer.next(&title);
            Ok(vec![PaneDescriptor {
                title,
                command,
                item: None,
                index,
            }])
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    fn existing(window_index: u32, window_name: &str, pane_index: u32, title: &str) -> ExistingPane {
        ExistingPane {
            window_index,
            window_name: window_name.to_string(),
            pane_index,
            pane_title: title.to_string(),
        }
    }

    fn pane(title: &str, command: &str, index: Option<u32>) -> PaneDescriptor {
        PaneDescriptor {
            title: title.to_string(),
            command: Value::from(command),
            item: None,
            index,
        }
    }

    #[test]
    fn test_interpret_pane_spec() {
        let mut indexer = Indexer::default();
        let result =
            interpret_and_expand_pane(&yaml("{foo: bar}"), None, &mut indexer).unwrap();
        assert_eq!(result, vec![pane("foo", "bar", None)]);
    }

    #[test]
    fn test_interpret_and_expand_pane_spec() {
        let panes = [
            existing(1, "w", 10, "pane-foo"),
            existing(1, "w", 20, "pane-bar"),
            existing(1, "w", 30, "pane-bar"),
        ];
        let mut indexer = Indexer::build(&panes, |p| p.pane_title.as_str(), |p| p.pane_index);
        let items: Vec<String> = ["foo", "bar", "baz", "bar", "bar"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let spec = yaml(r#"{"pane-{{ item }}": "echo {{item}}"}"#);

        let result = interpret_and_expand_pane(&spec, Some(&items), &mut indexer).unwrap();

        let summary: Vec<(&str, Option<&str>, Option<u32>)> = result
            .iter()
            .map(|p| (p.title.as_str(), p.item.as_deref(), p.index))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("pane-foo", Some("foo"), Some(10)),
                ("pane-bar", Some("bar"), Some(20)),
                ("pane-baz", Some("baz"), None),
                ("pane-bar", Some("bar"), Some(30)),
                ("pane-bar", Some("bar"), None),
            ]
        );
        assert!(result.iter().all(|p| p.command == Value::from("echo {{item}}")));
    }

    #[test]
    fn test_placeholder_without_items_is_one_pane() {
        let mut indexer = Indexer::default();
        let result =
            interpret_and_expand_pane(&yaml(r#""pane-{{ item }}""#), None, &mut indexer).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "pane-{{ item }}");
        assert_eq!(result[0].item, None);
    }

    #[test]
    fn test_pane_level_items_override_window_items() {
        let mut indexer = Indexer::default();
        let window_items = vec!["x".to_string()];
        let spec = yaml(r#"{"build-{{ item }}": "make", items: [a, 2]}"#);
        let result =
            interpret_and_expand_pane(&spec, Some(&window_items), &mut indexer).unwrap();
        let titles: Vec<&str> = result.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["build-a", "build-2"]);
    }

    #[test]
    fn test_multiline_bare_pane_title() {
        let mut indexer = Indexer::default();
        let spec = Value::from("echo a\necho b");
        let result = interpret_and_expand_pane(&spec, None, &mut indexer).unwrap();
        assert_eq!(result[0].title, "echo a echo b");
        assert_eq!(result[0].command, spec);
    }

    #[test]
    fn test_interpret_empty_spec() {
        let (windows, options) = interpret(&Value::Sequence(vec![]), &[]).unwrap();
        assert!(windows.is_empty());
        assert!(options.is_empty());
    }

    #[test]
    fn test_interpret_spec() {
        let spec = yaml(
            r#"
windows:
  - foo
  - foo:
      panes: [foo2-1, foo2-3]
      opt: optval
  - bar:
      panes: [bar-1]
      layout: tiled
  - foo:
      panes:
        - foo3-1: echo foo3
layout: tiled
foo: bar
"#,
        );
        let list = [
            existing(1, "etc", 1, ""),
            existing(2, "foo", 1, "foo-1"),
            existing(3, "bar", 0, "bar-1"),
            existing(3, "bar", 1, "bar-2"),
            existing(4, "foo", 1, "foo2-1"),
            existing(4, "foo", 2, "foo2-2"),
        ];

        let (windows, root_options) = interpret(&spec, &list).unwrap();

        let mut foo_options = WindowOptions::new();
        foo_options.insert("opt".to_string(), OptionValue::from("optval"));
        let expected = vec![
            WindowDescriptor {
                name: "foo".to_string(),
                index: Some(2),
                panes: vec![],
                layout: None,
                options: WindowOptions::new(),
            },
            WindowDescriptor {
                name: "foo".to_string(),
                index: Some(4),
                panes: vec![pane("foo2-1", "foo2-1", Some(1)), pane("foo2-3", "foo2-3", None)],
                layout: None,
                options: foo_options,
            },
            WindowDescriptor {
                name: "bar".to_string(),
                index: Some(3),
                panes: vec![pane("bar-1", "bar-1", Some(0))],
                layout: Some("tiled".to_string()),
                options: WindowOptions::new(),
            },
            WindowDescriptor {
                name: "foo".to_string(),
                index: None,
                panes: vec![pane("foo3-1", "echo foo3", None)],
                layout: None,
                options: WindowOptions::new(),
            },
        ];
        assert_eq!(windows, expected);

        let mut expected_root = WindowOptions::new();
        expected_root.insert("layout".to_string(), OptionValue::from("tiled"));
        expected_root.insert("foo".to_string(), OptionValue::from("bar"));
        assert_eq!(root_options, expected_root);
    }

    #[test]
    fn test_window_shorthand_list_and_items() {
        let spec = yaml(
            r#"
- logs:
    items: [api, db]
    panes:
      - "tail-{{ item }}": tail -f {{ item }}.log
- shell: [zsh]
"#,
        );
        let (windows, options) = interpret(&spec, &[]).unwrap();
        assert!(options.is_empty());
        assert_eq!(windows.len(), 2);
        let titles: Vec<&str> = windows[0].panes.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["tail-api", "tail-db"]);
        assert_eq!(windows[1].panes, vec![pane("zsh", "zsh", None)]);
        assert!(windows.iter().all(|w| w.index.is_none()));
    }
}
