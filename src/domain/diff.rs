//! Structural diff: which top-level keys changed between two mappings.
//!
//! The comparison is shallow-keyed. A nested object or array is compared as one opaque
//! value through its canonical serialization, so a single changed field inside
//! `settings` reports the whole new `settings` object. Change summaries downstream
//! rely on exactly this granularity.

use std::fmt;

use serde_json::{Map, Value};

use crate::domain::node::Node;
use crate::domain::tree::Tree;

/// Keys of `change` that are new or differ from `base`, with their new values.
///
/// Keys present only in `base` are not reported.
pub fn diff(base: &Map<String, Value>, change: &Map<String, Value>) -> Map<String, Value> {
    change
        .iter()
        .filter(|(key, new)| match base.get(key.as_str()) {
            None => true,
            Some(old) => !same_value(old, new),
        })
        .map(|(key, new)| (key.clone(), new.clone()))
        .collect()
}

fn same_value(old: &Value, new: &Value) -> bool {
    match (old, new) {
        (Value::Object(_), Value::Object(_)) | (Value::Array(_), Value::Array(_)) => {
            canonical(old) == canonical(new)
        }
        _ => old == new,
    }
}

/// Canonical text of a value: object keys sorted, no whitespace.
///
/// Keys are sorted here rather than relying on the map type, which keeps insertion
/// order when serde_json's `preserve_order` feature is enabled.
pub fn canonical(value: &Value) -> String {
    sorted(value).to_string()
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(entries.into_iter().map(|(k, v)| (k.clone(), sorted(v))).collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

/// A node's own fields (tag, flags, data, settings) without its children.
///
/// `enabled` is always present here, even though serialization omits the default.
pub fn node_fields(node: &Node) -> Map<String, Value> {
    let mut map = match serde_json::to_value(node.detached()) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    map.remove("children");
    map.insert("enabled".into(), Value::Bool(node.enabled));
    map
}

/// Placement of every node: `uuid -> {"parent": uuid|null, "position": index}`.
pub fn placement_map(tree: &Tree) -> Map<String, Value> {
    let mut map = Map::new();
    fn walk(nodes: &[Node], parent: Option<&str>, map: &mut Map<String, Value>) {
        for (position, node) in nodes.iter().enumerate() {
            let mut entry = Map::new();
            entry.insert(
                "parent".into(),
                parent.map(|p| Value::String(p.to_string())).unwrap_or(Value::Null),
            );
            entry.insert("position".into(), Value::from(position));
            map.insert(node.uuid.to_string(), Value::Object(entry));
            walk(&node.children, Some(node.uuid.as_str()), map);
        }
    }
    walk(&tree.nodes, None, &mut map);
    map
}

/// One line of a human-readable change summary.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Added { key: String, value: Value },
    Changed { key: String, from: Value, to: Value },
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Added { key, value } => write!(f, "{key}: {value}"),
            Change::Changed { key, from, to } => write!(f, "{key}: {from} -> {to}"),
        }
    }
}

/// Describe a diff against the mapping it was computed from.
pub fn summarize(base: &Map<String, Value>, diff: &Map<String, Value>) -> Vec<Change> {
    diff.iter()
        .map(|(key, to)| match base.get(key) {
            Some(from) => Change::Changed {
                key: key.clone(),
                from: from.clone(),
                to: to.clone(),
            },
            None => Change::Added {
                key: key.clone(),
                value: to.clone(),
            },
        })
        .collect()
}
