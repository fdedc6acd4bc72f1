//! Order reconciler: client order payloads to cleaned skeletons, skeletons to trees.
//!
//! A drag-and-drop tree widget posts its DOM order as nested
//! `[{"uuid": …, "children": [...], …widget attributes}]`. Only `uuid` and nesting
//! survive cleaning; node content always comes from the current snapshot.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Node, NodeId};
use crate::domain::tree::{ParentRef, Tree, TreeIterator};

/// One level of a cleaned order: an ordered `uuid -> children` mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OrderSkeleton(Vec<OrderEntry>);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderEntry {
    pub uuid: NodeId,
    pub children: OrderSkeleton,
}

impl OrderSkeleton {
    pub fn entries(&self) -> &[OrderEntry] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of uuids on all levels.
    pub fn total(&self) -> usize {
        self.0.iter().map(|e| 1 + e.children.total()).sum()
    }

    /// Map semantics: a repeated uuid keeps its first position and takes the new children.
    fn upsert(&mut self, uuid: NodeId, children: OrderSkeleton) {
        match self.0.iter_mut().find(|e| e.uuid == uuid) {
            Some(existing) => existing.children = children,
            None => self.0.push(OrderEntry { uuid, children }),
        }
    }
}

/// Reduce a raw order payload to its uuid/nesting skeleton.
///
/// Non-object entries and entries without a non-empty string `uuid` are dropped
/// together with their children. Anything other than an array cleans to an empty skeleton.
pub fn clean_order_tree(raw: &Value) -> OrderSkeleton {
    let mut skeleton = OrderSkeleton::default();
    let Some(entries) = raw.as_array() else {
        return skeleton;
    };
    for entry in entries {
        let Some(object) = entry.as_object() else {
            continue;
        };
        let Some(uuid) = object.get("uuid").and_then(Value::as_str).filter(|s| !s.is_empty()) else {
            debug!("dropping order entry without uuid");
            continue;
        };
        let children = object.get("children").map(clean_order_tree).unwrap_or_default();
        skeleton.upsert(NodeId::new(uuid), children);
    }
    skeleton
}

/// Rebuild the children of `parent` following `skeleton`.
///
/// Node content is looked up among the current descendants of `parent`. Descendants the
/// skeleton does not mention are dropped from the tree; unknown uuids are ignored so a
/// reorder racing a delete still applies. Fails with `OrderMismatch` when the skeleton is
/// empty or none of its uuids resolve.
#[instrument(level = "debug", skip(tree, skeleton), fields(entries = skeleton.total()))]
pub fn apply_order(tree: &Tree, parent: &ParentRef, skeleton: &OrderSkeleton) -> DomainResult<Tree> {
    if skeleton.is_empty() {
        return Err(DomainError::OrderMismatch("order payload is empty".into()));
    }

    let current = tree.children_of(parent)?;
    let index: HashMap<&NodeId, &Node> = TreeIterator::new(current)
        .map(|(_, node)| (&node.uuid, node))
        .collect();

    let mut placed = HashSet::new();
    let rebuilt = build_level(skeleton, &index, &mut placed);
    if placed.is_empty() {
        return Err(DomainError::OrderMismatch(format!(
            "none of the {} referenced uuids exist under {}",
            skeleton.total(),
            parent
        )));
    }

    let dropped: Vec<&str> = index
        .keys()
        .filter(|id| !placed.contains(**id))
        .map(|id| id.as_str())
        .sorted_unstable()
        .collect();
    if !dropped.is_empty() {
        warn!(
            "order payload under {} omits {} node(s), dropping them: {}",
            parent,
            dropped.len(),
            dropped.iter().join(", ")
        );
    }

    let mut next = tree.clone();
    let siblings = next
        .siblings_mut(parent)
        .ok_or_else(|| DomainError::OrderMismatch(format!("parent {parent} disappeared")))?;
    *siblings = rebuilt;
    Ok(next)
}

/// Clean `raw` and apply it in one step.
pub fn reorder(tree: &Tree, parent: &ParentRef, raw: &Value) -> DomainResult<Tree> {
    apply_order(tree, parent, &clean_order_tree(raw))
}

fn build_level(level: &OrderSkeleton, index: &HashMap<&NodeId, &Node>, placed: &mut HashSet<NodeId>) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(level.entries().len());
    for entry in level.entries() {
        let Some(node) = index.get(&entry.uuid) else {
            warn!("order payload references unknown node {}, ignoring", entry.uuid);
            continue;
        };
        if !placed.insert(entry.uuid.clone()) {
            warn!("node {} placed more than once, keeping the first placement", entry.uuid);
            continue;
        }
        let mut rebuilt = node.detached();
        rebuilt.children = build_level(&entry.children, index, placed);
        nodes.push(rebuilt);
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn uuids(skeleton: &OrderSkeleton) -> Vec<&str> {
        skeleton.entries().iter().map(|e| e.uuid.as_str()).collect()
    }

    #[test]
    fn given_widget_payload_when_cleaning_then_only_uuid_and_nesting_survive() {
        let raw = json!([
            {"uuid": "a", "id": "dom-1", "class": "drag", "children": [
                {"uuid": "a1", "text": "x"},
                {"text": "no uuid", "children": [{"uuid": "lost"}]}
            ]},
            "garbage",
            {"uuid": ""},
            {"uuid": 42},
            {"uuid": "b"}
        ]);
        let skeleton = clean_order_tree(&raw);
        assert_eq!(uuids(&skeleton), vec!["a", "b"]);
        assert_eq!(uuids(&skeleton.entries()[0].children), vec!["a1"]);
        assert_eq!(
            serde_json::to_value(&skeleton).unwrap(),
            json!([
                {"uuid": "a", "children": [{"uuid": "a1", "children": []}]},
                {"uuid": "b", "children": []}
            ])
        );
    }

    #[test]
    fn given_repeated_uuid_on_level_when_cleaning_then_first_position_last_children() {
        let raw = json!([
            {"uuid": "a", "children": [{"uuid": "x"}]},
            {"uuid": "b"},
            {"uuid": "a", "children": [{"uuid": "y"}]}
        ]);
        let skeleton = clean_order_tree(&raw);
        assert_eq!(uuids(&skeleton), vec!["a", "b"]);
        assert_eq!(uuids(&skeleton.entries()[0].children), vec!["y"]);
    }

    #[test]
    fn given_non_array_when_cleaning_then_empty() {
        assert!(clean_order_tree(&json!({"uuid": "a"})).is_empty());
        assert!(clean_order_tree(&json!(null)).is_empty());
    }

    #[test]
    fn given_cleaned_skeleton_when_cleaning_again_then_unchanged() {
        let raw = json!([{"uuid": "a", "x": 1, "children": [{"uuid": "b"}, {"foo": 1}]}, {"uuid": "a"}]);
        let once = clean_order_tree(&raw);
        let twice = clean_order_tree(&serde_json::to_value(&once).unwrap());
        assert_eq!(once, twice);
    }
}
