//! Property-based tests for the tree store, order reconciler and diff engine.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated trees, payloads and mappings.

use proptest::prelude::*;
use proptest::sample::Index;
use serde_json::{json, Map, Value};

use cmstree::domain::diff::canonical;
use cmstree::domain::{clean_order_tree, diff, Direction, DomainError, NodeId, Shifted, Tree};

/// Nesting shape of a generated tree; ids are assigned afterwards.
#[derive(Debug, Clone)]
struct Shape(Vec<Shape>);

fn shapes() -> impl Strategy<Value = Vec<Shape>> {
    let leaf = Just(Shape(Vec::new()));
    let node = leaf.prop_recursive(3, 32, 4, |inner| prop::collection::vec(inner, 0..4).prop_map(Shape));
    prop::collection::vec(node, 1..5)
}

fn build(shapes: &[Shape], next: &mut usize) -> Vec<Value> {
    shapes
        .iter()
        .map(|shape| {
            let uuid = format!("n{next}");
            *next += 1;
            json!({
                "uuid": uuid,
                "itemType": "Link",
                "data": {"title": uuid},
                "children": build(&shape.0, next),
            })
        })
        .collect()
}

/// Menu trees with unique ids `n0, n1, ...`.
fn menu_tree() -> impl Strategy<Value = Tree> {
    shapes().prop_map(|shapes| {
        let mut next = 0;
        let nodes = build(&shapes, &mut next);
        serde_json::from_value(json!({"aggregate": "menu", "version": 0, "nodes": nodes}))
            .expect("generated tree is valid")
    })
}

/// A tree plus one of its node ids.
fn tree_and_uuid() -> impl Strategy<Value = (Tree, NodeId)> {
    (menu_tree(), any::<Index>()).prop_map(|(tree, index)| {
        let ids: Vec<NodeId> = tree.iter().map(|(_, n)| n.uuid.clone()).collect();
        let uuid = index.get(&ids).clone();
        (tree, uuid)
    })
}

/// JSON resembling widget order payloads, including malformed entries.
fn order_payload() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        "[a-d]{0,2}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::btree_map(
                prop_oneof![Just("uuid".to_string()), Just("children".to_string()), Just("id".to_string())],
                inner,
                0..3,
            )
            .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Small mappings over a shared key space so keys collide often.
fn mapping() -> impl Strategy<Value = Map<String, Value>> {
    let value = prop_oneof![
        Just(Value::Null),
        (0..3i64).prop_map(Value::from),
        "[xy]".prop_map(Value::String),
        prop::collection::vec(0..3i64, 0..3).prop_map(|v| json!(v)),
        prop::collection::btree_map("[pq]", 0..2i64, 0..2).prop_map(|m| json!(m)),
    ];
    prop::collection::btree_map("[a-e]", value, 0..6).prop_map(|m| m.into_iter().collect())
}

proptest! {
    #[test]
    fn find_node_returns_exactly_that_node((tree, uuid) in tree_and_uuid()) {
        let found = tree.find_node(&uuid).unwrap();
        prop_assert_eq!(&found.uuid, &uuid);
        prop_assert_eq!(tree.iter().filter(|(_, n)| n.uuid == uuid).count(), 1);
    }

    #[test]
    fn removed_subtree_is_never_findable((tree, uuid) in tree_and_uuid()) {
        let (next, removed) = tree.remove_node(&uuid).unwrap();
        for id in removed.subtree_ids() {
            prop_assert_eq!(next.find_node(&id), Err(DomainError::NotFound(id.clone())));
        }
        prop_assert_eq!(next.len() + removed.subtree_ids().len(), tree.len());
    }

    #[test]
    fn shift_is_its_own_inverse((tree, uuid) in tree_and_uuid()) {
        for (first, second) in [(Direction::Up, Direction::Down), (Direction::Down, Direction::Up)] {
            match tree.shift_sibling(&uuid, first).unwrap() {
                Shifted::Moved(moved) => {
                    prop_assert_ne!(&moved, &tree);
                    prop_assert_eq!(moved.shift_sibling(&uuid, second).unwrap(), Shifted::Moved(tree.clone()));
                }
                Shifted::NoOp => {
                    let (parent, index) = tree.find_parent(&uuid).unwrap();
                    let len = tree.children_of(&parent).unwrap().len();
                    prop_assert!(index == 0 || index + 1 == len);
                }
            }
        }
    }

    #[test]
    fn clean_order_tree_is_idempotent(raw in order_payload()) {
        let once = clean_order_tree(&raw);
        let twice = clean_order_tree(&serde_json::to_value(&once).unwrap());
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn diff_of_mapping_with_itself_is_empty(base in mapping()) {
        prop_assert!(diff(&base, &base).is_empty());
    }

    #[test]
    fn diff_reports_exactly_new_or_changed_keys(base in mapping(), change in mapping()) {
        let result = diff(&base, &change);
        for (key, value) in &change {
            let changed = match base.get(key) {
                None => true,
                Some(old) => canonical(old) != canonical(value),
            };
            prop_assert_eq!(result.contains_key(key), changed, "key {}", key);
            if changed {
                prop_assert_eq!(&result[key], value);
            }
        }
        prop_assert!(result.keys().all(|k| change.contains_key(k)));
    }
}
