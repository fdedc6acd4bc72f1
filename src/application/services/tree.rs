//! Tree mutation service
//!
//! Takes `(current snapshot, operation)` and returns `(new snapshot, diff, error)`.
//! Persistence, locking and versioning stay with the caller.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::application::operation::{OperationDescriptor, Outcome};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    diff, node_fields, placement_map, reorder, resize_column, ChildPolicy, DomainResult, Node, NodeData,
    NodeField, NodeId, ParentRef, Shifted, Tree,
};

/// Service applying operations to tree snapshots.
///
/// Holds no mutable state; one instance can serve concurrent callers on different snapshots.
pub struct TreeService {
    policy: Arc<dyn ChildPolicy>,
}

impl TreeService {
    /// Create a new tree service with the given child-type policy.
    pub fn new(policy: Arc<dyn ChildPolicy>) -> Self {
        Self { policy }
    }

    /// Parse a snapshot from JSON text and check its invariants.
    pub fn load(&self, json: &str) -> ApplicationResult<Tree> {
        let tree: Tree = serde_json::from_str(json).map_err(|e| ApplicationError::Snapshot {
            message: e.to_string(),
        })?;
        tree.validate()?;
        debug!("load: {} node(s), version {}", tree.len(), tree.version);
        Ok(tree)
    }

    /// Parse an operation descriptor from JSON text.
    pub fn parse_operation(&self, json: &str) -> ApplicationResult<OperationDescriptor> {
        serde_json::from_str(json).map_err(|e| ApplicationError::Operation {
            message: e.to_string(),
        })
    }

    /// Apply one operation. Failures are reported in the outcome, never panicked on.
    #[instrument(level = "debug", skip(self, snapshot, operation), fields(op = operation.name()))]
    pub fn apply(&self, snapshot: &Tree, operation: &OperationDescriptor) -> Outcome {
        match self.try_apply(snapshot, operation) {
            Ok(Some((tree, diff))) => {
                info!("{} applied, {} key(s) changed", operation.name(), diff.len());
                Outcome::applied(tree, diff)
            }
            Ok(None) => {
                debug!("{} left the snapshot unchanged", operation.name());
                Outcome::no_op(snapshot.clone())
            }
            Err(e) => {
                warn!("{} failed: {}", operation.name(), e);
                Outcome::failed(snapshot.clone(), &e)
            }
        }
    }

    /// `Ok(None)` is a defined no-op (boundary shift).
    fn try_apply(&self, snapshot: &Tree, operation: &OperationDescriptor) -> DomainResult<Option<(Tree, Map<String, Value>)>> {
        let applied = match operation {
            OperationDescriptor::AddNode {
                parent_uuid,
                element_type,
                at_index,
                initial_data,
            } => {
                let data = NodeData::from_parts(element_type, initial_data.clone())?;
                let node = Node::new(NodeId::generate(), data);
                let parent = ParentRef::from(parent_uuid.clone());
                let tree = snapshot.insert_child(&parent, node.clone(), *at_index, self.policy.as_ref())?;
                let mut diff = Map::new();
                diff.insert(node.uuid.to_string(), serde_json::to_value(&node).unwrap_or(Value::Null));
                (tree, diff)
            }
            OperationDescriptor::RemoveNode { uuid } => {
                let (tree, removed) = snapshot.remove_node(uuid)?;
                (tree, tombstones(removed.subtree_ids()))
            }
            OperationDescriptor::ShiftNode { uuid, direction } => match snapshot.shift_sibling(uuid, *direction)? {
                Shifted::Moved(tree) => {
                    let diff = diff(&placement_map(snapshot), &placement_map(&tree));
                    (tree, diff)
                }
                Shifted::NoOp => return Ok(None),
            },
            OperationDescriptor::ReorderSubtree {
                parent_uuid,
                raw_order_payload,
            } => {
                let parent = ParentRef::from(parent_uuid.clone());
                let tree = reorder(snapshot, &parent, raw_order_payload)?;
                let mut diff = diff(&placement_map(snapshot), &placement_map(&tree));
                diff.extend(tombstones(dropped_ids(snapshot, &tree)));
                (tree, diff)
            }
            OperationDescriptor::SetEnabled { uuid, enabled } => {
                let tree = snapshot.set_field(uuid, NodeField::Enabled(*enabled))?;
                let diff = diff(
                    &node_fields(snapshot.find_node(uuid)?),
                    &node_fields(tree.find_node(uuid)?),
                );
                (tree, diff)
            }
            OperationDescriptor::ResizeColumn {
                uuid,
                breakpoint,
                end_size_px,
                full_width_px,
            } => {
                let tree = resize_column(snapshot, uuid, *breakpoint, *end_size_px, *full_width_px)?;
                let diff = data_diff(snapshot, &tree, uuid)?;
                (tree, diff)
            }
            OperationDescriptor::EditNodeData { uuid, new_data } => {
                let element_type = snapshot.find_node(uuid)?.element_type();
                let data = NodeData::from_parts(&element_type, new_data.clone())?;
                let tree = snapshot.set_field(uuid, NodeField::Data(data))?;
                let diff = data_diff(snapshot, &tree, uuid)?;
                (tree, diff)
            }
        };
        Ok(Some(applied))
    }
}

/// Diff of one node's `data` mapping between two snapshots.
fn data_diff(before: &Tree, after: &Tree, uuid: &NodeId) -> DomainResult<Map<String, Value>> {
    Ok(diff(
        &before.find_node(uuid)?.data.to_map(),
        &after.find_node(uuid)?.data.to_map(),
    ))
}

/// Ids present in `before` but gone from `after`.
fn dropped_ids(before: &Tree, after: &Tree) -> Vec<NodeId> {
    let kept: HashSet<&NodeId> = after.iter().map(|(_, n)| &n.uuid).collect();
    before
        .iter()
        .map(|(_, n)| &n.uuid)
        .filter(|id| !kept.contains(id))
        .cloned()
        .collect()
}

/// Removed nodes are reported as `uuid -> null`.
fn tombstones(ids: Vec<NodeId>) -> Map<String, Value> {
    ids.into_iter().map(|id| (id.to_string(), Value::Null)).collect()
}
