//! Operation descriptors and outcomes: the boundary with the command handlers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{Breakpoint, Direction, DomainError, ElementType, NodeId, Tree};

/// One requested mutation of a snapshot.
///
/// Serialized with an `op` tag, e.g.
/// `{"op": "shiftNode", "uuid": "…", "direction": "up"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OperationDescriptor {
    AddNode {
        /// Root level when absent
        #[serde(default)]
        parent_uuid: Option<NodeId>,
        element_type: ElementType,
        #[serde(default)]
        at_index: usize,
        #[serde(default)]
        initial_data: Map<String, Value>,
    },
    RemoveNode {
        uuid: NodeId,
    },
    ShiftNode {
        uuid: NodeId,
        direction: Direction,
    },
    ReorderSubtree {
        /// Root level when absent
        #[serde(default)]
        parent_uuid: Option<NodeId>,
        raw_order_payload: Value,
    },
    SetEnabled {
        uuid: NodeId,
        enabled: bool,
    },
    ResizeColumn {
        uuid: NodeId,
        breakpoint: Breakpoint,
        end_size_px: f64,
        full_width_px: f64,
    },
    EditNodeData {
        uuid: NodeId,
        new_data: Map<String, Value>,
    },
}

impl OperationDescriptor {
    pub fn name(&self) -> &'static str {
        match self {
            OperationDescriptor::AddNode { .. } => "addNode",
            OperationDescriptor::RemoveNode { .. } => "removeNode",
            OperationDescriptor::ShiftNode { .. } => "shiftNode",
            OperationDescriptor::ReorderSubtree { .. } => "reorderSubtree",
            OperationDescriptor::SetEnabled { .. } => "setEnabled",
            OperationDescriptor::ResizeColumn { .. } => "resizeColumn",
            OperationDescriptor::EditNodeData { .. } => "editNodeData",
        }
    }
}

/// Failure class reported back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    NotFound,
    InvalidParent,
    OrderMismatch,
    /// Shift at a boundary: not a failure, the snapshot is returned unchanged
    NoOp,
    DuplicateId,
    InvalidField,
    InvalidData,
}

impl From<&DomainError> for ErrorKind {
    fn from(error: &DomainError) -> Self {
        match error {
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::InvalidParent { .. } => ErrorKind::InvalidParent,
            DomainError::OrderMismatch(_) => ErrorKind::OrderMismatch,
            DomainError::DuplicateId(_) => ErrorKind::DuplicateId,
            DomainError::InvalidField { .. } | DomainError::InvalidResize(_) => ErrorKind::InvalidField,
            DomainError::InvalidData { .. } => ErrorKind::InvalidData,
        }
    }
}

/// `(new snapshot, diff, error)` for one operation.
///
/// When `error` is set the snapshot is the unchanged input and the diff is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub snapshot: Tree,
    pub diff: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Outcome {
    pub fn applied(snapshot: Tree, diff: Map<String, Value>) -> Self {
        Self {
            snapshot,
            diff,
            error: None,
            message: None,
        }
    }

    pub fn no_op(snapshot: Tree) -> Self {
        Self {
            snapshot,
            diff: Map::new(),
            error: Some(ErrorKind::NoOp),
            message: None,
        }
    }

    pub fn failed(snapshot: Tree, error: &DomainError) -> Self {
        Self {
            snapshot,
            diff: Map::new(),
            error: Some(ErrorKind::from(error)),
            message: Some(error.to_string()),
        }
    }

    /// True when the snapshot changed in a way worth a new aggregate version.
    pub fn is_change(&self) -> bool {
        self.error.is_none() && !self.diff.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_tagged_json_when_deserializing_then_matching_variant() {
        let op: OperationDescriptor = serde_json::from_value(json!({
            "op": "resizeColumn", "uuid": "a", "breakpoint": "sm", "endSizePx": 300, "fullWidthPx": 1200
        }))
        .unwrap();
        assert_eq!(
            op,
            OperationDescriptor::ResizeColumn {
                uuid: NodeId::new("a"),
                breakpoint: Breakpoint::Sm,
                end_size_px: 300.0,
                full_width_px: 1200.0,
            }
        );
        assert_eq!(op.name(), "resizeColumn");
    }

    #[test]
    fn given_add_without_optional_fields_when_deserializing_then_defaults() {
        let op: OperationDescriptor = serde_json::from_value(json!({
            "op": "addNode", "elementType": {"family": "menuItem", "name": "Link"}
        }))
        .unwrap();
        let OperationDescriptor::AddNode {
            parent_uuid,
            element_type,
            at_index,
            initial_data,
        } = op
        else {
            panic!("expected addNode");
        };
        assert_eq!(parent_uuid, None);
        assert_eq!(element_type, ElementType::menu_item("Link"));
        assert_eq!(at_index, 0);
        assert!(initial_data.is_empty());
    }

    #[test]
    fn given_domain_errors_when_classifying_then_kinds() {
        assert_eq!(
            ErrorKind::from(&DomainError::NotFound(NodeId::new("x"))),
            ErrorKind::NotFound
        );
        assert_eq!(
            ErrorKind::from(&DomainError::InvalidResize("bad".into())),
            ErrorKind::InvalidField
        );
    }
}
