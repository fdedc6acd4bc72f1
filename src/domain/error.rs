//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::node::NodeId;

/// Domain errors represent violations of the tree model.
/// None of these are fatal; callers decide whether to retry against a fresher snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NotFound(NodeId),

    #[error("{child} is not allowed under {parent}")]
    InvalidParent { parent: String, child: String },

    #[error("order payload could not be applied: {0}")]
    OrderMismatch(String),

    #[error("duplicate node id: {0}")]
    DuplicateId(NodeId),

    #[error("invalid field on {uuid}: {message}")]
    InvalidField { uuid: NodeId, message: String },

    #[error("invalid node data for {element}: {message}")]
    InvalidData { element: String, message: String },

    #[error("invalid resize: {0}")]
    InvalidResize(String),
}

/// Result type for tree operations.
pub type DomainResult<T> = Result<T, DomainError>;
