//! Domain layer: the content-tree model and its algorithms
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).
//! Every function takes an immutable snapshot and returns a new one.

pub mod diff;
pub mod error;
pub mod field;
pub mod grid;
pub mod layout;
pub mod node;
pub mod order;
pub mod policy;
pub mod tree;

pub use diff::{diff, node_fields, placement_map, summarize, Change};
pub use error::{DomainError, DomainResult};
pub use field::Field;
pub use grid::{Breakpoint, LayoutSettings, Side, Spacing, SpacingRule, Width, GRID_COLUMNS};
pub use layout::{
    col_span, column_classes, resize_column, resolve_spacing_class, resolve_width_class,
    spacing_classes, SpacingKind,
};
pub use node::{Aggregate, ColumnData, ElementType, Family, Node, NodeData, NodeId};
pub use order::{apply_order, clean_order_tree, reorder, OrderEntry, OrderSkeleton};
pub use policy::{AllowAll, AllowList, ChildPolicy};
pub use tree::{Direction, NodeField, ParentRef, Shifted, Tree};
