//! Tree store: one aggregate's content tree and its structural operations.
//!
//! Every operation borrows a snapshot and returns a new [`Tree`]; the input snapshot
//! is never modified, so older versions stay valid for as long as callers hold them.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::field::Field;
use crate::domain::grid::{Breakpoint, LayoutSettings, SpacingRule, Width};
use crate::domain::node::{Aggregate, ElementType, Node, NodeData, NodeId};
use crate::domain::policy::{ChildPolicy, ROOT_KEY};

/// Snapshot of one aggregate's content: the ordered root-level nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub aggregate: Aggregate,
    /// Owned by the aggregate-versioning engine; carried through untouched.
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

/// Parent position of a node: the root level or a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParentRef {
    Root,
    Node(NodeId),
}

impl ParentRef {
    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            ParentRef::Root => None,
            ParentRef::Node(id) => Some(id),
        }
    }
}

impl From<Option<NodeId>> for ParentRef {
    fn from(id: Option<NodeId>) -> Self {
        match id {
            Some(id) => ParentRef::Node(id),
            None => ParentRef::Root,
        }
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentRef::Root => f.write_str(ROOT_KEY),
            ParentRef::Node(id) => write!(f, "{id}"),
        }
    }
}

/// Sibling shift direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "Up", alias = "UP")]
    Up,
    #[serde(alias = "Down", alias = "DOWN")]
    Down,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// Result of a sibling shift.
#[derive(Debug, Clone, PartialEq)]
pub enum Shifted {
    Moved(Tree),
    /// Node already first (`Up`) or last (`Down`); the snapshot is unchanged.
    NoOp,
}

/// A single field replaced by [`Tree::set_field`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeField {
    Enabled(bool),
    Width(Breakpoint, Field<Width>),
    /// `Field::Null` writes an explicit `null`; `Field::Absent` removes the key.
    Paddings(Field<Vec<SpacingRule>>),
    Margins(Field<Vec<SpacingRule>>),
    /// Whole payload; the type tag must stay the same.
    Data(NodeData),
}

impl Tree {
    pub fn new(aggregate: Aggregate) -> Self {
        Self {
            aggregate,
            version: 0,
            nodes: Vec::new(),
        }
    }

    /// Pre-order iterator over `(depth, node)`, root level at depth 0.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(&self.nodes)
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, uuid: &NodeId) -> bool {
        self.iter().any(|(_, node)| &node.uuid == uuid)
    }

    /// Depth-first lookup, parent before children.
    #[instrument(level = "trace", skip(self))]
    pub fn find_node(&self, uuid: &NodeId) -> DomainResult<&Node> {
        self.iter()
            .map(|(_, node)| node)
            .find(|node| &node.uuid == uuid)
            .ok_or_else(|| DomainError::NotFound(uuid.clone()))
    }

    /// Immediate parent of `uuid` and the node's index among its siblings.
    #[instrument(level = "trace", skip(self))]
    pub fn find_parent(&self, uuid: &NodeId) -> DomainResult<(ParentRef, usize)> {
        locate(&self.nodes, &ParentRef::Root, uuid).ok_or_else(|| DomainError::NotFound(uuid.clone()))
    }

    /// Children sequence of `parent`.
    pub fn children_of(&self, parent: &ParentRef) -> DomainResult<&[Node]> {
        match parent {
            ParentRef::Root => Ok(&self.nodes),
            ParentRef::Node(id) => Ok(&self.find_node(id)?.children),
        }
    }

    /// Ids of all nodes below `parent` (excluding the parent itself).
    pub fn descendant_ids(&self, parent: &ParentRef) -> DomainResult<Vec<NodeId>> {
        Ok(self
            .children_of(parent)?
            .iter()
            .flat_map(|child| child.subtree_ids())
            .collect())
    }

    /// Insert `node` (with its subtree) under `parent` at `at_index`, clamped to `[0, len]`.
    #[instrument(level = "debug", skip(self, node, policy), fields(node = %node.uuid))]
    pub fn insert_child(
        &self,
        parent: &ParentRef,
        node: Node,
        at_index: usize,
        policy: &dyn ChildPolicy,
    ) -> DomainResult<Tree> {
        let child_type = node.element_type();
        let parent_type: Option<ElementType> = match parent {
            ParentRef::Root => None,
            ParentRef::Node(id) => Some(self.find_node(id)?.element_type()),
        };
        let parent_label = parent_type
            .as_ref()
            .map(|t| t.name.clone())
            .unwrap_or_else(|| ROOT_KEY.to_string());

        if child_type.family != self.aggregate.family() {
            return Err(DomainError::InvalidParent {
                parent: parent_label,
                child: child_type.name,
            });
        }
        if !policy.allows(parent_type.as_ref(), &child_type) {
            return Err(DomainError::InvalidParent {
                parent: parent_label,
                child: child_type.name,
            });
        }

        let mut incoming = HashSet::new();
        for id in node.subtree_ids() {
            if self.contains(&id) || !incoming.insert(id.clone()) {
                return Err(DomainError::DuplicateId(id));
            }
        }

        let mut next = self.clone();
        let siblings = next.siblings_mut(parent).ok_or_else(|| {
            let missing = parent.node_id().cloned();
            DomainError::NotFound(missing.unwrap_or_else(|| NodeId::new(ROOT_KEY)))
        })?;
        let index = at_index.min(siblings.len());
        siblings.insert(index, node);
        debug!("inserted under {} at {}", parent_label, index);
        Ok(next)
    }

    /// Remove `uuid` and its whole subtree; returns the new tree and the removed subtree.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_node(&self, uuid: &NodeId) -> DomainResult<(Tree, Node)> {
        let (parent, index) = self.find_parent(uuid)?;
        let mut next = self.clone();
        let siblings = next
            .siblings_mut(&parent)
            .ok_or_else(|| DomainError::NotFound(uuid.clone()))?;
        let removed = siblings.remove(index);
        debug!("removed {} node(s)", removed.subtree_ids().len());
        Ok((next, removed))
    }

    /// Swap `uuid` with its preceding (`Up`) or following (`Down`) sibling.
    #[instrument(level = "debug", skip(self))]
    pub fn shift_sibling(&self, uuid: &NodeId, direction: Direction) -> DomainResult<Shifted> {
        let (parent, index) = self.find_parent(uuid)?;
        let len = self.children_of(&parent)?.len();
        let other = match direction {
            Direction::Up if index == 0 => return Ok(Shifted::NoOp),
            Direction::Down if index + 1 >= len => return Ok(Shifted::NoOp),
            Direction::Up => index - 1,
            Direction::Down => index + 1,
        };

        let mut next = self.clone();
        let siblings = next
            .siblings_mut(&parent)
            .ok_or_else(|| DomainError::NotFound(uuid.clone()))?;
        siblings.swap(index, other);
        Ok(Shifted::Moved(next))
    }

    /// Replace one field of the node `uuid`, leaving everything else as it was.
    #[instrument(level = "debug", skip(self, field))]
    pub fn set_field(&self, uuid: &NodeId, field: NodeField) -> DomainResult<Tree> {
        let mut next = self.clone();
        let node = find_mut(&mut next.nodes, uuid).ok_or_else(|| DomainError::NotFound(uuid.clone()))?;

        match field {
            NodeField::Enabled(enabled) => node.enabled = enabled,
            NodeField::Width(breakpoint, width) => {
                let element = node.element_type();
                let column = node.data.as_column_mut().ok_or_else(|| DomainError::InvalidField {
                    uuid: uuid.clone(),
                    message: format!("widths only apply to Column nodes, not {element}"),
                })?;
                *column.width_mut(breakpoint) = width;
            }
            NodeField::Paddings(rules) => {
                let mut settings = take_settings(node);
                settings.paddings = rules;
                node.settings = pruned(settings);
            }
            NodeField::Margins(rules) => {
                let mut settings = take_settings(node);
                settings.margins = rules;
                node.settings = pruned(settings);
            }
            NodeField::Data(data) => {
                let current = node.element_type();
                let proposed = data.element_type();
                if current != proposed {
                    return Err(DomainError::InvalidField {
                        uuid: uuid.clone(),
                        message: format!("type tag is immutable ({current} -> {proposed})"),
                    });
                }
                node.data = data;
            }
        }
        Ok(next)
    }

    /// Check snapshot invariants: unique ids and node family matching the aggregate.
    #[instrument(level = "debug", skip(self))]
    pub fn validate(&self) -> DomainResult<()> {
        let family = self.aggregate.family();
        let mut seen = HashSet::new();
        for (_, node) in self.iter() {
            if !seen.insert(&node.uuid) {
                return Err(DomainError::DuplicateId(node.uuid.clone()));
            }
            let element_type = node.element_type();
            if element_type.family != family {
                return Err(DomainError::InvalidData {
                    element: element_type.name,
                    message: format!("node {} does not belong in a {} tree", node.uuid, self.aggregate),
                });
            }
        }
        Ok(())
    }

    /// Mutable children sequence of `parent`.
    pub(crate) fn siblings_mut(&mut self, parent: &ParentRef) -> Option<&mut Vec<Node>> {
        match parent {
            ParentRef::Root => Some(&mut self.nodes),
            ParentRef::Node(id) => find_mut(&mut self.nodes, id).map(|node| &mut node.children),
        }
    }
}

fn take_settings(node: &mut Node) -> LayoutSettings {
    match std::mem::take(&mut node.settings) {
        Field::Set(settings) => settings,
        Field::Null | Field::Absent => LayoutSettings::default(),
    }
}

/// Settings with both lists absent are dropped; a `null` list keeps them.
fn pruned(settings: LayoutSettings) -> Field<LayoutSettings> {
    if settings.paddings.is_absent() && settings.margins.is_absent() {
        Field::Absent
    } else {
        Field::Set(settings)
    }
}

fn locate(nodes: &[Node], parent: &ParentRef, uuid: &NodeId) -> Option<(ParentRef, usize)> {
    for (index, node) in nodes.iter().enumerate() {
        if &node.uuid == uuid {
            return Some((parent.clone(), index));
        }
        if let Some(hit) = locate(&node.children, &ParentRef::Node(node.uuid.clone()), uuid) {
            return Some(hit);
        }
    }
    None
}

fn find_mut<'a>(nodes: &'a mut [Node], uuid: &NodeId) -> Option<&'a mut Node> {
    for node in nodes.iter_mut() {
        if &node.uuid == uuid {
            return Some(node);
        }
        if let Some(found) = find_mut(&mut node.children, uuid) {
            return Some(found);
        }
    }
    None
}

pub struct TreeIterator<'a> {
    stack: Vec<(usize, &'a Node)>,
}

impl<'a> TreeIterator<'a> {
    pub(crate) fn new(roots: &'a [Node]) -> Self {
        Self {
            stack: roots.iter().rev().map(|node| (0, node)).collect(),
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        for child in node.children.iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}
