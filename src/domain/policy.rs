//! Child-type rules: which node types may be placed under which parents.
//!
//! Validation of allowed children is owned by configuration; the tree store only
//! asks the policy it is handed.

use std::collections::BTreeMap;

use crate::domain::node::ElementType;

/// Rule key used for the root level of a tree.
pub const ROOT_KEY: &str = "root";

/// Decides whether `child` may be inserted under `parent` (`None` for the root level).
pub trait ChildPolicy: Send + Sync {
    fn allows(&self, parent: Option<&ElementType>, child: &ElementType) -> bool;
}

/// Accepts every placement.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl ChildPolicy for AllowAll {
    fn allows(&self, _parent: Option<&ElementType>, _child: &ElementType) -> bool {
        true
    }
}

/// Allow-list keyed by parent tag (or [`ROOT_KEY`]).
///
/// A parent tag without an entry is unconstrained.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    rules: BTreeMap<String, Vec<String>>,
}

impl AllowList {
    pub fn new(rules: BTreeMap<String, Vec<String>>) -> Self {
        Self { rules }
    }
}

impl ChildPolicy for AllowList {
    fn allows(&self, parent: Option<&ElementType>, child: &ElementType) -> bool {
        let key = parent.map(|p| p.name.as_str()).unwrap_or(ROOT_KEY);
        match self.rules.get(key) {
            Some(allowed) => allowed.iter().any(|name| name == &child.name),
            None => true,
        }
    }
}
