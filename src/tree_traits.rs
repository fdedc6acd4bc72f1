/*
Rendering lives outside the domain types so the domain stays free of display concerns.
A trait is needed because inherent impls on `termtree::Tree` are not allowed here (E0116).
 */
use termtree::Tree as TermTree;
use tracing::instrument;

use crate::domain::{column_classes, Node, Tree};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> TermTree<String>;
}

impl TreeNodeConvert for Node {
    fn to_tree_string(&self) -> TermTree<String> {
        let mut label = format!("{} {}", self.element_type().name, self.uuid);
        if !self.enabled {
            label.push_str(" [disabled]");
        }
        if let Some(column) = self.data.as_column() {
            let classes = column_classes(column);
            if !classes.is_empty() {
                label.push_str(&format!(" ({})", classes.join(" ")));
            }
        }

        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree_string()).collect();
        TermTree::new(label).with_leaves(leaves)
    }
}

impl TreeNodeConvert for Tree {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> TermTree<String> {
        let root = format!("{} (version {})", self.aggregate, self.version);
        let leaves: Vec<_> = self.nodes.iter().map(|n| n.to_tree_string()).collect();
        TermTree::new(root).with_leaves(leaves)
    }
}
