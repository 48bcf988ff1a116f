//! Output tree structure.
//!
//! Nodes are produced fresh by each materialization pass and hold copies of
//! the id and label they were built from, never references into the store.

mod materializer;

pub use materializer::{
    build_forest, build_subtree, materialize, CyclePolicy, MaterializeOptions, Materializer,
    DEFAULT_MAX_DEPTH,
};

use crate::record::RecordId;
use serde::{Deserialize, Serialize};

/// A node in the materialized tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Id of the record this node came from
    pub id: RecordId,

    /// Display label
    pub label: String,

    /// Child nodes in input order
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a node without children.
    pub fn leaf(id: impl Into<RecordId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            children: Vec::new(),
        }
    }

    /// Create a node with children.
    pub fn with_children(
        id: impl Into<RecordId>,
        label: impl Into<String>,
        children: Vec<TreeNode>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including self.
    pub fn node_count(&self) -> usize {
        self.walk().count()
    }

    /// Height of this subtree (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(TreeNode::depth).max().unwrap_or(0)
    }

    /// Pre-order traversal of this subtree.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

/// Total node count of a forest.
pub fn count_nodes(nodes: &[TreeNode]) -> usize {
    nodes.iter().map(TreeNode::node_count).sum()
}

/// Pre-order iterator over a subtree.
pub struct Walk<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        TreeNode::with_children(
            1,
            "Root",
            vec![
                TreeNode::with_children(2, "Child A", vec![TreeNode::leaf(4, "Grandchild")]),
                TreeNode::leaf(3, "Child B"),
            ],
        )
    }

    #[test]
    fn test_walk_is_pre_order() {
        let tree = sample();
        let labels: Vec<&str> = tree.walk().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Root", "Child A", "Grandchild", "Child B"]);
    }

    #[test]
    fn test_counts_and_depth() {
        let tree = sample();
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.depth(), 3);
        assert_eq!(count_nodes(&[tree.clone(), TreeNode::leaf(9, "x")]), 5);
        assert!(!tree.is_leaf());
        assert!(tree.children[1].is_leaf());
    }

    #[test]
    fn test_tree_serialization() {
        let tree = sample();
        let json = serde_json::to_string(&tree).unwrap();
        assert!(json.starts_with(r#"{"id":1,"label":"Root","children":["#));

        let parsed: TreeNode = serde_json::from_str(&json).unwrap();
        assert_eq!(tree, parsed);
    }
}
