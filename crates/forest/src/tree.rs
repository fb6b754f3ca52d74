//! Regression tree structures
//!
//! Nodes are stored in a flat vector with node 0 as the root. Internal
//! nodes route a sample left when `feature <= threshold`.

use serde::{Deserialize, Serialize};

/// A regression tree node (internal or leaf)
///
/// For internal nodes `feature_idx >= 0`, `left`/`right` index into the
/// node vector and `leaf` is `None`. Leaves carry `feature_idx == -1` and
/// the mean target of the samples that reached them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Left child index (-1 for leaf nodes)
    pub left: i32,

    /// Right child index (-1 for leaf nodes)
    pub right: i32,

    /// Feature index to split on (-1 for leaf nodes)
    pub feature_idx: i32,

    /// Split threshold
    pub threshold: f64,

    /// Leaf value (Some for leaf nodes, None for internal nodes)
    pub leaf: Option<f64>,

    /// Number of training samples that reached this node
    pub samples: u32,
}

impl Node {
    /// Create a new internal (split) node; children are patched in later
    pub fn internal(feature_idx: i32, threshold: f64, samples: u32) -> Self {
        Self {
            left: -1,
            right: -1,
            feature_idx,
            threshold,
            leaf: None,
            samples,
        }
    }

    /// Create a new leaf node
    pub fn leaf(value: f64, samples: u32) -> Self {
        Self {
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0.0,
            leaf: Some(value),
            samples,
        }
    }

    /// Check if this node is a leaf
    pub fn is_leaf(&self) -> bool {
        self.feature_idx < 0 || self.leaf.is_some()
    }
}

/// A single regression tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Tree {
    /// Tree nodes (node 0 is the root)
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Evaluate this tree on a feature vector
    ///
    /// Malformed structure evaluates to 0.0 rather than panicking; `validate`
    /// is the place to reject such trees.
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        let mut idx = 0usize;

        loop {
            let Some(node) = self.nodes.get(idx) else {
                return 0.0;
            };

            if let Some(value) = node.leaf {
                return value;
            }

            let Some(&feature_value) = features.get(node.feature_idx as usize) else {
                return 0.0;
            };

            let next = if feature_value <= node.threshold {
                node.left
            } else {
                node.right
            };
            if next < 0 {
                return 0.0;
            }
            idx = next as usize;
        }
    }

    /// Depth of the deepest leaf (a single leaf has depth 0)
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes.get(idx) {
                Some(node) if !node.is_leaf() => {
                    1 + walk(nodes, node.left as usize).max(walk(nodes, node.right as usize))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Validate tree structure
    pub fn validate(&self, feature_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                match node.leaf {
                    Some(v) if v.is_finite() => {}
                    Some(v) => return Err(format!("Leaf node {i} has non-finite value {v}")),
                    None => return Err(format!("Leaf node {i} has no leaf value")),
                }
                continue;
            }

            for (side, child) in [("left", node.left), ("right", node.right)] {
                // Children are always emitted after their parent.
                if child <= i as i32 || child as usize >= self.nodes.len() {
                    return Err(format!("Node {i} has invalid {side} child: {child}"));
                }
            }

            if node.feature_idx as usize >= feature_count {
                return Err(format!(
                    "Internal node {} splits on feature {} of {}",
                    i, node.feature_idx, feature_count
                ));
            }
        }

        Ok(())
    }
}
