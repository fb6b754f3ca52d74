//! CART (Classification and Regression Tree) builder
//!
//! Implements deterministic exact-greedy regression tree construction.
//! Splits maximise the reduction in squared error, which for unit hessians
//! is `G_left²/n_left + G_right²/n_right - G_parent²/n_parent`.

use crate::deterministic::SplitTieBreaker;
use crate::tree::{Node, Tree};

/// Training parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 15,
            min_samples_split: 5,
            min_samples_leaf: 1,
        }
    }
}

/// Split candidate with gain and tie-breaker
#[derive(Debug, Clone)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
    tie_breaker: SplitTieBreaker,
}

impl SplitCandidate {
    fn beats(&self, current: &SplitCandidate) -> bool {
        self.gain > current.gain
            || (self.gain == current.gain && self.tie_breaker < current.tie_breaker)
    }
}

/// Build a regression tree using the exact-greedy CART algorithm
pub struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a [Vec<f64>],
    targets: &'a [f64],
    feature_count: usize,
}

impl<'a> CartBuilder<'a> {
    /// Callers guarantee `features.len() == targets.len()` and rectangular rows.
    pub fn new(features: &'a [Vec<f64>], targets: &'a [f64], config: TreeConfig) -> Self {
        let feature_count = features.first().map_or(0, Vec::len);

        Self {
            config,
            features,
            targets,
            feature_count,
        }
    }

    /// Build a tree over the given sample indices (repeats allowed)
    pub fn build(&self, sample: &[usize]) -> Tree {
        let mut nodes = Vec::new();
        let mut indices = sample.to_vec();

        self.build_node(&mut indices, 0, &mut nodes);

        Tree { nodes }
    }

    /// Recursively build tree nodes, returning the index of the created node
    fn build_node(&self, indices: &mut [usize], depth: usize, nodes: &mut Vec<Node>) -> i32 {
        let current_idx = nodes.len();
        let (sum, _) = self.sum_targets(indices);
        let count = indices.len();
        let leaf_value = if count == 0 { 0.0 } else { sum / count as f64 };

        let splittable = depth < self.config.max_depth
            && count >= self.config.min_samples_split.max(2)
            && count >= 2 * self.config.min_samples_leaf.max(1)
            && !self.is_pure(indices);

        let split = if splittable {
            self.find_best_split(indices)
        } else {
            None
        };

        let Some(split) = split else {
            nodes.push(Node::leaf(leaf_value, count as u32));
            return current_idx as i32;
        };

        let boundary = self.partition(indices, split.feature_idx, split.threshold);
        tracing::trace!(
            depth,
            feature = split.feature_idx,
            threshold = split.threshold,
            left = boundary,
            right = count - boundary,
            "split node"
        );

        // Reserve space for current node
        nodes.push(Node::internal(
            split.feature_idx as i32,
            split.threshold,
            count as u32,
        ));

        let (left_indices, right_indices) = indices.split_at_mut(boundary);
        let left_idx = self.build_node(left_indices, depth + 1, nodes);
        let right_idx = self.build_node(right_indices, depth + 1, nodes);

        nodes[current_idx].left = left_idx;
        nodes[current_idx].right = right_idx;

        current_idx as i32
    }

    /// Find best split by sweeping each feature in sorted order
    fn find_best_split(&self, indices: &[usize]) -> Option<SplitCandidate> {
        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let (total_sum, _) = self.sum_targets(indices);
        let parent_score = total_sum * total_sum / n as f64;

        let mut best_split: Option<SplitCandidate> = None;
        let mut order = indices.to_vec();

        for feature_idx in 0..self.feature_count {
            order.copy_from_slice(indices);
            order.sort_by(|&a, &b| {
                self.features[a][feature_idx]
                    .total_cmp(&self.features[b][feature_idx])
                    .then(a.cmp(&b))
            });

            let mut left_sum = 0.0;
            for rank in 1..n {
                left_sum += self.targets[order[rank - 1]];

                let lo = self.features[order[rank - 1]][feature_idx];
                let hi = self.features[order[rank]][feature_idx];
                if lo >= hi || rank < min_leaf || n - rank < min_leaf {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let gain = left_sum * left_sum / rank as f64
                    + right_sum * right_sum / (n - rank) as f64
                    - parent_score;
                if gain <= 0.0 {
                    continue;
                }

                let midpoint = lo + (hi - lo) / 2.0;
                let threshold = if midpoint < hi { midpoint } else { lo };

                let candidate = SplitCandidate {
                    feature_idx,
                    threshold,
                    gain,
                    tie_breaker: SplitTieBreaker::new(feature_idx, rank),
                };

                match &best_split {
                    Some(current) if !candidate.beats(current) => {}
                    _ => best_split = Some(candidate),
                }
            }
        }

        best_split
    }

    /// Reorder indices so the left partition comes first; returns its length
    fn partition(&self, indices: &mut [usize], feature_idx: usize, threshold: f64) -> usize {
        let (mut left, mut right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&idx| self.features[idx][feature_idx] <= threshold);
        let boundary = left.len();
        left.append(&mut right);
        indices.copy_from_slice(&left);
        boundary
    }

    fn is_pure(&self, indices: &[usize]) -> bool {
        match indices.first() {
            Some(&first) => {
                let y = self.targets[first];
                indices.iter().all(|&idx| self.targets[idx] == y)
            }
            None => true,
        }
    }

    /// Sum of targets and sample count for a set of samples
    fn sum_targets(&self, indices: &[usize]) -> (f64, usize) {
        let sum = indices.iter().map(|&idx| self.targets[idx]).sum();
        (sum, indices.len())
    }
}
