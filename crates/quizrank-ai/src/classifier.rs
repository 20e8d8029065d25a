//! CART decision-tree classifier.
//!
//! Grows a binary tree greedily: at each node, every feature is sorted and
//! every midpoint between consecutive distinct values is scored by the
//! weighted Gini impurity of the two children. The lowest-impurity split wins;
//! ties go to the lower feature index, then the lower threshold, so fitting is
//! deterministic. Growth stops at pure nodes, at `max_depth`, or when no split
//! satisfies the sample-count limits.
//!
//! Nodes live in a flat arena in pre-order. A split sends `x[feature] <= threshold`
//! to `left`, everything else to `right`, and both children always sit at higher
//! indices than their parent. That ordering is checked whenever a tree is
//! deserialized, so traversal of any constructed tree terminates.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Two impurities closer than this are a tie.
const IMPURITY_EPS: f64 = 1e-12;

/// Growth limits. Defaults grow the tree until every leaf is pure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        /// Training samples that reached this node.
        samples: usize,
    },
    Leaf {
        /// Majority class of `counts`, lowest index on ties.
        class: usize,
        /// Training samples per class that reached this leaf.
        counts: Vec<usize>,
    },
}

impl Node {
    fn leaf(counts: Vec<usize>) -> Self {
        let class = argmax(&counts);
        Self::Leaf { class, counts }
    }
}

/// A fitted decision tree.
///
/// Only obtainable through [`DecisionTree::fit`] or deserialization, both of
/// which validate the node arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TreeRepr")]
pub struct DecisionTree {
    n_features: usize,
    n_classes: usize,
    nodes: Vec<Node>,
}

/// Unvalidated wire form of [`DecisionTree`].
#[derive(Deserialize)]
struct TreeRepr {
    n_features: usize,
    n_classes: usize,
    nodes: Vec<Node>,
}

impl TryFrom<TreeRepr> for DecisionTree {
    type Error = ModelError;

    fn try_from(repr: TreeRepr) -> Result<Self, Self::Error> {
        let tree = Self {
            n_features: repr.n_features,
            n_classes: repr.n_classes,
            nodes: repr.nodes,
        };
        tree.validate()?;
        Ok(tree)
    }
}

impl DecisionTree {
    /// Fit a tree on row-major `features` with class indices `targets`.
    pub fn fit(
        features: &[Vec<f64>],
        targets: &[usize],
        n_classes: usize,
        params: &TreeParams,
    ) -> Result<Self, ModelError> {
        if features.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if features.len() != targets.len() {
            return Err(ModelError::Corrupt(format!(
                "{} feature rows but {} targets",
                features.len(),
                targets.len()
            )));
        }

        let n_features = features[0].len();
        if n_features == 0 {
            return Err(ModelError::FeatureCount {
                expected: 1,
                found: 0,
            });
        }
        for (index, (row, &target)) in features.iter().zip(targets).enumerate() {
            if row.len() != n_features {
                return Err(ModelError::FeatureCount {
                    expected: n_features,
                    found: row.len(),
                });
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(ModelError::InvalidSample {
                    index,
                    reason: "non-finite feature value".into(),
                });
            }
            if target >= n_classes {
                return Err(ModelError::InvalidSample {
                    index,
                    reason: format!("class {target} outside 0..{n_classes}"),
                });
            }
        }

        let mut builder = Builder {
            features,
            targets,
            n_features,
            n_classes,
            params,
            nodes: Vec::new(),
        };
        builder.grow((0..features.len()).collect(), 0);

        let tree = Self {
            n_features,
            n_classes,
            nodes: builder.nodes,
        };
        tree.validate()?;
        Ok(tree)
    }

    /// Predicted class index for one feature row.
    pub fn predict(&self, x: &[f64]) -> Result<usize, ModelError> {
        self.leaf_for(x).map(|(class, _)| class)
    }

    /// Class distribution of the leaf `x` lands in. Sums to 1.
    pub fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, ModelError> {
        let (_, counts) = self.leaf_for(x)?;
        let total: usize = counts.iter().sum();
        if total == 0 {
            // Only reachable for hand-built artifacts; spread evenly.
            return Ok(vec![1.0 / self.n_classes as f64; self.n_classes]);
        }
        Ok(counts.iter().map(|&c| c as f64 / total as f64).collect())
    }

    fn leaf_for(&self, x: &[f64]) -> Result<(usize, &[usize]), ModelError> {
        if x.len() != self.n_features {
            return Err(ModelError::FeatureCount {
                expected: self.n_features,
                found: x.len(),
            });
        }

        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    id = if x[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Node::Leaf { class, counts } => return Ok((*class, counts.as_slice())),
            }
        }
    }

    /// Check the arena invariants every traversal relies on.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::Corrupt("tree has no nodes".into()));
        }
        if self.n_features == 0 || self.n_classes == 0 {
            return Err(ModelError::Corrupt(format!(
                "tree declares {} features and {} classes",
                self.n_features, self.n_classes
            )));
        }

        let len = self.nodes.len();
        let mut has_parent = vec![false; len];
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= self.n_features {
                        return Err(ModelError::Corrupt(format!(
                            "node {i} splits on feature {feature} of {}",
                            self.n_features
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ModelError::Corrupt(format!(
                            "node {i} has non-finite threshold"
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= len {
                            return Err(ModelError::Corrupt(format!(
                                "node {i} has invalid child index {child}"
                            )));
                        }
                    }
                    if left == right {
                        return Err(ModelError::Corrupt(format!(
                            "node {i} has identical children"
                        )));
                    }
                    for child in [*left, *right] {
                        if std::mem::replace(&mut has_parent[child], true) {
                            return Err(ModelError::Corrupt(format!(
                                "node {child} is shared by more than one split"
                            )));
                        }
                    }
                }
                Node::Leaf { class, counts } => {
                    if counts.len() != self.n_classes {
                        return Err(ModelError::Corrupt(format!(
                            "leaf {i} has {} class counts, expected {}",
                            counts.len(),
                            self.n_classes
                        )));
                    }
                    if *class >= self.n_classes {
                        return Err(ModelError::Corrupt(format!(
                            "leaf {i} predicts class {class} of {}",
                            self.n_classes
                        )));
                    }
                }
            }
        }
        if let Some(orphan) = (1..len).find(|&i| !has_parent[i]) {
            return Err(ModelError::Corrupt(format!(
                "node {orphan} is not reachable from the root"
            )));
        }
        Ok(())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Edges on the longest root-to-leaf path. A single leaf has depth 0.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Node::Split { left, right, .. } = &self.nodes[id] {
                stack.push((*left, depth + 1));
                stack.push((*right, depth + 1));
            }
        }
        max_depth
    }
}

// ── Growth ──

struct Builder<'a> {
    features: &'a [Vec<f64>],
    targets: &'a [usize],
    n_features: usize,
    n_classes: usize,
    params: &'a TreeParams,
    nodes: Vec<Node>,
}

struct Candidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl Builder<'_> {
    /// Append the subtree for `indices` and return its root id.
    fn grow(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let counts = self.class_counts(&indices);
        let n = indices.len();
        let id = self.nodes.len();
        self.nodes.push(Node::leaf(counts.clone()));

        let at_max_depth = self.params.max_depth.is_some_and(|max| depth >= max);
        if at_max_depth
            || n < self.params.min_samples_split
            || n < 2 * self.params.min_samples_leaf.max(1)
            || gini(&counts, n) <= IMPURITY_EPS
        {
            return id;
        }

        let Some(split) = self.best_split(&indices, &counts) else {
            return id;
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.features[i][split.feature] <= split.threshold);

        let left = self.grow(left_idx, depth + 1);
        let right = self.grow(right_idx, depth + 1);

        self.nodes[id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            samples: n,
        };
        id
    }

    fn best_split(&self, indices: &[usize], totals: &[usize]) -> Option<Candidate> {
        let n = indices.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut order = indices.to_vec();
        let mut best: Option<Candidate> = None;

        for feature in 0..self.n_features {
            order.sort_by(|&a, &b| self.features[a][feature].total_cmp(&self.features[b][feature]));

            let mut left = vec![0usize; self.n_classes];
            for pos in 1..n {
                left[self.targets[order[pos - 1]]] += 1;

                let lo = self.features[order[pos - 1]][feature];
                let hi = self.features[order[pos]][feature];
                if hi <= lo {
                    continue;
                }

                let n_left = pos;
                let n_right = n - pos;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let right: Vec<usize> = totals.iter().zip(&left).map(|(t, l)| t - l).collect();
                let impurity = (n_left as f64 * gini(&left, n_left)
                    + n_right as f64 * gini(&right, n_right))
                    / n as f64;

                if best
                    .as_ref()
                    .is_none_or(|b| impurity < b.impurity - IMPURITY_EPS)
                {
                    best = Some(Candidate {
                        feature,
                        threshold: midpoint(lo, hi),
                        impurity,
                    });
                }
            }
        }

        best
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &i in indices {
            counts[self.targets[i]] += 1;
        }
        counts
    }
}

fn gini(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

/// Threshold between two distinct sorted values. Falls back to `lo` when the
/// midpoint rounds up onto `hi`, so `hi` always goes right.
fn midpoint(lo: f64, hi: f64) -> f64 {
    let mid = lo / 2.0 + hi / 2.0;
    if mid >= hi || !mid.is_finite() { lo } else { mid }
}

fn argmax(counts: &[usize]) -> usize {
    let mut best = 0;
    for (i, &c) in counts.iter().enumerate() {
        if c > counts[best] {
            best = i;
        }
    }
    best
}
