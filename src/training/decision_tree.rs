//! Decision tree classifier

use crate::error::{Result, TurnoverError};
use ndarray::{Array1, Array2};
use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node holding the class distribution of its training samples
    Leaf {
        value: f64,
        distribution: Vec<f64>,
        n_samples: usize,
    },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Decision tree classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Tree root
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Maximum features to consider per split
    pub max_features: Option<usize>,
    /// Seed for feature subsampling
    pub random_state: Option<u64>,
    /// Number of features
    n_features: usize,
    /// Sorted class labels; leaf distributions follow this order
    classes: Vec<f64>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            random_state: None,
            n_features: 0,
            classes: Vec::new(),
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set random state used to pick feature subsets
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Fix the class set, so leaves carry entries for classes absent from `y`.
    pub fn with_classes(mut self, classes: Vec<f64>) -> Self {
        self.classes = classes;
        self
    }

    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Fit the tree to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(TurnoverError::Shape {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }

        if n_samples == 0 {
            return Err(TurnoverError::Data("cannot fit a tree on zero rows".to_string()));
        }

        self.n_features = n_features;

        if self.classes.is_empty() {
            let mut classes: Vec<f64> = y.iter().copied().collect();
            classes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            classes.dedup();
            self.classes = classes;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state.unwrap_or(0));

        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_tree(x, y, &indices, 0, &mut rng));

        Ok(self)
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_samples = indices.len();
        let y_subset: Vec<f64> = indices.iter().map(|&i| y[i]).collect();

        let should_stop = n_samples < self.min_samples_split
            || n_samples <= self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || self.is_pure(&y_subset);

        if should_stop {
            return self.make_leaf(&y_subset);
        }

        let candidates = self.candidate_features(x.ncols(), rng);

        match self.find_best_split(x, y, indices, &candidates) {
            Some((best_feature, best_threshold)) => {
                let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| x[[i, best_feature]] <= best_threshold);

                if left_indices.len() < self.min_samples_leaf || right_indices.len() < self.min_samples_leaf {
                    return self.make_leaf(&y_subset);
                }

                let left = Box::new(self.build_tree(x, y, &left_indices, depth + 1, rng));
                let right = Box::new(self.build_tree(x, y, &right_indices, depth + 1, rng));

                TreeNode::Split {
                    feature_idx: best_feature,
                    threshold: best_threshold,
                    left,
                    right,
                    n_samples,
                    impurity: self.impurity(&self.class_counts(&y_subset), n_samples),
                }
            }
            None => self.make_leaf(&y_subset),
        }
    }

    /// Features examined at one node: all of them, or a seeded subset of `max_features`.
    fn candidate_features(&self, n_features: usize, rng: &mut ChaCha8Rng) -> Vec<usize> {
        match self.max_features {
            Some(k) if k < n_features => {
                let mut picked = index::sample(rng, n_features, k.max(1)).into_vec();
                picked.sort_unstable();
                picked
            }
            _ => (0..n_features).collect(),
        }
    }

    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        candidates: &[usize],
    ) -> Option<(usize, f64)> {
        let n = indices.len();
        let parent_counts = self.class_counts(&indices.iter().map(|&i| y[i]).collect::<Vec<_>>());
        let parent_impurity = self.impurity(&parent_counts, n);

        // Each candidate feature finds its own best threshold by sweeping sorted values
        let feature_results: Vec<Option<(usize, f64, f64)>> = candidates
            .par_iter()
            .map(|&feature_idx| {
                let mut order: Vec<usize> = indices.to_vec();
                order.sort_by(|&a, &b| {
                    x[[a, feature_idx]]
                        .partial_cmp(&x[[b, feature_idx]])
                        .unwrap_or(std::cmp::Ordering::Equal)
                });

                let mut left_counts = vec![0usize; self.classes.len()];
                let mut right_counts = parent_counts.clone();
                let mut best: Option<(f64, f64)> = None;

                for pos in 0..n.saturating_sub(1) {
                    let class_idx = self.class_index(y[order[pos]]);
                    left_counts[class_idx] += 1;
                    right_counts[class_idx] -= 1;

                    let current = x[[order[pos], feature_idx]];
                    let next = x[[order[pos + 1], feature_idx]];
                    if current == next {
                        continue;
                    }

                    let n_left = pos + 1;
                    let n_right = n - n_left;
                    if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                        continue;
                    }

                    let weighted = (n_left as f64 * self.impurity(&left_counts, n_left)
                        + n_right as f64 * self.impurity(&right_counts, n_right))
                        / n as f64;
                    let gain = parent_impurity - weighted;

                    if gain > best.map_or(0.0, |(g, _)| g) {
                        best = Some((gain, (current + next) / 2.0));
                    }
                }

                best.map(|(gain, threshold)| (feature_idx, threshold, gain))
            })
            .collect();

        feature_results
            .into_iter()
            .flatten()
            .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(feature_idx, threshold, _)| (feature_idx, threshold))
    }

    fn class_index(&self, label: f64) -> usize {
        self.classes
            .iter()
            .position(|&c| (c - label).abs() < 1e-9)
            .unwrap_or(0)
    }

    fn class_counts(&self, y: &[f64]) -> Vec<usize> {
        let mut counts = vec![0usize; self.classes.len()];
        for &label in y {
            counts[self.class_index(label)] += 1;
        }
        counts
    }

    /// Gini impurity
    fn impurity(&self, counts: &[usize], total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let n = total as f64;
        1.0 - counts.iter().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
    }

    fn is_pure(&self, y: &[f64]) -> bool {
        match y.first() {
            None => true,
            Some(&first) => y.iter().all(|&v| (v - first).abs() < 1e-10),
        }
    }

    fn make_leaf(&self, y: &[f64]) -> TreeNode {
        let counts = self.class_counts(y);
        let n = y.len().max(1) as f64;
        let distribution: Vec<f64> = counts.iter().map(|&c| c as f64 / n).collect();

        // Majority class; ties go to the lower class label
        let value = counts
            .iter()
            .enumerate()
            .fold((0usize, 0usize), |best, (idx, &count)| if count > best.1 { (idx, count) } else { best })
            .0;

        TreeNode::Leaf {
            value: self.classes.get(value).copied().unwrap_or(0.0),
            distribution,
            n_samples: y.len(),
        }
    }

    fn leaf_for<'a>(&'a self, node: &'a TreeNode, sample: &[f64]) -> &'a TreeNode {
        match node {
            TreeNode::Leaf { .. } => node,
            TreeNode::Split { feature_idx, threshold, left, right, .. } => {
                if sample[*feature_idx] <= *threshold {
                    self.leaf_for(left, sample)
                } else {
                    self.leaf_for(right, sample)
                }
            }
        }
    }

    fn check_width(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() != self.n_features {
            return Err(TurnoverError::Shape {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(())
    }

    /// Predict class labels
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(TurnoverError::ModelNotFitted)?;
        self.check_width(x)?;

        Ok(x.rows()
            .into_iter()
            .map(|row| match self.leaf_for(root, &row.to_vec()) {
                TreeNode::Leaf { value, .. } => *value,
                TreeNode::Split { .. } => 0.0,
            })
            .collect())
    }

    /// Class distribution of the leaf each row lands in, columns in [`DecisionTree::classes`] order
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let root = self.root.as_ref().ok_or(TurnoverError::ModelNotFitted)?;
        self.check_width(x)?;

        let mut proba = Array2::zeros((x.nrows(), self.classes.len()));
        for (i, row) in x.rows().into_iter().enumerate() {
            if let TreeNode::Leaf { distribution, .. } = self.leaf_for(root, &row.to_vec()) {
                for (j, &p) in distribution.iter().enumerate() {
                    proba[[i, j]] = p;
                }
            }
        }
        Ok(proba)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_classifier_simple() {
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        let predictions = tree.predict(&x).unwrap();
        assert_eq!(predictions, y);
    }

    #[test]
    fn test_max_depth() {
        // alternating labels need three splits to separate fully
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![0.0, 1.0, 0.0, 1.0];

        let mut tree = DecisionTree::new().with_max_depth(1);
        tree.fit(&x, &y).unwrap();
        assert_ne!(tree.predict(&x).unwrap(), y);

        let mut deep = DecisionTree::new();
        deep.fit(&x, &y).unwrap();
        assert_eq!(deep.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_leaf_distribution() {
        // A depth-1 stump cannot separate the mixed right half
        let x = array![[0.0], [0.1], [1.0], [1.1], [1.2], [1.3]];
        let y = array![0.0, 0.0, 1.0, 1.0, 1.0, 0.0];

        let mut tree = DecisionTree::new().with_max_depth(1);
        tree.fit(&x, &y).unwrap();

        let proba = tree.predict_proba(&array![[0.05], [1.25]]).unwrap();
        assert_eq!(proba.shape(), &[2, 2]);
        assert_eq!(proba[[0, 0]], 1.0);
        assert!((proba[[1, 1]] - 0.75).abs() < 1e-12);
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_fixed_classes_pad_distribution() {
        let x = array![[0.0], [1.0]];
        let y = array![1.0, 1.0];

        let mut tree = DecisionTree::new().with_classes(vec![0.0, 1.0]);
        tree.fit(&x, &y).unwrap();

        let proba = tree.predict_proba(&x).unwrap();
        assert_eq!(proba.row(0).to_vec(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let mut tree = DecisionTree::new();
        tree.fit(&array![[0.0, 1.0], [1.0, 0.0]], &array![0.0, 1.0]).unwrap();
        assert!(tree.predict(&array![[0.0, 1.0, 2.0]]).is_err());
        assert!(DecisionTree::new().predict(&array![[0.0]]).is_err());
    }
}
