//! Random Forest classifier

use crate::error::{Result, TurnoverError};
use super::decision_tree::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use rand::RngCore;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random Forest model
///
/// Every tree is grown on a bootstrap sample and looks at `ceil(sqrt(n_features))`
/// candidate features per split. Probabilities are the mean of the per-tree
/// leaf distributions; the predicted class is the most probable one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    /// Individual trees
    trees: Vec<DecisionTree>,
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree
    pub max_depth: Option<usize>,
    /// Random state
    pub random_state: Option<u64>,
    /// Number of features
    n_features: usize,
    /// Column names seen at fit time, in order
    feature_names: Vec<String>,
    /// Sorted class labels
    classes: Vec<f64>,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForest {
    /// Create a new classifier forest
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            random_state: None,
            n_features: 0,
            feature_names: Vec::new(),
            classes: Vec::new(),
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    fn max_features(n_features: usize) -> usize {
        ((n_features as f64).sqrt().ceil() as usize).max(1)
    }

    /// Fit the forest and record the column names it was trained on.
    pub fn fit_named(&mut self, x: &Array2<f64>, y: &Array1<f64>, feature_names: &[String]) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(TurnoverError::Shape {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if feature_names.len() != n_features {
            return Err(TurnoverError::Shape {
                expected: format!("{} feature names", n_features),
                actual: format!("{} feature names", feature_names.len()),
            });
        }
        if n_samples == 0 || self.n_estimators == 0 {
            return Err(TurnoverError::Data("a forest needs at least one row and one tree".to_string()));
        }

        self.n_features = n_features;
        self.feature_names = feature_names.to_vec();
        let max_features = Self::max_features(n_features);

        let mut classes: Vec<f64> = y.iter().copied().collect();
        classes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        classes.dedup();
        self.classes = classes;

        let base_seed = self.random_state.unwrap_or(42);

        let trees: Vec<DecisionTree> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| -> Result<DecisionTree> {
                let seed = base_seed.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                let sample_indices: Vec<usize> = (0..n_samples)
                    .map(|_| (rng.next_u64() as usize) % n_samples)
                    .collect();

                let x_boot = x.select(Axis(0), &sample_indices);
                let y_boot: Array1<f64> = sample_indices.iter().map(|&i| y[i]).collect();

                let mut tree = DecisionTree::new()
                    .with_random_state(seed)
                    .with_classes(self.classes.clone());

                if let Some(d) = self.max_depth {
                    tree = tree.with_max_depth(d);
                }
                tree.max_features = Some(max_features);

                tree.fit(&x_boot, &y_boot)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        self.trees = trees;

        Ok(self)
    }

    /// Predict class probabilities, columns in [`RandomForest::classes`] order
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.trees.is_empty() {
            return Err(TurnoverError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(TurnoverError::Shape {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        let per_tree: Vec<Array2<f64>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict_proba(x))
            .collect::<Result<Vec<_>>>()?;

        let mut proba = Array2::<f64>::zeros((x.nrows(), self.classes.len()));
        for tree_proba in &per_tree {
            proba += tree_proba;
        }
        proba /= per_tree.len() as f64;

        Ok(proba)
    }

    /// Predict class labels (most probable class; ties go to the lower label)
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;

        Ok(proba
            .rows()
            .into_iter()
            .map(|row| {
                let best = row
                    .iter()
                    .enumerate()
                    .fold((0usize, f64::NEG_INFINITY), |best, (idx, &p)| if p > best.1 { (idx, p) } else { best })
                    .0;
                self.classes.get(best).copied().unwrap_or(0.0)
            })
            .collect())
    }

    /// Column names recorded at fit time
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Get number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
