//! Seeded stratified train/test split

use crate::error::{Result, TurnoverError};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// A single train/test partition of row indices (both sorted ascending)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Stratified splitter: class proportions are preserved in both subsets.
#[derive(Debug, Clone)]
pub struct StratifiedSplit {
    test_size: f64,
    random_state: u64,
}

impl Default for StratifiedSplit {
    fn default() -> Self {
        Self::new(0.3, 42)
    }
}

impl StratifiedSplit {
    pub fn new(test_size: f64, random_state: u64) -> Self {
        Self {
            test_size,
            random_state,
        }
    }

    pub fn test_size(&self) -> f64 {
        self.test_size
    }

    pub fn random_state(&self) -> u64 {
        self.random_state
    }

    /// Number of held-out rows for `n_samples` rows.
    pub fn n_test(&self, n_samples: usize) -> usize {
        (self.test_size * n_samples as f64).ceil() as usize
    }

    /// Split row indices of `y` into train and test sets.
    ///
    /// Per-class test counts are proportional to class size, with leftover
    /// rows assigned by largest remainder (ties favour the larger class).
    pub fn split(&self, y: &Array1<f64>) -> Result<TrainTestSplit> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(TurnoverError::Input(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }

        let n_samples = y.len();
        let n_test = self.n_test(n_samples);
        let n_train = n_samples.saturating_sub(n_test);

        // BTreeMap keeps class iteration order stable across runs
        let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (idx, &val) in y.iter().enumerate() {
            class_indices.entry(val.round() as i64).or_default().push(idx);
        }
        let n_classes = class_indices.len();

        if n_classes == 0 || n_test < n_classes || n_train < n_classes {
            return Err(TurnoverError::Data(format!(
                "cannot stratify {} rows with {} classes into {} train / {} test rows",
                n_samples, n_classes, n_train, n_test
            )));
        }

        let allocation = Self::allocate(&class_indices, n_test, n_samples);

        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
        let mut train_indices = Vec::with_capacity(n_train);
        let mut test_indices = Vec::with_capacity(n_test);

        for (indices, take) in class_indices.values_mut().zip(allocation) {
            indices.shuffle(&mut rng);
            test_indices.extend_from_slice(&indices[..take]);
            train_indices.extend_from_slice(&indices[take..]);
        }

        train_indices.sort_unstable();
        test_indices.sort_unstable();

        Ok(TrainTestSplit {
            train_indices,
            test_indices,
        })
    }

    fn allocate(class_indices: &BTreeMap<i64, Vec<usize>>, n_test: usize, n_samples: usize) -> Vec<usize> {
        let exact: Vec<f64> = class_indices
            .values()
            .map(|idx| n_test as f64 * idx.len() as f64 / n_samples as f64)
            .collect();
        let mut allocation: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();

        let mut leftover = n_test - allocation.iter().sum::<usize>();
        let sizes: Vec<usize> = class_indices.values().map(|idx| idx.len()).collect();

        let mut order: Vec<usize> = (0..exact.len()).collect();
        order.sort_by(|&a, &b| {
            let ra = exact[a] - exact[a].floor();
            let rb = exact[b] - exact[b].floor();
            rb.partial_cmp(&ra)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(sizes[b].cmp(&sizes[a]))
                .then(a.cmp(&b))
        });

        for class in order.into_iter().cycle() {
            if leftover == 0 {
                break;
            }
            if allocation[class] < sizes[class] {
                allocation[class] += 1;
                leftover -= 1;
            }
        }

        allocation
    }
}
