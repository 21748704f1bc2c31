//! Turnover dataset handling
//!
//! - [`schema`] - ordered feature schema and label encoding
//! - [`loader`] - polars-backed CSV loading
//!
//! A [`Dataset`] is loaded once and then only read.

pub mod loader;
pub mod schema;

pub use loader::DatasetLoader;
pub use schema::{
    encode_labels, label_to_numeric, FeatureSchema, FEATURE_ORG_CLIMATE, FEATURE_WORKLOAD,
    LABEL_NEGATIVE, LABEL_POSITIVE, TARGET_COLUMN,
};

use crate::error::Result;
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// One dataset row: the two stress scores and the categorical label.
///
/// Field names are the CSV column names so a record serializes as the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub stress_workload_amount: f64,
    pub stress_org_climate_grievance: f64,
    pub turnover_intention: String,
}

/// A chart point: a record plus its numeric label (`null` for unknown labels).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    #[serde(flatten)]
    pub record: DatasetRecord,
    pub turnover_numeric: Option<u8>,
}

impl From<&DatasetRecord> for ChartPoint {
    fn from(record: &DatasetRecord) -> Self {
        Self {
            turnover_numeric: label_to_numeric(&record.turnover_intention),
            record: record.clone(),
        }
    }
}

/// In-memory turnover dataset
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<DatasetRecord>,
}

impl Dataset {
    pub fn from_records(records: Vec<DatasetRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[DatasetRecord] {
        &self.records
    }

    /// Feature matrix in schema order, one row per record.
    pub fn features(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.records.len(), FeatureSchema::n_features()), |(r, c)| {
            let record = &self.records[r];
            match c {
                0 => record.stress_workload_amount,
                _ => record.stress_org_climate_grievance,
            }
        })
    }

    /// Labels mapped to 0/1. Unknown labels are an error.
    pub fn targets(&self) -> Result<Array1<f64>> {
        let labels: Vec<&str> = self
            .records
            .iter()
            .map(|r| r.turnover_intention.as_str())
            .collect();
        encode_labels(&labels)
    }

    /// Draw `n` distinct records with a seeded RNG, in draw order.
    ///
    /// When the dataset holds fewer than `n` rows every row is returned
    /// (still in seeded order).
    pub fn sample(&self, n: usize, seed: u64) -> Vec<DatasetRecord> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let amount = n.min(self.records.len());
        rand::seq::index::sample(&mut rng, self.records.len(), amount)
            .into_iter()
            .map(|idx| self.records[idx].clone())
            .collect()
    }
}
