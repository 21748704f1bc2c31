//! CSV dataset loading
//!
//! Reads a turnover CSV with polars and keeps only the schema columns.

use crate::error::{Result, TurnoverError};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::debug;

use super::schema::{FeatureSchema, TARGET_COLUMN};
use super::{Dataset, DatasetRecord};

/// Loader for turnover dataset files
pub struct DatasetLoader {
    infer_schema_length: usize,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetLoader {
    pub fn new() -> Self {
        Self {
            infer_schema_length: 1000,
        }
    }

    /// Load a dataset, restricted to the two features and the label column.
    ///
    /// Missing columns are reported together as [`TurnoverError::MissingColumns`].
    pub fn load(&self, path: &Path) -> Result<Dataset> {
        let df = self.read_csv(path)?;
        let dataset = Self::dataframe_to_dataset(&df)?;
        debug!(rows = dataset.len(), path = %path.display(), "Dataset loaded");
        Ok(dataset)
    }

    fn read_csv(&self, path: &Path) -> Result<DataFrame> {
        let file = File::open(path)?;

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| TurnoverError::Data(e.to_string()))
    }

    /// Fail with every required column that `df` lacks.
    pub fn require_columns(df: &DataFrame, required: &[&str]) -> Result<()> {
        let present: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let missing: Vec<String> = required
            .iter()
            .filter(|col| !present.iter().any(|p| p == *col))
            .map(|col| col.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(TurnoverError::MissingColumns(missing))
        }
    }

    /// Convert a polars frame holding the schema columns into records.
    pub fn dataframe_to_dataset(df: &DataFrame) -> Result<Dataset> {
        Self::require_columns(df, &FeatureSchema::DATASET_COLUMNS)?;

        let workload = Self::numeric_column(df, FeatureSchema::NAMES[0])?;
        let climate = Self::numeric_column(df, FeatureSchema::NAMES[1])?;
        let labels = Self::label_column(df)?;

        let records = workload
            .into_iter()
            .zip(climate)
            .zip(labels)
            .map(|((stress_workload_amount, stress_org_climate_grievance), turnover_intention)| {
                DatasetRecord {
                    stress_workload_amount,
                    stress_org_climate_grievance,
                    turnover_intention,
                }
            })
            .collect();

        Ok(Dataset::from_records(records))
    }

    fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
        let column = df
            .column(name)
            .map_err(|_| TurnoverError::MissingColumns(vec![name.to_string()]))?;
        let as_f64 = column
            .cast(&DataType::Float64)
            .map_err(|e| TurnoverError::Data(format!("column {} is not numeric: {}", name, e)))?;

        as_f64
            .f64()
            .map_err(|e| TurnoverError::Data(e.to_string()))?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                value.ok_or_else(|| {
                    TurnoverError::Data(format!("column {} has a missing value at row {}", name, row))
                })
            })
            .collect()
    }

    fn label_column(df: &DataFrame) -> Result<Vec<String>> {
        let column = df
            .column(TARGET_COLUMN)
            .map_err(|_| TurnoverError::MissingColumns(vec![TARGET_COLUMN.to_string()]))?;
        let as_str = column
            .cast(&DataType::String)
            .map_err(|e| TurnoverError::Data(e.to_string()))?;

        Ok(as_str
            .str()
            .map_err(|e| TurnoverError::Data(e.to_string()))?
            .into_iter()
            .map(|value| value.unwrap_or_default().to_string())
            .collect())
    }
}
