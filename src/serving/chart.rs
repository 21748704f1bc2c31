//! Scatter-plot data for the two stress features

use crate::data::{ChartPoint, Dataset};
use crate::error::{Result, TurnoverError};
use serde::Serialize;
use tracing::warn;

/// Records drawn for the chart
pub const CHART_SAMPLE_SIZE: usize = 200;
/// Seed used for the chart draw
pub const CHART_SEED: u64 = 42;

pub const X_LABEL: &str = "工作量壓力 (stress_workload_amount)";
pub const Y_LABEL: &str = "組織風氣-申訴管道壓力 (stress_org_climate_grievance)";

#[derive(Debug, Clone, Serialize)]
pub struct ChartResponse {
    pub data: Vec<ChartPoint>,
    pub x_label: &'static str,
    pub y_label: &'static str,
}

/// Chart sample drawn once at load time
#[derive(Debug, Clone, Default)]
pub struct ChartData {
    points: Option<Vec<ChartPoint>>,
}

impl ChartData {
    pub fn unloaded() -> Self {
        Self { points: None }
    }

    pub fn from_dataset(dataset: &Dataset) -> Self {
        if dataset.len() < CHART_SAMPLE_SIZE {
            warn!(rows = dataset.len(), wanted = CHART_SAMPLE_SIZE, "Dataset smaller than chart sample, using every row");
        }

        let points = dataset
            .sample(CHART_SAMPLE_SIZE, CHART_SEED)
            .iter()
            .map(ChartPoint::from)
            .collect();

        Self { points: Some(points) }
    }

    pub fn is_loaded(&self) -> bool {
        self.points.as_ref().is_some_and(|p| !p.is_empty())
    }

    pub fn len(&self) -> usize {
        self.points.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Chart payload, or [`TurnoverError::DataNotLoaded`] when no sample exists.
    pub fn response(&self) -> Result<ChartResponse> {
        match &self.points {
            Some(points) if !points.is_empty() => Ok(ChartResponse {
                data: points.clone(),
                x_label: X_LABEL,
                y_label: Y_LABEL,
            }),
            _ => Err(TurnoverError::DataNotLoaded),
        }
    }
}
