//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use ndarray::array;
use serde_json::Value;
use tower::ServiceExt;

use turnover_insight::artifacts::{self, ArtifactPaths};
use turnover_insight::data::{DatasetLoader, FeatureSchema};
use turnover_insight::inference::LinearScaledModel;
use turnover_insight::preprocessing::{Scaler, ScalerParams, ScalerType};
use turnover_insight::server::{create_router, AppState, ServerConfig};
use turnover_insight::training::{LogisticRegression, RandomForest};

pub const HEADER: &str = "stress_workload_amount,stress_org_climate_grievance,turnover_intention";

/// 300 rows, positive exactly when workload >= 5, half of each class.
pub fn training_csv() -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for i in 0..300 {
        let f1 = (i % 50) as f64 / 5.0;
        let f2 = ((i * 7) % 30) as f64 / 3.0;
        let label = if f1 >= 5.0 { "有" } else { "沒有" };
        out.push_str(&format!("{},{},{}\n", f1, f2, label));
    }
    out
}

/// Scaler center (3, 2) scale (2, 1); weights (0.5, -0.25); intercept 0.1
pub fn toy_linear() -> LinearScaledModel {
    let scaler = Scaler::from_params(
        ScalerType::Standard,
        FeatureSchema::names(),
        vec![ScalerParams { center: 3.0, scale: 2.0 }, ScalerParams { center: 2.0, scale: 1.0 }],
    )
    .unwrap();
    LinearScaledModel::new(scaler, LogisticRegression::from_coefficients(array![0.5, -0.25], 0.1)).unwrap()
}

/// Write every artifact plus the primary dataset into `dir`.
pub fn write_artifacts(dir: &Path) -> ArtifactPaths {
    let paths = ArtifactPaths::in_dir(dir);
    std::fs::write(&paths.dataset, training_csv()).unwrap();

    artifacts::save_linear_model(&paths, &toy_linear()).unwrap();

    let dataset = DatasetLoader::new().load(&paths.dataset).unwrap();
    let mut forest = RandomForest::new(15).with_random_state(42);
    forest
        .fit_named(&dataset.features(), &dataset.targets().unwrap(), &FeatureSchema::names())
        .unwrap();
    artifacts::save_ensemble_model(&paths, &forest, &FeatureSchema::names()).unwrap();

    paths
}

pub fn app_for(dir: &Path) -> axum::Router {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        models_dir: dir.display().to_string(),
        static_dir: None,
        new_data_path: None,
    };
    let state = Arc::new(AppState::load(config));
    create_router(state)
}

pub async fn send(app: &axum::Router, method: Method, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

pub async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let (status, bytes) = send(app, Method::GET, uri).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}
