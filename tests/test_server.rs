//! Integration test: Server API endpoints

mod common;

use axum::http::{Method, StatusCode};
use common::{app_for, get_json, send, write_artifacts, HEADER};

fn loaded_app() -> (tempfile::TempDir, axum::Router) {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());
    let app = app_for(dir.path());
    (dir, app)
}

fn write_new_data(dir: &std::path::Path, body: &str) {
    std::fs::write(dir.join("turnover_new_data.csv"), body).unwrap();
}

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, app) = loaded_app();
    let (status, body) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["models"]["logistic"]["ready"], true);
    assert_eq!(body["models"]["rf"]["ready"], true);
    assert_eq!(body["models"]["rf"]["chart_ready"], true);
}

#[tokio::test]
async fn test_pages_serve_html() {
    let (_dir, app) = loaded_app();
    for uri in ["/", "/logistic", "/logistic/", "/rf", "/rf/"] {
        let (status, bytes) = send(&app, Method::GET, uri).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert!(String::from_utf8_lossy(&bytes).contains("<html"), "{}", uri);
    }
}

#[tokio::test]
async fn test_logistic_predict_fixture() {
    let (_dir, app) = loaded_app();
    let (status, body) = get_json(&app, "/logistic/predict?f1=5&f2=3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction_probability"], 58.66);
    assert_eq!(body["feature_values"], serde_json::json!([5.0, 3.0]));
    assert_eq!(body["feature_names"], serde_json::json!(["工作量壓力", "組織風氣-申訴管道壓力"]));
    assert!(body.get("prediction_class").is_none());
}

#[tokio::test]
async fn test_logistic_predict_defaults_to_one() {
    let (_dir, app) = loaded_app();
    let (status, defaulted) = get_json(&app, "/logistic/predict").await;
    let (_, explicit) = get_json(&app, "/logistic/predict?f1=1&f2=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(defaulted["feature_values"], serde_json::json!([1.0, 1.0]));
    assert_eq!(defaulted["prediction_probability"], explicit["prediction_probability"]);
}

#[tokio::test]
async fn test_malformed_feature_is_bad_request() {
    let (_dir, app) = loaded_app();
    let (status, body) = get_json(&app, "/logistic/predict?f1=abc&f2=2").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("f1"));

    let (status, body) = get_json(&app, "/rf/predict?f1=2&f2=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("f2"));
}

#[tokio::test]
async fn test_repeated_feature_uses_first_value() {
    let (_dir, app) = loaded_app();
    let (status, body) = get_json(&app, "/logistic/predict?f1=5&f1=2&f2=3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction_probability"], 58.66);
    assert_eq!(body["feature_values"], serde_json::json!([5.0, 3.0]));

    let (status, body) = get_json(&app, "/rf/predict?f1=1&f1=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["feature_values"], serde_json::json!([1.0, 1.0]));

    let (status, body) = get_json(&app, "/logistic/predict?f2=x&f2=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("f2"));
}

#[tokio::test]
async fn test_rf_predict() {
    let (_dir, app) = loaded_app();
    let (status, high) = get_json(&app, "/rf/predict?f1=9&f2=1").await;
    assert_eq!(status, StatusCode::OK);

    let p = high["prediction_probability"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&p));
    assert_eq!((p * 100.0).round() / 100.0, p);
    assert_eq!(high["prediction_class"], 1);
    assert_eq!(
        high["feature_names"],
        serde_json::json!(["stress_workload_amount", "stress_org_climate_grievance"])
    );

    let (_, low) = get_json(&app, "/rf/predict?f1=1&f2=1").await;
    assert_eq!(low["prediction_class"], 0);

    let (_, again) = get_json(&app, "/rf/predict?f1=9&f2=1").await;
    assert_eq!(again, high);
}

#[tokio::test]
async fn test_chart_data() {
    let (_dir, app) = loaded_app();
    let (status, first) = get_json(&app, "/logistic/chart-data").await;

    assert_eq!(status, StatusCode::OK);
    let points = first["data"].as_array().unwrap();
    assert_eq!(points.len(), 200);
    for point in points {
        let label = point["turnover_intention"].as_str().unwrap();
        let expected = if label == "有" { 1 } else { 0 };
        assert_eq!(point["turnover_numeric"], expected);
        assert!(point["stress_workload_amount"].is_number());
        assert!(point["stress_org_climate_grievance"].is_number());
    }
    assert!(first["x_label"].as_str().unwrap().contains("stress_workload_amount"));
    assert!(first["y_label"].as_str().unwrap().contains("stress_org_climate_grievance"));

    let (_, second) = get_json(&app, "/logistic/chart-data").await;
    assert_eq!(first, second);

    let (_, rf) = get_json(&app, "/rf/chart-data").await;
    assert_eq!(rf["data"], first["data"]);
}

#[tokio::test]
async fn test_info_reports_split_and_metrics() {
    let (_dir, app) = loaded_app();

    for family in ["logistic", "rf"] {
        let (status, body) = get_json(&app, &format!("/{}/info", family)).await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(body["dataset"]["total_samples"], 300);
        assert_eq!(body["dataset"]["test_size"], 90);
        assert_eq!(body["dataset"]["train_size"], 210);
        assert_eq!(body["dataset"]["target"], "turnover_intention");

        for key in ["recall", "f1_score", "auc"] {
            let value = body["evaluation"][key].as_str().unwrap();
            let (_, decimals) = value.split_once('.').unwrap();
            assert_eq!(decimals.len(), 4, "{} {}", family, key);
        }
        assert!(body["chart_info"]["title"].is_string());
    }
}

#[tokio::test]
async fn test_missing_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_for(dir.path());

    let (status, body) = get_json(&app, "/logistic/predict?f1=1&f2=1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "模型未載入");

    // readiness comes before input parsing
    let (status, body) = get_json(&app, "/rf/predict?f1=abc").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "模型未載入");

    let (status, body) = get_json(&app, "/rf/chart-data").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "圖表資料未載入");

    let (status, body) = get_json(&app, "/logistic/info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["evaluation"]["recall"], "N/A");
    assert_eq!(body["dataset"]["test_size"], "N/A");

    let (status, body) = get_json(&app, "/rf/evaluate-new-data").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "模型未載入");

    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["models"]["logistic"]["ready"], false);
}

#[tokio::test]
async fn test_dataset_without_models_unloads_chart() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("turnover_data.csv"), common::training_csv()).unwrap();
    let app = app_for(dir.path());

    let (status, body) = get_json(&app, "/rf/chart-data").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "圖表資料未載入");

    let (_, info) = get_json(&app, "/rf/info").await;
    assert_eq!(info["dataset"]["total_samples"], "N/A");
    assert_eq!(info["evaluation"]["auc"], "N/A");
}

#[tokio::test]
async fn test_missing_dataset_unloads_predictor() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_artifacts(dir.path());
    std::fs::remove_file(&paths.dataset).unwrap();
    let app = app_for(dir.path());

    for uri in ["/logistic/predict?f1=5&f2=3", "/rf/predict?f1=5&f2=3", "/rf/evaluate-new-data"] {
        let (status, body) = get_json(&app, uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert_eq!(body["error"], "模型未載入", "{}", uri);
    }
    let (status, _) = get_json(&app, "/logistic/chart-data").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_missing_forest_unloads_its_chart_only() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_artifacts(dir.path());
    std::fs::remove_file(&paths.rf_model).unwrap();
    let app = app_for(dir.path());

    let (status, body) = get_json(&app, "/rf/chart-data").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "圖表資料未載入");

    let (status, _) = get_json(&app, "/logistic/chart-data").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get_json(&app, "/logistic/predict?f1=5&f2=3").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_evaluate_new_data() {
    let (dir, app) = loaded_app();
    write_new_data(
        dir.path(),
        &format!(
            "{}\n1,2,沒有\n2,2,沒有\n9,2,沒有\n8,2,有\n9,3,有\n1,3,有\n",
            HEADER
        ),
    );

    let (status, body) = get_json(&app, "/rf/evaluate-new-data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["confusion_matrix"], serde_json::json!([[2, 1], [1, 2]]));
    assert_eq!(body["metrics"]["total_samples"], 6);
    assert_eq!(body["metrics"]["accuracy"], 0.6667);
    assert_eq!(body["metrics"]["recall"], 0.6667);
}

#[tokio::test]
async fn test_evaluate_new_data_is_read_per_request() {
    let (dir, app) = loaded_app();
    write_new_data(dir.path(), &format!("{}\n1,2,沒有\n9,3,有\n", HEADER));
    let (_, first) = get_json(&app, "/rf/evaluate-new-data").await;
    assert_eq!(first["metrics"]["total_samples"], 2);

    write_new_data(dir.path(), &format!("{}\n1,2,沒有\n2,2,沒有\n9,3,有\n", HEADER));
    let (_, second) = get_json(&app, "/rf/evaluate-new-data").await;
    assert_eq!(second["metrics"]["total_samples"], 3);
}

#[tokio::test]
async fn test_evaluate_new_data_missing_column() {
    let (dir, app) = loaded_app();
    write_new_data(dir.path(), "stress_workload_amount,turnover_intention\n1,沒有\n9,有\n");

    let (status, body) = get_json(&app, "/rf/evaluate-new-data").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("stress_org_climate_grievance"));
}

#[tokio::test]
async fn test_evaluate_new_data_missing_file() {
    let (_dir, app) = loaded_app();
    let (status, body) = get_json(&app, "/rf/evaluate-new-data").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (_dir, app) = loaded_app();
    let (status, body) = get_json(&app, "/does-not-exist").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_post_is_405() {
    let (_dir, app) = loaded_app();
    let (status, bytes) = send(&app, Method::POST, "/logistic/predict").await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}
