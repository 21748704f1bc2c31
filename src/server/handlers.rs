//! HTTP request handlers

use std::sync::Arc;
use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::inference::ModelFamily;
use crate::serving::FamilyService;

use super::error::{Result, ServerError};
use super::state::AppState;

/// Raw query values; parsed by hand so errors can name the parameter
#[derive(Debug, Default, PartialEq)]
pub struct PredictQuery {
    pub f1: Option<String>,
    pub f2: Option<String>,
}

impl PredictQuery {
    /// Keep the first value of each feature; repeats and unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "f1" => &mut query.f1,
                "f2" => &mut query.f2,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

/// Parse one feature value. Absent means 1.0.
pub fn parse_feature(name: &str, raw: Option<&str>) -> Result<f64> {
    let Some(raw) = raw else {
        return Ok(1.0);
    };

    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ServerError::BadRequest(format!("could not convert {} to float: {:?}", name, raw)))?;

    if !value.is_finite() {
        return Err(ServerError::BadRequest(format!("{} must be a finite number, got {:?}", name, raw)));
    }
    Ok(value)
}

fn predict_with(service: &FamilyService, query: &PredictQuery) -> Result<Json<Value>> {
    // readiness is checked before the inputs are looked at
    service.model()?;

    let f1 = parse_feature("f1", query.f1.as_deref())?;
    let f2 = parse_feature("f2", query.f2.as_deref())?;

    let response = service.predict(f1, f2)?;
    debug!(
        family = %service.family(),
        f1,
        f2,
        probability = response.prediction_probability,
        "Prediction served"
    );
    Ok(Json(serde_json::to_value(response).map_err(|e| ServerError::Internal(e.to_string()))?))
}

fn chart_with(service: &FamilyService) -> Result<Json<Value>> {
    let chart = service.chart_data()?;
    Ok(Json(serde_json::to_value(chart).map_err(|e| ServerError::Internal(e.to_string()))?))
}

fn info_with(service: &FamilyService) -> Result<Json<Value>> {
    Ok(Json(
        serde_json::to_value(service.model_info()).map_err(|e| ServerError::Internal(e.to_string()))?,
    ))
}

// ============================================================================
// Logistic Regression Handlers
// ============================================================================

pub async fn logistic_predict(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Value>> {
    predict_with(&state.serving.logistic, &PredictQuery::from_pairs(pairs))
}

pub async fn logistic_chart_data(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    chart_with(&state.serving.logistic)
}

pub async fn logistic_info(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    info_with(&state.serving.logistic)
}

// ============================================================================
// Random Forest Handlers
// ============================================================================

pub async fn rf_predict(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Value>> {
    predict_with(&state.serving.rf, &PredictQuery::from_pairs(pairs))
}

pub async fn rf_chart_data(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    chart_with(&state.serving.rf)
}

pub async fn rf_info(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    info_with(&state.serving.rf)
}

/// Score the forest on the secondary dataset; the file is re-read per call.
pub async fn rf_evaluate_new_data(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    state.serving.rf.model()?;

    let worker_state = Arc::clone(&state);
    let report = tokio::task::spawn_blocking(move || worker_state.serving.evaluate_new_data())
        .await
        .map_err(|e| ServerError::Internal(format!("evaluation task failed: {}", e)))??;

    info!(
        rows = report.metrics.total_samples,
        accuracy = report.metrics.accuracy,
        "New data evaluation served"
    );
    Ok(Json(serde_json::to_value(report).map_err(|e| ServerError::Internal(e.to_string()))?))
}

// ============================================================================
// System Handlers
// ============================================================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let family = |f: ModelFamily| {
        let service = state.serving.family(f);
        json!({
            "ready": service.is_ready(),
            "chart_ready": service.chart_ready(),
        })
    };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.uptime_secs(),
        "models": {
            "logistic": family(ModelFamily::Logistic),
            "rf": family(ModelFamily::Rf),
        },
    }))
}

// ============================================================================
// UI Handlers
// ============================================================================

pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn serve_logistic_page() -> Html<&'static str> {
    Html(LOGISTIC_HTML)
}

pub async fn serve_rf_page() -> Html<&'static str> {
    Html(RF_HTML)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="zh-Hant">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>員工離職傾向預測</title>
</head>
<body>
    <h1>員工離職傾向預測</h1>
    <ul>
        <li><a href="/logistic/">邏輯迴歸</a></li>
        <li><a href="/rf/">隨機森林</a></li>
        <li><a href="/health">服務狀態</a></li>
    </ul>
</body>
</html>
"#;

const LOGISTIC_HTML: &str = r#"<!DOCTYPE html>
<html lang="zh-Hant">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>邏輯迴歸 - 離職傾向</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
</head>
<body>
    <h1>邏輯迴歸</h1>
    <form id="predict">
        <label>工作量壓力 <input name="f1" type="number" step="any" value="1"></label>
        <label>組織風氣-申訴管道壓力 <input name="f2" type="number" step="any" value="1"></label>
        <button type="submit">預測</button>
    </form>
    <pre id="result"></pre>
    <canvas id="chart"></canvas>
    <script>
        const base = "/logistic";
        document.getElementById("predict").addEventListener("submit", async (e) => {
            e.preventDefault();
            const q = new URLSearchParams(new FormData(e.target));
            const res = await fetch(`${base}/predict?${q}`);
            document.getElementById("result").textContent = JSON.stringify(await res.json(), null, 2);
        });
        fetch(`${base}/chart-data`).then(r => r.json()).then(d => {
            if (d.error) return;
            const pick = (n) => d.data.filter(p => p.turnover_numeric === n)
                .map(p => ({ x: p.stress_workload_amount, y: p.stress_org_climate_grievance }));
            new Chart(document.getElementById("chart"), {
                type: "scatter",
                data: { datasets: [{ label: "有", data: pick(1) }, { label: "沒有", data: pick(0) }] },
                options: { scales: { x: { title: { display: true, text: d.x_label } }, y: { title: { display: true, text: d.y_label } } } }
            });
        });
    </script>
</body>
</html>
"#;

const RF_HTML: &str = r#"<!DOCTYPE html>
<html lang="zh-Hant">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>隨機森林 - 離職傾向</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
</head>
<body>
    <h1>隨機森林</h1>
    <form id="predict">
        <label>工作量壓力 <input name="f1" type="number" step="any" value="1"></label>
        <label>組織風氣-申訴管道壓力 <input name="f2" type="number" step="any" value="1"></label>
        <button type="submit">預測</button>
    </form>
    <pre id="result"></pre>
    <button id="evaluate">以新資料評估</button>
    <pre id="evaluation"></pre>
    <canvas id="chart"></canvas>
    <script>
        const base = "/rf";
        document.getElementById("predict").addEventListener("submit", async (e) => {
            e.preventDefault();
            const q = new URLSearchParams(new FormData(e.target));
            const res = await fetch(`${base}/predict?${q}`);
            document.getElementById("result").textContent = JSON.stringify(await res.json(), null, 2);
        });
        document.getElementById("evaluate").addEventListener("click", async () => {
            const res = await fetch(`${base}/evaluate-new-data`);
            document.getElementById("evaluation").textContent = JSON.stringify(await res.json(), null, 2);
        });
        fetch(`${base}/chart-data`).then(r => r.json()).then(d => {
            if (d.error) return;
            const pick = (n) => d.data.filter(p => p.turnover_numeric === n)
                .map(p => ({ x: p.stress_workload_amount, y: p.stress_org_climate_grievance }));
            new Chart(document.getElementById("chart"), {
                type: "scatter",
                data: { datasets: [{ label: "有", data: pick(1) }, { label: "沒有", data: pick(0) }] },
                options: { scales: { x: { title: { display: true, text: d.x_label } }, y: { title: { display: true, text: d.y_label } } } }
            });
        });
    </script>
</body>
</html>
"#;
