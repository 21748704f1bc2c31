//! API route definitions

use std::sync::Arc;
use axum::{
    response::IntoResponse,
    routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;

use super::{error::ServerError, handlers, state::AppState};

async fn handle_404() -> impl IntoResponse {
    ServerError::NotFound("Not found. Visit / for the pages or /health to check service status.".to_string())
}

async fn handle_405() -> impl IntoResponse {
    ServerError::MethodNotAllowed("Method not allowed. Every endpoint accepts GET only.".to_string())
}

fn cors_layer() -> CorsLayer {
    match std::env::var("CORS_ORIGIN") {
        Ok(origin) if !origin.is_empty() && origin != "*" => match origin.parse::<axum::http::HeaderValue>() {
            Ok(value) => CorsLayer::new()
                .allow_origin(value)
                .allow_methods(Any)
                .allow_headers(Any),
            Err(_) => {
                warn!(origin = %origin, "Invalid CORS_ORIGIN, allowing any origin");
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            }
        },
        _ => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    }
}

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();

    let mut app = Router::new()
        .route("/", get(handlers::serve_index))
        .route("/health", get(handlers::health_check))
        // Logistic regression
        .route("/logistic", get(handlers::serve_logistic_page))
        .route("/logistic/", get(handlers::serve_logistic_page))
        .route("/logistic/predict", get(handlers::logistic_predict))
        .route("/logistic/chart-data", get(handlers::logistic_chart_data))
        .route("/logistic/info", get(handlers::logistic_info))
        // Random forest
        .route("/rf", get(handlers::serve_rf_page))
        .route("/rf/", get(handlers::serve_rf_page))
        .route("/rf/predict", get(handlers::rf_predict))
        .route("/rf/chart-data", get(handlers::rf_chart_data))
        .route("/rf/info", get(handlers::rf_info))
        .route("/rf/evaluate-new-data", get(handlers::rf_evaluate_new_data))
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405)
        .with_state(state);

    // Serve static files if directory exists
    if let Some(ref static_dir) = static_dir {
        let static_path = std::path::Path::new(static_dir);
        if static_path.exists() {
            app = app.nest_service("/static", ServeDir::new(static_path));
        }
    }

    app.layer(CompressionLayer::new())
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}
