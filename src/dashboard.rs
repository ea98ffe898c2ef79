//! HTTP-дашборд: графики и метрики обучения в JSON

use axum::{
    extract::State,
    http::Method,
    response::Json,
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::visor::{Dashboard, DashboardSnapshot};

pub fn router(dashboard: Dashboard) -> Router {
    // CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/scatter", get(scatter))
        .route("/api/model", get(model))
        .route("/api/training", get(training))
        .route("/api/predictions", get(predictions))
        .route("/api/report", get(report))
        .layer(cors)
        .with_state(dashboard)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Cars MPG regression (Rust)",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn scatter(State(dashboard): State<Dashboard>) -> Json<serde_json::Value> {
    let snapshot = dashboard.snapshot();
    Json(serde_json::json!({ "scatter": snapshot.scatter }))
}

async fn model(State(dashboard): State<Dashboard>) -> Json<serde_json::Value> {
    let snapshot = dashboard.snapshot();
    Json(serde_json::json!({ "model": snapshot.model }))
}

async fn training(State(dashboard): State<Dashboard>) -> Json<serde_json::Value> {
    let DashboardSnapshot {
        status, error, epochs, ..
    } = dashboard.snapshot();
    Json(serde_json::json!({
        "status": status,
        "error": error,
        "epochs": epochs,
    }))
}

async fn predictions(State(dashboard): State<Dashboard>) -> Json<serde_json::Value> {
    let snapshot = dashboard.snapshot();
    Json(serde_json::json!({
        "original": snapshot.scatter.map(|s| s.points),
        "predicted": snapshot.predictions,
    }))
}

async fn report(State(dashboard): State<Dashboard>) -> Json<DashboardSnapshot> {
    Json(dashboard.snapshot())
}
