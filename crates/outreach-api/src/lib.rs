pub mod compare;
pub mod error;
pub mod export;
pub mod middleware;
pub mod state;
pub mod stats;
pub mod view;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use serde_json::{Value, json};
use tracing::info;

pub use error::ApiError;
pub use state::{AppState, AppStateInner};

/// All dashboard routes under `/api`. Layers (CORS, tracing, static files)
/// are left to the binary.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/summary", get(stats::summary))
        .route("/api/weekly", get(stats::weekly))
        .route("/api/types", get(stats::types))
        .route("/api/performance", get(stats::performance))
        .route("/api/global", get(stats::global))
        .route("/api/entries", get(stats::entries))
        .route("/api/chart", get(stats::chart))
        .route("/api/compare", get(compare::compare))
        .route("/api/export/weekly.csv", get(export::weekly_csv))
        .route("/api/export/chart.csv", get(export::chart_csv))
        .route("/api/refresh", post(refresh))
        .layer(from_fn_with_state(state.clone(), middleware::require_token));

    Router::new()
        .route("/api/health", get(health))
        .merge(protected)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn refresh(State(state): State<AppState>) -> StatusCode {
    state.source.invalidate().await;
    info!("cache dropped on request");
    StatusCode::NO_CONTENT
}
