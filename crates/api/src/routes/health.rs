use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

pub fn health_router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// Liveness check plus a quick look at the stored state marker.
async fn health(State(state): State<AppState>) -> Json<Value> {
    let last_state = state
        .store
        .last_overall_state()
        .await
        .ok()
        .flatten()
        .map(|s| s.to_string());

    Json(json!({
        "status": "ok",
        "last_overall_state": last_state,
    }))
}
