use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use common::{series_spec, Error};

use crate::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/series/:id", get(get_series))
        .route("/api/status", get(get_status))
}

#[derive(Deserialize)]
struct SeriesQuery {
    limit: Option<i64>,
}

/// Stored observations for one registered series, oldest first.
async fn get_series(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<SeriesQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let spec = series_spec(&id).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("unknown series '{id}'") })),
        )
    })?;

    let limit = q.limit.unwrap_or(500).clamp(1, 5000);
    let series = state.store.load_series(&id, limit).await.map_err(internal)?;

    let points: Vec<Value> = series
        .points()
        .iter()
        .map(|p| json!({ "ts": p.ts.to_rfc3339(), "value": p.value }))
        .collect();

    Ok(Json(json!({
        "series_id": spec.id,
        "name": spec.name,
        "freq": spec.freq.to_string(),
        "source": spec.source,
        "units": spec.unit,
        "count": points.len(),
        "points": points,
    })))
}

/// Evaluate the trigger report against current stored data.
async fn get_status(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match triggers::evaluate(&state.store, &state.gates).await {
        Ok(report) => Ok(Json(serde_json::to_value(&report).map_err(|e| {
            internal(Error::Json(e))
        })?)),
        Err(Error::InsufficientData { indicator, detail }) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": "insufficient data",
                "indicator": indicator,
                "detail": detail,
            })),
        )),
        Err(e) => Err(internal(e)),
    }
}

fn internal(e: Error) -> (StatusCode, Json<Value>) {
    warn!(error = %e, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
}
