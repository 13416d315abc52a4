use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::errors::ServiceError;
use crate::services::sync::{BatchSummary, RetriggerResponse};
use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/sync/run", post(run_sync))
        .route("/api/v1/sync/orders/:order_id", post(retrigger_order))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let database = if state.db.ping().await.is_ok() {
        "up"
    } else {
        "down"
    };
    Json(json!({ "status": "ok", "database": database }))
}

#[derive(Debug, Deserialize)]
struct RunSyncQuery {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

async fn run_sync(
    State(state): State<AppState>,
    Query(query): Query<RunSyncQuery>,
) -> Result<Json<BatchSummary>, ServiceError> {
    let summary = match (query.from, query.to) {
        (Some(from), Some(to)) => state.sync.run_window(from, to).await?,
        _ => state.sync.run_default_window().await?,
    };
    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
struct RetriggerQuery {
    #[serde(default)]
    force: bool,
}

async fn retrigger_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Query(query): Query<RetriggerQuery>,
) -> Result<Json<RetriggerResponse>, ServiceError> {
    let response = state.sync.retrigger(&order_id, query.force).await?;
    Ok(Json(response))
}
