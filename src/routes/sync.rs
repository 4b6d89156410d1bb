use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use crate::services::sync::{ShowSyncManager, SyncReport, SyncStatus};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sync", post(sync_now))
        .route("/status", get(get_status))
}

/// Trigger a manual sync pass of all approved shows to the radio platform.
///
/// The report is returned with a 200 either way; a failed pass is expressed
/// in its `success`/`error` fields, not as an HTTP error.
async fn sync_now(State(state): State<Arc<AppState>>) -> Json<SyncReport> {
    let report =
        ShowSyncManager::sync_approved_shows(state.cms.as_ref(), state.radio.as_ref()).await;

    *state.last_sync.write().await = Some(SyncStatus {
        finished_at: Utc::now(),
        report: report.clone(),
    });

    Json(report)
}

/// Sync status: whether the background worker is enabled, its interval, and
/// the outcome of the last completed pass (manual or periodic).
async fn get_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let last_sync = state.last_sync.read().await.clone();

    Json(json!({
        "enabled": state.config.sync.enabled,
        "interval_seconds": state.config.sync.interval_seconds,
        "last_sync": last_sync,
    }))
}
