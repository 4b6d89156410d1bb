use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::cms::ShowRepository;
use crate::error::AppResult;
use crate::services::live;
use crate::services::radiocult::{RadioCultBackend, RadioEvent};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(now_playing))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NowPlayingResponse {
    current_event: Option<RadioEvent>,
    matching_show_slug: Option<String>,
    is_live: bool,
}

/// What is on air right now, with a link back into the catalog when the
/// event matches a show record. No current event and no matching record are
/// both normal outcomes, not errors; the frontend simply omits the link.
async fn now_playing(State(state): State<Arc<AppState>>) -> AppResult<Json<NowPlayingResponse>> {
    let schedule = state.radio.get_schedule().await?;

    let now = Utc::now();
    let Some(current) = live::current_event(&schedule, now) else {
        return Ok(Json(NowPlayingResponse {
            current_event: None,
            matching_show_slug: None,
            is_live: false,
        }));
    };

    // Matching is best-effort: a catalog read failure should not take the
    // "now playing" endpoint down with it.
    let matching_show_slug = match ShowRepository::find_all(state.cms.as_ref()).await {
        Ok(shows) => live::find_matching_show(current, &shows).map(|show| show.slug.clone()),
        Err(e) => {
            tracing::warn!("Failed to load catalog for live matching: {}", e);
            None
        }
    };

    Ok(Json(NowPlayingResponse {
        current_event: Some(current.clone()),
        matching_show_slug,
        is_live: true,
    }))
}
