use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::cms::{ShowKind, ShowRecord, ShowRepository};
use crate::error::{AppError, AppResult};
use crate::AppState;

const DEFAULT_PAGE_LIMIT: u32 = 20;
const MAX_PAGE_LIMIT: u32 = 100;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_shows))
        .route("/:slug", get(get_show))
}

#[derive(Debug, Deserialize)]
struct ListParams {
    limit: Option<u32>,
    skip: Option<u32>,
    /// `episodes` (default) or `shows` for the legacy archive type.
    kind: Option<String>,
}

#[derive(Debug, Serialize)]
struct ShowListResponse {
    shows: Vec<ShowRecord>,
    total: u64,
}

/// Browse the catalog, newest first.
async fn list_shows(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ShowListResponse>> {
    let kind = match params.kind.as_deref() {
        None | Some("episodes") => ShowKind::Episode,
        Some("shows") => ShowKind::LegacyShow,
        Some(other) => {
            return Err(AppError::BadRequest(format!(
                "Unknown show kind '{}'",
                other
            )))
        }
    };

    let limit = params
        .limit
        .unwrap_or(DEFAULT_PAGE_LIMIT)
        .min(MAX_PAGE_LIMIT);
    let skip = params.skip.unwrap_or(0);

    let (shows, total) = ShowRepository::find_page(state.cms.as_ref(), kind, limit, skip).await?;
    Ok(Json(ShowListResponse { shows, total }))
}

/// Whether a path segment looks like a CMS object id rather than a slug.
/// Old permalinks use the raw 24-char hex id.
fn looks_like_object_id(segment: &str) -> bool {
    segment.len() == 24 && segment.chars().all(|c| c.is_ascii_hexdigit())
}

async fn get_show(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Json<ShowRecord>> {
    if let Some(show) = ShowRepository::find_by_slug(state.cms.as_ref(), &slug).await? {
        return Ok(Json(show));
    }

    if looks_like_object_id(&slug) {
        return ShowRepository::find_by_id(state.cms.as_ref(), &slug)
            .await
            .map(Json);
    }

    Err(AppError::NotFound(format!("Show '{}' not found", slug)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_detection() {
        assert!(looks_like_object_id("64e1f0a9b2c3d4e5f6a7b8c9"));
        assert!(!looks_like_object_id("late-night-disco"));
        assert!(!looks_like_object_id("64e1f0a9"));
        assert!(!looks_like_object_id("64e1f0a9b2c3d4e5f6a7b8cZ"));
    }
}
