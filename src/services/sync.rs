use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::cms::{CmsBackend, ShowRecord, ShowRepository};
use crate::error::{AppError, AppResult};
use crate::services::live::normalize_title;
use crate::services::radiocult::{EventPayload, RadioCultBackend, RadioEvent};
use crate::services::schedule::parse_duration_to_seconds;

/// Event length used when the record's duration field is missing or
/// unparseable; the platform rejects zero-length events.
const DEFAULT_EVENT_SECONDS: i64 = 3600;

/// Aggregate result of one reconciliation pass, returned to the HTTP caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synced_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Last completed sync pass, kept in `AppState` for the status endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub finished_at: DateTime<Utc>,
    pub report: SyncReport,
}

/// How a single record was reconciled against the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpsertOutcome {
    /// The record already carried a platform event id; that event was updated.
    Updated,
    /// No stored id, but a schedule event matched by title and start; the
    /// record adopted its id instead of creating a duplicate.
    Adopted,
    /// A new platform event was created and its id persisted to the CMS.
    Created,
}

impl UpsertOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            UpsertOutcome::Updated => "updated",
            UpsertOutcome::Adopted => "adopted",
            UpsertOutcome::Created => "created",
        }
    }
}

/// Show sync reconciler:
///
/// - Fetches all approved show records from the CMS.
/// - Maps each onto the platform's event schema (start from the broadcast
///   date/time fields, end from the parsed duration).
/// - Upserts sequentially: update when the record carries a platform event
///   id, otherwise adopt a schedule event matching by title+start, otherwise
///   create and persist the new id back onto the CMS record.
/// - A failure on one record is logged and counted as a non-sync; only the
///   initial CMS fetch is fatal to the whole pass.
pub struct ShowSyncManager;

impl ShowSyncManager {
    /// Run one best-effort reconciliation pass. Never returns an error: all
    /// failure modes are folded into the report.
    pub async fn sync_approved_shows(
        cms: &dyn CmsBackend,
        radio: &dyn RadioCultBackend,
    ) -> SyncReport {
        let shows = match ShowRepository::find_approved(cms).await {
            Ok(shows) => shows,
            Err(e) => {
                warn!("Failed to fetch approved shows from CMS: {}", e);
                return SyncReport {
                    success: false,
                    synced_count: None,
                    error: Some(format!("Failed to fetch approved shows: {}", e)),
                };
            }
        };

        info!("Starting sync pass for {} approved show(s)", shows.len());

        // Fetched once per pass; lets records that lost their stored id
        // re-attach to their platform event instead of duplicating it. Losing
        // this fetch only disables that fallback.
        let schedule = match radio.get_schedule().await {
            Ok(schedule) => schedule,
            Err(e) => {
                warn!(
                    "Failed to fetch platform schedule, continuing without event adoption: {}",
                    e
                );
                Vec::new()
            }
        };

        let mut synced = 0usize;
        for show in &shows {
            match Self::upsert_show(cms, radio, show, &schedule).await {
                Ok(outcome) => {
                    info!("Synced show {} ({})", show.slug, outcome.as_str());
                    synced += 1;
                }
                Err(e) => {
                    warn!("Failed to sync show {}: {}", show.slug, e);
                }
            }
        }

        info!("Sync pass complete: {}/{} show(s) synced", synced, shows.len());

        SyncReport {
            success: true,
            synced_count: Some(synced),
            error: None,
        }
    }

    /// Build the platform event payload for a show record.
    fn event_payload(show: &ShowRecord) -> AppResult<EventPayload> {
        let start = show.broadcast_start().ok_or_else(|| {
            AppError::Validation(format!(
                "Show {} has no parseable broadcast date",
                show.slug
            ))
        })?;

        let mut seconds = parse_duration_to_seconds(show.metadata.duration.as_deref());
        if seconds == 0 {
            seconds = DEFAULT_EVENT_SECONDS;
        }

        Ok(EventPayload {
            title: show.title.clone(),
            start_date_time_utc: start,
            end_date_time_utc: start + Duration::seconds(seconds),
            description: show.metadata.description.clone(),
            artwork_url: show.metadata.artwork_url.clone(),
        })
    }

    /// Upsert one record. Create-or-update is keyed by the platform event id
    /// stored on the record, falling back to title+start matching against the
    /// fetched schedule when the id is absent.
    async fn upsert_show(
        cms: &dyn CmsBackend,
        radio: &dyn RadioCultBackend,
        show: &ShowRecord,
        schedule: &[RadioEvent],
    ) -> AppResult<UpsertOutcome> {
        let payload = Self::event_payload(show)?;

        if let Some(event_id) = show.metadata.radiocult_event_id.as_deref() {
            radio.update_event(event_id, payload).await?;
            return Ok(UpsertOutcome::Updated);
        }

        let title = normalize_title(&show.title);
        if let Some(existing) = schedule.iter().find(|ev| {
            ev.start_date_time_utc == payload.start_date_time_utc
                && normalize_title(&ev.title) == title
        }) {
            radio.update_event(&existing.id, payload).await?;
            ShowRepository::store_platform_event_id(cms, &show.id, &existing.id).await?;
            return Ok(UpsertOutcome::Adopted);
        }

        let created = radio.create_event(payload).await?;
        ShowRepository::store_platform_event_id(cms, &show.id, &created.id).await?;
        Ok(UpsertOutcome::Created)
    }
}
