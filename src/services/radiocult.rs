use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Schedule window requested from the platform: a little history so an event
/// that started before this instant is still returned, and enough future for
/// the reconciler's title+date matching.
const SCHEDULE_LOOKBACK_HOURS: i64 = 24;
const SCHEDULE_LOOKAHEAD_DAYS: i64 = 30;

// ============================================================================
// Schedule Types
// ============================================================================

/// A scheduled (or currently broadcasting) event on the radio platform.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadioEvent {
    pub id: String,
    pub title: String,
    pub start_date_time_utc: DateTime<Utc>,
    pub end_date_time_utc: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RadioEvent {
    /// Whether this event is on air at the given instant.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.start_date_time_utc <= now && now < self.end_date_time_utc
    }
}

#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    #[serde(default)]
    schedules: Vec<RadioEvent>,
}

// ============================================================================
// Event Upsert Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub title: String,
    pub start_date_time_utc: DateTime<Utc>,
    pub end_date_time_utc: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artwork_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedEvent {
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct CreateEventResponse {
    event: CreatedEvent,
}

// ============================================================================
// Client
// ============================================================================

/// Operations this service needs from the radio platform. The HTTP client
/// implements it; tests substitute fakes.
#[async_trait]
pub trait RadioCultBackend: Send + Sync {
    async fn get_schedule(&self) -> AppResult<Vec<RadioEvent>>;
    async fn create_event(&self, payload: EventPayload) -> AppResult<CreatedEvent>;
    async fn update_event(&self, event_id: &str, payload: EventPayload) -> AppResult<()>;
}

#[derive(Debug, Clone)]
pub struct RadioCultService {
    client: Client,
    api_url: String,
    station_id: String,
    api_key: String,
}

impl RadioCultService {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(e.into()))?;

        Ok(Self {
            client,
            api_url: config.radiocult.api_url.clone(),
            station_id: config.radiocult.station_id.clone(),
            api_key: config.radiocult.api_key.clone(),
        })
    }

    fn station_url(&self, path: &str) -> String {
        format!("{}/station/{}{}", self.api_url, self.station_id, path)
    }
}

#[async_trait]
impl RadioCultBackend for RadioCultService {
    /// Fetch the station schedule around the current time, including any
    /// currently-broadcasting event.
    async fn get_schedule(&self) -> AppResult<Vec<RadioEvent>> {
        let now = Utc::now();
        let start = now - Duration::hours(SCHEDULE_LOOKBACK_HOURS);
        let end = now + Duration::days(SCHEDULE_LOOKAHEAD_DAYS);

        let url = format!(
            "{}?startDate={}&endDate={}",
            self.station_url("/schedule"),
            urlencoding::encode(&start.to_rfc3339()),
            urlencoding::encode(&end.to_rfc3339()),
        );

        let response = self
            .client
            .get(url)
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::RadioCultApi(format!(
                "Failed to fetch schedule: {}",
                error_text
            )));
        }

        response
            .json::<ScheduleResponse>()
            .await
            .map(|r| r.schedules)
            .map_err(|e| AppError::RadioCultApi(format!("Failed to parse schedule: {}", e)))
    }

    async fn create_event(&self, payload: EventPayload) -> AppResult<CreatedEvent> {
        let response = self
            .client
            .post(self.station_url("/events"))
            .header("x-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::RadioCultApi(format!(
                "Failed to create event '{}': {}",
                payload.title, error_text
            )));
        }

        response
            .json::<CreateEventResponse>()
            .await
            .map(|r| r.event)
            .map_err(|e| AppError::RadioCultApi(format!("Failed to parse created event: {}", e)))
    }

    async fn update_event(&self, event_id: &str, payload: EventPayload) -> AppResult<()> {
        let response = self
            .client
            .put(self.station_url(&format!("/events/{}", event_id)))
            .header("x-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::RadioCultApi(format!(
                "Failed to update event {}: {}",
                event_id, error_text
            )));
        }

        Ok(())
    }
}
