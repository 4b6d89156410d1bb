use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

// ============================================================================
// Raw CMS Object (wire shape)
// ============================================================================

/// Object as returned by the CMS API. `metadata` stays free-form JSON until
/// the object is validated into a typed record at this module's boundary.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CmsObject {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

// ============================================================================
// Validated Show Records
// ============================================================================

/// The catalog holds two record types: current `episodes` and the legacy
/// `shows` type kept for archive pages. Both map onto the same record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowKind {
    Episode,
    LegacyShow,
}

impl ShowKind {
    pub fn cms_type(&self) -> &'static str {
        match self {
            ShowKind::Episode => "episodes",
            ShowKind::LegacyShow => "shows",
        }
    }

    pub fn from_cms_type(object_type: &str) -> Option<Self> {
        match object_type {
            "episodes" => Some(ShowKind::Episode),
            "shows" => Some(ShowKind::LegacyShow),
            _ => None,
        }
    }
}

/// Scheduling and publishing fields stored on a show record. All of them are
/// entered by editors, so everything except the approval flag is optional and
/// free-form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShowMetadata {
    pub approved: bool,
    /// Broadcast date, `YYYY-MM-DD` (editors sometimes paste full RFC3339).
    pub broadcast_date: Option<String>,
    /// Broadcast start time, `HH:MM` or `HH:MM:SS`.
    pub broadcast_time: Option<String>,
    /// Free-form duration string; see `services::schedule` for the parse policy.
    pub duration: Option<String>,
    pub description: Option<String>,
    pub artwork_url: Option<String>,
    /// Set once the show has been synced to the radio platform. Presence of
    /// this id is what makes subsequent syncs update instead of create.
    pub radiocult_event_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowRecord {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub kind: ShowKind,
    pub modified_at: Option<DateTime<Utc>>,
    pub metadata: ShowMetadata,
}

impl ShowRecord {
    /// Scheduled broadcast start combined from the date/time metadata fields.
    pub fn broadcast_start(&self) -> Option<DateTime<Utc>> {
        crate::services::schedule::broadcast_start(
            self.metadata.broadcast_date.as_deref(),
            self.metadata.broadcast_time.as_deref(),
        )
    }
}

fn string_field(metadata: &serde_json::Value, key: &str) -> Option<String> {
    metadata
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn bool_field(metadata: &serde_json::Value, key: &str) -> bool {
    match metadata.get(key) {
        Some(serde_json::Value::Bool(b)) => *b,
        // Editors occasionally store the flag as a string select field.
        Some(serde_json::Value::String(s)) => {
            matches!(s.to_lowercase().as_str(), "true" | "1" | "yes")
        }
        _ => false,
    }
}

/// Artwork is stored either as a plain URL string or as a media object with
/// `url` / `imgix_url` fields, depending on how the record was created.
fn artwork_field(metadata: &serde_json::Value) -> Option<String> {
    match metadata.get("artwork") {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
            Some(s.trim().to_string())
        }
        Some(serde_json::Value::Object(obj)) => obj
            .get("imgix_url")
            .or_else(|| obj.get("url"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        _ => None,
    }
}

impl TryFrom<CmsObject> for ShowRecord {
    type Error = AppError;

    fn try_from(object: CmsObject) -> Result<Self, Self::Error> {
        let kind = ShowKind::from_cms_type(&object.object_type).ok_or_else(|| {
            AppError::Validation(format!(
                "Object {} has unknown type '{}'",
                object.id, object.object_type
            ))
        })?;

        if object.title.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "Object {} has an empty title",
                object.id
            )));
        }

        let metadata = ShowMetadata {
            approved: bool_field(&object.metadata, "approved"),
            broadcast_date: string_field(&object.metadata, "broadcast_date"),
            broadcast_time: string_field(&object.metadata, "broadcast_time"),
            duration: string_field(&object.metadata, "duration"),
            description: string_field(&object.metadata, "description"),
            artwork_url: artwork_field(&object.metadata),
            radiocult_event_id: string_field(&object.metadata, "radiocult_event_id"),
        };

        Ok(ShowRecord {
            id: object.id,
            slug: object.slug,
            title: object.title,
            kind,
            modified_at: object.modified_at,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_object(object_type: &str, metadata: serde_json::Value) -> CmsObject {
        CmsObject {
            id: "64e1f0a9b2c3d4e5f6a7b8c9".to_string(),
            slug: "late-night-disco".to_string(),
            title: "Late Night Disco".to_string(),
            object_type: object_type.to_string(),
            status: Some("published".to_string()),
            modified_at: None,
            metadata,
        }
    }

    #[test]
    fn converts_episode_with_full_metadata() {
        let record = ShowRecord::try_from(raw_object(
            "episodes",
            json!({
                "approved": true,
                "broadcast_date": "2024-06-01",
                "broadcast_time": "22:00",
                "duration": "2",
                "description": "Disco until late",
                "artwork": {"imgix_url": "https://imgix.example/disco.jpg"},
                "radiocult_event_id": "ev_123"
            }),
        ))
        .unwrap();

        assert_eq!(record.kind, ShowKind::Episode);
        assert!(record.metadata.approved);
        assert_eq!(record.metadata.broadcast_date.as_deref(), Some("2024-06-01"));
        assert_eq!(
            record.metadata.artwork_url.as_deref(),
            Some("https://imgix.example/disco.jpg")
        );
        assert_eq!(record.metadata.radiocult_event_id.as_deref(), Some("ev_123"));
    }

    #[test]
    fn accepts_string_approval_flag_and_plain_artwork_url() {
        let record = ShowRecord::try_from(raw_object(
            "shows",
            json!({
                "approved": "true",
                "artwork": "https://cdn.example/cover.png"
            }),
        ))
        .unwrap();

        assert_eq!(record.kind, ShowKind::LegacyShow);
        assert!(record.metadata.approved);
        assert_eq!(
            record.metadata.artwork_url.as_deref(),
            Some("https://cdn.example/cover.png")
        );
    }

    #[test]
    fn missing_approval_defaults_to_false() {
        let record = ShowRecord::try_from(raw_object("episodes", json!({}))).unwrap();
        assert!(!record.metadata.approved);
        assert!(record.metadata.radiocult_event_id.is_none());
    }

    #[test]
    fn rejects_unknown_object_type() {
        let err = ShowRecord::try_from(raw_object("pages", json!({}))).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn blank_metadata_strings_become_none() {
        let record = ShowRecord::try_from(raw_object(
            "episodes",
            json!({"duration": "   ", "broadcast_time": ""}),
        ))
        .unwrap();
        assert!(record.metadata.duration.is_none());
        assert!(record.metadata.broadcast_time.is_none());
    }
}
