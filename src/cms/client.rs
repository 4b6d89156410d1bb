use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::cms::models::CmsObject;
use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Object properties requested on every read. Keeps list payloads small while
/// still carrying everything needed to build a `ShowRecord`.
const OBJECT_PROPS: &str = "id,slug,title,type,status,modified_at,metadata";

// ============================================================================
// Query / Response Types
// ============================================================================

/// A query against the CMS object store. `filters` is merged into the query
/// document next to the object type, e.g. `{"metadata.approved": true}`.
#[derive(Debug, Clone, Default)]
pub struct CmsQuery {
    pub object_type: String,
    pub filters: serde_json::Map<String, serde_json::Value>,
    pub sort: Option<String>,
    pub limit: Option<u32>,
    pub skip: Option<u32>,
}

impl CmsQuery {
    pub fn for_type(object_type: &str) -> Self {
        CmsQuery {
            object_type: object_type.to_string(),
            ..Default::default()
        }
    }

    pub fn filter(mut self, key: &str, value: serde_json::Value) -> Self {
        self.filters.insert(key.to_string(), value);
        self
    }

    fn query_document(&self) -> serde_json::Value {
        let mut doc = serde_json::Map::new();
        doc.insert(
            "type".to_string(),
            serde_json::Value::String(self.object_type.clone()),
        );
        for (key, value) in &self.filters {
            doc.insert(key.clone(), value.clone());
        }
        serde_json::Value::Object(doc)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CmsObjectList {
    #[serde(default)]
    pub objects: Vec<CmsObject>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Deserialize)]
struct CmsObjectResponse {
    object: CmsObject,
}

/// Body for creating a new object in the CMS.
#[derive(Debug, Clone, Serialize)]
pub struct NewCmsObject {
    pub title: String,
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct MetadataPatch<'a> {
    metadata: &'a serde_json::Value,
}

// ============================================================================
// Client
// ============================================================================

/// Operations this service needs from the CMS. The HTTP client implements it;
/// tests substitute fakes.
#[async_trait]
pub trait CmsBackend: Send + Sync {
    async fn find(&self, query: CmsQuery) -> AppResult<CmsObjectList>;
    async fn find_one(&self, id: &str) -> AppResult<CmsObject>;
    async fn insert_one(&self, new_object: NewCmsObject) -> AppResult<CmsObject>;
    /// Merge-patch the metadata of an existing object.
    async fn update_one(&self, id: &str, metadata: serde_json::Value) -> AppResult<()>;
}

#[derive(Debug, Clone)]
pub struct CmsService {
    client: Client,
    api_url: String,
    bucket_slug: String,
    read_key: String,
    write_key: String,
}

impl CmsService {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(e.into()))?;

        Ok(Self {
            client,
            api_url: config.cms.api_url.clone(),
            bucket_slug: config.cms.bucket_slug.clone(),
            read_key: config.cms.read_key.clone(),
            write_key: config.cms.write_key.clone(),
        })
    }

    fn objects_url(&self) -> String {
        format!("{}/buckets/{}/objects", self.api_url, self.bucket_slug)
    }

    fn object_url(&self, id: &str) -> String {
        format!("{}/buckets/{}/objects/{}", self.api_url, self.bucket_slug, id)
    }
}

#[async_trait]
impl CmsBackend for CmsService {
    async fn find(&self, query: CmsQuery) -> AppResult<CmsObjectList> {
        let query_json = query.query_document().to_string();

        let mut url = format!(
            "{}?read_key={}&query={}&props={}",
            self.objects_url(),
            urlencoding::encode(&self.read_key),
            urlencoding::encode(&query_json),
            urlencoding::encode(OBJECT_PROPS),
        );
        if let Some(sort) = &query.sort {
            url.push_str(&format!("&sort={}", urlencoding::encode(sort)));
        }
        if let Some(limit) = query.limit {
            url.push_str(&format!("&limit={}", limit));
        }
        if let Some(skip) = query.skip {
            url.push_str(&format!("&skip={}", skip));
        }

        let response = self.client.get(url).send().await?;

        // The CMS answers an empty result set with 404 rather than an empty
        // list; treat that as zero objects.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(CmsObjectList {
                objects: Vec::new(),
                total: 0,
            });
        }

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::CmsApi(format!(
                "Failed to query objects: {}",
                error_text
            )));
        }

        response
            .json::<CmsObjectList>()
            .await
            .map_err(|e| AppError::CmsApi(format!("Failed to parse object list: {}", e)))
    }

    async fn find_one(&self, id: &str) -> AppResult<CmsObject> {
        let url = format!(
            "{}?read_key={}&props={}",
            self.object_url(id),
            urlencoding::encode(&self.read_key),
            urlencoding::encode(OBJECT_PROPS),
        );

        let response = self.client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("Object {} not found", id)));
        }

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::CmsApi(format!(
                "Failed to fetch object {}: {}",
                id, error_text
            )));
        }

        response
            .json::<CmsObjectResponse>()
            .await
            .map(|r| r.object)
            .map_err(|e| AppError::CmsApi(format!("Failed to parse object: {}", e)))
    }

    async fn insert_one(&self, new_object: NewCmsObject) -> AppResult<CmsObject> {
        let response = self
            .client
            .post(self.objects_url())
            .header("Authorization", format!("Bearer {}", self.write_key))
            .json(&new_object)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::CmsApi(format!(
                "Failed to create object: {}",
                error_text
            )));
        }

        response
            .json::<CmsObjectResponse>()
            .await
            .map(|r| r.object)
            .map_err(|e| AppError::CmsApi(format!("Failed to parse created object: {}", e)))
    }

    async fn update_one(&self, id: &str, metadata: serde_json::Value) -> AppResult<()> {
        let response = self
            .client
            .patch(self.object_url(id))
            .header("Authorization", format!("Bearer {}", self.write_key))
            .json(&MetadataPatch {
                metadata: &metadata,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::CmsApi(format!(
                "Failed to update object {}: {}",
                id, error_text
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_document_merges_type_and_filters() {
        let query = CmsQuery::for_type("episodes")
            .filter("metadata.approved", serde_json::Value::Bool(true));
        let doc = query.query_document();

        assert_eq!(doc["type"], "episodes");
        assert_eq!(doc["metadata.approved"], true);
    }

    #[test]
    fn query_defaults_carry_no_paging() {
        let query = CmsQuery::for_type("shows");
        assert!(query.limit.is_none());
        assert!(query.skip.is_none());
        assert!(query.sort.is_none());
    }
}
