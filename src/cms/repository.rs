use serde_json::json;
use tracing::warn;

use crate::cms::client::{CmsBackend, CmsQuery};
use crate::cms::models::{ShowKind, ShowRecord};
use crate::error::AppResult;

/// Page size used when walking the whole catalog.
const PAGE_LIMIT: u32 = 100;

/// Repository for show records stored in the CMS (`episodes` and the legacy
/// `shows` type). Raw objects are validated into `ShowRecord`s here; records
/// that fail validation are logged and skipped rather than failing the read.
pub struct ShowRepository;

impl ShowRepository {
    /// Fetch every record of one kind matching the given query filters,
    /// following pagination until the reported total is reached.
    async fn find_all_of_kind(
        cms: &dyn CmsBackend,
        kind: ShowKind,
        filters: &[(&str, serde_json::Value)],
    ) -> AppResult<Vec<ShowRecord>> {
        let mut records = Vec::new();
        let mut skip = 0u32;

        loop {
            let mut query = CmsQuery::for_type(kind.cms_type());
            for (key, value) in filters {
                query = query.filter(key, value.clone());
            }
            query.sort = Some("-modified_at".to_string());
            query.limit = Some(PAGE_LIMIT);
            query.skip = Some(skip);

            let page = cms.find(query).await?;
            let fetched = page.objects.len() as u32;

            for object in page.objects {
                let id = object.id.clone();
                match ShowRecord::try_from(object) {
                    Ok(record) => records.push(record),
                    Err(e) => warn!("Skipping invalid catalog object {}: {}", id, e),
                }
            }

            skip += fetched;
            if fetched < PAGE_LIMIT || u64::from(skip) >= page.total {
                break;
            }
        }

        Ok(records)
    }

    /// All show records flagged approved, across both record types. This is
    /// the input set for a sync pass.
    pub async fn find_approved(cms: &dyn CmsBackend) -> AppResult<Vec<ShowRecord>> {
        let mut records = Vec::new();
        for kind in [ShowKind::Episode, ShowKind::LegacyShow] {
            let mut batch = Self::find_all_of_kind(
                cms,
                kind,
                &[("metadata.approved", serde_json::Value::Bool(true))],
            )
            .await?;
            records.append(&mut batch);
        }
        Ok(records)
    }

    /// The full catalog, both kinds, no approval filter. Candidate set for
    /// live-event matching.
    pub async fn find_all(cms: &dyn CmsBackend) -> AppResult<Vec<ShowRecord>> {
        let mut records = Vec::new();
        for kind in [ShowKind::Episode, ShowKind::LegacyShow] {
            let mut batch = Self::find_all_of_kind(cms, kind, &[]).await?;
            records.append(&mut batch);
        }
        Ok(records)
    }

    /// One page of the catalog for browse endpoints, newest first.
    pub async fn find_page(
        cms: &dyn CmsBackend,
        kind: ShowKind,
        limit: u32,
        skip: u32,
    ) -> AppResult<(Vec<ShowRecord>, u64)> {
        let mut query = CmsQuery::for_type(kind.cms_type());
        query.sort = Some("-modified_at".to_string());
        query.limit = Some(limit);
        query.skip = Some(skip);

        let page = cms.find(query).await?;
        let total = page.total;

        let mut records = Vec::new();
        for object in page.objects {
            let id = object.id.clone();
            match ShowRecord::try_from(object) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping invalid catalog object {}: {}", id, e),
            }
        }

        Ok((records, total))
    }

    /// Look a record up by slug, checking episodes before the legacy type.
    pub async fn find_by_slug(
        cms: &dyn CmsBackend,
        slug: &str,
    ) -> AppResult<Option<ShowRecord>> {
        for kind in [ShowKind::Episode, ShowKind::LegacyShow] {
            let mut query = CmsQuery::for_type(kind.cms_type())
                .filter("slug", serde_json::Value::String(slug.to_string()));
            query.limit = Some(1);

            let page = cms.find(query).await?;
            if let Some(object) = page.objects.into_iter().next() {
                return Ok(Some(ShowRecord::try_from(object)?));
            }
        }
        Ok(None)
    }

    /// Look a record up by its CMS object id (used for id-based permalinks).
    pub async fn find_by_id(cms: &dyn CmsBackend, id: &str) -> AppResult<ShowRecord> {
        let object = cms.find_one(id).await?;
        ShowRecord::try_from(object)
    }

    /// Persist the radio platform event id back onto the CMS record after a
    /// successful create. Subsequent sync passes will update that event
    /// instead of creating a duplicate.
    pub async fn store_platform_event_id(
        cms: &dyn CmsBackend,
        show_id: &str,
        event_id: &str,
    ) -> AppResult<()> {
        cms.update_one(show_id, json!({ "radiocult_event_id": event_id }))
            .await
    }
}
