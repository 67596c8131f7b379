//! In-process `LandStore` for tests that should not need Postgres.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::repos::error::RepoResult;
use crate::repos::land_repo::{
    Attachment, Land, LandFilter, LandId, LandPatch, LandStatus, LandStore, NewLand,
};
use crate::repos::page::{Page, PageRequest, SortDir};

#[derive(Debug, Default)]
pub struct MemoryLandStore {
    rows: RwLock<HashMap<LandId, Land>>,
    next_id: AtomicI64,
}

impl MemoryLandStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches(filter: &LandFilter, land: &Land) -> bool {
    match filter {
        LandFilter::All => true,
        LandFilter::Province(v) => contains_ignore_case(&land.province, v),
        LandFilter::District(v) => contains_ignore_case(&land.district, v),
        LandFilter::Sector(v) => contains_ignore_case(&land.sector, v),
        LandFilter::Area { min, max } => (*min..=*max).contains(&land.area_sq_meters),
        LandFilter::Status(status) => land.status == *status,
    }
}

fn urls_mut(land: &mut Land, kind: Attachment) -> &mut Vec<String> {
    match kind {
        Attachment::Image => &mut land.image_urls,
        Attachment::Document => &mut land.document_urls,
    }
}

impl MemoryLandStore {
    async fn modify(&self, id: LandId, f: impl FnOnce(&mut Land)) -> Option<Land> {
        let mut rows = self.rows.write().await;
        let land = rows.get_mut(&id)?;
        f(land);
        land.updated_at = Utc::now();
        Some(land.clone())
    }
}

#[async_trait]
impl LandStore for MemoryLandStore {
    async fn insert(&self, land: NewLand) -> RepoResult<Land> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let row = Land {
            id,
            owner_id: land.owner_id,
            province: land.province,
            district: land.district,
            sector: land.sector,
            area_sq_meters: land.area_sq_meters,
            availability_type: land.availability_type,
            status: LandStatus::Available,
            image_urls: Vec::new(),
            document_urls: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.rows.write().await.insert(id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: LandId) -> RepoResult<Option<Land>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn list(&self, filter: &LandFilter, page: PageRequest) -> RepoResult<Page<Land>> {
        let rows = self.rows.read().await;
        let mut hits: Vec<Land> = rows.values().filter(|l| matches(filter, l)).cloned().collect();

        hits.sort_by_key(|l| (l.created_at, l.id));
        if page.sort_dir == SortDir::Desc {
            hits.reverse();
        }

        let total = hits.len() as i64;
        let content = hits
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .collect();

        Ok(Page::new(content, page, total))
    }

    async fn update(&self, id: LandId, patch: &LandPatch) -> RepoResult<Option<Land>> {
        Ok(self
            .modify(id, |land| {
                if let Some(v) = &patch.province {
                    land.province = v.clone();
                }
                if let Some(v) = &patch.district {
                    land.district = v.clone();
                }
                if let Some(v) = &patch.sector {
                    land.sector = v.clone();
                }
                if let Some(v) = patch.area_sq_meters {
                    land.area_sq_meters = v;
                }
                if let Some(v) = patch.availability_type {
                    land.availability_type = v;
                }
            })
            .await)
    }

    async fn set_status(&self, id: LandId, status: LandStatus) -> RepoResult<Option<Land>> {
        Ok(self.modify(id, |land| land.status = status).await)
    }

    async fn delete(&self, id: LandId) -> RepoResult<bool> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }

    async fn append_urls(
        &self,
        id: LandId,
        kind: Attachment,
        urls: &[String],
    ) -> RepoResult<Option<Land>> {
        Ok(self
            .modify(id, |land| urls_mut(land, kind).extend_from_slice(urls))
            .await)
    }

    async fn remove_url(
        &self,
        id: LandId,
        kind: Attachment,
        url: &str,
    ) -> RepoResult<Option<Land>> {
        Ok(self
            .modify(id, |land| urls_mut(land, kind).retain(|u| u != url))
            .await)
    }
}
