/*
 * Responsibility
 * - Land listing use cases on top of a `LandStore`
 * - Every mutation goes load -> 404 -> ownership guard -> write; reads skip the guard
 * - The owner is always the authenticated caller, never a request field
 */
use std::sync::Arc;

use market_auth::AuthCtx;
use market_auth::ownership::load_owned;
use tracing::info;

use crate::error::AppError;
use crate::repos::land_repo::{
    Attachment, AvailabilityType, Land, LandFilter, LandId, LandPatch, LandStatus, LandStore,
    NewLand,
};
use crate::repos::page::{Page, PageRequest};

/// Fields the caller controls when listing a new land.
#[derive(Debug, Clone, PartialEq)]
pub struct LandDraft {
    pub province: String,
    pub district: String,
    pub sector: String,
    pub area_sq_meters: f64,
    pub availability_type: AvailabilityType,
}

#[derive(Clone)]
pub struct LandService {
    store: Arc<dyn LandStore>,
}

impl std::fmt::Debug for LandService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LandService").finish_non_exhaustive()
    }
}

impl LandService {
    pub fn new(store: Arc<dyn LandStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, identity: &AuthCtx, draft: LandDraft) -> Result<Land, AppError> {
        let land = self
            .store
            .insert(NewLand {
                owner_id: identity.user_id,
                province: draft.province,
                district: draft.district,
                sector: draft.sector,
                area_sq_meters: draft.area_sq_meters,
                availability_type: draft.availability_type,
            })
            .await?;

        info!(land_id = land.id, owner_id = land.owner_id, "land created");
        Ok(land)
    }

    pub async fn get(&self, id: LandId) -> Result<Land, AppError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(AppError::not_found("land"))
    }

    pub async fn list(&self, filter: &LandFilter, page: PageRequest) -> Result<Page<Land>, AppError> {
        Ok(self.store.list(filter, page).await?)
    }

    /// `None` means the caller gave no usable location filter.
    pub async fn search_location(
        &self,
        filter: Option<LandFilter>,
        page: PageRequest,
    ) -> Result<Page<Land>, AppError> {
        match filter {
            Some(filter) => self.list(&filter, page).await,
            None => Ok(Page::empty(page)),
        }
    }

    pub async fn search_area(&self, min: f64, max: f64, page: PageRequest) -> Result<Page<Land>, AppError> {
        if min > max {
            return Err(AppError::validation(
                "min_area must not be greater than max_area",
            ));
        }
        self.list(&LandFilter::Area { min, max }, page).await
    }

    pub async fn update(
        &self,
        identity: &AuthCtx,
        id: LandId,
        patch: LandPatch,
    ) -> Result<Land, AppError> {
        self.load_for_mutation(identity, id).await?;
        let land = self.store.update(id, &patch).await?;
        land.ok_or(AppError::not_found("land"))
    }

    pub async fn change_status(
        &self,
        identity: &AuthCtx,
        id: LandId,
        status: LandStatus,
    ) -> Result<Land, AppError> {
        let current = self.load_for_mutation(identity, id).await?;
        let land = self
            .store
            .set_status(id, status)
            .await?
            .ok_or(AppError::not_found("land"))?;

        info!(land_id = id, from = %current.status, to = %status, "land status changed");
        Ok(land)
    }

    pub async fn delete(&self, identity: &AuthCtx, id: LandId) -> Result<(), AppError> {
        self.load_for_mutation(identity, id).await?;
        if !self.store.delete(id).await? {
            return Err(AppError::not_found("land"));
        }

        info!(land_id = id, user_id = identity.user_id, "land deleted");
        Ok(())
    }

    pub async fn add_attachments(
        &self,
        identity: &AuthCtx,
        id: LandId,
        kind: Attachment,
        urls: &[String],
    ) -> Result<Land, AppError> {
        self.load_for_mutation(identity, id).await?;
        self.store
            .append_urls(id, kind, urls)
            .await?
            .ok_or(AppError::not_found("land"))
    }

    pub async fn remove_attachment(
        &self,
        identity: &AuthCtx,
        id: LandId,
        kind: Attachment,
        url: &str,
    ) -> Result<Land, AppError> {
        self.load_for_mutation(identity, id).await?;
        self.store
            .remove_url(id, kind, url)
            .await?
            .ok_or(AppError::not_found("land"))
    }

    async fn load_for_mutation(&self, identity: &AuthCtx, id: LandId) -> Result<Land, AppError> {
        load_owned(identity, async {
            self.store.find_by_id(id).await.map_err(AppError::from)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use market_auth::{AccessError, Role};

    use super::*;
    use crate::repos::memory::MemoryLandStore;

    fn service() -> LandService {
        LandService::new(Arc::new(MemoryLandStore::new()))
    }

    fn owner(user_id: i64) -> AuthCtx {
        AuthCtx::new(format!("u{user_id}@example.com"), user_id, [Role::LandOwner])
    }

    fn draft(sector: &str) -> LandDraft {
        LandDraft {
            province: "Kigali".into(),
            district: "Gasabo".into(),
            sector: sector.into(),
            area_sq_meters: 1_500.0,
            availability_type: AvailabilityType::Sale,
        }
    }

    fn is_forbidden(res: Result<Land, AppError>) -> bool {
        matches!(res, Err(AppError::Access(AccessError::NotOwner { .. })))
    }

    #[tokio::test]
    async fn owner_comes_from_the_caller() {
        let svc = service();
        let land = svc.create(&owner(7), draft("Remera")).await.unwrap();
        assert_eq!(land.owner_id, 7);
        assert_eq!(land.status, LandStatus::Available);
    }

    #[tokio::test]
    async fn every_mutation_is_denied_to_non_owners() {
        let svc = service();
        let land = svc.create(&owner(7), draft("Remera")).await.unwrap();
        let intruder = owner(9);
        let url = vec!["https://cdn.example/a.png".to_string()];

        assert!(is_forbidden(
            svc.update(&intruder, land.id, LandPatch::default()).await
        ));
        assert!(is_forbidden(
            svc.change_status(&intruder, land.id, LandStatus::Sold).await
        ));
        assert!(is_forbidden(
            svc.add_attachments(&intruder, land.id, Attachment::Image, &url).await
        ));
        assert!(is_forbidden(
            svc.remove_attachment(&intruder, land.id, Attachment::Document, &url[0])
                .await
        ));
        assert!(matches!(
            svc.delete(&intruder, land.id).await,
            Err(AppError::Access(AccessError::NotOwner { .. }))
        ));

        // Nothing changed.
        assert_eq!(svc.get(land.id).await.unwrap(), land);
    }

    #[tokio::test]
    async fn missing_land_is_not_found_before_ownership() {
        let svc = service();
        let res = svc.update(&owner(9), 404, LandPatch::default()).await;
        assert!(matches!(
            res,
            Err(AppError::Access(AccessError::NotFound { resource: "land" }))
        ));
    }

    #[tokio::test]
    async fn owner_mutations_apply() {
        let svc = service();
        let me = owner(7);
        let land = svc.create(&me, draft("Remera")).await.unwrap();

        let patched = svc
            .update(
                &me,
                land.id,
                LandPatch {
                    area_sq_meters: Some(2_000.0),
                    ..LandPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.area_sq_meters, 2_000.0);
        assert_eq!(patched.sector, "Remera");
        assert_eq!(patched.owner_id, 7);

        let dup = "https://cdn.example/a.png".to_string();
        svc.add_attachments(&me, land.id, Attachment::Image, &[dup.clone(), dup.clone()])
            .await
            .unwrap();
        let cleared = svc
            .remove_attachment(&me, land.id, Attachment::Image, &dup)
            .await
            .unwrap();
        assert!(cleared.image_urls.is_empty());

        svc.delete(&me, land.id).await.unwrap();
        assert!(svc.get(land.id).await.is_err());
    }

    #[tokio::test]
    async fn searches() {
        let svc = service();
        let me = owner(7);
        svc.create(&me, draft("Remera")).await.unwrap();
        svc.create(&me, draft("Kimironko")).await.unwrap();

        let page = PageRequest::default();
        let by_sector = svc
            .search_location(LandFilter::by_location(None, None, Some("REM")), page)
            .await
            .unwrap();
        assert_eq!(by_sector.total_elements, 1);

        let none = svc.search_location(None, page).await.unwrap();
        assert!(none.content.is_empty());

        assert!(matches!(
            svc.search_area(500.0, 100.0, page).await,
            Err(AppError::BadRequest { .. })
        ));
        let in_range = svc.search_area(1_500.0, 1_500.0, page).await.unwrap();
        assert_eq!(in_range.total_elements, 2);
    }
}
