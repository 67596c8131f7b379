/*
 * Responsibility
 * - Land request/response DTOs
 * - validate() does shape checks only; ownership and existence are the service's job
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::repos::land_repo::{AvailabilityType, Land, LandPatch, LandStatus};
use crate::services::lands::LandDraft;

pub const MIN_AREA_SQ_METERS: f64 = 100.0;
pub const MAX_AREA_SQ_METERS: f64 = 10_000_000.0;
pub const MAX_IMAGES_PER_UPLOAD: usize = 10;
pub const MAX_DOCUMENTS_PER_UPLOAD: usize = 5;

fn check_location(value: &str, err: &'static str) -> Result<(), &'static str> {
    let len = value.trim().chars().count();
    if (2..=50).contains(&len) {
        Ok(())
    } else {
        Err(err)
    }
}

fn check_area(area: f64) -> Result<(), &'static str> {
    if (MIN_AREA_SQ_METERS..=MAX_AREA_SQ_METERS).contains(&area) {
        Ok(())
    } else {
        Err("area_sq_meters must be between 100 and 10,000,000")
    }
}

/// Absolute http(s) URL with a host.
pub fn is_http_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
        .unwrap_or(false)
}

fn check_urls(urls: &[String], max: usize, err: &'static str) -> Result<(), &'static str> {
    if urls.is_empty() || urls.len() > max {
        return Err(err);
    }
    if !urls.iter().all(|u| is_http_url(u)) {
        return Err("every url must be an absolute http(s) url");
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateLandRequest {
    pub province: String,
    pub district: String,
    pub sector: String,
    pub area_sq_meters: f64,
    pub availability_type: AvailabilityType,
}

impl CreateLandRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        check_location(&self.province, "province must be between 2 and 50 characters")?;
        check_location(&self.district, "district must be between 2 and 50 characters")?;
        check_location(&self.sector, "sector must be between 2 and 50 characters")?;
        check_area(self.area_sq_meters)
    }

    pub fn into_draft(self) -> LandDraft {
        LandDraft {
            province: self.province.trim().to_string(),
            district: self.district.trim().to_string(),
            sector: self.sector.trim().to_string(),
            area_sq_meters: self.area_sq_meters,
            availability_type: self.availability_type,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateLandRequest {
    pub province: Option<String>,
    pub district: Option<String>,
    pub sector: Option<String>,
    pub area_sq_meters: Option<f64>,
    pub availability_type: Option<AvailabilityType>,
}

impl UpdateLandRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(v) = &self.province {
            check_location(v, "province must be between 2 and 50 characters")?;
        }
        if let Some(v) = &self.district {
            check_location(v, "district must be between 2 and 50 characters")?;
        }
        if let Some(v) = &self.sector {
            check_location(v, "sector must be between 2 and 50 characters")?;
        }
        if let Some(area) = self.area_sq_meters {
            check_area(area)?;
        }
        Ok(())
    }

    pub fn into_patch(self) -> LandPatch {
        let trimmed = |v: Option<String>| v.map(|s| s.trim().to_string());
        LandPatch {
            province: trimmed(self.province),
            district: trimmed(self.district),
            sector: trimmed(self.sector),
            area_sq_meters: self.area_sq_meters,
            availability_type: self.availability_type,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: LandStatus,
}

#[derive(Debug, Deserialize)]
pub struct UploadImagesRequest {
    pub image_urls: Vec<String>,
}

impl UploadImagesRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        check_urls(
            &self.image_urls,
            MAX_IMAGES_PER_UPLOAD,
            "image_urls must contain between 1 and 10 urls",
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadDocumentsRequest {
    pub document_urls: Vec<String>,
}

impl UploadDocumentsRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        check_urls(
            &self.document_urls,
            MAX_DOCUMENTS_PER_UPLOAD,
            "document_urls must contain between 1 and 5 urls",
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct RemoveImageQuery {
    pub image_url: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveDocumentQuery {
    pub document_url: String,
}

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub province: Option<String>,
    pub district: Option<String>,
    pub sector: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AreaQuery {
    pub min_area: f64,
    pub max_area: f64,
}

#[derive(Debug, Serialize)]
pub struct LandResponse {
    pub id: i64,
    pub owner_id: i64,
    pub province: String,
    pub district: String,
    pub sector: String,
    pub area_sq_meters: f64,
    pub availability_type: AvailabilityType,
    pub status: LandStatus,
    pub image_urls: Vec<String>,
    pub document_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Land> for LandResponse {
    fn from(land: Land) -> Self {
        Self {
            id: land.id,
            owner_id: land.owner_id,
            province: land.province,
            district: land.district,
            sector: land.sector,
            area_sq_meters: land.area_sq_meters,
            availability_type: land.availability_type,
            status: land.status,
            image_urls: land.image_urls,
            document_urls: land.document_urls,
            created_at: land.created_at,
            updated_at: land.updated_at,
        }
    }
}

/// Listing row: no image or document lists.
#[derive(Debug, Serialize)]
pub struct LandSummaryResponse {
    pub id: i64,
    pub owner_id: i64,
    pub province: String,
    pub district: String,
    pub sector: String,
    pub area_sq_meters: f64,
    pub availability_type: AvailabilityType,
    pub status: LandStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Land> for LandSummaryResponse {
    fn from(land: Land) -> Self {
        Self {
            id: land.id,
            owner_id: land.owner_id,
            province: land.province,
            district: land.district,
            sector: land.sector,
            area_sq_meters: land.area_sq_meters,
            availability_type: land.availability_type,
            status: land.status,
            created_at: land.created_at,
        }
    }
}
