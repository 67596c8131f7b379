/*
 * Responsibility
 * - Land listing model and the store interface the service layer depends on
 * - Postgres implementation (SQLx, runtime-checked queries)
 * - owner_id is written once on insert; no statement here ever updates it
 */
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use market_auth::{OwnedResource, UserId};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::repos::error::RepoResult;
use crate::repos::page::{Page, PageRequest};

pub type LandId = i64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailabilityType {
    Sale,
    Rent,
    HarvestShare,
    SaleOrRent,
    All,
}

impl AvailabilityType {
    pub const ALL: [AvailabilityType; 5] = [
        AvailabilityType::Sale,
        AvailabilityType::Rent,
        AvailabilityType::HarvestShare,
        AvailabilityType::SaleOrRent,
        AvailabilityType::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityType::Sale => "SALE",
            AvailabilityType::Rent => "RENT",
            AvailabilityType::HarvestShare => "HARVEST_SHARE",
            AvailabilityType::SaleOrRent => "SALE_OR_RENT",
            AvailabilityType::All => "ALL",
        }
    }
}

impl FromStr for AvailabilityType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "availability type",
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for AvailabilityType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LandStatus {
    #[default]
    Available,
    Pending,
    Sold,
    Rented,
    UnderContract,
    Withdrawn,
}

impl LandStatus {
    pub const ALL: [LandStatus; 6] = [
        LandStatus::Available,
        LandStatus::Pending,
        LandStatus::Sold,
        LandStatus::Rented,
        LandStatus::UnderContract,
        LandStatus::Withdrawn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LandStatus::Available => "AVAILABLE",
            LandStatus::Pending => "PENDING",
            LandStatus::Sold => "SOLD",
            LandStatus::Rented => "RENTED",
            LandStatus::UnderContract => "UNDER_CONTRACT",
            LandStatus::Withdrawn => "WITHDRAWN",
        }
    }
}

impl fmt::Display for LandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LandStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "land status",
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for LandStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Land {
    pub id: LandId,
    pub owner_id: UserId,
    pub province: String,
    pub district: String,
    pub sector: String,
    pub area_sq_meters: f64,
    #[sqlx(try_from = "String")]
    pub availability_type: AvailabilityType,
    #[sqlx(try_from = "String")]
    pub status: LandStatus,
    pub image_urls: Vec<String>,
    pub document_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for Land {
    const KIND: &'static str = "land";

    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLand {
    pub owner_id: UserId,
    pub province: String,
    pub district: String,
    pub sector: String,
    pub area_sq_meters: f64,
    pub availability_type: AvailabilityType,
}

/// Partial update: `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandPatch {
    pub province: Option<String>,
    pub district: Option<String>,
    pub sector: Option<String>,
    pub area_sq_meters: Option<f64>,
    pub availability_type: Option<AvailabilityType>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LandFilter {
    All,
    /// Case-insensitive substring match on one location column.
    Province(String),
    District(String),
    Sector(String),
    /// Inclusive on both ends.
    Area { min: f64, max: f64 },
    Status(LandStatus),
}

impl LandFilter {
    /// The most specific non-blank location wins: sector, then district, then province.
    pub fn by_location(
        province: Option<&str>,
        district: Option<&str>,
        sector: Option<&str>,
    ) -> Option<Self> {
        let present = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        present(sector)
            .map(LandFilter::Sector)
            .or_else(|| present(district).map(LandFilter::District))
            .or_else(|| present(province).map(LandFilter::Province))
    }
}

/// The two URL lists a land carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    Image,
    Document,
}

impl Attachment {
    fn column(&self) -> &'static str {
        match self {
            Attachment::Image => "image_urls",
            Attachment::Document => "document_urls",
        }
    }
}

/// Persistence boundary for land listings.
///
/// Mutations return `None` when the row no longer exists.
#[async_trait]
pub trait LandStore: Send + Sync {
    async fn insert(&self, land: NewLand) -> RepoResult<Land>;

    async fn find_by_id(&self, id: LandId) -> RepoResult<Option<Land>>;

    async fn list(&self, filter: &LandFilter, page: PageRequest) -> RepoResult<Page<Land>>;

    async fn update(&self, id: LandId, patch: &LandPatch) -> RepoResult<Option<Land>>;

    async fn set_status(&self, id: LandId, status: LandStatus) -> RepoResult<Option<Land>>;

    async fn delete(&self, id: LandId) -> RepoResult<bool>;

    async fn append_urls(
        &self,
        id: LandId,
        kind: Attachment,
        urls: &[String],
    ) -> RepoResult<Option<Land>>;

    /// Removes every occurrence of `url`.
    async fn remove_url(&self, id: LandId, kind: Attachment, url: &str)
    -> RepoResult<Option<Land>>;
}

const LAND_COLUMNS: &str = r#"
    id, owner_id, province, district, sector, area_sq_meters,
    availability_type, status, image_urls, document_urls, created_at, updated_at
"#;

#[derive(Clone, Debug)]
pub struct PgLandStore {
    pool: PgPool,
}

impl PgLandStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// `%` and `_` in user input are literals, not wildcards.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &LandFilter) {
    match filter {
        LandFilter::All => {}
        LandFilter::Province(v) => {
            qb.push(" WHERE province ILIKE ").push_bind(like_pattern(v));
        }
        LandFilter::District(v) => {
            qb.push(" WHERE district ILIKE ").push_bind(like_pattern(v));
        }
        LandFilter::Sector(v) => {
            qb.push(" WHERE sector ILIKE ").push_bind(like_pattern(v));
        }
        LandFilter::Area { min, max } => {
            qb.push(" WHERE area_sq_meters BETWEEN ")
                .push_bind(*min)
                .push(" AND ")
                .push_bind(*max);
        }
        LandFilter::Status(status) => {
            qb.push(" WHERE status = ").push_bind(status.as_str());
        }
    }
}

#[async_trait]
impl LandStore for PgLandStore {
    async fn insert(&self, land: NewLand) -> RepoResult<Land> {
        let sql = format!(
            r#"
            INSERT INTO lands
                (owner_id, province, district, sector, area_sq_meters, availability_type, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {LAND_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, Land>(&sql)
            .bind(land.owner_id)
            .bind(&land.province)
            .bind(&land.district)
            .bind(&land.sector)
            .bind(land.area_sq_meters)
            .bind(land.availability_type.as_str())
            .bind(LandStatus::Available.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_by_id(&self, id: LandId) -> RepoResult<Option<Land>> {
        let sql = format!("SELECT {LAND_COLUMNS} FROM lands WHERE id = $1");

        let row = sqlx::query_as::<_, Land>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn list(&self, filter: &LandFilter, page: PageRequest) -> RepoResult<Page<Land>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM lands");
        push_filter(&mut count, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {LAND_COLUMNS} FROM lands"));
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY created_at ")
            .push(page.sort_dir.sql())
            .push(", id ")
            .push(page.sort_dir.sql())
            .push(" LIMIT ")
            .push_bind(page.size)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = select
            .build_query_as::<Land>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(rows, page, total))
    }

    async fn update(&self, id: LandId, patch: &LandPatch) -> RepoResult<Option<Land>> {
        let sql = format!(
            r#"
            UPDATE lands
            SET
                province = COALESCE($2, province),
                district = COALESCE($3, district),
                sector = COALESCE($4, sector),
                area_sq_meters = COALESCE($5, area_sq_meters),
                availability_type = COALESCE($6, availability_type),
                updated_at = now()
            WHERE id = $1
            RETURNING {LAND_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, Land>(&sql)
            .bind(id)
            .bind(patch.province.as_deref())
            .bind(patch.district.as_deref())
            .bind(patch.sector.as_deref())
            .bind(patch.area_sq_meters)
            .bind(patch.availability_type.map(|a| a.as_str()))
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn set_status(&self, id: LandId, status: LandStatus) -> RepoResult<Option<Land>> {
        let sql = format!(
            r#"
            UPDATE lands
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING {LAND_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, Land>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn delete(&self, id: LandId) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM lands WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn append_urls(
        &self,
        id: LandId,
        kind: Attachment,
        urls: &[String],
    ) -> RepoResult<Option<Land>> {
        let column = kind.column();
        let sql = format!(
            r#"
            UPDATE lands
            SET {column} = array_cat({column}, $2), updated_at = now()
            WHERE id = $1
            RETURNING {LAND_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, Land>(&sql)
            .bind(id)
            .bind(urls)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn remove_url(
        &self,
        id: LandId,
        kind: Attachment,
        url: &str,
    ) -> RepoResult<Option<Land>> {
        let column = kind.column();
        let sql = format!(
            r#"
            UPDATE lands
            SET {column} = array_remove({column}, $2), updated_at = now()
            WHERE id = $1
            RETURNING {LAND_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, Land>(&sql)
            .bind(id)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }
}
