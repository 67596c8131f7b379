/*
 * Responsibility
 * - /lands handlers: parse + validate input, call LandService, shape output
 * - Identity arrives through the `Identity` extractor; handlers never decode credentials
 */
use axum::{extract::State, http::StatusCode};
use market_auth::Identity;
use market_auth::input::{Json, Path, Query};

use crate::api::v1::dto::lands::{
    AreaQuery, CreateLandRequest, LandResponse, LandSummaryResponse, LocationQuery,
    RemoveDocumentQuery, RemoveImageQuery, UpdateLandRequest, UpdateStatusRequest,
    UploadDocumentsRequest, UploadImagesRequest,
};
use crate::api::v1::dto::page::PageParams;
use crate::error::AppError;
use crate::repos::land_repo::{Attachment, LandFilter, LandId, LandStatus};
use crate::repos::page::Page;
use crate::state::AppState;

type PageResponse = Json<Page<LandSummaryResponse>>;

pub async fn create_land(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<CreateLandRequest>,
) -> Result<(StatusCode, Json<LandResponse>), AppError> {
    req.validate().map_err(AppError::validation)?;

    let land = state.lands.create(&identity, req.into_draft()).await?;
    Ok((StatusCode::CREATED, Json(land.into())))
}

pub async fn list_lands(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> Result<PageResponse, AppError> {
    let page = page.into_request().map_err(AppError::validation)?;
    let lands = state.lands.list(&LandFilter::All, page).await?;
    Ok(Json(lands.map(Into::into)))
}

pub async fn get_land(
    State(state): State<AppState>,
    Path(id): Path<LandId>,
) -> Result<Json<LandResponse>, AppError> {
    let land = state.lands.get(id).await?;
    Ok(Json(land.into()))
}

pub async fn update_land(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<LandId>,
    Json(req): Json<UpdateLandRequest>,
) -> Result<Json<LandResponse>, AppError> {
    req.validate().map_err(AppError::validation)?;

    let land = state.lands.update(&identity, id, req.into_patch()).await?;
    Ok(Json(land.into()))
}

pub async fn update_status(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<LandId>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<LandResponse>, AppError> {
    let land = state.lands.change_status(&identity, id, req.status).await?;
    Ok(Json(land.into()))
}

pub async fn delete_land(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<LandId>,
) -> Result<StatusCode, AppError> {
    state.lands.delete(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn search_by_location(
    State(state): State<AppState>,
    Query(location): Query<LocationQuery>,
    Query(page): Query<PageParams>,
) -> Result<PageResponse, AppError> {
    let page = page.into_request().map_err(AppError::validation)?;
    let filter = LandFilter::by_location(
        location.province.as_deref(),
        location.district.as_deref(),
        location.sector.as_deref(),
    );

    let lands = state.lands.search_location(filter, page).await?;
    Ok(Json(lands.map(Into::into)))
}

pub async fn search_by_area(
    State(state): State<AppState>,
    Query(area): Query<AreaQuery>,
    Query(page): Query<PageParams>,
) -> Result<PageResponse, AppError> {
    let page = page.into_request().map_err(AppError::validation)?;
    let lands = state
        .lands
        .search_area(area.min_area, area.max_area, page)
        .await?;
    Ok(Json(lands.map(Into::into)))
}

pub async fn list_by_status(
    State(state): State<AppState>,
    Path(status): Path<LandStatus>,
    Query(page): Query<PageParams>,
) -> Result<PageResponse, AppError> {
    let page = page.into_request().map_err(AppError::validation)?;
    let lands = state.lands.list(&LandFilter::Status(status), page).await?;
    Ok(Json(lands.map(Into::into)))
}

pub async fn add_images(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<LandId>,
    Json(req): Json<UploadImagesRequest>,
) -> Result<Json<LandResponse>, AppError> {
    req.validate().map_err(AppError::validation)?;

    let land = state
        .lands
        .add_attachments(&identity, id, Attachment::Image, &req.image_urls)
        .await?;
    Ok(Json(land.into()))
}

pub async fn remove_image(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<LandId>,
    Query(query): Query<RemoveImageQuery>,
) -> Result<Json<LandResponse>, AppError> {
    let land = state
        .lands
        .remove_attachment(&identity, id, Attachment::Image, &query.image_url)
        .await?;
    Ok(Json(land.into()))
}

pub async fn add_documents(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<LandId>,
    Json(req): Json<UploadDocumentsRequest>,
) -> Result<Json<LandResponse>, AppError> {
    req.validate().map_err(AppError::validation)?;

    let land = state
        .lands
        .add_attachments(&identity, id, Attachment::Document, &req.document_urls)
        .await?;
    Ok(Json(land.into()))
}

pub async fn remove_document(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<LandId>,
    Query(query): Query<RemoveDocumentQuery>,
) -> Result<Json<LandResponse>, AppError> {
    let land = state
        .lands
        .remove_attachment(&identity, id, Attachment::Document, &query.document_url)
        .await?;
    Ok(Json(land.into()))
}
