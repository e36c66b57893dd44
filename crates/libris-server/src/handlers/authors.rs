use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use libris_api::{ApiError, ApiResponse};
use libris_core::{Author, AuthorDraft, AuthorPatch, EntityId};

use super::{CategoryQuery, NameQuery};
use crate::server::AppState;

pub async fn list(State(state): State<AppState>) -> Result<ApiResponse<Vec<Author>>, ApiError> {
    Ok(ApiResponse::ok(state.authors.list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<ApiResponse<Author>, ApiError> {
    Ok(ApiResponse::ok(state.authors.get(id).await?))
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<ApiResponse<Vec<Author>>, ApiError> {
    Ok(ApiResponse::ok(state.authors.find_by_name(&query.name).await?))
}

pub async fn by_category(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<ApiResponse<Vec<Author>>, ApiError> {
    Ok(ApiResponse::ok(
        state.authors.find_by_book_category(&query.category).await?,
    ))
}

pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<AuthorDraft>,
) -> Result<ApiResponse<Author>, ApiError> {
    Ok(ApiResponse::created(state.authors.create(draft).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(patch): Json<AuthorPatch>,
) -> Result<ApiResponse<Author>, ApiError> {
    Ok(ApiResponse::ok(state.authors.update(id, patch).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<StatusCode, ApiError> {
    state.authors.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
