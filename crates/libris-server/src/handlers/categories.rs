use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use libris_api::{ApiError, ApiResponse};
use libris_core::{Category, CategoryDraft, CategoryPatch, EntityId};

use super::{BookQuery, NameQuery};
use crate::server::AppState;

pub async fn list(State(state): State<AppState>) -> Result<ApiResponse<Vec<Category>>, ApiError> {
    Ok(ApiResponse::ok(state.categories.list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<ApiResponse<Category>, ApiError> {
    Ok(ApiResponse::ok(state.categories.get(id).await?))
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<ApiResponse<Vec<Category>>, ApiError> {
    Ok(ApiResponse::ok(
        state.categories.find_by_name(&query.name).await?,
    ))
}

pub async fn by_book_name(
    State(state): State<AppState>,
    Query(query): Query<BookQuery>,
) -> Result<ApiResponse<Vec<Category>>, ApiError> {
    Ok(ApiResponse::ok(
        state.categories.find_by_book_name(&query.book).await?,
    ))
}

pub async fn by_book_id(
    State(state): State<AppState>,
    Path(book_id): Path<EntityId>,
) -> Result<ApiResponse<Vec<Category>>, ApiError> {
    Ok(ApiResponse::ok(state.categories.find_by_book_id(book_id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<CategoryDraft>,
) -> Result<ApiResponse<Category>, ApiError> {
    Ok(ApiResponse::created(state.categories.create(draft).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(patch): Json<CategoryPatch>,
) -> Result<ApiResponse<Category>, ApiError> {
    Ok(ApiResponse::ok(state.categories.update(id, patch).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<StatusCode, ApiError> {
    state.categories.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
