use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use libris_api::{ApiError, ApiResponse};
use libris_core::{Book, BookDraft, BookPatch, BulkDrafts, EntityId};
use serde::Deserialize;

use super::{AuthorQuery, CategoryQuery};
use crate::server::AppState;

/// `GET /api/books/search?authorName=&title=`; at least one is required.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub author_name: Option<String>,
    pub title: Option<String>,
}

pub async fn list(State(state): State<AppState>) -> Result<ApiResponse<Vec<Book>>, ApiError> {
    Ok(ApiResponse::ok(state.books.list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<ApiResponse<Book>, ApiError> {
    Ok(ApiResponse::ok(state.books.get(id).await?))
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<ApiResponse<Vec<Book>>, ApiError> {
    let books = state
        .books
        .search(query.author_name.as_deref(), query.title.as_deref())
        .await?;
    Ok(ApiResponse::ok(books))
}

pub async fn by_author_name(
    State(state): State<AppState>,
    Query(query): Query<AuthorQuery>,
) -> Result<ApiResponse<Vec<Book>>, ApiError> {
    Ok(ApiResponse::ok(
        state.books.find_by_author_name(&query.author).await?,
    ))
}

pub async fn by_author_id(
    State(state): State<AppState>,
    Path(author_id): Path<EntityId>,
) -> Result<ApiResponse<Vec<Book>>, ApiError> {
    Ok(ApiResponse::ok(state.books.find_by_author_id(author_id).await?))
}

pub async fn by_category_name(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<ApiResponse<Vec<Book>>, ApiError> {
    Ok(ApiResponse::ok(
        state.books.find_by_category_name(&query.category).await?,
    ))
}

pub async fn by_category_id(
    State(state): State<AppState>,
    Path(category_id): Path<EntityId>,
) -> Result<ApiResponse<Vec<Book>>, ApiError> {
    Ok(ApiResponse::ok(
        state.books.find_by_category_id(category_id).await?,
    ))
}

pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<BookDraft>,
) -> Result<ApiResponse<Book>, ApiError> {
    Ok(ApiResponse::created(state.books.create(draft).await?))
}

/// Accepts a JSON array of book drafts.
pub async fn create_bulk(
    State(state): State<AppState>,
    Json(items): Json<Vec<BookDraft>>,
) -> Result<ApiResponse<Vec<Book>>, ApiError> {
    let created = state.books.create_bulk(BulkDrafts { items }).await?;
    Ok(ApiResponse::created(created))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(patch): Json<BookPatch>,
) -> Result<ApiResponse<Book>, ApiError> {
    Ok(ApiResponse::ok(state.books.update(id, patch).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<StatusCode, ApiError> {
    state.books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
