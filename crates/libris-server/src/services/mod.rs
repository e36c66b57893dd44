//! Catalogue services: cached reads and cache-invalidating writes over a
//! [`CatalogStorage`](libris_storage::CatalogStorage) backend.

pub mod author;
pub mod book;
pub mod category;

use std::future::Future;

use libris_api::ApiError;
use libris_core::{CoreError, EntityId, EntityKind};
use libris_storage::StorageError;
use thiserror::Error;

use crate::cache::{BoundedResultCache, CacheKey};

pub use author::AuthorService;
pub use book::BookService;
pub use category::CategoryService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A lookup matched nothing.
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),
}

impl ServiceError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Storage(e) => e.is_not_found(),
            _ => false,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => e.into(),
            ServiceError::Storage(e) => e.into(),
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::BadRequest(msg) => ApiError::bad_request(msg),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Treats missing and blank text parameters alike.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) fn require_param<'a>(name: &str, value: &'a str) -> ServiceResult<&'a str> {
    non_blank(Some(value))
        .ok_or_else(|| ServiceError::BadRequest(format!("parameter '{name}' must not be blank")))
}

/// Serves `key` from `cache`, or loads, caches and returns a non-empty result.
///
/// Empty results are reported through `not_found` and never cached.
pub(crate) async fn cached_non_empty<V, F, Fut>(
    cache: &BoundedResultCache<V>,
    key: CacheKey,
    load: F,
    not_found: impl FnOnce() -> ServiceError,
) -> ServiceResult<Vec<V>>
where
    V: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<V>, StorageError>>,
{
    if let Some(hit) = cache.get(key.as_str()) {
        if !hit.is_empty() {
            return Ok(hit);
        }
    }
    let values = load().await?;
    if values.is_empty() {
        return Err(not_found());
    }
    cache.put(key.into_string(), values.clone());
    Ok(values)
}

/// Like [`cached_non_empty`] but an empty result is a valid, cached answer.
pub(crate) async fn cached<V, F, Fut>(
    cache: &BoundedResultCache<V>,
    key: CacheKey,
    load: F,
) -> ServiceResult<Vec<V>>
where
    V: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<V>, StorageError>>,
{
    if let Some(hit) = cache.get(key.as_str()) {
        return Ok(hit);
    }
    let values = load().await?;
    cache.put(key.into_string(), values.clone());
    Ok(values)
}

/// Loads a single entity by id through the cache.
pub(crate) async fn cached_by_id<V, F, Fut>(
    cache: &BoundedResultCache<V>,
    key: CacheKey,
    kind: EntityKind,
    id: EntityId,
    load: F,
) -> ServiceResult<V>
where
    V: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<V>, StorageError>>,
{
    let found = cached_non_empty(
        cache,
        key,
        || async move { Ok::<Vec<V>, StorageError>(load().await?.into_iter().collect()) },
        || StorageError::not_found(kind, id).into(),
    )
    .await?;
    found
        .into_iter()
        .next()
        .ok_or_else(|| StorageError::not_found(kind, id).into())
}
