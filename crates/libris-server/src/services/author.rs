use libris_core::{Author, AuthorDraft, AuthorPatch, EntityId, EntityKind};
use libris_storage::DynStorage;

use super::{ServiceError, ServiceResult, cached_by_id, cached_non_empty, require_param};
use crate::cache::{CacheCoordinator, CacheKey};

#[derive(Clone)]
pub struct AuthorService {
    storage: DynStorage,
    caches: CacheCoordinator,
}

impl AuthorService {
    pub fn new(storage: DynStorage, caches: CacheCoordinator) -> Self {
        Self { storage, caches }
    }

    /// Every author; not cached.
    pub async fn list(&self) -> ServiceResult<Vec<Author>> {
        Ok(self.storage.list_authors().await?)
    }

    pub async fn get(&self, id: EntityId) -> ServiceResult<Author> {
        cached_by_id(
            self.caches.authors(),
            CacheKey::op("author_id").param(id).build(),
            EntityKind::Author,
            id,
            || self.storage.read_author(id),
        )
        .await
    }

    pub async fn find_by_name(&self, name: &str) -> ServiceResult<Vec<Author>> {
        let name = require_param("name", name)?;
        cached_non_empty(
            self.caches.authors(),
            CacheKey::op("authors_by_name").param(name).build(),
            || self.storage.find_authors_by_name(name),
            || ServiceError::not_found(format!("No authors found with name: {name}")),
        )
        .await
    }

    /// Authors with at least one book in a matching category.
    pub async fn find_by_book_category(&self, category: &str) -> ServiceResult<Vec<Author>> {
        let category = require_param("category", category)?;
        cached_non_empty(
            self.caches.authors(),
            CacheKey::op("authors_by_category").param(category).build(),
            || self.storage.find_authors_by_book_category(category),
            || ServiceError::not_found(format!("No authors found for book category: {category}")),
        )
        .await
    }

    pub async fn create(&self, draft: AuthorDraft) -> ServiceResult<Author> {
        draft.validate()?;
        let author = self.storage.create_author(&draft).await?;
        self.caches.on_author_mutated();
        tracing::info!(author_id = author.id, "author created");
        Ok(author)
    }

    pub async fn update(&self, id: EntityId, patch: AuthorPatch) -> ServiceResult<Author> {
        patch.validate()?;
        let author = self.storage.update_author(id, &patch).await?;
        self.caches.on_author_mutated();
        tracing::info!(author_id = id, "author updated");
        Ok(author)
    }

    pub async fn delete(&self, id: EntityId) -> ServiceResult<()> {
        self.storage.delete_author(id).await?;
        self.caches.on_author_mutated();
        tracing::info!(author_id = id, "author deleted");
        Ok(())
    }
}
