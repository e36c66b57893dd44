use libris_core::{Book, BookDraft, BookPatch, BulkDrafts, EntityId, EntityKind};
use libris_storage::{DynStorage, StorageError};

use super::{
    ServiceError, ServiceResult, cached, cached_by_id, cached_non_empty, non_blank, require_param,
};
use crate::cache::{CacheCoordinator, CacheKey};

#[derive(Clone)]
pub struct BookService {
    storage: DynStorage,
    caches: CacheCoordinator,
}

impl BookService {
    pub fn new(storage: DynStorage, caches: CacheCoordinator) -> Self {
        Self { storage, caches }
    }

    /// Every book; not cached.
    pub async fn list(&self) -> ServiceResult<Vec<Book>> {
        Ok(self.storage.list_books().await?)
    }

    pub async fn get(&self, id: EntityId) -> ServiceResult<Book> {
        cached_by_id(
            self.caches.books(),
            CacheKey::op("book_id").param(id).build(),
            EntityKind::Book,
            id,
            || self.storage.read_book(id),
        )
        .await
    }

    /// Books whose author matches `author` or whose title matches `title`.
    pub async fn search(
        &self,
        author: Option<&str>,
        title: Option<&str>,
    ) -> ServiceResult<Vec<Book>> {
        let author = non_blank(author);
        let title = non_blank(title);
        if author.is_none() && title.is_none() {
            return Err(ServiceError::BadRequest(
                "at least one of 'authorName' or 'title' is required".into(),
            ));
        }
        cached_non_empty(
            self.caches.books(),
            CacheKey::op("search_books")
                .opt_param(author)
                .opt_param(title)
                .build(),
            || self.storage.search_books(author, title),
            || {
                ServiceError::not_found(format!(
                    "No books found for author '{}' or title '{}'",
                    author.unwrap_or_default(),
                    title.unwrap_or_default()
                ))
            },
        )
        .await
    }

    pub async fn find_by_author_name(&self, author: &str) -> ServiceResult<Vec<Book>> {
        let author = require_param("author", author)?;
        cached_non_empty(
            self.caches.books(),
            CacheKey::op("books_by_author").param(author).build(),
            || self.storage.find_books_by_author_name(author),
            || ServiceError::not_found(format!("No books found for author: {author}")),
        )
        .await
    }

    pub async fn find_by_category_name(&self, category: &str) -> ServiceResult<Vec<Book>> {
        let category = require_param("category", category)?;
        cached_non_empty(
            self.caches.books(),
            CacheKey::op("books_by_category").param(category).build(),
            || self.storage.find_books_by_category_name(category),
            || ServiceError::not_found(format!("No books found for category: {category}")),
        )
        .await
    }

    /// Books of an existing author; an author without books yields `[]`.
    pub async fn find_by_author_id(&self, author_id: EntityId) -> ServiceResult<Vec<Book>> {
        if self.storage.read_author(author_id).await?.is_none() {
            return Err(StorageError::not_found(EntityKind::Author, author_id).into());
        }
        cached(
            self.caches.books(),
            CacheKey::op("books_by_author_id").param(author_id).build(),
            || self.storage.find_books_by_author_id(author_id),
        )
        .await
    }

    /// Books of an existing category; an empty category yields `[]`.
    pub async fn find_by_category_id(&self, category_id: EntityId) -> ServiceResult<Vec<Book>> {
        if self.storage.read_category(category_id).await?.is_none() {
            return Err(StorageError::not_found(EntityKind::Category, category_id).into());
        }
        cached(
            self.caches.books(),
            CacheKey::op("books_by_category_id").param(category_id).build(),
            || self.storage.find_books_by_category_id(category_id),
        )
        .await
    }

    pub async fn create(&self, draft: BookDraft) -> ServiceResult<Book> {
        draft.validate()?;
        let book = self.storage.create_book(&draft).await?;
        self.caches.on_book_mutated();
        tracing::info!(book_id = book.id, author_id = draft.author_id, "book created");
        Ok(book)
    }

    /// Validates every draft up front, then creates them in order.
    ///
    /// Stops at the first storage error. Books created before it stay
    /// created and the caches are still invalidated for them.
    pub async fn create_bulk(&self, bulk: BulkDrafts<BookDraft>) -> ServiceResult<Vec<Book>> {
        bulk.validate_with(BookDraft::validate)?;

        let mut created = Vec::with_capacity(bulk.items.len());
        let mut failure = None;
        for draft in &bulk.items {
            match self.storage.create_book(draft).await {
                Ok(book) => created.push(book),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        if !created.is_empty() {
            self.caches.on_book_mutated();
        }
        tracing::info!(
            requested = bulk.items.len(),
            created = created.len(),
            "bulk book creation finished"
        );

        match failure {
            Some(e) => Err(e.into()),
            None => Ok(created),
        }
    }

    pub async fn update(&self, id: EntityId, patch: BookPatch) -> ServiceResult<Book> {
        patch.validate()?;
        let book = self.storage.update_book(id, &patch).await?;
        self.caches.on_book_mutated();
        tracing::info!(book_id = id, "book updated");
        Ok(book)
    }

    pub async fn delete(&self, id: EntityId) -> ServiceResult<()> {
        self.storage.delete_book(id).await?;
        self.caches.on_book_mutated();
        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }
}
