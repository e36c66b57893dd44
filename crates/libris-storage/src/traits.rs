//! Storage traits for the catalogue storage abstraction layer.
//!
//! This module defines the core trait that all storage backends must implement.

use async_trait::async_trait;
use libris_core::{
    Author, AuthorDraft, AuthorPatch, Book, BookDraft, BookPatch, Category, CategoryDraft,
    CategoryPatch, EntityId,
};

use crate::error::StorageError;

/// The storage trait that all catalogue backends must implement.
///
/// Implementations must be thread-safe (`Send + Sync`). Text predicates
/// (`find_*_by_name` and friends) are case-insensitive substring matches.
/// Reads return denormalised views (see [`libris_core::model`]).
///
/// # Example
///
/// ```ignore
/// use libris_storage::{CatalogStorage, StorageError};
///
/// async fn get_author(storage: &dyn CatalogStorage, id: i32) -> Result<Author, StorageError> {
///     storage
///         .read_author(id)
///         .await?
///         .ok_or_else(|| StorageError::not_found(EntityKind::Author, id))
/// }
/// ```
#[async_trait]
pub trait CatalogStorage: Send + Sync {
    // ==================== Authors ====================

    /// Returns every author with their book titles.
    async fn list_authors(&self) -> Result<Vec<Author>, StorageError>;

    /// Reads an author by id. Returns `None` if absent.
    async fn read_author(&self, id: EntityId) -> Result<Option<Author>, StorageError>;

    async fn find_authors_by_name(&self, fragment: &str) -> Result<Vec<Author>, StorageError>;

    /// Authors with at least one book in a category whose name matches `fragment`.
    async fn find_authors_by_book_category(
        &self,
        fragment: &str,
    ) -> Result<Vec<Author>, StorageError>;

    /// Exact (case-sensitive) name check used for uniqueness.
    async fn author_name_exists(&self, name: &str) -> Result<bool, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if the name is taken.
    async fn create_author(&self, draft: &AuthorDraft) -> Result<Author, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the author does not exist.
    async fn update_author(&self, id: EntityId, patch: &AuthorPatch)
    -> Result<Author, StorageError>;

    /// Deletes an author; their books remain but lose the author link.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the author does not exist.
    async fn delete_author(&self, id: EntityId) -> Result<(), StorageError>;

    // ==================== Books ====================

    async fn list_books(&self) -> Result<Vec<Book>, StorageError>;

    async fn read_book(&self, id: EntityId) -> Result<Option<Book>, StorageError>;

    /// Books whose author name matches `author` OR whose title matches `title`.
    /// A `None` predicate never matches.
    async fn search_books(
        &self,
        author: Option<&str>,
        title: Option<&str>,
    ) -> Result<Vec<Book>, StorageError>;

    async fn find_books_by_author_name(&self, fragment: &str) -> Result<Vec<Book>, StorageError>;

    async fn find_books_by_category_name(&self, fragment: &str)
    -> Result<Vec<Book>, StorageError>;

    async fn find_books_by_author_id(&self, author_id: EntityId)
    -> Result<Vec<Book>, StorageError>;

    async fn find_books_by_category_id(
        &self,
        category_id: EntityId,
    ) -> Result<Vec<Book>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::InvalidReference` if the author or any category
    /// is missing, and `StorageError::AlreadyExists` if the author already has
    /// a book with the same title.
    async fn create_book(&self, draft: &BookDraft) -> Result<Book, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the book does not exist and
    /// `StorageError::InvalidReference` for missing author/categories.
    async fn update_book(&self, id: EntityId, patch: &BookPatch) -> Result<Book, StorageError>;

    async fn delete_book(&self, id: EntityId) -> Result<(), StorageError>;

    // ==================== Categories ====================

    async fn list_categories(&self) -> Result<Vec<Category>, StorageError>;

    async fn read_category(&self, id: EntityId) -> Result<Option<Category>, StorageError>;

    async fn find_categories_by_name(&self, fragment: &str)
    -> Result<Vec<Category>, StorageError>;

    /// Categories holding at least one book whose title contains `fragment`.
    async fn find_categories_by_book_name(
        &self,
        fragment: &str,
    ) -> Result<Vec<Category>, StorageError>;

    /// Categories of one book; empty when the book does not exist.
    async fn find_categories_by_book_id(
        &self,
        book_id: EntityId,
    ) -> Result<Vec<Category>, StorageError>;

    async fn category_name_exists(&self, name: &str) -> Result<bool, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` for a duplicate name and
    /// `StorageError::InvalidReference` for missing books.
    async fn create_category(&self, draft: &CategoryDraft) -> Result<Category, StorageError>;

    async fn update_category(
        &self,
        id: EntityId,
        patch: &CategoryPatch,
    ) -> Result<Category, StorageError>;

    /// Deletes a category and unlinks it from every book.
    async fn delete_category(&self, id: EntityId) -> Result<(), StorageError>;

    // ==================== Metadata ====================

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
