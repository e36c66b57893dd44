//! Invalidation policy binding catalogue mutations to result caches.
//!
//! Invalidation is whole-cache. Cached views are denormalised (a category
//! result embeds book titles), so a book mutation also clears categories.
//! Callers invoke the hooks only after the mutation succeeded.

use std::sync::Arc;

use libris_core::{Author, Book, Category, EntityKind};

use super::bounded::{BoundedResultCache, CacheStats};

pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub struct CacheCoordinator {
    authors: Arc<BoundedResultCache<Author>>,
    books: Arc<BoundedResultCache<Book>>,
    categories: Arc<BoundedResultCache<Category>>,
}

impl CacheCoordinator {
    pub fn new(capacity: usize) -> Self {
        Self {
            authors: Arc::new(BoundedResultCache::new("authors", capacity)),
            books: Arc::new(BoundedResultCache::new("books", capacity)),
            categories: Arc::new(BoundedResultCache::new("categories", capacity)),
        }
    }

    pub fn authors(&self) -> &BoundedResultCache<Author> {
        &self.authors
    }

    pub fn books(&self) -> &BoundedResultCache<Book> {
        &self.books
    }

    pub fn categories(&self) -> &BoundedResultCache<Category> {
        &self.categories
    }

    pub fn on_author_mutated(&self) {
        self.on_mutated(EntityKind::Author);
    }

    pub fn on_book_mutated(&self) {
        self.on_mutated(EntityKind::Book);
    }

    pub fn on_category_mutated(&self) {
        self.on_mutated(EntityKind::Category);
    }

    /// Clears every cache that may hold results derived from `kind`.
    pub fn on_mutated(&self, kind: EntityKind) {
        tracing::debug!(entity = %kind, "invalidating result caches");
        match kind {
            EntityKind::Author => self.authors.clear(),
            EntityKind::Book => {
                self.books.clear();
                self.categories.clear();
            }
            EntityKind::Category => self.categories.clear(),
        }
    }

    pub fn stats(&self) -> Vec<CacheStats> {
        vec![
            self.authors.stats(),
            self.books.stats(),
            self.categories.stats(),
        ]
    }
}

impl Default for CacheCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> CacheCoordinator {
        let coordinator = CacheCoordinator::new(10);
        coordinator.authors().put("author_id:1", vec![]);
        coordinator.books().put("book_id:1", vec![]);
        coordinator.categories().put("category_id:1", vec![]);
        coordinator
    }

    #[test]
    fn author_mutation_clears_only_authors() {
        let coordinator = seeded();
        coordinator.on_author_mutated();
        assert!(coordinator.authors().is_empty());
        assert_eq!(coordinator.books().len(), 1);
        assert_eq!(coordinator.categories().len(), 1);
    }

    #[test]
    fn book_mutation_clears_books_and_categories() {
        let coordinator = seeded();
        coordinator.on_book_mutated();
        assert_eq!(coordinator.authors().len(), 1);
        assert!(coordinator.books().is_empty());
        assert!(coordinator.categories().is_empty());
    }

    #[test]
    fn category_mutation_clears_only_categories() {
        let coordinator = seeded();
        coordinator.on_category_mutated();
        assert_eq!(coordinator.authors().len(), 1);
        assert_eq!(coordinator.books().len(), 1);
        assert!(coordinator.categories().is_empty());
    }

    #[test]
    fn clones_share_the_same_caches() {
        let coordinator = CacheCoordinator::default();
        let clone = coordinator.clone();
        clone.books().put("k", vec![]);
        assert!(coordinator.books().contains_key("k"));
        assert_eq!(coordinator.authors().capacity(), DEFAULT_CAPACITY);
    }
}
