use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};

use indexmap::IndexSet;
use libris_core::{Author, AuthorRef, Book, Category, CategoryRef, EntityId, EntityKind};
use libris_storage::StorageError;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub(crate) struct AuthorRow {
    pub(crate) id: EntityId,
    pub(crate) name: String,
}

#[derive(Debug, Clone)]
pub(crate) struct BookRow {
    pub(crate) id: EntityId,
    pub(crate) title: String,
    pub(crate) author_id: Option<EntityId>,
    pub(crate) category_ids: Vec<EntityId>,
}

#[derive(Debug, Clone)]
pub(crate) struct CategoryRow {
    pub(crate) id: EntityId,
    pub(crate) name: String,
}

/// The three catalogue tables. Associations are kept as ids on the book row.
#[derive(Debug, Default)]
pub(crate) struct CatalogData {
    pub(crate) authors: BTreeMap<EntityId, AuthorRow>,
    pub(crate) books: BTreeMap<EntityId, BookRow>,
    pub(crate) categories: BTreeMap<EntityId, CategoryRow>,
}

/// Case-insensitive substring match used by every free-text predicate.
pub(crate) fn matches_fragment(haystack: &str, fragment: &str) -> bool {
    haystack.to_lowercase().contains(&fragment.to_lowercase())
}

/// Drops repeated ids, keeping the first occurrence of each.
pub(crate) fn distinct_ids(ids: &[EntityId]) -> Vec<EntityId> {
    ids.iter().copied().collect::<IndexSet<_>>().into_iter().collect()
}

impl CatalogData {
    pub(crate) fn author_view(&self, row: &AuthorRow) -> Author {
        Author {
            id: row.id,
            name: row.name.clone(),
            books: self
                .books
                .values()
                .filter(|b| b.author_id == Some(row.id))
                .map(|b| b.title.clone())
                .collect(),
        }
    }

    pub(crate) fn category_view(&self, row: &CategoryRow) -> Category {
        Category {
            id: row.id,
            name: row.name.clone(),
            books: self
                .books
                .values()
                .filter(|b| b.category_ids.contains(&row.id))
                .map(|b| b.title.clone())
                .collect(),
        }
    }

    pub(crate) fn book_view(&self, row: &BookRow) -> Book {
        Book {
            id: row.id,
            title: row.title.clone(),
            author: row
                .author_id
                .and_then(|id| self.authors.get(&id))
                .map(|a| AuthorRef {
                    id: a.id,
                    name: a.name.clone(),
                }),
            categories: row
                .category_ids
                .iter()
                .filter_map(|id| self.categories.get(id))
                .map(|c| CategoryRef {
                    id: c.id,
                    name: c.name.clone(),
                })
                .collect(),
        }
    }

    pub(crate) fn categories_where(&self, pred: impl Fn(&CategoryRow) -> bool) -> Vec<Category> {
        self.categories
            .values()
            .filter(|c| pred(c))
            .map(|c| self.category_view(c))
            .collect()
    }

    pub(crate) fn author_name(&self, row: &BookRow) -> Option<&str> {
        row.author_id
            .and_then(|id| self.authors.get(&id))
            .map(|a| a.name.as_str())
    }

    pub(crate) fn books_where(&self, pred: impl Fn(&BookRow) -> bool) -> Vec<Book> {
        self.books
            .values()
            .filter(|b| pred(b))
            .map(|b| self.book_view(b))
            .collect()
    }

    pub(crate) fn require_author(&self, id: EntityId) -> Result<(), StorageError> {
        if self.authors.contains_key(&id) {
            Ok(())
        } else {
            Err(StorageError::invalid_reference(EntityKind::Author, vec![id]))
        }
    }

    /// Fails with every missing category id, not just the first.
    pub(crate) fn require_categories(&self, ids: &[EntityId]) -> Result<(), StorageError> {
        let missing: Vec<EntityId> = ids
            .iter()
            .copied()
            .filter(|id| !self.categories.contains_key(id))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(StorageError::invalid_reference(EntityKind::Category, missing))
        }
    }

    pub(crate) fn require_books(&self, ids: &[EntityId]) -> Result<(), StorageError> {
        let missing: Vec<EntityId> = ids
            .iter()
            .copied()
            .filter(|id| !self.books.contains_key(id))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(StorageError::invalid_reference(EntityKind::Book, missing))
        }
    }

    /// A title may appear once per author. `except` skips the book being updated.
    pub(crate) fn title_taken(
        &self,
        author_id: Option<EntityId>,
        title: &str,
        except: Option<EntityId>,
    ) -> bool {
        self.books.values().any(|b| {
            Some(b.id) != except && b.author_id == author_id && b.title == title
        })
    }

    pub(crate) fn author_name_taken(&self, name: &str, except: Option<EntityId>) -> bool {
        self.authors
            .values()
            .any(|a| Some(a.id) != except && a.name == name)
    }

    pub(crate) fn category_name_taken(&self, name: &str, except: Option<EntityId>) -> bool {
        self.categories
            .values()
            .any(|c| Some(c.id) != except && c.name == name)
    }

    /// Replaces the set of books filed under `category_id`.
    pub(crate) fn assign_category(&mut self, category_id: EntityId, book_ids: &[EntityId]) {
        for book in self.books.values_mut() {
            let listed = book_ids.contains(&book.id);
            let present = book.category_ids.contains(&category_id);
            if listed && !present {
                book.category_ids.push(category_id);
            } else if !listed && present {
                book.category_ids.retain(|id| *id != category_id);
            }
        }
    }
}

/// In-memory catalogue backend.
///
/// A single `tokio::sync::RwLock` guards all three tables, so multi-table
/// writes (such as detaching books from a deleted author) are atomic.
/// Ids are assigned from per-table atomic counters starting at 1.
#[derive(Debug)]
pub struct InMemoryCatalog {
    pub(crate) data: RwLock<CatalogData>,
    author_seq: AtomicI32,
    book_seq: AtomicI32,
    category_seq: AtomicI32,
}

impl InMemoryCatalog {
    /// Creates an empty catalogue.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(CatalogData::default()),
            author_seq: AtomicI32::new(1),
            book_seq: AtomicI32::new(1),
            category_seq: AtomicI32::new(1),
        }
    }

    pub(crate) fn next_id(&self, kind: EntityKind) -> EntityId {
        let seq = match kind {
            EntityKind::Author => &self.author_seq,
            EntityKind::Book => &self.book_seq,
            EntityKind::Category => &self.category_seq,
        };
        seq.fetch_add(1, Ordering::SeqCst)
    }

    /// Number of rows per table as `(authors, books, categories)`.
    pub async fn counts(&self) -> (usize, usize, usize) {
        let data = self.data.read().await;
        (data.authors.len(), data.books.len(), data.categories.len())
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_ids_keeps_first_occurrence() {
        assert_eq!(distinct_ids(&[1, 2, 1, 3, 2]), vec![1, 2, 3]);
        assert!(distinct_ids(&[]).is_empty());
    }

    #[test]
    fn test_matches_fragment_ignores_case() {
        assert!(matches_fragment("Ursula K. Le Guin", "le gu"));
        assert!(matches_fragment("Poetry", "POET"));
        assert!(!matches_fragment("Poetry", "prose"));
    }

    #[test]
    fn test_next_id_is_per_table() {
        let catalog = InMemoryCatalog::new();
        assert_eq!(catalog.next_id(EntityKind::Author), 1);
        assert_eq!(catalog.next_id(EntityKind::Author), 2);
        assert_eq!(catalog.next_id(EntityKind::Book), 1);
    }

    #[test]
    fn test_assign_category_replaces_membership() {
        let mut data = CatalogData::default();
        for id in 1..=3 {
            data.books.insert(
                id,
                BookRow {
                    id,
                    title: format!("b{id}"),
                    author_id: None,
                    category_ids: if id == 1 { vec![7] } else { vec![] },
                },
            );
        }

        data.assign_category(7, &[2, 3]);

        assert!(data.books[&1].category_ids.is_empty());
        assert_eq!(data.books[&2].category_ids, vec![7]);
        assert_eq!(data.books[&3].category_ids, vec![7]);
    }

    #[test]
    fn test_require_categories_lists_all_missing() {
        let mut data = CatalogData::default();
        data.categories.insert(
            1,
            CategoryRow {
                id: 1,
                name: "Poetry".into(),
            },
        );
        let err = data.require_categories(&[1, 4, 5]).unwrap_err();
        assert_eq!(err.to_string(), "category not found with ids: [4, 5]");
    }
}
