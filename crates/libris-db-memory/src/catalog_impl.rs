//! Implementation of the CatalogStorage trait for InMemoryCatalog.

use async_trait::async_trait;

use libris_core::{
    Author, AuthorDraft, AuthorPatch, Book, BookDraft, BookPatch, Category, CategoryDraft,
    CategoryPatch, EntityId, EntityKind,
};
use libris_storage::{CatalogStorage, StorageError};

use crate::storage::{
    AuthorRow, BookRow, CategoryRow, InMemoryCatalog, distinct_ids, matches_fragment,
};

#[async_trait]
impl CatalogStorage for InMemoryCatalog {
    // ==================== Authors ====================

    async fn list_authors(&self) -> Result<Vec<Author>, StorageError> {
        let data = self.data.read().await;
        Ok(data.authors.values().map(|a| data.author_view(a)).collect())
    }

    async fn read_author(&self, id: EntityId) -> Result<Option<Author>, StorageError> {
        let data = self.data.read().await;
        Ok(data.authors.get(&id).map(|a| data.author_view(a)))
    }

    async fn find_authors_by_name(&self, fragment: &str) -> Result<Vec<Author>, StorageError> {
        let data = self.data.read().await;
        Ok(data
            .authors
            .values()
            .filter(|a| matches_fragment(&a.name, fragment))
            .map(|a| data.author_view(a))
            .collect())
    }

    async fn find_authors_by_book_category(
        &self,
        fragment: &str,
    ) -> Result<Vec<Author>, StorageError> {
        let data = self.data.read().await;
        let category_ids: Vec<EntityId> = data
            .categories
            .values()
            .filter(|c| matches_fragment(&c.name, fragment))
            .map(|c| c.id)
            .collect();

        Ok(data
            .authors
            .values()
            .filter(|a| {
                data.books.values().any(|b| {
                    b.author_id == Some(a.id)
                        && b.category_ids.iter().any(|c| category_ids.contains(c))
                })
            })
            .map(|a| data.author_view(a))
            .collect())
    }

    async fn author_name_exists(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.data.read().await.author_name_taken(name, None))
    }

    async fn create_author(&self, draft: &AuthorDraft) -> Result<Author, StorageError> {
        let mut data = self.data.write().await;
        if data.author_name_taken(&draft.name, None) {
            return Err(StorageError::already_exists(EntityKind::Author, &draft.name));
        }

        let row = AuthorRow {
            id: self.next_id(EntityKind::Author),
            name: draft.name.clone(),
        };
        let view = data.author_view(&row);
        data.authors.insert(row.id, row);
        Ok(view)
    }

    async fn update_author(
        &self,
        id: EntityId,
        patch: &AuthorPatch,
    ) -> Result<Author, StorageError> {
        let mut data = self.data.write().await;
        if !data.authors.contains_key(&id) {
            return Err(StorageError::not_found(EntityKind::Author, id));
        }

        if let Some(name) = patch.effective_name() {
            if data.author_name_taken(name, Some(id)) {
                return Err(StorageError::already_exists(EntityKind::Author, name));
            }
            if let Some(row) = data.authors.get_mut(&id) {
                row.name = name.to_string();
            }
        }

        data.authors
            .get(&id)
            .map(|row| data.author_view(row))
            .ok_or_else(|| StorageError::not_found(EntityKind::Author, id))
    }

    async fn delete_author(&self, id: EntityId) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        if data.authors.remove(&id).is_none() {
            return Err(StorageError::not_found(EntityKind::Author, id));
        }
        for book in data.books.values_mut() {
            if book.author_id == Some(id) {
                book.author_id = None;
            }
        }
        Ok(())
    }

    // ==================== Books ====================

    async fn list_books(&self) -> Result<Vec<Book>, StorageError> {
        Ok(self.data.read().await.books_where(|_| true))
    }

    async fn read_book(&self, id: EntityId) -> Result<Option<Book>, StorageError> {
        let data = self.data.read().await;
        Ok(data.books.get(&id).map(|b| data.book_view(b)))
    }

    async fn search_books(
        &self,
        author: Option<&str>,
        title: Option<&str>,
    ) -> Result<Vec<Book>, StorageError> {
        let data = self.data.read().await;
        Ok(data.books_where(|b| {
            let by_author = match (author, data.author_name(b)) {
                (Some(fragment), Some(name)) => matches_fragment(name, fragment),
                _ => false,
            };
            let by_title = title.is_some_and(|fragment| matches_fragment(&b.title, fragment));
            by_author || by_title
        }))
    }

    async fn find_books_by_author_name(&self, fragment: &str) -> Result<Vec<Book>, StorageError> {
        let data = self.data.read().await;
        Ok(data.books_where(|b| {
            data.author_name(b)
                .is_some_and(|name| matches_fragment(name, fragment))
        }))
    }

    async fn find_books_by_category_name(
        &self,
        fragment: &str,
    ) -> Result<Vec<Book>, StorageError> {
        let data = self.data.read().await;
        Ok(data.books_where(|b| {
            b.category_ids.iter().any(|id| {
                data.categories
                    .get(id)
                    .is_some_and(|c| matches_fragment(&c.name, fragment))
            })
        }))
    }

    async fn find_books_by_author_id(
        &self,
        author_id: EntityId,
    ) -> Result<Vec<Book>, StorageError> {
        let data = self.data.read().await;
        Ok(data.books_where(|b| b.author_id == Some(author_id)))
    }

    async fn find_books_by_category_id(
        &self,
        category_id: EntityId,
    ) -> Result<Vec<Book>, StorageError> {
        let data = self.data.read().await;
        Ok(data.books_where(|b| b.category_ids.contains(&category_id)))
    }

    async fn create_book(&self, draft: &BookDraft) -> Result<Book, StorageError> {
        let mut data = self.data.write().await;
        data.require_author(draft.author_id)?;
        data.require_categories(&draft.category_ids)?;
        if data.title_taken(Some(draft.author_id), &draft.title, None) {
            return Err(StorageError::already_exists(EntityKind::Book, &draft.title));
        }

        let row = BookRow {
            id: self.next_id(EntityKind::Book),
            title: draft.title.clone(),
            author_id: Some(draft.author_id),
            category_ids: distinct_ids(&draft.category_ids),
        };
        let view = data.book_view(&row);
        data.books.insert(row.id, row);
        Ok(view)
    }

    async fn update_book(&self, id: EntityId, patch: &BookPatch) -> Result<Book, StorageError> {
        let mut data = self.data.write().await;
        let current_author = data
            .books
            .get(&id)
            .ok_or_else(|| StorageError::not_found(EntityKind::Book, id))?
            .author_id;

        if let Some(author_id) = patch.author_id {
            data.require_author(author_id)?;
        }
        if let Some(category_ids) = &patch.category_ids {
            data.require_categories(category_ids)?;
        }

        let author_id = patch.author_id.or(current_author);
        if data.title_taken(author_id, &patch.title, Some(id)) {
            return Err(StorageError::already_exists(EntityKind::Book, &patch.title));
        }

        let row = data
            .books
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found(EntityKind::Book, id))?;
        row.title = patch.title.clone();
        row.author_id = author_id;
        if let Some(category_ids) = &patch.category_ids {
            row.category_ids = distinct_ids(category_ids);
        }

        let row = row.clone();
        Ok(data.book_view(&row))
    }

    async fn delete_book(&self, id: EntityId) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        data.books
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(EntityKind::Book, id))
    }

    // ==================== Categories ====================

    async fn list_categories(&self) -> Result<Vec<Category>, StorageError> {
        let data = self.data.read().await;
        Ok(data
            .categories
            .values()
            .map(|c| data.category_view(c))
            .collect())
    }

    async fn read_category(&self, id: EntityId) -> Result<Option<Category>, StorageError> {
        let data = self.data.read().await;
        Ok(data.categories.get(&id).map(|c| data.category_view(c)))
    }

    async fn find_categories_by_name(
        &self,
        fragment: &str,
    ) -> Result<Vec<Category>, StorageError> {
        let data = self.data.read().await;
        Ok(data
            .categories
            .values()
            .filter(|c| matches_fragment(&c.name, fragment))
            .map(|c| data.category_view(c))
            .collect())
    }

    async fn find_categories_by_book_name(
        &self,
        fragment: &str,
    ) -> Result<Vec<Category>, StorageError> {
        let data = self.data.read().await;
        Ok(data.categories_where(|c| {
            data.books.values().any(|b| {
                b.category_ids.contains(&c.id) && matches_fragment(&b.title, fragment)
            })
        }))
    }

    async fn find_categories_by_book_id(
        &self,
        book_id: EntityId,
    ) -> Result<Vec<Category>, StorageError> {
        let data = self.data.read().await;
        let Some(book) = data.books.get(&book_id) else {
            return Ok(Vec::new());
        };
        Ok(data.categories_where(|c| book.category_ids.contains(&c.id)))
    }

    async fn category_name_exists(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.data.read().await.category_name_taken(name, None))
    }

    async fn create_category(&self, draft: &CategoryDraft) -> Result<Category, StorageError> {
        let mut data = self.data.write().await;
        if data.category_name_taken(&draft.name, None) {
            return Err(StorageError::already_exists(
                EntityKind::Category,
                &draft.name,
            ));
        }
        if let Some(book_ids) = &draft.book_ids {
            data.require_books(book_ids)?;
        }

        let row = CategoryRow {
            id: self.next_id(EntityKind::Category),
            name: draft.name.clone(),
        };
        let id = row.id;
        data.categories.insert(id, row);
        if let Some(book_ids) = &draft.book_ids {
            data.assign_category(id, book_ids);
        }

        data.categories
            .get(&id)
            .map(|c| data.category_view(c))
            .ok_or_else(|| StorageError::internal("category vanished during create"))
    }

    async fn update_category(
        &self,
        id: EntityId,
        patch: &CategoryPatch,
    ) -> Result<Category, StorageError> {
        let mut data = self.data.write().await;
        if !data.categories.contains_key(&id) {
            return Err(StorageError::not_found(EntityKind::Category, id));
        }
        if data.category_name_taken(&patch.name, Some(id)) {
            return Err(StorageError::already_exists(
                EntityKind::Category,
                &patch.name,
            ));
        }
        if let Some(book_ids) = &patch.book_ids {
            data.require_books(book_ids)?;
        }

        if let Some(row) = data.categories.get_mut(&id) {
            row.name = patch.name.clone();
        }
        if let Some(book_ids) = &patch.book_ids {
            data.assign_category(id, book_ids);
        }

        data.categories
            .get(&id)
            .map(|c| data.category_view(c))
            .ok_or_else(|| StorageError::not_found(EntityKind::Category, id))
    }

    async fn delete_category(&self, id: EntityId) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        if data.categories.remove(&id).is_none() {
            return Err(StorageError::not_found(EntityKind::Category, id));
        }
        for book in data.books.values_mut() {
            book.category_ids.retain(|c| *c != id);
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> InMemoryCatalog {
        let storage = InMemoryCatalog::new();
        storage
            .create_author(&AuthorDraft {
                name: "Ursula K. Le Guin".into(),
            })
            .await
            .unwrap();
        storage
            .create_author(&AuthorDraft {
                name: "Frank Herbert".into(),
            })
            .await
            .unwrap();
        storage
            .create_category(&CategoryDraft {
                name: "Fantasy".into(),
                book_ids: None,
            })
            .await
            .unwrap();
        storage
            .create_category(&CategoryDraft {
                name: "Science Fiction".into(),
                book_ids: None,
            })
            .await
            .unwrap();
        storage
            .create_book(&BookDraft {
                title: "A Wizard of Earthsea".into(),
                author_id: 1,
                category_ids: vec![1],
            })
            .await
            .unwrap();
        storage
            .create_book(&BookDraft {
                title: "Dune".into(),
                author_id: 2,
                category_ids: vec![2],
            })
            .await
            .unwrap();
        storage
    }

    #[tokio::test]
    async fn test_create_and_read_denormalised_views() {
        let storage = seeded().await;

        let book = storage.read_book(1).await.unwrap().unwrap();
        assert_eq!(book.author_name(), Some("Ursula K. Le Guin"));
        assert_eq!(book.categories[0].name, "Fantasy");

        let author = storage.read_author(2).await.unwrap().unwrap();
        assert_eq!(author.books, vec!["Dune".to_string()]);

        let category = storage.read_category(1).await.unwrap().unwrap();
        assert_eq!(category.books, vec!["A Wizard of Earthsea".to_string()]);

        assert!(storage.read_book(99).await.unwrap().is_none());
        assert_eq!(storage.counts().await, (2, 2, 2));
    }

    #[tokio::test]
    async fn test_unique_names() {
        let storage = seeded().await;

        let err = storage
            .create_author(&AuthorDraft {
                name: "Frank Herbert".into(),
            })
            .await
            .unwrap_err();
        assert!(err.is_already_exists());

        let err = storage
            .create_category(&CategoryDraft {
                name: "Fantasy".into(),
                book_ids: None,
            })
            .await
            .unwrap_err();
        assert!(err.is_already_exists());

        assert!(storage.author_name_exists("Frank Herbert").await.unwrap());
        assert!(!storage.category_name_exists("fantasy").await.unwrap());
    }

    #[tokio::test]
    async fn test_book_reference_rules() {
        let storage = seeded().await;

        let err = storage
            .create_book(&BookDraft {
                title: "Orphan".into(),
                author_id: 42,
                category_ids: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::InvalidReference {
                entity: EntityKind::Author,
                ..
            }
        ));

        let err = storage
            .create_book(&BookDraft {
                title: "Children of Dune".into(),
                author_id: 2,
                category_ids: vec![2, 8, 9],
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "category not found with ids: [8, 9]");

        let err = storage
            .create_book(&BookDraft {
                title: "Dune".into(),
                author_id: 2,
                category_ids: vec![],
            })
            .await
            .unwrap_err();
        assert!(err.is_already_exists());

        // Same title under another author is fine.
        storage
            .create_book(&BookDraft {
                title: "Dune".into(),
                author_id: 1,
                category_ids: vec![],
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_searches_are_case_insensitive() {
        let storage = seeded().await;

        let authors = storage.find_authors_by_name("le guin").await.unwrap();
        assert_eq!(authors.len(), 1);

        let authors = storage.find_authors_by_book_category("science").await.unwrap();
        assert_eq!(authors[0].name, "Frank Herbert");

        let books = storage.search_books(Some("herbert"), None).await.unwrap();
        assert_eq!(books.len(), 1);
        let books = storage
            .search_books(Some("herbert"), Some("earthsea"))
            .await
            .unwrap();
        assert_eq!(books.len(), 2);
        assert!(storage.search_books(None, None).await.unwrap().is_empty());

        let books = storage.find_books_by_category_name("FANT").await.unwrap();
        assert_eq!(books[0].title, "A Wizard of Earthsea");
        let books = storage.find_books_by_author_name("frank").await.unwrap();
        assert_eq!(books[0].title, "Dune");
        assert_eq!(storage.find_books_by_author_id(1).await.unwrap().len(), 1);
        assert_eq!(storage.find_books_by_category_id(2).await.unwrap().len(), 1);
        assert_eq!(storage.find_categories_by_name("fic").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_author_keeps_name_on_blank_patch() {
        let storage = seeded().await;

        let author = storage
            .update_author(1, &AuthorPatch { name: None })
            .await
            .unwrap();
        assert_eq!(author.name, "Ursula K. Le Guin");

        let author = storage
            .update_author(
                1,
                &AuthorPatch {
                    name: Some("U. K. Le Guin".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(author.name, "U. K. Le Guin");

        let err = storage
            .update_author(
                1,
                &AuthorPatch {
                    name: Some("Frank Herbert".into()),
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_already_exists());

        let err = storage
            .update_author(77, &AuthorPatch::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_book_replaces_associations() {
        let storage = seeded().await;

        let book = storage
            .update_book(
                2,
                &BookPatch {
                    title: "Dune Messiah".into(),
                    author_id: None,
                    category_ids: Some(vec![1, 2]),
                },
            )
            .await
            .unwrap();
        assert_eq!(book.title, "Dune Messiah");
        assert_eq!(book.author_name(), Some("Frank Herbert"));
        assert_eq!(book.category_ids(), vec![1, 2]);

        let err = storage
            .update_book(
                2,
                &BookPatch {
                    title: "Dune Messiah".into(),
                    author_id: Some(9),
                    category_ids: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidReference { .. }));
    }

    #[tokio::test]
    async fn test_delete_author_detaches_books() {
        let storage = seeded().await;
        storage.delete_author(2).await.unwrap();

        let book = storage.read_book(2).await.unwrap().unwrap();
        assert!(book.author.is_none());
        assert!(storage.delete_author(2).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_category_membership_follows_updates_and_deletes() {
        let storage = seeded().await;

        let category = storage
            .create_category(&CategoryDraft {
                name: "Classics".into(),
                book_ids: Some(vec![1, 2]),
            })
            .await
            .unwrap();
        assert_eq!(category.books.len(), 2);

        let err = storage
            .create_category(&CategoryDraft {
                name: "Ghost".into(),
                book_ids: Some(vec![5]),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "book not found with ids: [5]");

        let category = storage
            .update_category(
                category.id,
                &CategoryDraft {
                    name: "Classics".into(),
                    book_ids: Some(vec![2]),
                },
            )
            .await
            .unwrap();
        assert_eq!(category.books, vec!["Dune".to_string()]);

        storage.delete_category(category.id).await.unwrap();
        let book = storage.read_book(2).await.unwrap().unwrap();
        assert_eq!(book.category_ids(), vec![2]);
    }

    #[tokio::test]
    async fn test_delete_book() {
        let storage = seeded().await;
        storage.delete_book(1).await.unwrap();
        assert!(storage.read_book(1).await.unwrap().is_none());
        assert!(storage.delete_book(1).await.unwrap_err().is_not_found());
        assert_eq!(storage.backend_name(), "in-memory");
    }

    #[tokio::test]
    async fn test_repeated_category_ids_are_stored_once() {
        let storage = seeded().await;
        let book = storage
            .create_book(&BookDraft {
                title: "The Left Hand of Darkness".into(),
                author_id: 1,
                category_ids: vec![2, 1, 2],
            })
            .await
            .unwrap();
        let names: Vec<_> = book.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Science Fiction", "Fantasy"]);

        let updated = storage
            .update_book(
                book.id,
                &BookPatch {
                    title: book.title.clone(),
                    author_id: None,
                    category_ids: Some(vec![1, 2, 1, 1]),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.category_ids(), vec![1, 2]);

        let fantasy = storage.read_category(1).await.unwrap().unwrap();
        assert_eq!(
            fantasy.books,
            vec![
                "A Wizard of Earthsea".to_string(),
                "The Left Hand of Darkness".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_find_categories_by_book() {
        let storage = seeded().await;

        let by_title = storage.find_categories_by_book_name("DUNE").await.unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].name, "Science Fiction");
        assert!(
            storage
                .find_categories_by_book_name("missing")
                .await
                .unwrap()
                .is_empty()
        );

        let by_id = storage.find_categories_by_book_id(1).await.unwrap();
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].name, "Fantasy");
        assert!(storage.find_categories_by_book_id(99).await.unwrap().is_empty());
    }
}
