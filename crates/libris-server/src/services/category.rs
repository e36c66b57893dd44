use libris_core::{Category, CategoryDraft, CategoryPatch, EntityId, EntityKind};
use libris_storage::DynStorage;

use libris_storage::StorageError;

use super::{
    ServiceError, ServiceResult, cached, cached_by_id, cached_non_empty, require_param,
};
use crate::cache::{CacheCoordinator, CacheKey};

#[derive(Clone)]
pub struct CategoryService {
    storage: DynStorage,
    caches: CacheCoordinator,
}

impl CategoryService {
    pub fn new(storage: DynStorage, caches: CacheCoordinator) -> Self {
        Self { storage, caches }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.storage.list_categories().await?)
    }

    pub async fn get(&self, id: EntityId) -> ServiceResult<Category> {
        cached_by_id(
            self.caches.categories(),
            CacheKey::op("category_id").param(id).build(),
            EntityKind::Category,
            id,
            || self.storage.read_category(id),
        )
        .await
    }

    pub async fn find_by_name(&self, name: &str) -> ServiceResult<Vec<Category>> {
        let name = require_param("name", name)?;
        cached_non_empty(
            self.caches.categories(),
            CacheKey::op("categories_by_name").param(name).build(),
            || self.storage.find_categories_by_name(name),
            || ServiceError::not_found(format!("No categories found with name: {name}")),
        )
        .await
    }

    /// Categories holding a book whose title matches `book`.
    pub async fn find_by_book_name(&self, book: &str) -> ServiceResult<Vec<Category>> {
        let book = require_param("book", book)?;
        cached_non_empty(
            self.caches.categories(),
            CacheKey::op("categories_by_book").param(book).build(),
            || self.storage.find_categories_by_book_name(book),
            || ServiceError::not_found(format!("No categories found for book: {book}")),
        )
        .await
    }

    /// Categories of an existing book; an uncategorised book yields `[]`.
    pub async fn find_by_book_id(&self, book_id: EntityId) -> ServiceResult<Vec<Category>> {
        if self.storage.read_book(book_id).await?.is_none() {
            return Err(StorageError::not_found(EntityKind::Book, book_id).into());
        }
        cached(
            self.caches.categories(),
            CacheKey::op("categories_by_book_id").param(book_id).build(),
            || self.storage.find_categories_by_book_id(book_id),
        )
        .await
    }

    pub async fn create(&self, draft: CategoryDraft) -> ServiceResult<Category> {
        draft.validate()?;
        let category = self.storage.create_category(&draft).await?;
        self.caches.on_category_mutated();
        tracing::info!(category_id = category.id, "category created");
        Ok(category)
    }

    pub async fn update(&self, id: EntityId, patch: CategoryPatch) -> ServiceResult<Category> {
        patch.validate()?;
        let category = self.storage.update_category(id, &patch).await?;
        self.caches.on_category_mutated();
        tracing::info!(category_id = id, "category updated");
        Ok(category)
    }

    pub async fn delete(&self, id: EntityId) -> ServiceResult<()> {
        self.storage.delete_category(id).await?;
        self.caches.on_category_mutated();
        tracing::info!(category_id = id, "category deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libris_db_memory::create_storage;

    fn draft(name: &str) -> CategoryDraft {
        CategoryDraft {
            name: name.into(),
            book_ids: None,
        }
    }

    #[tokio::test]
    async fn category_lookups_and_invalidation() {
        let caches = CacheCoordinator::new(10);
        let service = CategoryService::new(create_storage(), caches.clone());
        let poetry = service.create(draft("Poetry")).await.unwrap();
        caches.books().put("book_id:1", vec![]);

        assert_eq!(service.get(poetry.id).await.unwrap().name, "Poetry");
        assert_eq!(service.find_by_name("poe").await.unwrap().len(), 1);
        assert_eq!(caches.categories().len(), 2);

        let err = service.find_by_name("prose").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(caches.categories().len(), 2);

        service.update(poetry.id, draft("Verse")).await.unwrap();
        assert!(caches.categories().is_empty());
        assert_eq!(caches.books().len(), 1);

        service.delete(poetry.id).await.unwrap();
        assert!(service.get(poetry.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn duplicate_name_is_a_storage_conflict() {
        let service = CategoryService::new(create_storage(), CacheCoordinator::default());
        service.create(draft("Poetry")).await.unwrap();
        let err = service.create(draft("Poetry")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(ref e) if e.is_already_exists()));
    }

    #[tokio::test]
    async fn lookups_by_book_are_cached_and_checked() {
        let storage = create_storage();
        let caches = CacheCoordinator::new(10);
        let service = CategoryService::new(storage.clone(), caches.clone());
        let poetry = service.create(draft("Poetry")).await.unwrap();
        let author = storage
            .create_author(&libris_core::AuthorDraft {
                name: "Mary Oliver".into(),
            })
            .await
            .unwrap();
        let book = storage
            .create_book(&libris_core::BookDraft {
                title: "Devotions".into(),
                author_id: author.id,
                category_ids: vec![poetry.id],
            })
            .await
            .unwrap();
        let bare = storage
            .create_book(&libris_core::BookDraft {
                title: "Upstream".into(),
                author_id: author.id,
                category_ids: vec![],
            })
            .await
            .unwrap();

        let found = service.find_by_book_name("devot").await.unwrap();
        assert_eq!(found[0].name, "Poetry");
        assert!(caches.categories().contains_key("categories_by_book:devot"));

        assert!(service.find_by_book_name("nothing").await.unwrap_err().is_not_found());

        let by_id = service.find_by_book_id(book.id).await.unwrap();
        assert_eq!(by_id[0].id, poetry.id);
        assert!(service.find_by_book_id(bare.id).await.unwrap().is_empty());
        assert!(
            caches
                .categories()
                .contains_key(&format!("categories_by_book_id:{}", bare.id))
        );

        let err = service.find_by_book_id(999).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!caches.categories().contains_key("categories_by_book_id:999"));
    }
}
