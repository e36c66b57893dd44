//! Catalogue entities as seen by readers of the store.
//!
//! Associations are denormalised on read: a [`Book`] carries its author's
//! name and its category names, while [`Author`] and [`Category`] carry the
//! titles of their books. Cached query results embed these views, which is
//! why a book mutation also invalidates category results.

use serde::{Deserialize, Serialize};

/// Integer identity assigned by the store.
pub type EntityId = i32;

/// Entity kinds known to the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Author,
    Book,
    Category,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Author => "author",
            EntityKind::Book => "book",
            EntityKind::Category => "category",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short reference to an author embedded in a [`Book`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: EntityId,
    pub name: String,
}

/// Short reference to a category embedded in a [`Book`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: EntityId,
    pub name: String,
    /// Titles of the author's books, in creation order.
    #[serde(default)]
    pub books: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: EntityId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorRef>,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
}

impl Book {
    pub fn author_name(&self) -> Option<&str> {
        self.author.as_ref().map(|a| a.name.as_str())
    }

    pub fn category_ids(&self) -> Vec<EntityId> {
        self.categories.iter().map(|c| c.id).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: EntityId,
    pub name: String,
    /// Titles of books filed under this category.
    #[serde(default)]
    pub books: Vec<String>,
}
