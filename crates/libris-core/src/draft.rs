//! Write-side payloads and their validation rules.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::model::EntityId;

pub const MAX_AUTHOR_NAME_LEN: usize = 40;
pub const MAX_CATEGORY_NAME_LEN: usize = 40;
pub const MAX_BOOK_TITLE_LEN: usize = 200;

fn require_text(field: &'static str, value: &str, max_len: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CoreError::invalid_field(field, "must not be blank"));
    }
    let len = value.chars().count();
    if len > max_len {
        return Err(CoreError::invalid_field(
            field,
            format!("must be at most {max_len} characters, got {len}"),
        ));
    }
    Ok(())
}

fn require_positive(field: &'static str, id: EntityId) -> Result<()> {
    if id <= 0 {
        return Err(CoreError::invalid_field(
            field,
            format!("ids must be positive, got {id}"),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorDraft {
    pub name: String,
}

impl AuthorDraft {
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name, MAX_AUTHOR_NAME_LEN)
    }
}

/// Author update; a missing or blank name leaves the stored name unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorPatch {
    #[serde(default)]
    pub name: Option<String>,
}

impl AuthorPatch {
    pub fn validate(&self) -> Result<()> {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => {
                require_text("name", name, MAX_AUTHOR_NAME_LEN)
            }
            _ => Ok(()),
        }
    }

    /// The name to apply, if any.
    pub fn effective_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDraft {
    pub title: String,
    pub author_id: EntityId,
    #[serde(default)]
    pub category_ids: Vec<EntityId>,
}

impl BookDraft {
    pub fn validate(&self) -> Result<()> {
        require_text("title", &self.title, MAX_BOOK_TITLE_LEN)?;
        require_positive("authorId", self.author_id)?;
        for id in &self.category_ids {
            require_positive("categoryIds", *id)?;
        }
        Ok(())
    }
}

/// Book update. `None` associations are left untouched; `Some` replaces them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    pub title: String,
    #[serde(default)]
    pub author_id: Option<EntityId>,
    #[serde(default)]
    pub category_ids: Option<Vec<EntityId>>,
}

impl BookPatch {
    pub fn validate(&self) -> Result<()> {
        require_text("title", &self.title, MAX_BOOK_TITLE_LEN)?;
        if let Some(author_id) = self.author_id {
            require_positive("authorId", author_id)?;
        }
        for id in self.category_ids.iter().flatten() {
            require_positive("categoryIds", *id)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    pub name: String,
    #[serde(default)]
    pub book_ids: Option<Vec<EntityId>>,
}

impl CategoryDraft {
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name, MAX_CATEGORY_NAME_LEN)?;
        for id in self.book_ids.iter().flatten() {
            require_positive("bookIds", *id)?;
        }
        Ok(())
    }
}

/// Category updates share the create payload: the name is required and a
/// present `book_ids` list replaces the category's books.
pub type CategoryPatch = CategoryDraft;

/// Envelope for bulk creation requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDrafts<T> {
    pub items: Vec<T>,
}

impl<T> BulkDrafts<T> {
    pub fn validate_with(&self, validate: impl Fn(&T) -> Result<()>) -> Result<()> {
        if self.items.is_empty() {
            return Err(CoreError::invalid_field(
                "items",
                "at least one item must be provided",
            ));
        }
        self.items.iter().try_for_each(validate)
    }
}
