pub mod draft;
pub mod error;
pub mod model;
pub mod time;

pub use draft::{
    AuthorDraft, AuthorPatch, BookDraft, BookPatch, BulkDrafts, CategoryDraft, CategoryPatch,
};
pub use error::{CoreError, ErrorCategory, Result};
pub use model::{Author, AuthorRef, Book, Category, CategoryRef, EntityId, EntityKind};
pub use time::ReportDate;
