//! # libris-storage
//!
//! Storage abstraction layer for the Libris server.
//!
//! This crate defines the trait and error types that all storage backends
//! must implement. It does not contain any implementations; those are
//! provided by separate crates (see `libris-db-memory`).
//!
//! ## Overview
//!
//! The main trait is [`CatalogStorage`], which defines the contract for:
//! - lookups by id and by free-text predicate
//! - create, update and delete of authors, books and categories
//!
//! Associations between entities are maintained by the backend; readers get
//! denormalised views from [`libris_core::model`].

mod error;
mod traits;

pub use error::{ErrorCategory, StorageError};
pub use traits::CatalogStorage;

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shared storage trait object.
pub type DynStorage = std::sync::Arc<dyn CatalogStorage>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use libris_storage::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{ErrorCategory, StorageError};
    pub use crate::traits::CatalogStorage;
    pub use crate::{DynStorage, StorageResult};
}
