//! In-memory catalogue storage backend for the Libris server.
//!
//! This crate provides an in-memory implementation of the `CatalogStorage`
//! trait from `libris-storage`. All tables live behind one async `RwLock`.
//!
//! # Example
//!
//! ```ignore
//! use libris_core::AuthorDraft;
//! use libris_db_memory::InMemoryCatalog;
//! use libris_storage::CatalogStorage;
//!
//! let storage = InMemoryCatalog::new();
//! let author = storage
//!     .create_author(&AuthorDraft { name: "Octavia Butler".into() })
//!     .await?;
//! ```

mod catalog_impl;
pub mod storage;

pub use libris_storage::{CatalogStorage, DynStorage, StorageError};
pub use storage::InMemoryCatalog;

/// Creates a new shareable in-memory storage instance.
pub fn create_storage() -> DynStorage {
    std::sync::Arc::new(InMemoryCatalog::new())
}
