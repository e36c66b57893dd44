//! Storage error types for the catalogue storage abstraction layer.
//!
//! This module defines all error types that can occur during storage operations.

use std::fmt;

use libris_core::{EntityId, EntityKind};

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested entity was not found.
    #[error("{entity} not found with id: {id}")]
    NotFound {
        /// The kind of entity that was not found.
        entity: EntityKind,
        /// The id that was looked up.
        id: EntityId,
    },

    /// Attempted to create an entity whose unique key is taken.
    #[error("{entity} already exists: {key}")]
    AlreadyExists {
        /// The kind of entity that already exists.
        entity: EntityKind,
        /// The unique key that collided (a name or title).
        key: String,
    },

    /// The write referenced entities that do not exist.
    #[error("{entity} not found with ids: {ids:?}")]
    InvalidReference {
        /// The kind of the referenced entities.
        entity: EntityKind,
        /// The ids that could not be resolved.
        ids: Vec<EntityId>,
    },

    /// The entity data is invalid.
    #[error("Invalid data: {message}")]
    Invalid {
        /// Description of why the data is invalid.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(entity: EntityKind, id: EntityId) -> Self {
        Self::NotFound { entity, id }
    }

    /// Creates a new `AlreadyExists` error.
    #[must_use]
    pub fn already_exists(entity: EntityKind, key: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity,
            key: key.into(),
        }
    }

    /// Creates a new `InvalidReference` error.
    #[must_use]
    pub fn invalid_reference(entity: EntityKind, ids: Vec<EntityId>) -> Self {
        Self::InvalidReference { entity, ids }
    }

    /// Creates a new `Invalid` error.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is an already exists error.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::AlreadyExists { .. } => ErrorCategory::Conflict,
            Self::InvalidReference { .. } => ErrorCategory::Validation,
            Self::Invalid { .. } => ErrorCategory::Validation,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of storage errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Entity not found.
    NotFound,
    /// Unique key collision.
    Conflict,
    /// Validation error.
    Validation,
    /// Internal error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Validation => write!(f, "validation"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
