//! Bounded query-result caching.
//!
//! ## Layout
//!
//! - [`BoundedResultCache`]: one per entity type, FIFO-evicting at capacity
//! - [`CacheCoordinator`]: clears the affected caches after a mutation
//! - [`CacheKey`]: deterministic key built from an operation and its params
//!
//! ```text
//! read → CacheKey → cache hit ──────────────→ values
//!                 → cache miss → storage → put (non-empty) → values
//! write → storage → CacheCoordinator::on_*_mutated → clear()
//! ```

pub mod bounded;
pub mod coordinator;
pub mod key;

pub use bounded::{BoundedResultCache, CacheStats};
pub use coordinator::{CacheCoordinator, DEFAULT_CAPACITY};
pub use key::CacheKey;
