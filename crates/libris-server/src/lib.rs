//! Libris catalogue server.
//!
//! Bounded query-result caches over a [`CatalogStorage`](libris_storage::CatalogStorage)
//! backend, an asynchronous log report job tracker and the axum HTTP surface.

pub mod cache;
pub mod config;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod observability;
pub mod reports;
pub mod server;
pub mod services;
pub mod visits;

pub use cache::{BoundedResultCache, CacheCoordinator, CacheKey, CacheStats};
pub use config::{AppConfig, CacheConfig, LoggingConfig, ReportsConfig, ServerConfig};
pub use observability::{apply_logging_level, init_tracing};
pub use reports::{JobError, JobRegistry, ReportService, TaskRecord, TaskStatus};
pub use server::{AppState, LibrisServer, ServerBuilder, build_app};
pub use services::{AuthorService, BookService, CategoryService, ServiceError};
pub use visits::VisitTracker;
