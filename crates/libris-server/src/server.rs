use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use libris_storage::DynStorage;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::{
    cache::CacheCoordinator,
    config::AppConfig,
    handlers,
    middleware as app_middleware,
    reports::ReportService,
    services::{AuthorService, BookService, CategoryService},
    visits::VisitTracker,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub authors: AuthorService,
    pub books: BookService,
    pub categories: CategoryService,
    pub reports: ReportService,
    pub caches: CacheCoordinator,
    pub visits: Arc<VisitTracker>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, storage: DynStorage) -> Self {
        let caches = CacheCoordinator::new(config.cache.capacity);
        tracing::info!(
            backend = storage.backend_name(),
            cache_capacity = config.cache.capacity,
            max_concurrent_jobs = config.reports.max_concurrent_jobs,
            "Application state initialized"
        );
        Self {
            authors: AuthorService::new(storage.clone(), caches.clone()),
            books: BookService::new(storage.clone(), caches.clone()),
            categories: CategoryService::new(storage, caches.clone()),
            reports: ReportService::new(config.reports.clone()),
            caches,
            visits: Arc::new(VisitTracker::new()),
            config: Arc::new(config),
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    let timeout = state.config.request_timeout();

    let api = Router::new()
        .route(
            "/authors",
            get(handlers::authors::list).post(handlers::authors::create),
        )
        .route("/authors/search", get(handlers::authors::search))
        .route("/authors/by-category", get(handlers::authors::by_category))
        .route(
            "/authors/{id}",
            get(handlers::authors::get)
                .put(handlers::authors::update)
                .delete(handlers::authors::delete),
        )
        .route(
            "/books",
            get(handlers::books::list).post(handlers::books::create),
        )
        .route("/books/bulk", post(handlers::books::create_bulk))
        .route("/books/search", get(handlers::books::search))
        .route("/books/by-author", get(handlers::books::by_author_name))
        .route("/books/by-author/{id}", get(handlers::books::by_author_id))
        .route("/books/by-category", get(handlers::books::by_category_name))
        .route(
            "/books/by-category/{id}",
            get(handlers::books::by_category_id),
        )
        .route(
            "/books/{id}",
            get(handlers::books::get)
                .put(handlers::books::update)
                .delete(handlers::books::delete),
        )
        .route(
            "/categories",
            get(handlers::categories::list).post(handlers::categories::create),
        )
        .route("/categories/search", get(handlers::categories::search))
        .route("/categories/by-book", get(handlers::categories::by_book_name))
        .route(
            "/categories/by-book/{id}",
            get(handlers::categories::by_book_id),
        )
        .route(
            "/categories/{id}",
            get(handlers::categories::get)
                .put(handlers::categories::update)
                .delete(handlers::categories::delete),
        );

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .route("/metrics", get(handlers::metrics))
        .nest("/api", api)
        // Logs and report jobs
        .route("/logs", get(handlers::logs::download_source))
        .route("/logs/reports", post(handlers::logs::create_report))
        .route(
            "/logs/reports/{task_id}/status",
            get(handlers::logs::report_status),
        )
        .route(
            "/logs/reports/{task_id}/download",
            get(handlers::logs::download_report),
        )
        // Counters
        .route("/stats/visits/total", get(handlers::stats::total_visits))
        .route("/stats/visits/by-url", get(handlers::stats::visits_by_url))
        .route("/stats/cache", get(handlers::stats::cache))
        // Middleware stack (outermost last: request id -> trace -> cors/compression -> visits -> timeout/body limit)
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            app_middleware::track_visits,
        ))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(middleware::from_fn(app_middleware::request_id))
        .with_state(state)
}

pub struct LibrisServer {
    addr: SocketAddr,
    app: Router,
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
    storage: Option<DynStorage>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
            storage: None,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    /// Uses `storage` instead of a fresh in-memory catalogue.
    pub fn with_storage(mut self, storage: DynStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn build(self) -> LibrisServer {
        let storage = self
            .storage
            .unwrap_or_else(libris_db_memory::create_storage);
        let state = AppState::new(self.config, storage);

        LibrisServer {
            addr: self.addr,
            app: build_app(state),
        }
    }
}

impl LibrisServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        self.run_with_listener(listener).await
    }

    /// Serves on an already bound listener.
    pub async fn run_with_listener(self, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
        tracing::info!("listening on {}", listener.local_addr()?);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
