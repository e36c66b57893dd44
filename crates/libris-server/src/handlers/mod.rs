//! HTTP handlers grouped by resource.

pub mod authors;
pub mod books;
pub mod categories;
pub mod logs;
pub mod stats;

use axum::{
    Json,
    http::{StatusCode, header},
    response::IntoResponse,
};
use libris_api::ApiError;
use libris_core::ReportDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "Libris Server",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn readyz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ready" }))
}

/// Prometheus text exposition.
pub async fn metrics() -> impl IntoResponse {
    match crate::metrics::render_metrics() {
        Some(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics not initialized").into_response(),
    }
}

// ---- Shared query parameters ----

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthorQuery {
    pub author: String,
}

#[derive(Debug, Deserialize)]
pub struct BookQuery {
    pub book: String,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: String,
}

impl DateQuery {
    pub fn parse(&self) -> Result<ReportDate, ApiError> {
        self.date.parse::<ReportDate>().map_err(ApiError::from)
    }
}
