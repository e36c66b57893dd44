use std::collections::BTreeMap;

use axum::{Json, extract::State};

use crate::cache::CacheStats;
use crate::server::AppState;
use crate::visits::TotalVisits;

pub async fn total_visits(State(state): State<AppState>) -> Json<TotalVisits> {
    Json(state.visits.total())
}

pub async fn visits_by_url(State(state): State<AppState>) -> Json<BTreeMap<String, u64>> {
    Json(state.visits.by_url())
}

pub async fn cache(State(state): State<AppState>) -> Json<Vec<CacheStats>> {
    Json(state.caches.stats())
}
