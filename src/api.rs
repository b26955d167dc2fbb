// src/api.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;

use crate::embed::{self, Embed};
use crate::link::{Link, Submission};
use crate::metrics::Metrics;
use crate::scoring::ScoringStore;
use crate::seen::SeenStore;

#[derive(Clone)]
pub struct AppState {
    pub scoring: Arc<dyn ScoringStore>,
    pub seen: Arc<dyn SeenStore>,
}

#[derive(Debug, Deserialize)]
pub struct SeenIds {
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SeenLookup {
    pub seen: Vec<String>,
}

pub fn create_router(state: AppState, metrics: Option<&Metrics>) -> Router {
    let mut router = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/embed", post(resolve_embed))
        .route("/submissions", post(build_submissions))
        .route("/scoring/{topic}", get(get_scoring))
        .route("/users/{user}/seen", put(mark_seen))
        .route("/users/{user}/seen/lookup", post(lookup_seen));

    if let Some(m) = metrics {
        router = router.merge(m.router());
    }

    router.layer(CorsLayer::very_permissive()).with_state(state)
}

/// Raw submission object in, preview descriptor (or `null`) out.
async fn resolve_embed(Json(raw): Json<Value>) -> Json<Option<Embed>> {
    Json(embed::resolve_raw(&raw))
}

/// Raw reddit submissions in, API submissions out. Objects that are not
/// valid submissions are skipped.
async fn build_submissions(Json(items): Json<Vec<Value>>) -> Json<Vec<Submission>> {
    let out = items
        .iter()
        .filter_map(|raw| match Link::from_reddit(raw) {
            Ok(link) => Some(link.submission()),
            Err(e) => {
                tracing::warn!(target: "api", error = %e, "skipping invalid submission");
                None
            }
        })
        .collect();
    Json(out)
}

async fn get_scoring(State(state): State<AppState>, Path(topic): Path<String>) -> Response {
    match state.scoring.get(&topic.to_ascii_lowercase()).await {
        Ok(Some(row)) => Json(row).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "unknown topic").into_response(),
        Err(e) => {
            tracing::error!(target: "api", error = %e, topic = %topic, "scoring lookup failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "scoring store unavailable").into_response()
        }
    }
}

async fn mark_seen(
    State(state): State<AppState>,
    Path(user): Path<String>,
    Json(body): Json<SeenIds>,
) -> Response {
    match state.seen.mark_seen(&user, &body.ids).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::error!(target: "api", error = %e, user = %user, "mark seen failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "seen store unavailable").into_response()
        }
    }
}

async fn lookup_seen(
    State(state): State<AppState>,
    Path(user): Path<String>,
    Json(body): Json<SeenIds>,
) -> Response {
    match state.seen.seen_ids(&user, &body.ids).await {
        Ok(seen) => Json(SeenLookup { seen }).into_response(),
        Err(e) => {
            tracing::error!(target: "api", error = %e, user = %user, "seen lookup failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "seen store unavailable").into_response()
        }
    }
}
