//! HTTP surface for health checks and manually triggered scrape runs.
//!
//! Scrape triggers are synchronous: the response carries the run summary,
//! so a triggered run blocks the request for its full duration. The
//! orchestrator serializes runs internally, so concurrent triggers queue
//! rather than interleave.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use nilhub_scraper::{RunSummary, ScrapeOrchestrator};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub orchestrator: Arc<ScrapeOrchestrator>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/scrape-runs", post(trigger_scrape_run))
        .route(
            "/api/v1/athletes/{athlete_id}/scrape-runs",
            post(trigger_athlete_scrape_run),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match nilhub_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthData {
                status: "ok",
                database: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData {
                    status: "degraded",
                    database: "unavailable",
                }),
            )
        }
    }
}

async fn trigger_scrape_run(State(state): State<AppState>) -> Json<RunSummary> {
    tracing::info!("manual scrape run triggered");
    Json(state.orchestrator.scrape_all_profiles().await)
}

async fn trigger_athlete_scrape_run(
    State(state): State<AppState>,
    Path(athlete_id): Path<Uuid>,
) -> Json<RunSummary> {
    tracing::info!(%athlete_id, "manual athlete scrape run triggered");
    Json(state.orchestrator.scrape_profiles_for_athlete(athlete_id).await)
}
