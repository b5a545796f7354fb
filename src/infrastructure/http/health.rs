//! Liveness/readiness endpoints.
//!
//! Grounded on the teacher's `platform::telemetry::telemetry_service`
//! (a bare `axum::Router` serving a single metrics route). This crate
//! does not expose a business API over HTTP — everything else named in
//! `[MODULE] HTTP API Surface` is served by an external gateway that
//! calls into these services directly — so the router here stays small.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use sqlx::PgPool;

#[derive(Clone)]
struct HealthState {
    pool: PgPool,
}

#[derive(Serialize)]
struct LiveResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: &'static str,
    database: &'static str,
}

pub fn health_router(pool: PgPool) -> Router {
    let state = Arc::new(HealthState { pool });
    Router::new()
        .route("/health/live", get(live))
        .route("/health/ready", get(ready))
        .route("/health", get(ready))
        .with_state(state)
}

async fn live() -> Json<LiveResponse> {
    Json(LiveResponse { status: "ok" })
}

async fn ready(State(state): State<Arc<HealthState>>) -> (StatusCode, Json<ReadyResponse>) {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(ReadyResponse {
                status: "ok",
                database: "reachable",
            }),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse {
                status: "degraded",
                database: "unreachable",
            }),
        ),
    }
}
