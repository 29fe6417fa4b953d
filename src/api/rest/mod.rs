pub mod generate;
pub mod references;
pub mod shipments;
pub mod track;
pub mod ws;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;
use tower_http::services::ServeDir;

use crate::error::AppError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.settings.static_dir);

    Router::new()
        .merge(track::router())
        .merge(generate::router())
        .merge(shipments::router())
        .merge(references::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
        .fallback_service(assets)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    shipments: usize,
    packages: usize,
    references: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, AppError> {
    let stats = state.store.stats()?;

    Ok(Json(HealthResponse {
        status: "ok",
        shipments: stats.shipments,
        packages: stats.packages,
        references: stats.references,
    }))
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}
