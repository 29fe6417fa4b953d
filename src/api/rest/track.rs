use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::Method;
use axum::routing::get;
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::models::package::Package;
use crate::models::shipment::Shipment;
use crate::state::AppState;
use crate::tracking::lookup;

/// Public lookup, reachable from any origin.
pub fn router() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST]);

    Router::new()
        .route("/track", get(track_by_query).post(track_by_form))
        .layer(cors)
}

#[derive(Deserialize)]
pub struct TrackRequest {
    #[serde(default)]
    pub tracking_number: String,
}

#[derive(Serialize)]
pub struct TrackResponse {
    pub tracking_number: String,
    pub shipment: Option<Shipment>,
    pub packages: Vec<Package>,
}

async fn track_by_query(
    State(state): State<Arc<AppState>>,
    Query(request): Query<TrackRequest>,
) -> Json<TrackResponse> {
    Json(track(&state, &request.tracking_number))
}

async fn track_by_form(
    State(state): State<Arc<AppState>>,
    Form(request): Form<TrackRequest>,
) -> Json<TrackResponse> {
    Json(track(&state, &request.tracking_number))
}

fn track(state: &AppState, raw: &str) -> TrackResponse {
    let result = lookup(state.store.as_ref(), raw);
    state
        .metrics
        .lookups_total
        .with_label_values(&[result.outcome.as_str()])
        .inc();

    TrackResponse {
        tracking_number: raw.trim().to_string(),
        shipment: result.shipment,
        packages: result.packages,
    }
}
