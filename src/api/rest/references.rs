use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::reference::{ReferenceEntry, ReferenceKind};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/references/:kind", post(create_reference).get(list_references))
        .route("/references/:kind/:id", delete(delete_reference))
}

#[derive(Deserialize)]
pub struct CreateReferenceRequest {
    pub name: String,
}

async fn create_reference(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<ReferenceKind>,
    Json(payload): Json<CreateReferenceRequest>,
) -> Result<Json<ReferenceEntry>, AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    let entry = ReferenceEntry {
        id: Uuid::new_v4(),
        kind,
        name: name.to_string(),
    };

    state.store.save_reference(entry.clone())?;
    Ok(Json(entry))
}

async fn list_references(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<ReferenceKind>,
) -> Result<Json<Vec<ReferenceEntry>>, AppError> {
    Ok(Json(state.store.list_references(kind)?))
}

/// Shipments pointing at the entry keep existing with that field cleared.
async fn delete_reference(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(ReferenceKind, Uuid)>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_reference(kind, id)? {
        return Err(AppError::NotFound(format!("{kind} {id} not found")));
    }

    info!(%kind, %id, "reference entry deleted");
    Ok(StatusCode::NO_CONTENT)
}
