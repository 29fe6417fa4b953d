use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::reference::ReferenceKind;
use crate::state::AppState;
use crate::tracking::{generate_unique, CarrierFormat, GenerateError, UniqueCode};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/admin/generate-tracking", get(generate_tracking))
}

#[derive(Deserialize)]
pub struct GenerateRequest {
    pub carrier_id: Option<String>,
    pub carrier_name: Option<String>,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub tracking_number: String,
    pub format: CarrierFormat,
    pub attempts: u32,
}

async fn generate_tracking(
    State(state): State<Arc<AppState>>,
    Query(request): Query<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let carrier_name = resolve_carrier_name(&state, &request).inspect_err(|_| {
        state
            .metrics
            .generation_failures_total
            .with_label_values(&["carrier"])
            .inc();
    })?;

    let code = issue_tracking_number(&state, &carrier_name)?;

    Ok(Json(GenerateResponse {
        success: true,
        tracking_number: code.tracking_number,
        format: code.format,
        attempts: code.attempts,
    }))
}

/// A name given directly wins over a carrier id.
fn resolve_carrier_name(state: &AppState, request: &GenerateRequest) -> Result<String, AppError> {
    let name = non_blank(request.carrier_name.as_deref());
    let id = non_blank(request.carrier_id.as_deref());

    match (name, id) {
        (Some(name), _) => Ok(name.to_string()),
        (None, Some(raw_id)) => {
            let id = Uuid::parse_str(raw_id)
                .map_err(|_| AppError::NotFound("carrier not found".to_string()))?;
            carrier_name(state, id)
        }
        (None, None) => Err(AppError::BadRequest(
            "carrier information is required".to_string(),
        )),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

pub(crate) fn carrier_name(state: &AppState, id: Uuid) -> Result<String, AppError> {
    state
        .store
        .get_reference(ReferenceKind::Carrier, id)?
        .map(|carrier| carrier.name)
        .ok_or_else(|| AppError::NotFound("carrier not found".to_string()))
}

/// Generates a tracking number no stored shipment carries yet, recording the
/// outcome in the metrics.
pub(crate) fn issue_tracking_number(
    state: &AppState,
    carrier_name: &str,
) -> Result<UniqueCode, AppError> {
    let result = {
        let mut rng = state.rng()?;
        generate_unique(
            state.store.as_ref(),
            carrier_name,
            &mut *rng,
            state.settings.max_generate_attempts,
        )
    };

    let metrics = &state.metrics;
    match &result {
        Ok(code) => {
            metrics
                .tracking_number_collisions_total
                .inc_by(u64::from(code.attempts - 1));
            metrics
                .tracking_numbers_generated_total
                .with_label_values(&[code.format.as_str()])
                .inc();
            info!(
                carrier = carrier_name,
                tracking_number = %code.tracking_number,
                attempts = code.attempts,
                "tracking number issued"
            );
        }
        Err(err) => {
            let reason = match err {
                GenerateError::MissingCarrier => "carrier",
                GenerateError::Exhausted { attempts, .. } => {
                    metrics
                        .tracking_number_collisions_total
                        .inc_by(u64::from(*attempts));
                    "exhausted"
                }
                GenerateError::Store(_) => "store",
            };
            metrics
                .generation_failures_total
                .with_label_values(&[reason])
                .inc();
        }
    }

    result.map_err(AppError::from)
}
