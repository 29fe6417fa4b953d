use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::rest::generate::{carrier_name, issue_tracking_number};
use crate::error::AppError;
use crate::models::event::{ShipmentEvent, ShipmentEventKind};
use crate::models::package::Package;
use crate::models::reference::ReferenceKind;
use crate::models::shipment::{Contact, Shipment, StatusSnapshot};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/shipments", post(create_shipment).get(list_shipments))
        .route(
            "/shipments/:id",
            get(get_shipment).put(update_shipment).delete(delete_shipment),
        )
        .route("/shipments/:id/status", patch(update_status))
}

#[derive(Deserialize)]
pub struct PackageRequest {
    pub qty: i32,
    pub piece_type: Option<Uuid>,
    pub description: String,
    pub length_cm: Decimal,
    pub width_cm: Decimal,
    pub height_cm: Decimal,
    pub weight_kg: Decimal,
}

/// Body for both creating and replacing a shipment. An omitted tracking
/// number is generated from the carrier on create and kept on replace.
#[derive(Deserialize)]
pub struct ShipmentRequest {
    pub tracking_number: Option<String>,
    pub shipper: Contact,
    pub receiver: Contact,
    pub shipment_type: Option<Uuid>,
    pub courier: Option<Uuid>,
    pub weight_kg: Decimal,
    pub package_count: i32,
    pub mode: Option<Uuid>,
    pub product: Option<Uuid>,
    pub quantity: i32,
    pub total_freight: String,
    pub payment_mode: Option<Uuid>,
    pub carrier: Option<Uuid>,
    pub carrier_reference_no: Option<String>,
    pub origin: Option<Uuid>,
    pub destination: Option<Uuid>,
    pub departure_time: NaiveTime,
    pub pickup_time: NaiveTime,
    pub pickup_date: NaiveDate,
    pub expected_delivery_date: NaiveDate,
    pub comments: Option<String>,
    pub current_status: StatusSnapshot,
    #[serde(default)]
    pub packages: Vec<PackageRequest>,
}

#[derive(Deserialize, Default)]
pub struct ListQuery {
    pub q: Option<String>,
    pub carrier: Option<Uuid>,
    pub status: Option<Uuid>,
    pub shipment_type: Option<Uuid>,
    pub page: Option<usize>,
}

#[derive(Serialize)]
pub struct ShipmentDetail {
    #[serde(flatten)]
    pub shipment: Shipment,
    pub packages: Vec<Package>,
}

#[derive(Serialize)]
pub struct ShipmentPage {
    pub items: Vec<Shipment>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
}

async fn create_shipment(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ShipmentRequest>,
) -> Result<Json<ShipmentDetail>, AppError> {
    validate(&payload)?;

    let now = Utc::now();
    let requested = payload
        .tracking_number
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    let (mut shipment, packages) = build(Uuid::new_v4(), requested, now, payload);
    check_references(&state, &shipment, &packages)?;

    if shipment.tracking_number.is_empty() {
        let carrier = shipment.carrier.ok_or_else(|| {
            AppError::BadRequest("tracking_number or carrier is required".to_string())
        })?;
        let name = carrier_name(&state, carrier)?;
        shipment.tracking_number = issue_tracking_number(&state, &name)?.tracking_number;
    } else if state
        .store
        .tracking_number_exists(&shipment.tracking_number)?
    {
        warn!(
            tracking_number = %shipment.tracking_number,
            "saving shipment with a tracking number already in use"
        );
    }

    state
        .store
        .save_shipment(shipment.clone(), packages.clone())?;
    refresh_gauge(&state);
    state.publish(event(ShipmentEventKind::Created, &shipment));

    info!(
        shipment_id = %shipment.id,
        tracking_number = %shipment.tracking_number,
        "shipment created"
    );

    Ok(Json(ShipmentDetail { shipment, packages }))
}

async fn list_shipments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ShipmentPage>, AppError> {
    let carrier_names: HashMap<Uuid, String> = state
        .store
        .list_references(ReferenceKind::Carrier)?
        .into_iter()
        .map(|carrier| (carrier.id, carrier.name))
        .collect();

    let mut shipments: Vec<Shipment> = state
        .store
        .list_shipments()?
        .into_iter()
        .filter(|shipment| matches_query(shipment, &query, &carrier_names))
        .collect();
    shipments.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(paginate(
        shipments,
        query.page.unwrap_or(1),
        state.settings.page_size,
    )))
}

async fn get_shipment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ShipmentDetail>, AppError> {
    let shipment = find(&state, id)?;
    let packages = state.store.packages_for(id)?;
    Ok(Json(ShipmentDetail { shipment, packages }))
}

async fn update_shipment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ShipmentRequest>,
) -> Result<Json<ShipmentDetail>, AppError> {
    validate(&payload)?;
    let existing = find(&state, id)?;

    let tracking_number = payload
        .tracking_number
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .unwrap_or(existing.tracking_number.as_str())
        .to_string();
    let (mut shipment, packages) = build(id, tracking_number, Utc::now(), payload);
    shipment.created_at = existing.created_at;
    check_references(&state, &shipment, &packages)?;

    state
        .store
        .save_shipment(shipment.clone(), packages.clone())?;
    state.publish(event(ShipmentEventKind::Updated, &shipment));

    Ok(Json(ShipmentDetail { shipment, packages }))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(status): Json<StatusSnapshot>,
) -> Result<Json<Shipment>, AppError> {
    let mut shipment = find(&state, id)?;
    let packages = state.store.packages_for(id)?;

    shipment.current_status = status;
    shipment.updated_at = Utc::now();
    check_references(&state, &shipment, &[])?;

    state.store.save_shipment(shipment.clone(), packages)?;
    state.publish(event(ShipmentEventKind::StatusChanged, &shipment));

    info!(
        shipment_id = %shipment.id,
        status = ?shipment.current_status.status,
        "shipment status updated"
    );

    Ok(Json(shipment))
}

async fn delete_shipment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Shipment>, AppError> {
    let shipment = state
        .store
        .delete_shipment(id)?
        .ok_or_else(|| not_found(id))?;

    refresh_gauge(&state);
    state.publish(event(ShipmentEventKind::Deleted, &shipment));

    Ok(Json(shipment))
}

fn find(state: &AppState, id: Uuid) -> Result<Shipment, AppError> {
    state.store.get_shipment(id)?.ok_or_else(|| not_found(id))
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("shipment {id} not found"))
}

fn validate(payload: &ShipmentRequest) -> Result<(), AppError> {
    for (role, contact) in [("shipper", &payload.shipper), ("receiver", &payload.receiver)] {
        if contact.name.trim().is_empty() {
            return Err(AppError::BadRequest(format!("{role} name cannot be empty")));
        }
        if !contact.email.contains('@') {
            return Err(AppError::BadRequest(format!(
                "{role} email must be a valid address"
            )));
        }
    }

    if payload.package_count < 0 || payload.quantity < 0 {
        return Err(AppError::BadRequest(
            "package_count and quantity must be >= 0".to_string(),
        ));
    }

    let measures = payload.packages.iter().flat_map(|package| {
        [
            package.length_cm,
            package.width_cm,
            package.height_cm,
            package.weight_kg,
        ]
    });
    if std::iter::once(payload.weight_kg)
        .chain(measures)
        .any(|value| value.is_sign_negative())
    {
        return Err(AppError::BadRequest(
            "weights and dimensions must be >= 0".to_string(),
        ));
    }

    if payload.packages.iter().any(|package| package.qty < 0) {
        return Err(AppError::BadRequest("package qty must be >= 0".to_string()));
    }

    Ok(())
}

fn check_references(
    state: &AppState,
    shipment: &Shipment,
    packages: &[Package],
) -> Result<(), AppError> {
    let piece_types = packages
        .iter()
        .filter_map(|package| package.piece_type)
        .map(|id| (ReferenceKind::PieceType, id));

    for (kind, id) in shipment.references().into_iter().chain(piece_types) {
        if state.store.get_reference(kind, id)?.is_none() {
            return Err(AppError::BadRequest(format!("{kind} {id} not found")));
        }
    }
    Ok(())
}

fn build(
    id: Uuid,
    tracking_number: String,
    now: DateTime<Utc>,
    payload: ShipmentRequest,
) -> (Shipment, Vec<Package>) {
    let packages = payload
        .packages
        .into_iter()
        .map(|package| Package {
            id: Uuid::new_v4(),
            shipment_id: id,
            qty: package.qty,
            piece_type: package.piece_type,
            description: package.description,
            length_cm: package.length_cm,
            width_cm: package.width_cm,
            height_cm: package.height_cm,
            weight_kg: package.weight_kg,
        })
        .collect();

    let shipment = Shipment {
        id,
        tracking_number,
        shipper: payload.shipper,
        receiver: payload.receiver,
        shipment_type: payload.shipment_type,
        courier: payload.courier,
        weight_kg: payload.weight_kg,
        package_count: payload.package_count,
        mode: payload.mode,
        product: payload.product,
        quantity: payload.quantity,
        total_freight: payload.total_freight,
        payment_mode: payload.payment_mode,
        carrier: payload.carrier,
        carrier_reference_no: payload.carrier_reference_no,
        origin: payload.origin,
        destination: payload.destination,
        departure_time: payload.departure_time,
        pickup_time: payload.pickup_time,
        pickup_date: payload.pickup_date,
        expected_delivery_date: payload.expected_delivery_date,
        comments: payload.comments,
        current_status: payload.current_status,
        created_at: now,
        updated_at: now,
    };

    (shipment, packages)
}

fn matches_query(
    shipment: &Shipment,
    query: &ListQuery,
    carrier_names: &HashMap<Uuid, String>,
) -> bool {
    if query.carrier.is_some() && shipment.carrier != query.carrier {
        return false;
    }
    if query.status.is_some() && shipment.current_status.status != query.status {
        return false;
    }
    if query.shipment_type.is_some() && shipment.shipment_type != query.shipment_type {
        return false;
    }

    let Some(needle) = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
    else {
        return true;
    };
    let needle = needle.to_lowercase();

    let carrier = shipment
        .carrier
        .and_then(|id| carrier_names.get(&id))
        .map(String::as_str)
        .unwrap_or_default();

    [
        shipment.tracking_number.as_str(),
        shipment.shipper.name.as_str(),
        shipment.receiver.name.as_str(),
        carrier,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
}

fn paginate(shipments: Vec<Shipment>, page: usize, per_page: usize) -> ShipmentPage {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let total = shipments.len();
    let items = shipments
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();

    ShipmentPage {
        items,
        page,
        per_page,
        total,
    }
}

fn refresh_gauge(state: &AppState) {
    match state.store.stats() {
        Ok(stats) => state.metrics.shipments_stored.set(stats.shipments as i64),
        Err(err) => warn!(error = %err, "failed to read store stats"),
    }
}

fn event(kind: ShipmentEventKind, shipment: &Shipment) -> ShipmentEvent {
    ShipmentEvent {
        kind,
        shipment_id: shipment.id,
        tracking_number: shipment.tracking_number.clone(),
        status: shipment.current_status.status,
        at: Utc::now(),
    }
}
