use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ShipmentEventKind {
    Created,
    Updated,
    StatusChanged,
    Deleted,
}

/// Pushed to websocket subscribers whenever staff change a shipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentEvent {
    pub kind: ShipmentEventKind,
    pub shipment_id: Uuid,
    pub tracking_number: String,
    pub status: Option<Uuid>,
    pub at: DateTime<Utc>,
}
