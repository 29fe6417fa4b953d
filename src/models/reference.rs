use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The named lists staff pick from when filling in a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceKind {
    ShipmentType,
    Courier,
    Mode,
    Product,
    PaymentMode,
    Carrier,
    Country,
    StatusType,
    PieceType,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReferenceKind::ShipmentType => "shipment type",
            ReferenceKind::Courier => "courier",
            ReferenceKind::Mode => "mode",
            ReferenceKind::Product => "product",
            ReferenceKind::PaymentMode => "payment mode",
            ReferenceKind::Carrier => "carrier",
            ReferenceKind::Country => "country",
            ReferenceKind::StatusType => "status type",
            ReferenceKind::PieceType => "piece type",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferenceEntry {
    pub id: Uuid,
    pub kind: ReferenceKind,
    pub name: String,
}
