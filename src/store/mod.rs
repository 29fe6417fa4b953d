pub mod memory;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::package::Package;
use crate::models::reference::{ReferenceEntry, ReferenceKind};
use crate::models::shipment::Shipment;

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{count} shipments share tracking number {tracking_number}")]
    AmbiguousTrackingNumber {
        tracking_number: String,
        count: usize,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct StoreStats {
    pub shipments: usize,
    pub packages: usize,
    pub references: usize,
}

/// Persistence for shipments, their packages and the reference lists.
///
/// Tracking numbers are not a key: several shipments may carry the same code,
/// and callers that need uniqueness check with `tracking_number_exists` first.
pub trait ShipmentStore: Send + Sync {
    /// Inserts or replaces a shipment. Its previous packages are replaced by
    /// `packages`.
    fn save_shipment(&self, shipment: Shipment, packages: Vec<Package>) -> Result<(), StoreError>;

    fn get_shipment(&self, id: Uuid) -> Result<Option<Shipment>, StoreError>;

    /// Removes a shipment together with its packages.
    fn delete_shipment(&self, id: Uuid) -> Result<Option<Shipment>, StoreError>;

    fn list_shipments(&self) -> Result<Vec<Shipment>, StoreError>;

    /// Exact, case-sensitive match. More than one match is an error.
    fn find_by_tracking_number(&self, tracking_number: &str)
    -> Result<Option<Shipment>, StoreError>;

    fn packages_for(&self, shipment_id: Uuid) -> Result<Vec<Package>, StoreError>;

    fn tracking_number_exists(&self, tracking_number: &str) -> Result<bool, StoreError>;

    fn save_reference(&self, entry: ReferenceEntry) -> Result<(), StoreError>;

    fn get_reference(
        &self,
        kind: ReferenceKind,
        id: Uuid,
    ) -> Result<Option<ReferenceEntry>, StoreError>;

    fn list_references(&self, kind: ReferenceKind) -> Result<Vec<ReferenceEntry>, StoreError>;

    /// Removes a reference entry and clears every shipment or package field
    /// that pointed at it.
    fn delete_reference(&self, kind: ReferenceKind, id: Uuid) -> Result<bool, StoreError>;

    fn stats(&self) -> Result<StoreStats, StoreError>;
}
