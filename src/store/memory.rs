use dashmap::DashMap;
use uuid::Uuid;

use crate::models::package::Package;
use crate::models::reference::{ReferenceEntry, ReferenceKind};
use crate::models::shipment::Shipment;
use crate::store::{ShipmentStore, StoreError, StoreStats};

#[derive(Default)]
pub struct MemoryStore {
    shipments: DashMap<Uuid, Shipment>,
    packages: DashMap<Uuid, Vec<Package>>,
    references: DashMap<Uuid, ReferenceEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShipmentStore for MemoryStore {
    fn save_shipment(&self, shipment: Shipment, packages: Vec<Package>) -> Result<(), StoreError> {
        let shipment_id = shipment.id;
        let packages = packages
            .into_iter()
            .map(|mut package| {
                package.shipment_id = shipment_id;
                package
            })
            .collect();

        self.shipments.insert(shipment_id, shipment);
        self.packages.insert(shipment_id, packages);
        Ok(())
    }

    fn get_shipment(&self, id: Uuid) -> Result<Option<Shipment>, StoreError> {
        Ok(self.shipments.get(&id).map(|entry| entry.value().clone()))
    }

    fn delete_shipment(&self, id: Uuid) -> Result<Option<Shipment>, StoreError> {
        let removed = self.shipments.remove(&id).map(|(_, shipment)| shipment);
        self.packages.remove(&id);
        Ok(removed)
    }

    fn list_shipments(&self) -> Result<Vec<Shipment>, StoreError> {
        Ok(self
            .shipments
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn find_by_tracking_number(
        &self,
        tracking_number: &str,
    ) -> Result<Option<Shipment>, StoreError> {
        let mut matches: Vec<Shipment> = self
            .shipments
            .iter()
            .filter(|entry| entry.value().tracking_number == tracking_number)
            .map(|entry| entry.value().clone())
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            count => Err(StoreError::AmbiguousTrackingNumber {
                tracking_number: tracking_number.to_string(),
                count,
            }),
        }
    }

    fn packages_for(&self, shipment_id: Uuid) -> Result<Vec<Package>, StoreError> {
        Ok(self
            .packages
            .get(&shipment_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    fn tracking_number_exists(&self, tracking_number: &str) -> Result<bool, StoreError> {
        Ok(self
            .shipments
            .iter()
            .any(|entry| entry.value().tracking_number == tracking_number))
    }

    fn save_reference(&self, entry: ReferenceEntry) -> Result<(), StoreError> {
        self.references.insert(entry.id, entry);
        Ok(())
    }

    fn get_reference(
        &self,
        kind: ReferenceKind,
        id: Uuid,
    ) -> Result<Option<ReferenceEntry>, StoreError> {
        Ok(self
            .references
            .get(&id)
            .filter(|entry| entry.value().kind == kind)
            .map(|entry| entry.value().clone()))
    }

    fn list_references(&self, kind: ReferenceKind) -> Result<Vec<ReferenceEntry>, StoreError> {
        let mut entries: Vec<ReferenceEntry> = self
            .references
            .iter()
            .filter(|entry| entry.value().kind == kind)
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn delete_reference(&self, kind: ReferenceKind, id: Uuid) -> Result<bool, StoreError> {
        if self
            .references
            .remove_if(&id, |_, entry| entry.kind == kind)
            .is_none()
        {
            return Ok(false);
        }

        for mut shipment in self.shipments.iter_mut() {
            shipment.clear_reference(kind, id);
        }

        if kind == ReferenceKind::PieceType {
            for mut packages in self.packages.iter_mut() {
                for package in packages.iter_mut() {
                    if package.piece_type == Some(id) {
                        package.piece_type = None;
                    }
                }
            }
        }

        Ok(true)
    }

    fn stats(&self) -> Result<StoreStats, StoreError> {
        Ok(StoreStats {
            shipments: self.shipments.len(),
            packages: self.packages.iter().map(|entry| entry.value().len()).sum(),
            references: self.references.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::MemoryStore;
    use crate::models::package::Package;
    use crate::models::reference::{ReferenceEntry, ReferenceKind};
    use crate::models::shipment::fixtures::shipment;
    use crate::store::{ShipmentStore, StoreError};

    fn package(piece_type: Option<Uuid>) -> Package {
        Package {
            id: Uuid::new_v4(),
            shipment_id: Uuid::nil(),
            qty: 2,
            piece_type,
            description: "boxes".to_string(),
            length_cm: Decimal::new(30, 0),
            width_cm: Decimal::new(20, 0),
            height_cm: Decimal::new(10, 0),
            weight_kg: Decimal::new(45, 1),
        }
    }

    fn reference(kind: ReferenceKind, name: &str) -> ReferenceEntry {
        ReferenceEntry {
            id: Uuid::new_v4(),
            kind,
            name: name.to_string(),
        }
    }

    #[test]
    fn saved_packages_are_attached_to_their_shipment() {
        let store = MemoryStore::new();
        let s = shipment("1Z0000000000000001");
        store
            .save_shipment(s.clone(), vec![package(None), package(None)])
            .unwrap();

        let packages = store.packages_for(s.id).unwrap();
        assert_eq!(packages.len(), 2);
        assert!(packages.iter().all(|p| p.shipment_id == s.id));
    }

    #[test]
    fn tracking_number_match_is_exact_and_case_sensitive() {
        let store = MemoryStore::new();
        store.save_shipment(shipment("ABC123"), Vec::new()).unwrap();

        assert!(store.find_by_tracking_number("ABC123").unwrap().is_some());
        assert!(store.find_by_tracking_number("abc123").unwrap().is_none());
        assert!(store.find_by_tracking_number("ABC12").unwrap().is_none());
        assert!(store.tracking_number_exists("ABC123").unwrap());
        assert!(!store.tracking_number_exists("ABC1234").unwrap());
    }

    #[test]
    fn duplicate_tracking_numbers_are_stored_but_ambiguous() {
        let store = MemoryStore::new();
        store.save_shipment(shipment("DUP"), Vec::new()).unwrap();
        store.save_shipment(shipment("DUP"), Vec::new()).unwrap();

        let err = store.find_by_tracking_number("DUP").unwrap_err();
        assert!(matches!(
            err,
            StoreError::AmbiguousTrackingNumber { count: 2, .. }
        ));
    }

    #[test]
    fn deleting_a_shipment_cascades_to_packages() {
        let store = MemoryStore::new();
        let s = shipment("ABC123");
        store.save_shipment(s.clone(), vec![package(None)]).unwrap();

        let removed = store.delete_shipment(s.id).unwrap();
        assert_eq!(removed.map(|r| r.id), Some(s.id));
        assert!(store.packages_for(s.id).unwrap().is_empty());
        assert_eq!(store.stats().unwrap().packages, 0);
    }

    #[test]
    fn deleting_a_reference_clears_pointers_but_keeps_shipments() {
        let store = MemoryStore::new();
        let carrier = reference(ReferenceKind::Carrier, "UPS");
        let piece = reference(ReferenceKind::PieceType, "Pallet");
        store.save_reference(carrier.clone()).unwrap();
        store.save_reference(piece.clone()).unwrap();

        let mut s = shipment("1Z0000000000000001");
        s.carrier = Some(carrier.id);
        store
            .save_shipment(s.clone(), vec![package(Some(piece.id))])
            .unwrap();

        assert!(store.delete_reference(ReferenceKind::Carrier, carrier.id).unwrap());
        assert!(store.delete_reference(ReferenceKind::PieceType, piece.id).unwrap());

        let kept = store.get_shipment(s.id).unwrap().unwrap();
        assert!(kept.carrier.is_none());
        assert!(store.packages_for(s.id).unwrap()[0].piece_type.is_none());
    }

    #[test]
    fn references_are_scoped_by_kind() {
        let store = MemoryStore::new();
        let carrier = reference(ReferenceKind::Carrier, "DHL");
        store.save_reference(carrier.clone()).unwrap();

        assert!(store
            .get_reference(ReferenceKind::Country, carrier.id)
            .unwrap()
            .is_none());
        assert!(!store
            .delete_reference(ReferenceKind::Country, carrier.id)
            .unwrap());
        assert_eq!(store.list_references(ReferenceKind::Carrier).unwrap().len(), 1);
    }
}
