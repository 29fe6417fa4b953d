use tracing::warn;

use crate::models::package::Package;
use crate::models::shipment::Shipment;
use crate::store::{ShipmentStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Empty,
    Found,
    NotFound,
    Fault,
}

impl LookupOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupOutcome::Empty => "empty",
            LookupOutcome::Found => "found",
            LookupOutcome::NotFound => "not_found",
            LookupOutcome::Fault => "fault",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrackingLookup {
    pub shipment: Option<Shipment>,
    pub packages: Vec<Package>,
    pub outcome: LookupOutcome,
}

impl TrackingLookup {
    fn absent(outcome: LookupOutcome) -> Self {
        Self {
            shipment: None,
            packages: Vec::new(),
            outcome,
        }
    }
}

/// Finds the shipment carrying exactly this tracking number, with its
/// packages.
///
/// Store faults are logged and reported as "not found"; callers never see
/// them.
pub fn lookup(store: &dyn ShipmentStore, tracking_number: &str) -> TrackingLookup {
    let tracking_number = tracking_number.trim();
    if tracking_number.is_empty() {
        return TrackingLookup::absent(LookupOutcome::Empty);
    }

    match fetch(store, tracking_number) {
        Ok(Some((shipment, packages))) => TrackingLookup {
            shipment: Some(shipment),
            packages,
            outcome: LookupOutcome::Found,
        },
        Ok(None) => TrackingLookup::absent(LookupOutcome::NotFound),
        Err(err) => {
            warn!(error = %err, tracking_number, "shipment lookup failed");
            TrackingLookup::absent(LookupOutcome::Fault)
        }
    }
}

fn fetch(
    store: &dyn ShipmentStore,
    tracking_number: &str,
) -> Result<Option<(Shipment, Vec<Package>)>, StoreError> {
    let Some(shipment) = store.find_by_tracking_number(tracking_number)? else {
        return Ok(None);
    };
    let packages = store.packages_for(shipment.id)?;
    Ok(Some((shipment, packages)))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::{lookup, LookupOutcome};
    use crate::models::package::Package;
    use crate::models::shipment::fixtures::shipment;
    use crate::store::testing::FakeStore;
    use crate::store::{MemoryStore, ShipmentStore};

    fn package(description: &str) -> Package {
        Package {
            id: Uuid::new_v4(),
            shipment_id: Uuid::nil(),
            qty: 1,
            piece_type: None,
            description: description.to_string(),
            length_cm: Decimal::ONE,
            width_cm: Decimal::ONE,
            height_cm: Decimal::ONE,
            weight_kg: Decimal::ONE,
        }
    }

    #[test]
    fn empty_input_skips_the_store() {
        let store = FakeStore::failing();
        for input in ["", "   ", "\t\n"] {
            let result = lookup(&store, input);
            assert!(result.shipment.is_none());
            assert!(result.packages.is_empty());
            assert_eq!(result.outcome, LookupOutcome::Empty);
        }
        assert_eq!(store.calls(), 0);
    }

    #[test]
    fn unknown_tracking_number_is_absent() {
        let store = MemoryStore::new();
        store.save_shipment(shipment("XYZ999"), Vec::new()).unwrap();

        let result = lookup(&store, "ABC123");
        assert!(result.shipment.is_none());
        assert!(result.packages.is_empty());
        assert_eq!(result.outcome, LookupOutcome::NotFound);
    }

    #[test]
    fn match_returns_shipment_and_all_packages() {
        let store = MemoryStore::new();
        let s = shipment("ABC123");
        store
            .save_shipment(s.clone(), vec![package("crate"), package("envelope")])
            .unwrap();
        store.save_shipment(shipment("OTHER"), vec![package("x")]).unwrap();

        let result = lookup(&store, "  ABC123  ");
        assert_eq!(result.shipment.map(|found| found.id), Some(s.id));

        let mut descriptions: Vec<_> = result.packages.iter().map(|p| p.description.as_str()).collect();
        descriptions.sort();
        assert_eq!(descriptions, ["crate", "envelope"]);
    }

    #[test]
    fn match_is_case_sensitive_and_not_partial() {
        let store = MemoryStore::new();
        store.save_shipment(shipment("ABC123"), Vec::new()).unwrap();

        assert!(lookup(&store, "abc123").shipment.is_none());
        assert!(lookup(&store, "ABC").shipment.is_none());
    }

    #[test]
    fn store_faults_look_like_not_found() {
        let store = FakeStore::failing();
        let result = lookup(&store, "ABC123");
        assert!(result.shipment.is_none());
        assert!(result.packages.is_empty());
        assert_eq!(result.outcome, LookupOutcome::Fault);
        assert_eq!(store.calls(), 1);
    }

    #[test]
    fn ambiguous_tracking_number_is_absorbed() {
        let store = MemoryStore::new();
        store.save_shipment(shipment("DUP"), Vec::new()).unwrap();
        store.save_shipment(shipment("DUP"), Vec::new()).unwrap();

        let result = lookup(&store, "DUP");
        assert!(result.shipment.is_none());
        assert_eq!(result.outcome, LookupOutcome::Fault);
    }
}
