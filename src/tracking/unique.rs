use rand::RngCore;
use thiserror::Error;
use tracing::{debug, warn};

use crate::store::{ShipmentStore, StoreError};
use crate::tracking::generator::{classify, generate, CarrierFormat};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("carrier information is required")]
    MissingCarrier,

    #[error("no unique tracking number after {attempts} attempts (last candidate {last_candidate})")]
    Exhausted {
        attempts: u32,
        last_candidate: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniqueCode {
    pub tracking_number: String,
    pub format: CarrierFormat,
    pub attempts: u32,
}

/// Generates tracking numbers until one is not already on a shipment, giving
/// up after `max_attempts` candidates.
///
/// The check and the later insert are not atomic; two concurrent callers can
/// both receive the same code.
pub fn generate_unique(
    store: &dyn ShipmentStore,
    carrier_name: &str,
    rng: &mut dyn RngCore,
    max_attempts: u32,
) -> Result<UniqueCode, GenerateError> {
    if carrier_name.trim().is_empty() {
        return Err(GenerateError::MissingCarrier);
    }

    let format = classify(carrier_name);
    let max_attempts = max_attempts.max(1);
    let mut last_candidate = String::new();

    for attempt in 1..=max_attempts {
        let candidate = generate(carrier_name, rng);
        if !store.tracking_number_exists(&candidate)? {
            return Ok(UniqueCode {
                tracking_number: candidate,
                format,
                attempts: attempt,
            });
        }

        debug!(attempt, candidate = %candidate, "tracking number collision");
        last_candidate = candidate;
    }

    warn!(
        carrier = carrier_name,
        attempts = max_attempts,
        "gave up generating a unique tracking number"
    );

    Err(GenerateError::Exhausted {
        attempts: max_attempts,
        last_candidate,
    })
}

#[cfg(test)]
mod tests {
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::{generate_unique, GenerateError};
    use crate::models::shipment::fixtures::shipment;
    use crate::store::testing::FakeStore;
    use crate::store::{MemoryStore, ShipmentStore};
    use crate::tracking::generator::generate;

    #[test]
    fn collision_with_first_candidate_is_retried() {
        let store = MemoryStore::new();
        let first = generate("UPS", &mut StdRng::seed_from_u64(9));
        store.save_shipment(shipment(&first), Vec::new()).unwrap();

        let code = generate_unique(&store, "UPS", &mut StdRng::seed_from_u64(9), 5).unwrap();

        assert_ne!(code.tracking_number, first);
        assert_eq!(code.attempts, 2);
        assert!(!store.tracking_number_exists(&code.tracking_number).unwrap());
    }

    #[test]
    fn first_free_candidate_is_returned_immediately() {
        let store = MemoryStore::new();
        let code = generate_unique(&store, "DHL", &mut StdRng::seed_from_u64(1), 5).unwrap();
        assert_eq!(code.attempts, 1);
        assert_eq!(code.format.as_str(), "dhl");
    }

    #[test]
    fn exhaustion_stops_after_max_attempts() {
        let store = FakeStore::taken();
        let err = generate_unique(&store, "FedEx", &mut StdRng::seed_from_u64(2), 5).unwrap_err();

        assert_eq!(store.calls(), 5);
        match err {
            GenerateError::Exhausted {
                attempts,
                last_candidate,
            } => {
                assert_eq!(attempts, 5);
                assert!(!last_candidate.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn deterministic_source_exhausts_against_its_own_output() {
        let store = MemoryStore::new();
        let repeated = generate("UPS", &mut StepRng::new(0, 0));
        store.save_shipment(shipment(&repeated), Vec::new()).unwrap();

        let err = generate_unique(&store, "UPS", &mut StepRng::new(0, 0), 3).unwrap_err();
        assert!(matches!(err, GenerateError::Exhausted { attempts: 3, .. }));
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let store = FakeStore::taken();
        let _ = generate_unique(&store, "UPS", &mut StdRng::seed_from_u64(4), 0);
        assert_eq!(store.calls(), 1);
    }

    #[test]
    fn blank_carrier_is_rejected_without_store_access() {
        let store = FakeStore::taken();
        let err = generate_unique(&store, "  ", &mut StdRng::seed_from_u64(4), 5).unwrap_err();
        assert!(matches!(err, GenerateError::MissingCarrier));
        assert_eq!(store.calls(), 0);
    }

    #[test]
    fn store_faults_are_surfaced() {
        let store = FakeStore::failing();
        let err = generate_unique(&store, "UPS", &mut StdRng::seed_from_u64(4), 5).unwrap_err();
        assert!(matches!(err, GenerateError::Store(_)));
        assert_eq!(store.calls(), 1);
    }
}
