use std::sync::{Arc, Mutex, MutexGuard};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::broadcast;

use crate::config::ServiceSettings;
use crate::error::AppError;
use crate::models::event::ShipmentEvent;
use crate::observability::metrics::Metrics;
use crate::store::{MemoryStore, ShipmentStore};

pub struct AppState {
    pub store: Arc<dyn ShipmentStore>,
    pub settings: ServiceSettings,
    pub shipment_events_tx: broadcast::Sender<ShipmentEvent>,
    pub metrics: Metrics,
    rng: Mutex<StdRng>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ShipmentStore>,
        settings: ServiceSettings,
        event_buffer_size: usize,
    ) -> Self {
        let (shipment_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            store,
            settings,
            shipment_events_tx,
            metrics: Metrics::new(),
            rng: Mutex::new(rng),
        }
    }

    pub fn in_memory(settings: ServiceSettings, event_buffer_size: usize) -> Self {
        Self::new(Arc::new(MemoryStore::new()), settings, event_buffer_size)
    }

    /// The tracking-number RNG. Never hold the guard across an `.await`.
    pub fn rng(&self) -> Result<MutexGuard<'_, StdRng>, AppError> {
        self.rng
            .lock()
            .map_err(|_| AppError::Internal("tracking rng lock poisoned".to_string()))
    }

    pub fn publish(&self, event: ShipmentEvent) {
        let _ = self.shipment_events_tx.send(event);
    }
}
