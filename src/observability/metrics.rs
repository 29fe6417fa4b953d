use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub tracking_numbers_generated_total: IntCounterVec,
    pub tracking_number_collisions_total: IntCounter,
    pub generation_failures_total: IntCounterVec,
    pub lookups_total: IntCounterVec,
    pub shipments_stored: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let tracking_numbers_generated_total = IntCounterVec::new(
            Opts::new(
                "tracking_numbers_generated_total",
                "Unique tracking numbers handed out, by carrier format",
            ),
            &["format"],
        )
        .expect("valid tracking_numbers_generated_total metric");

        let tracking_number_collisions_total = IntCounter::new(
            "tracking_number_collisions_total",
            "Generated candidates rejected because a shipment already had them",
        )
        .expect("valid tracking_number_collisions_total metric");

        let generation_failures_total = IntCounterVec::new(
            Opts::new(
                "generation_failures_total",
                "Tracking number generation requests that failed, by reason",
            ),
            &["reason"],
        )
        .expect("valid generation_failures_total metric");

        let lookups_total = IntCounterVec::new(
            Opts::new("lookups_total", "Tracking lookups by outcome"),
            &["outcome"],
        )
        .expect("valid lookups_total metric");

        let shipments_stored = IntGauge::new("shipments_stored", "Shipments currently stored")
            .expect("valid shipments_stored metric");

        registry
            .register(Box::new(tracking_numbers_generated_total.clone()))
            .expect("register tracking_numbers_generated_total");
        registry
            .register(Box::new(tracking_number_collisions_total.clone()))
            .expect("register tracking_number_collisions_total");
        registry
            .register(Box::new(generation_failures_total.clone()))
            .expect("register generation_failures_total");
        registry
            .register(Box::new(lookups_total.clone()))
            .expect("register lookups_total");
        registry
            .register(Box::new(shipments_stored.clone()))
            .expect("register shipments_stored");

        Self {
            registry,
            tracking_numbers_generated_total,
            tracking_number_collisions_total,
            generation_failures_total,
            lookups_total,
            shipments_stored,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
