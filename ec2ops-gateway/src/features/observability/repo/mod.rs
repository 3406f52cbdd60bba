use prometheus::{
    opts, CounterVec, Encoder, HistogramOpts, HistogramVec, IntCounterVec, Registry, TextEncoder,
};

/// Prometheus collectors for the gateway, held in a private registry.
pub struct ObservabilityRepository {
    registry: Registry,
    commands_total: IntCounterVec,
    api_request_total: CounterVec,
    api_request_latency_seconds: HistogramVec,
    deferred_delivery_total: IntCounterVec,
}

impl ObservabilityRepository {
    pub fn new() -> Result<Self, String> {
        let registry = Registry::new();

        let commands_total = IntCounterVec::new(
            opts!("ec2ops_commands_total", "Dispatched commands by route"),
            &["kind"],
        )
        .map_err(|e| e.to_string())?;
        let api_request_total = CounterVec::new(
            opts!("ec2ops_api_request_total", "Inbound HTTP request total"),
            &["endpoint", "status"],
        )
        .map_err(|e| e.to_string())?;
        let api_request_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "ec2ops_api_request_latency_seconds",
                "Inbound HTTP request latency (seconds)",
            ),
            &["endpoint"],
        )
        .map_err(|e| e.to_string())?;
        let deferred_delivery_total = IntCounterVec::new(
            opts!(
                "ec2ops_deferred_delivery_total",
                "Callback deliveries by outcome"
            ),
            &["outcome"],
        )
        .map_err(|e| e.to_string())?;

        registry
            .register(Box::new(commands_total.clone()))
            .map_err(|e| e.to_string())?;
        registry
            .register(Box::new(api_request_total.clone()))
            .map_err(|e| e.to_string())?;
        registry
            .register(Box::new(api_request_latency_seconds.clone()))
            .map_err(|e| e.to_string())?;
        registry
            .register(Box::new(deferred_delivery_total.clone()))
            .map_err(|e| e.to_string())?;

        Ok(Self {
            registry,
            commands_total,
            api_request_total,
            api_request_latency_seconds,
            deferred_delivery_total,
        })
    }

    pub fn inc_commands_total(&self, kind: &str) {
        self.commands_total.with_label_values(&[kind]).inc();
    }

    pub fn observe_api_request(&self, endpoint: &str, status: &str, seconds: f64) {
        self.api_request_total
            .with_label_values(&[endpoint, status])
            .inc();
        self.api_request_latency_seconds
            .with_label_values(&[endpoint])
            .observe(seconds);
    }

    pub fn inc_deferred_delivery_total(&self, outcome: &str) {
        self.deferred_delivery_total
            .with_label_values(&[outcome])
            .inc();
    }

    pub fn commands_total(&self, kind: &str) -> u64 {
        self.commands_total.with_label_values(&[kind]).get()
    }

    pub fn deferred_delivery_total(&self, outcome: &str) -> u64 {
        self.deferred_delivery_total
            .with_label_values(&[outcome])
            .get()
    }

    pub fn render_metrics(&self) -> Result<String, String> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        encoder
            .encode(&families, &mut buffer)
            .map_err(|e| e.to_string())?;
        String::from_utf8(buffer).map_err(|e| e.to_string())
    }
}
