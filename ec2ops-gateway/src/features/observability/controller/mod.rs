use crate::features::observability::repo::ObservabilityRepository;
use crate::features::observability::service::ObservabilityService;
use std::sync::Arc;

/// Metrics handle shared by the dispatcher, delivery and HTTP layers.
pub struct ObservabilityController {
    service: ObservabilityService,
}

impl ObservabilityController {
    pub fn new(service: ObservabilityService) -> Self {
        Self { service }
    }

    /// Controller over a fresh registry.
    pub fn with_registry() -> Result<Arc<Self>, String> {
        let repo = Arc::new(ObservabilityRepository::new()?);
        Ok(Arc::new(Self::new(ObservabilityService::new(repo))))
    }

    pub fn record_command(&self, kind: &str) {
        self.service.record_command(kind);
    }

    pub fn record_api_request(&self, endpoint: &str, status: u16, seconds: f64) {
        self.service.record_api_request(endpoint, status, seconds);
    }

    pub fn record_delivery(&self, delivered: bool) {
        self.service.record_delivery(delivered);
    }

    pub fn command_count(&self, kind: &str) -> u64 {
        self.service.command_count(kind)
    }

    pub fn delivery_count(&self, delivered: bool) -> u64 {
        self.service.delivery_count(delivered)
    }

    pub fn render_metrics(&self) -> Result<String, String> {
        self.service.render_metrics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_render_contains_known_metric_names() {
        let controller = ObservabilityController::with_registry().unwrap();
        controller.record_command("menu");
        controller.record_api_request("/slack/commands", 200, 0.01);
        controller.record_delivery(false);

        let rendered = controller.render_metrics().unwrap();
        assert!(rendered.contains("ec2ops_commands_total"));
        assert!(rendered.contains("ec2ops_api_request_total"));
        assert!(rendered.contains("ec2ops_api_request_latency_seconds"));
        assert!(rendered.contains("ec2ops_deferred_delivery_total"));
    }

    #[test]
    fn test_counters_are_per_registry() {
        let first = ObservabilityController::with_registry().unwrap();
        let second = ObservabilityController::with_registry().unwrap();
        first.record_command("list");
        first.record_command("list");
        first.record_delivery(true);

        assert_eq!(first.command_count("list"), 2);
        assert_eq!(second.command_count("list"), 0);
        assert_eq!(first.delivery_count(true), 1);
        assert_eq!(first.delivery_count(false), 0);
    }
}
