use crate::features::observability::repo::ObservabilityRepository;
use std::sync::Arc;

pub struct ObservabilityService {
    repo: Arc<ObservabilityRepository>,
}

impl ObservabilityService {
    pub fn new(repo: Arc<ObservabilityRepository>) -> Self {
        Self { repo }
    }

    pub fn record_command(&self, kind: &str) {
        self.repo.inc_commands_total(kind);
    }

    pub fn record_api_request(&self, endpoint: &str, status: u16, seconds: f64) {
        self.repo
            .observe_api_request(endpoint, &status.to_string(), seconds);
    }

    pub fn record_delivery(&self, delivered: bool) {
        self.repo
            .inc_deferred_delivery_total(if delivered { "delivered" } else { "failed" });
    }

    pub fn command_count(&self, kind: &str) -> u64 {
        self.repo.commands_total(kind)
    }

    pub fn delivery_count(&self, delivered: bool) -> u64 {
        self.repo
            .deferred_delivery_total(if delivered { "delivered" } else { "failed" })
    }

    pub fn render_metrics(&self) -> Result<String, String> {
        self.repo.render_metrics()
    }
}
