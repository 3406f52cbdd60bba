use crate::features::deferred_delivery::repo::CallbackRepository;
use crate::features::observability::controller::ObservabilityController;
use crate::features::response_builder::blocks::Message;
use std::sync::Arc;
use tracing::{error, info};

/// Posts a computed reply to its callback URL. Failures are logged and
/// counted, never returned: the platform has already been acknowledged.
pub struct DeferredDeliveryService {
    repo: Arc<dyn CallbackRepository>,
    observability: Arc<ObservabilityController>,
}

impl DeferredDeliveryService {
    pub fn new(
        repo: Arc<dyn CallbackRepository>,
        observability: Arc<ObservabilityController>,
    ) -> Self {
        Self {
            repo,
            observability,
        }
    }

    pub async fn deliver(&self, callback_url: &str, message: &Message) {
        let body = match serde_json::to_value(message.to_payload()) {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Failed to encode deferred response");
                self.observability.record_delivery(false);
                return;
            }
        };

        match self.repo.post_json(callback_url, &body).await {
            Ok(()) => {
                info!("Deferred response delivered");
                self.observability.record_delivery(true);
            }
            Err(e) => {
                error!(error = %e, "Error sending response to callback");
                self.observability.record_delivery(false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::deferred_delivery::repo::MockCallbackRepository;
    use crate::shared::error::GatewayError;
    use mockall::predicate::eq;
    use serde_json::json;

    fn service(repo: MockCallbackRepository) -> (DeferredDeliveryService, Arc<ObservabilityController>) {
        let observability = ObservabilityController::with_registry().unwrap();
        (
            DeferredDeliveryService::new(Arc::new(repo), observability.clone()),
            observability,
        )
    }

    #[tokio::test]
    async fn test_deliver_posts_unwrapped_payload() {
        let mut repo = MockCallbackRepository::new();
        repo.expect_post_json()
            .with(
                eq("https://hooks.slack.test/actions/1"),
                eq(json!({"response_type": "in_channel", "text": "📋 No instances found in ap-southeast-1 region"})),
            )
            .times(1)
            .returning(|_, _| Ok(()));

        let (service, observability) = service(repo);
        service
            .deliver(
                "https://hooks.slack.test/actions/1",
                &Message::text("📋 No instances found in ap-southeast-1 region"),
            )
            .await;

        assert_eq!(observability.delivery_count(true), 1);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_swallowed_and_counted() {
        let mut repo = MockCallbackRepository::new();
        repo.expect_post_json()
            .times(1)
            .returning(|_, _| Err(GatewayError::Delivery("HTTP 404: no_service".to_string())));

        let (service, observability) = service(repo);
        service
            .deliver("https://hooks.slack.test/actions/1", &Message::text("hi"))
            .await;

        assert_eq!(observability.delivery_count(false), 1);
        assert_eq!(observability.delivery_count(true), 0);
    }
}
