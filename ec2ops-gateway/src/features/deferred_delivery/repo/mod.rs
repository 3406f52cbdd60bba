use crate::shared::error::{GatewayError, GatewayResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Outbound POST of a JSON body to a platform-supplied callback URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CallbackRepository: Send + Sync {
    async fn post_json(&self, url: &str, body: &Value) -> GatewayResult<()>;
}

pub struct ReqwestCallbackRepository {
    client: Client,
}

impl ReqwestCallbackRepository {
    pub fn new(timeout: Duration) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Delivery(format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CallbackRepository for ReqwestCallbackRepository {
    async fn post_json(&self, url: &str, body: &Value) -> GatewayResult<()> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GatewayError::Delivery(format!(
                "HTTP {}: {}",
                status.as_u16(),
                text.chars().take(200).collect::<String>()
            )));
        }
        Ok(())
    }
}
