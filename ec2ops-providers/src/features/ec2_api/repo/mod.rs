use crate::sigv4::{AwsCredentials, RequestSigner};
use async_trait::async_trait;
use chrono::Utc;
use ec2ops_core::{CoreError, Result};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

/// Raw Query API reply; status and body are interpreted by the service.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Ec2ApiRepository: Send + Sync {
    /// Sends one Query API call. `params` includes `Action` and `Version`.
    async fn call(&self, params: &[(String, String)]) -> Result<ApiResponse>;
}

pub struct ReqwestEc2ApiRepository {
    client: Client,
    endpoint: Url,
    host: String,
    signer: RequestSigner,
}

impl ReqwestEc2ApiRepository {
    pub fn new(
        credentials: AwsCredentials,
        region: &str,
        endpoint: Option<&str>,
        timeout: Duration,
    ) -> Result<Self> {
        let endpoint = match endpoint {
            Some(endpoint) => endpoint.to_string(),
            None => format!("https://ec2.{region}.amazonaws.com/"),
        };
        let endpoint = Url::parse(&endpoint).map_err(|e| {
            CoreError::InvalidConfiguration(format!("invalid EC2 endpoint '{endpoint}': {e}"))
        })?;
        let host = match (endpoint.host_str(), endpoint.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(CoreError::InvalidConfiguration(format!(
                    "EC2 endpoint '{endpoint}' has no host"
                )))
            }
        };

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Transport(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            host,
            signer: RequestSigner::new(credentials, region, "ec2"),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Ec2ApiRepository for ReqwestEc2ApiRepository {
    async fn call(&self, params: &[(String, String)]) -> Result<ApiResponse> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();
        let signed = self.signer.sign(&self.host, &body, Utc::now());

        let mut builder = self.client.post(self.endpoint.clone());
        for (name, value) in signed.headers() {
            builder = builder.header(name, value);
        }

        let response = builder
            .body(body)
            .send()
            .await
            .map_err(|e| CoreError::Transport(format!("failed to call EC2 API: {e}")))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            CoreError::Transport(format!("failed to read EC2 API response body: {e}"))
        })?;

        debug!(status, endpoint = %self.endpoint, "EC2 API call completed");

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> AwsCredentials {
        AwsCredentials::new("AKIDEXAMPLE", "secret")
    }

    #[test]
    fn test_default_endpoint_uses_region() {
        let repo = ReqwestEc2ApiRepository::new(
            credentials(),
            "ap-southeast-1",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            repo.endpoint().as_str(),
            "https://ec2.ap-southeast-1.amazonaws.com/"
        );
        assert_eq!(repo.host, "ec2.ap-southeast-1.amazonaws.com");
    }

    #[test]
    fn test_endpoint_override_keeps_port_in_signed_host() {
        let repo = ReqwestEc2ApiRepository::new(
            credentials(),
            "us-east-1",
            Some("http://localhost:4566/"),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(repo.host, "localhost:4566");
    }

    #[test]
    fn test_invalid_endpoint_is_configuration_error() {
        let result = ReqwestEc2ApiRepository::new(
            credentials(),
            "us-east-1",
            Some("not a url"),
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(CoreError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_api_response_success_range() {
        let ok = ApiResponse {
            status: 200,
            body: String::new(),
        };
        let bad = ApiResponse {
            status: 400,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!bad.is_success());
    }
}
