pub mod repo;
pub mod service;

use crate::sigv4::AwsCredentials;
use crate::ComputeProvider;
use async_trait::async_trait;
use ec2ops_core::{Instance, InstanceState, Result, StateTransition};
use repo::{Ec2ApiRepository, ReqwestEc2ApiRepository};
use service::{Ec2ApiService, Filter};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// `ComputeProvider` backed by the EC2 Query API of a single region.
pub struct Ec2ComputeProvider {
    service: Ec2ApiService,
}

impl Ec2ComputeProvider {
    pub fn new(
        credentials: AwsCredentials,
        region: &str,
        endpoint: Option<&str>,
        timeout: Duration,
    ) -> Result<Self> {
        let repo = Arc::new(ReqwestEc2ApiRepository::new(
            credentials,
            region,
            endpoint,
            timeout,
        )?);
        Ok(Self::with_repository(repo))
    }

    pub fn with_repository(repo: Arc<dyn Ec2ApiRepository>) -> Self {
        Self {
            service: Ec2ApiService::new(repo),
        }
    }
}

#[async_trait]
impl ComputeProvider for Ec2ComputeProvider {
    async fn list_instances(&self, states: &[InstanceState]) -> Result<Vec<Instance>> {
        self.service
            .describe_instances(&[Filter::states(states)], &[])
            .await
    }

    async fn describe_instance(&self, instance_id: &str) -> Result<Option<Instance>> {
        match self.service.describe_instances(&[], &[instance_id]).await {
            Ok(instances) => Ok(instances.into_iter().next()),
            Err(error) if error.is_instance_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn describe_by_tag(
        &self,
        name: &str,
        states: &[InstanceState],
    ) -> Result<Vec<Instance>> {
        self.service
            .describe_instances(&[Filter::name_tag(name), Filter::states(states)], &[])
            .await
    }

    async fn start_instance(&self, instance_id: &str) -> Result<StateTransition> {
        let transition = self.service.change_state("StartInstances", instance_id).await?;
        info!(%instance_id, previous = %transition.previous, current = %transition.current, "StartInstances accepted");
        Ok(transition)
    }

    async fn stop_instance(&self, instance_id: &str) -> Result<StateTransition> {
        let transition = self.service.change_state("StopInstances", instance_id).await?;
        info!(%instance_id, previous = %transition.previous, current = %transition.current, "StopInstances accepted");
        Ok(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ec2_api::repo::{ApiResponse, MockEc2ApiRepository};
    use crate::features::ec2_api::service::fixtures::{
        DESCRIBE_TWO_INSTANCES, NOT_FOUND_ERROR,
    };
    use ec2ops_core::CoreError;

    fn response(status: u16, body: &str) -> ApiResponse {
        ApiResponse {
            status,
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn test_describe_instance_not_found_is_none() {
        let mut repo = MockEc2ApiRepository::new();
        repo.expect_call()
            .returning(|_| Ok(response(400, NOT_FOUND_ERROR)));
        let provider = Ec2ComputeProvider::with_repository(Arc::new(repo));

        let result = provider
            .describe_instance("i-0000000000000000a")
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_describe_instance_other_errors_propagate() {
        let mut repo = MockEc2ApiRepository::new();
        repo.expect_call().returning(|_| {
            Ok(response(
                403,
                "<Response><Errors><Error><Code>UnauthorizedOperation</Code>\
                 <Message>not allowed</Message></Error></Errors></Response>",
            ))
        });
        let provider = Ec2ComputeProvider::with_repository(Arc::new(repo));

        let err = provider
            .describe_instance("i-0123456789abcdef0")
            .await
            .unwrap_err();
        assert_eq!(err, CoreError::api("UnauthorizedOperation", "not allowed"));
    }

    #[tokio::test]
    async fn test_list_instances_sends_state_filter() {
        let mut repo = MockEc2ApiRepository::new();
        repo.expect_call()
            .withf(|params| {
                params
                    .iter()
                    .any(|(k, v)| k == "Filter.1.Name" && v == "instance-state-name")
                    && params
                        .iter()
                        .filter(|(k, _)| k.starts_with("Filter.1.Value."))
                        .count()
                        == InstanceState::LIVE.len()
            })
            .returning(|_| Ok(response(200, DESCRIBE_TWO_INSTANCES)));
        let provider = Ec2ComputeProvider::with_repository(Arc::new(repo));

        let instances = provider.list_instances(&InstanceState::LIVE).await.unwrap();
        assert_eq!(instances.len(), 2);
    }
}
