use crate::shared::error::{GatewayError, GatewayResult};
use crate::shared::types::ResolvedInstance;
use ec2ops_core::{is_instance_id, Instance, InstanceState};
use ec2ops_providers::ComputeProvider;
use std::sync::Arc;
use tracing::debug;

/// Directory of manageable instances and the identifier resolver.
///
/// Holds the single injected provider handle; every call goes to the provider.
pub struct InstanceDirectory {
    provider: Arc<dyn ComputeProvider>,
    region: String,
}

impl InstanceDirectory {
    pub fn new(provider: Arc<dyn ComputeProvider>, region: impl Into<String>) -> Self {
        Self {
            provider,
            region: region.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn provider(&self) -> &Arc<dyn ComputeProvider> {
        &self.provider
    }

    /// Non-terminated instances sorted case-insensitively by name.
    pub async fn list_all(&self) -> GatewayResult<Vec<Instance>> {
        let mut instances = self.provider.list_instances(&InstanceState::LIVE).await?;
        instances.sort_by_cached_key(|instance| instance.name.to_lowercase());
        Ok(instances)
    }

    /// Resolves an id-shaped identifier by direct lookup and anything else by
    /// name tag. The first tag match in provider order wins.
    pub async fn resolve(&self, identifier: &str) -> GatewayResult<ResolvedInstance> {
        let found = if is_instance_id(identifier) {
            match self.provider.describe_instance(identifier).await {
                Ok(found) => found,
                Err(err) if err.is_instance_not_found() => None,
                Err(err) => return Err(err.into()),
            }
        } else {
            match self
                .provider
                .describe_by_tag(identifier, &InstanceState::LIVE)
                .await
            {
                Ok(matches) => matches.into_iter().next(),
                Err(err) if err.is_instance_not_found() => None,
                Err(err) => return Err(err.into()),
            }
        };

        let instance = found.ok_or_else(|| self.not_found(identifier))?;
        debug!(identifier = %identifier, instance_id = %instance.id, "Resolved instance");

        Ok(ResolvedInstance {
            id: instance.id,
            name: instance.name,
        })
    }

    /// Current view of a resolved instance; gone since resolution is NotFound.
    pub async fn describe(&self, resolved: &ResolvedInstance) -> GatewayResult<Instance> {
        match self.provider.describe_instance(&resolved.id).await {
            Ok(Some(instance)) => Ok(instance),
            Ok(None) => Err(self.not_found(&resolved.name)),
            Err(err) if err.is_instance_not_found() => Err(self.not_found(&resolved.name)),
            Err(err) => Err(err.into()),
        }
    }

    pub fn not_found(&self, identifier: &str) -> GatewayError {
        GatewayError::InstanceNotFound {
            identifier: identifier.to_string(),
            region: self.region.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::testing::{instance, MockProvider, REGION};
    use ec2ops_core::CoreError;
    use ec2ops_providers::InMemoryComputeProvider;

    fn directory(provider: impl ComputeProvider + 'static) -> InstanceDirectory {
        InstanceDirectory::new(Arc::new(provider), REGION)
    }

    #[tokio::test]
    async fn test_list_all_sorts_case_insensitively_and_drops_terminated() {
        let provider = InMemoryComputeProvider::with_instances([
            instance("i-0000000000000000a", "web", InstanceState::Running),
            instance("i-0000000000000000b", "Api", InstanceState::Stopped),
            instance("i-0000000000000000c", "batch", InstanceState::Pending),
            instance("i-0000000000000000d", "archive", InstanceState::Terminated),
        ]);

        let names: Vec<String> = directory(provider)
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();

        assert_eq!(names, vec!["Api", "batch", "web"]);
    }

    #[tokio::test]
    async fn test_list_all_empty_is_not_an_error() {
        let listed = directory(InMemoryComputeProvider::new()).list_all().await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_list_all_propagates_provider_errors() {
        let mut provider = MockProvider::new();
        provider
            .expect_list_instances()
            .returning(|_| Err(CoreError::Transport("connection refused".to_string())));

        let err = directory(provider).list_all().await.unwrap_err();
        assert!(matches!(err, GatewayError::Provider { .. }));
    }

    #[tokio::test]
    async fn test_resolve_id_shape_uses_direct_lookup() {
        let mut provider = MockProvider::new();
        provider
            .expect_describe_instance()
            .withf(|id| id == "i-0123456789abcdef0")
            .times(1)
            .returning(|id| Ok(Some(instance(id, "untagged-match", InstanceState::Running))));
        provider.expect_describe_by_tag().never();

        let resolved = directory(provider)
            .resolve("i-0123456789abcdef0")
            .await
            .unwrap();
        assert_eq!(resolved.id, "i-0123456789abcdef0");
        assert_eq!(resolved.name, "untagged-match");
    }

    #[tokio::test]
    async fn test_resolve_name_uses_tag_lookup_on_live_states() {
        let mut provider = MockProvider::new();
        provider.expect_describe_instance().never();
        provider
            .expect_describe_by_tag()
            .withf(|name, states| {
                name == "my-box" && states == InstanceState::LIVE.as_slice()
            })
            .times(1)
            .returning(|_, _| {
                Ok(vec![
                    instance("i-0000000000000000a", "my-box", InstanceState::Stopped),
                    instance("i-0000000000000000b", "my-box", InstanceState::Running),
                ])
            });

        let resolved = directory(provider).resolve("my-box").await.unwrap();
        assert_eq!(resolved.id, "i-0000000000000000a");
    }

    #[tokio::test]
    async fn test_resolve_unknown_name_is_not_found() {
        let err = directory(InMemoryComputeProvider::new())
            .resolve("my-box")
            .await
            .unwrap_err();
        assert_eq!(
            err.user_message(),
            "❌ Instance 'my-box' not found in ap-southeast-1 region"
        );
    }

    #[tokio::test]
    async fn test_resolve_collapses_provider_not_found() {
        let mut provider = MockProvider::new();
        provider.expect_describe_instance().returning(|id| {
            Err(CoreError::api(
                "InvalidInstanceID.NotFound",
                format!("The instance ID '{id}' does not exist"),
            ))
        });

        let err = directory(provider)
            .resolve("i-0123456789abcdef0")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InstanceNotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_other_provider_errors_propagate() {
        let mut provider = MockProvider::new();
        provider
            .expect_describe_by_tag()
            .returning(|_, _| Err(CoreError::api("UnauthorizedOperation", "denied")));

        let err = directory(provider).resolve("web").await.unwrap_err();
        assert_eq!(err.to_string(), "Error: UnauthorizedOperation: denied");
    }

    #[tokio::test]
    async fn test_describe_missing_after_resolution_is_not_found() {
        let provider = InMemoryComputeProvider::new();
        let resolved = ResolvedInstance {
            id: "i-0123456789abcdef0".to_string(),
            name: "web".to_string(),
        };
        let err = directory(provider).describe(&resolved).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::InstanceNotFound { ref identifier, .. } if identifier == "web"
        ));
    }
}
