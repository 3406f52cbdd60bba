pub mod features;
pub mod in_memory;
pub mod sigv4;

pub use features::ec2_api::Ec2ComputeProvider;
pub use in_memory::InMemoryComputeProvider;

use async_trait::async_trait;
use ec2ops_core::{Instance, InstanceState, Result, StateTransition};

/// Compute provider operations the gateway depends on.
///
/// Implementations never cache: every call reflects live provider state.
#[async_trait]
pub trait ComputeProvider: Send + Sync {
    /// All instances whose state is one of `states`.
    async fn list_instances(&self, states: &[InstanceState]) -> Result<Vec<Instance>>;

    /// A single instance by provider id, `None` if the provider does not know it.
    async fn describe_instance(&self, instance_id: &str) -> Result<Option<Instance>>;

    /// Instances whose name tag equals `name` and whose state is one of `states`,
    /// in provider order.
    async fn describe_by_tag(&self, name: &str, states: &[InstanceState])
        -> Result<Vec<Instance>>;

    async fn start_instance(&self, instance_id: &str) -> Result<StateTransition>;

    async fn stop_instance(&self, instance_id: &str) -> Result<StateTransition>;
}
