use async_trait::async_trait;
use ec2ops_core::{Instance, InstanceState, Result, StateTransition};
use ec2ops_providers::ComputeProvider;
use mockall::mock;

mock! {
    pub Provider {}

    #[async_trait]
    impl ComputeProvider for Provider {
        async fn list_instances(&self, states: &[InstanceState]) -> Result<Vec<Instance>>;
        async fn describe_instance(&self, instance_id: &str) -> Result<Option<Instance>>;
        async fn describe_by_tag(
            &self,
            name: &str,
            states: &[InstanceState],
        ) -> Result<Vec<Instance>>;
        async fn start_instance(&self, instance_id: &str) -> Result<StateTransition>;
        async fn stop_instance(&self, instance_id: &str) -> Result<StateTransition>;
    }
}

pub const REGION: &str = "ap-southeast-1";

pub fn instance(id: &str, name: &str, state: InstanceState) -> Instance {
    Instance::new(id, Some(name.to_string()), state, "t3.micro")
}
