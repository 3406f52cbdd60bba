use crate::ComputeProvider;
use async_trait::async_trait;
use ec2ops_core::{CoreError, Instance, InstanceState, Result, StateTransition};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// Thread-safe provider over an ordered in-memory instance table.
///
/// Start and stop move instances into their transitional state and are
/// counted, so callers can assert whether an operation was issued.
#[derive(Clone, Default)]
pub struct InMemoryComputeProvider {
    storage: Arc<RwLock<Vec<Instance>>>,
    start_calls: Arc<AtomicUsize>,
    stop_calls: Arc<AtomicUsize>,
}

impl InMemoryComputeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instances(instances: impl IntoIterator<Item = Instance>) -> Self {
        let provider = Self::new();
        for instance in instances {
            provider.insert(instance);
        }
        provider
    }

    /// Adds an instance, replacing any existing entry with the same id.
    pub fn insert(&self, instance: Instance) {
        if let Ok(mut storage) = self.storage.write() {
            match storage.iter_mut().find(|existing| existing.id == instance.id) {
                Some(existing) => *existing = instance,
                None => storage.push(instance),
            }
        }
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    fn snapshot(&self) -> Result<Vec<Instance>> {
        self.storage
            .read()
            .map(|storage| storage.clone())
            .map_err(|_| CoreError::Transport("Storage lock poisoned".to_string()))
    }

    fn transition(&self, instance_id: &str, target: InstanceState) -> Result<StateTransition> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| CoreError::Transport("Storage lock poisoned".to_string()))?;
        let instance = storage
            .iter_mut()
            .find(|instance| instance.id == instance_id)
            .ok_or_else(|| {
                CoreError::api(
                    "InvalidInstanceID.NotFound",
                    format!("The instance ID '{instance_id}' does not exist"),
                )
            })?;

        let previous = std::mem::replace(&mut instance.state, target.clone());
        Ok(StateTransition {
            instance_id: instance_id.to_string(),
            previous,
            current: target,
        })
    }
}

#[async_trait]
impl ComputeProvider for InMemoryComputeProvider {
    async fn list_instances(&self, states: &[InstanceState]) -> Result<Vec<Instance>> {
        Ok(self
            .snapshot()?
            .into_iter()
            .filter(|instance| states.contains(&instance.state))
            .collect())
    }

    async fn describe_instance(&self, instance_id: &str) -> Result<Option<Instance>> {
        Ok(self
            .snapshot()?
            .into_iter()
            .find(|instance| instance.id == instance_id))
    }

    async fn describe_by_tag(
        &self,
        name: &str,
        states: &[InstanceState],
    ) -> Result<Vec<Instance>> {
        // Untagged instances carry their id as name and never match a tag filter.
        Ok(self
            .snapshot()?
            .into_iter()
            .filter(|instance| instance.name == name && instance.name != instance.id)
            .filter(|instance| states.contains(&instance.state))
            .collect())
    }

    async fn start_instance(&self, instance_id: &str) -> Result<StateTransition> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        self.transition(instance_id, InstanceState::Pending)
    }

    async fn stop_instance(&self, instance_id: &str) -> Result<StateTransition> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.transition(instance_id, InstanceState::Stopping)
    }
}
