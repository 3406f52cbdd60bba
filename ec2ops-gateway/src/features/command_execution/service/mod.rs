use crate::features::instance_directory::service::InstanceDirectory;
use crate::shared::error::{GatewayError, GatewayResult};
use crate::shared::types::ExecutionOutcome;
use ec2ops_core::{Action, InstanceState};
use std::sync::Arc;
use tracing::info;

/// Executes targeted actions with idempotent start/stop.
pub struct CommandExecutor {
    directory: Arc<InstanceDirectory>,
}

impl CommandExecutor {
    pub fn new(directory: Arc<InstanceDirectory>) -> Self {
        Self { directory }
    }

    pub async fn execute(&self, action: Action, identifier: &str) -> GatewayResult<ExecutionOutcome> {
        if !action.takes_target() {
            return Err(GatewayError::invalid_action(action.as_str(), &Action::TARGETED));
        }

        let resolved = self.directory.resolve(identifier).await?;
        let instance = self.directory.describe(&resolved).await?;
        let name = resolved.name;
        let state = instance.state.clone();

        let (settled, target) = match action {
            Action::Start => (InstanceState::Running, InstanceState::Pending),
            Action::Stop => (InstanceState::Stopped, InstanceState::Stopping),
            _ => return Ok(ExecutionOutcome::Status { name, instance }),
        };

        if state == settled {
            return Ok(ExecutionOutcome::AlreadyInState { name, state });
        }
        if state.is_transitional() {
            return Ok(ExecutionOutcome::InTransition { name, state });
        }

        let provider = self.directory.provider();
        let transition = match action {
            Action::Start => provider.start_instance(&resolved.id).await?,
            _ => provider.stop_instance(&resolved.id).await?,
        };

        info!(
            instance_id = %resolved.id,
            action = %action,
            from = %state,
            reported = %transition.current,
            "Instance state change requested"
        );

        Ok(ExecutionOutcome::Transitioned {
            action,
            name,
            from: state,
            to: target,
        })
    }
}
