pub mod action;
pub mod state;

pub use action::Action;
pub use state::InstanceState;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of a provider-assigned instance id, e.g. `i-0123456789abcdef0`.
pub const INSTANCE_ID_PREFIX: &str = "i-";
/// Total length of a provider-assigned instance id.
pub const INSTANCE_ID_LEN: usize = 19;
/// Tag key holding the human-readable instance name.
pub const NAME_TAG: &str = "Name";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("{code}: {message}")]
    Api { code: String, message: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl CoreError {
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code: code.into(),
            message: message.into(),
        }
    }

    /// True when the provider rejected an instance id as unknown or malformed.
    pub fn is_instance_not_found(&self) -> bool {
        matches!(
            self,
            Self::Api { code, .. }
                if code == "InvalidInstanceID.NotFound" || code == "InvalidInstanceID.Malformed"
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Returns true if `identifier` has the shape of a provider instance id
/// rather than a name tag.
pub fn is_instance_id(identifier: &str) -> bool {
    identifier.starts_with(INSTANCE_ID_PREFIX) && identifier.len() == INSTANCE_ID_LEN
}

/// Provider view of one compute instance, fetched fresh on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub name: String,
    pub state: InstanceState,
    pub instance_type: String,
    pub private_ip: Option<String>,
    pub public_ip: Option<String>,
    pub launch_time: Option<DateTime<Utc>>,
}

impl Instance {
    /// Builds an instance; the name falls back to the id when no name tag exists.
    pub fn new(
        id: impl Into<String>,
        name_tag: Option<String>,
        state: InstanceState,
        instance_type: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let name = name_tag
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| id.clone());
        Self {
            id,
            name,
            state,
            instance_type: instance_type.into(),
            private_ip: None,
            public_ip: None,
            launch_time: None,
        }
    }

    pub fn with_addresses(mut self, private_ip: Option<String>, public_ip: Option<String>) -> Self {
        self.private_ip = private_ip;
        self.public_ip = public_ip;
        self
    }

    pub fn with_launch_time(mut self, launch_time: DateTime<Utc>) -> Self {
        self.launch_time = Some(launch_time);
        self
    }
}

/// State change reported by the provider after a start or stop call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub instance_id: String,
    pub previous: InstanceState,
    pub current: InstanceState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_instance_id_accepts_provider_shape() {
        assert!(is_instance_id("i-0123456789abcdef0"));
    }

    #[test]
    fn test_is_instance_id_rejects_names_and_short_ids() {
        assert!(!is_instance_id("my-box"));
        assert!(!is_instance_id("i-01234567"));
        assert!(!is_instance_id("x-0123456789abcdef0"));
        assert!(!is_instance_id("i-0123456789abcdef01"));
    }

    #[test]
    fn test_instance_name_falls_back_to_id() {
        let instance = Instance::new("i-0123456789abcdef0", None, InstanceState::Running, "t3.micro");
        assert_eq!(instance.name, "i-0123456789abcdef0");

        let blank = Instance::new(
            "i-0123456789abcdef0",
            Some(String::new()),
            InstanceState::Running,
            "t3.micro",
        );
        assert_eq!(blank.name, "i-0123456789abcdef0");
    }

    #[test]
    fn test_instance_name_uses_tag() {
        let instance = Instance::new(
            "i-0123456789abcdef0",
            Some("web-server".to_string()),
            InstanceState::Stopped,
            "t3.micro",
        );
        assert_eq!(instance.name, "web-server");
        assert_eq!(instance.private_ip, None);
    }

    #[test]
    fn test_with_addresses() {
        let instance = Instance::new("i-1", None, InstanceState::Running, "t3.micro")
            .with_addresses(Some("10.0.0.5".to_string()), None);
        assert_eq!(instance.private_ip.as_deref(), Some("10.0.0.5"));
        assert!(instance.public_ip.is_none());
    }

    #[test]
    fn test_core_error_not_found_codes() {
        assert!(CoreError::api("InvalidInstanceID.NotFound", "gone").is_instance_not_found());
        assert!(CoreError::api("InvalidInstanceID.Malformed", "bad").is_instance_not_found());
        assert!(!CoreError::api("UnauthorizedOperation", "nope").is_instance_not_found());
        assert!(!CoreError::Transport("timeout".to_string()).is_instance_not_found());
    }

    #[test]
    fn test_core_error_display() {
        let err = CoreError::api("IncorrectInstanceState", "instance is terminated");
        assert_eq!(err.to_string(), "IncorrectInstanceState: instance is terminated");
        let err = CoreError::Transport("connection refused".to_string());
        assert!(err.to_string().contains("Transport error"));
    }
}
