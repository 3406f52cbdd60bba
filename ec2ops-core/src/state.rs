use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Lifecycle state of a compute instance as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InstanceState {
    Pending,
    Running,
    Stopping,
    Stopped,
    Rebooting,
    Terminated,
    /// Any state name the provider reports that is not modelled above
    /// (e.g. `shutting-down`).
    Other(String),
}

impl InstanceState {
    /// States an instance can be in while it is still manageable.
    pub const LIVE: [InstanceState; 5] = [
        InstanceState::Pending,
        InstanceState::Running,
        InstanceState::Stopping,
        InstanceState::Stopped,
        InstanceState::Rebooting,
    ];

    pub fn parse(name: &str) -> Self {
        match name {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "stopping" => Self::Stopping,
            "stopped" => Self::Stopped,
            "rebooting" => Self::Rebooting,
            "terminated" => Self::Terminated,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Rebooting => "rebooting",
            Self::Terminated => "terminated",
            Self::Other(name) => name,
        }
    }

    /// In-flight states during which start/stop requests are not issued.
    pub fn is_transitional(&self) -> bool {
        matches!(self, Self::Pending | Self::Stopping | Self::Rebooting)
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Running => "🟢",
            Self::Stopped => "🔴",
            Self::Pending => "🟡",
            Self::Stopping => "🟠",
            Self::Rebooting => "🔄",
            Self::Terminated => "⚫",
            Self::Other(_) => "⚪",
        }
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for InstanceState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for InstanceState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}
