use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_REGION: &str = "ap-southeast-1";
pub const DEFAULT_SLASH_COMMAND: &str = "/ec2";
pub const DEFAULT_CALLBACK_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Which compute provider the binary wires in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Ec2,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    pub region: String,
    pub slash_command: String,
    pub provider: ProviderKind,
    pub ec2_endpoint: Option<String>,
    pub callback_timeout: Duration,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_addr = get("EC2OPS_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "EC2OPS_BIND_ADDR",
                message: e.to_string(),
            })?;

        let region = get("AWS_REGION")
            .or_else(|| get("AWS_DEFAULT_REGION"))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let slash_command = get("EC2OPS_SLASH_COMMAND")
            .unwrap_or_else(|| DEFAULT_SLASH_COMMAND.to_string());
        if !slash_command.starts_with('/') || slash_command.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                key: "EC2OPS_SLASH_COMMAND",
                message: format!("'{slash_command}' is not a slash command"),
            });
        }

        let provider = match get("EC2OPS_PROVIDER").as_deref().map(str::to_lowercase) {
            None => ProviderKind::Ec2,
            Some(kind) if kind == "ec2" => ProviderKind::Ec2,
            Some(kind) if kind == "memory" => ProviderKind::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "EC2OPS_PROVIDER",
                    message: format!("expected 'ec2' or 'memory', got '{other}'"),
                })
            }
        };

        let callback_timeout_ms = match get("EC2OPS_CALLBACK_TIMEOUT_MS") {
            None => DEFAULT_CALLBACK_TIMEOUT_MS,
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                key: "EC2OPS_CALLBACK_TIMEOUT_MS",
                message: e.to_string(),
            })?,
        };

        Ok(Self {
            bind_addr,
            region,
            slash_command,
            provider,
            ec2_endpoint: get("EC2OPS_EC2_ENDPOINT"),
            callback_timeout: Duration::from_millis(callback_timeout_ms),
        })
    }
}
