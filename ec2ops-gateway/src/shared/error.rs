use ec2ops_core::{Action, CoreError};
use thiserror::Error;

/// Glyph prefixed to every user-facing error message.
pub const ERROR_GLYPH: &str = "❌";

/// Gateway errors. Every variant renders as a normal chat reply; none maps
/// to an HTTP error status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Validation(String),
    #[error("Instance '{identifier}' not found in {region} region")]
    InstanceNotFound { identifier: String, region: String },
    #[error("{context}: {message}")]
    Provider { context: String, message: String },
    #[error("Error processing action: {0}")]
    MalformedPayload(String),
    #[error("Error sending response to callback: {0}")]
    Delivery(String),
}

impl GatewayError {
    /// `Invalid action '<token>'. Supported actions are: <actions>`
    pub fn invalid_action(token: &str, supported: &[Action]) -> Self {
        Self::Validation(format!(
            "Invalid action '{}'. Supported actions are: {}",
            token.to_lowercase(),
            Action::join(supported)
        ))
    }

    pub fn invalid_format(command: &str) -> Self {
        Self::Validation(format!(
            "Invalid command format. Use: `{command} <action> <instance>` or `{command}` for interactive menu"
        ))
    }

    /// Replaces the call-site context of a provider error; other kinds pass through.
    pub fn with_context(self, context: &str) -> Self {
        match self {
            Self::Provider { message, .. } => Self::Provider {
                context: context.to_string(),
                message,
            },
            other => other,
        }
    }

    /// The chat text shown to the user.
    pub fn user_message(&self) -> String {
        format!("{ERROR_GLYPH} {self}")
    }
}

impl From<CoreError> for GatewayError {
    fn from(err: CoreError) -> Self {
        Self::Provider {
            context: "Error".to_string(),
            message: err.to_string(),
        }
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
