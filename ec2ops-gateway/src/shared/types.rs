use crate::features::response_builder::blocks::Message;
use ec2ops_core::{Action, Instance, InstanceState};
use serde::Deserialize;
use std::collections::HashMap;

/// Fields of a form-encoded slash command submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlashCommandForm {
    pub text: String,
    pub user_name: String,
    pub channel_name: String,
}

/// Inbound request body, classified by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundRequest {
    SlashCommand(SlashCommandForm),
    /// Raw JSON carried in the `payload` form field.
    Interaction(String),
}

impl InboundRequest {
    /// Classifies a form-encoded body; a `payload` field marks an interaction.
    pub fn from_form_body(body: &[u8]) -> Self {
        let mut fields: HashMap<String, String> = url::form_urlencoded::parse(body)
            .into_owned()
            .collect();

        if let Some(payload) = fields.remove("payload") {
            return Self::Interaction(payload);
        }

        Self::SlashCommand(SlashCommandForm {
            text: fields.remove("text").unwrap_or_default().trim().to_string(),
            user_name: fields
                .remove("user_name")
                .unwrap_or_else(|| "unknown".to_string()),
            channel_name: fields
                .remove("channel_name")
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }
}

/// JSON interaction payload sent when a button or overflow option is clicked.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionPayload {
    pub actions: Vec<InteractionAction>,
    #[serde(default)]
    pub user: Option<InteractionUser>,
    #[serde(default)]
    pub response_url: Option<String>,
}

impl InteractionPayload {
    pub fn user_name(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|user| user.name.as_deref())
            .unwrap_or("unknown")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionAction {
    pub action_id: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub selected_option: Option<SelectedOption>,
}

impl InteractionAction {
    /// Button value, or the chosen option's value for overflow menus.
    pub fn value(&self) -> &str {
        self.value
            .as_deref()
            .or_else(|| self.selected_option.as_ref().map(|o| o.value.as_str()))
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectedOption {
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionUser {
    #[serde(default)]
    pub name: Option<String>,
}

/// What the HTTP layer sends back for one inbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// 200 with the message as JSON body.
    Inline(Message),
    /// Bare 200 now; the message is POSTed to `callback_url` afterwards.
    Deferred { callback_url: String, message: Message },
    /// Bare 200 with nothing further to send.
    Acknowledge,
}

/// Canonical identity of a resolved instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInstance {
    pub id: String,
    pub name: String,
}

/// Result of executing a targeted action against one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Nothing to do; the instance already is where the action would take it.
    AlreadyInState { name: String, state: InstanceState },
    /// Nothing issued while the instance is mid-transition.
    InTransition { name: String, state: InstanceState },
    /// The provider accepted a start or stop.
    Transitioned {
        action: Action,
        name: String,
        from: InstanceState,
        to: InstanceState,
    },
    Status { name: String, instance: Instance },
}
