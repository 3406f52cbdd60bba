use crate::features::command_dispatch::service::{
    parse_interaction, parse_slash_text, InteractionRoute, SlashCommand,
};
use crate::features::command_execution::service::CommandExecutor;
use crate::features::instance_directory::service::InstanceDirectory;
use crate::features::observability::controller::ObservabilityController;
use crate::features::response_builder::blocks::Message;
use crate::features::response_builder::service::MessageRenderer;
use crate::shared::error::{GatewayError, GatewayResult};
use crate::shared::types::{InboundRequest, InteractionPayload, Reply, SlashCommandForm};
use ec2ops_core::Action;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Single entry point: classifies a request, runs it, and decides whether the
/// reply goes back inline or through the callback URL.
pub struct CommandDispatcher {
    directory: Arc<InstanceDirectory>,
    executor: CommandExecutor,
    renderer: MessageRenderer,
    observability: Arc<ObservabilityController>,
    command: String,
}

impl CommandDispatcher {
    pub fn new(
        directory: Arc<InstanceDirectory>,
        command: impl Into<String>,
        observability: Arc<ObservabilityController>,
    ) -> Self {
        let command = command.into();
        Self {
            executor: CommandExecutor::new(directory.clone()),
            renderer: MessageRenderer::new(directory.region(), command.clone()),
            directory,
            observability,
            command,
        }
    }

    pub async fn dispatch(&self, request: InboundRequest) -> Reply {
        match request {
            InboundRequest::SlashCommand(form) => Reply::Inline(self.handle_slash_command(form).await),
            InboundRequest::Interaction(raw) => self.handle_interaction(&raw).await,
        }
    }

    async fn handle_slash_command(&self, form: SlashCommandForm) -> Message {
        info!(
            user = %form.user_name,
            channel = %form.channel_name,
            text = %form.text,
            "Received slash command"
        );

        let command = match parse_slash_text(&form.text, &self.command) {
            Ok(command) => command,
            Err(err) => {
                self.observability.record_command("invalid");
                return self.settle(Err(err));
            }
        };
        self.observability.record_command(command.kind());

        let result = match command {
            SlashCommand::Menu => self.menu().await,
            SlashCommand::List => self.listing().await,
            SlashCommand::Choose(action) => self.chooser(action).await,
            SlashCommand::Execute { action, target } => self.execute(action, &target).await,
        };
        self.settle(result)
    }

    async fn handle_interaction(&self, raw: &str) -> Reply {
        let payload: InteractionPayload = match serde_json::from_str(raw) {
            Ok(payload) => payload,
            Err(e) => return self.malformed(e.to_string()),
        };
        let Some(action) = payload.actions.first() else {
            return self.malformed("payload contains no actions".to_string());
        };

        info!(
            user = %payload.user_name(),
            action_id = %action.action_id,
            "Received interactive action"
        );

        let route = match parse_interaction(action) {
            Ok(route) => route,
            Err(err) => {
                self.observability.record_command("invalid");
                let message = self.settle(Err(err));
                return self.defer(payload.response_url, message);
            }
        };
        self.observability.record_command(route.kind());

        let result = match route {
            InteractionRoute::Unknown => {
                warn!(action_id = %action.action_id, "Unknown action_id");
                return Reply::Inline(self.renderer.unknown_action());
            }
            InteractionRoute::ShowList => self.listing().await,
            InteractionRoute::ShowMenu => self.menu().await,
            InteractionRoute::Execute { action, target } => self.execute(action, &target).await,
        };
        let message = self.settle(result);
        self.defer(payload.response_url, message)
    }

    async fn menu(&self) -> GatewayResult<Message> {
        let instances = self
            .directory
            .list_all()
            .await
            .map_err(|e| e.with_context("Error creating interactive menu"))?;
        Ok(self.renderer.interactive_menu(&instances))
    }

    async fn listing(&self) -> GatewayResult<Message> {
        let instances = self
            .directory
            .list_all()
            .await
            .map_err(|e| e.with_context("Error listing instances"))?;
        Ok(self.renderer.directory_listing(&instances))
    }

    async fn chooser(&self, action: Action) -> GatewayResult<Message> {
        let instances = self
            .directory
            .list_all()
            .await
            .map_err(|e| e.with_context("Error retrieving instances"))?;
        Ok(self.renderer.action_chooser(action, &instances))
    }

    async fn execute(&self, action: Action, target: &str) -> GatewayResult<Message> {
        let outcome = self.executor.execute(action, target).await?;
        Ok(self.renderer.execution_outcome(&outcome))
    }

    fn settle(&self, result: GatewayResult<Message>) -> Message {
        result.unwrap_or_else(|err| {
            match &err {
                GatewayError::Provider { .. } => error!(error = %err, "Provider call failed"),
                _ => info!(error = %err, "Command rejected"),
            }
            self.renderer.error(&err)
        })
    }

    fn malformed(&self, detail: String) -> Reply {
        let err = GatewayError::MalformedPayload(detail);
        error!(error = %err, "Error handling interactive action");
        self.observability.record_command("malformed");
        Reply::Inline(self.renderer.error(&err))
    }

    fn defer(&self, callback_url: Option<String>, message: Message) -> Reply {
        match callback_url.filter(|url| !url.is_empty()) {
            Some(callback_url) => Reply::Deferred {
                callback_url,
                message,
            },
            None => {
                warn!("Interaction has no response_url; dropping result");
                Reply::Acknowledge
            }
        }
    }
}
