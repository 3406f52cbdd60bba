//! Pure parsing of slash command text and interaction action ids.

use crate::features::response_builder::service::{
    INSTANCE_ACTION_PREFIX, INSTANCE_MENU_PREFIX, SHOW_HELP_ACTION_ID, SHOW_LIST_ACTION_ID,
};
use crate::shared::error::{GatewayError, GatewayResult};
use crate::shared::types::InteractionAction;
use ec2ops_core::Action;

const HELP_ALIASES: [&str; 3] = ["help", "h", "?"];
const LIST_ALIASES: [&str; 2] = ["list", "ls"];

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Menu,
    List,
    Choose(Action),
    Execute { action: Action, target: String },
}

impl SlashCommand {
    /// Metric label for the route taken.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::List => "list",
            Self::Choose(_) => "choose",
            Self::Execute { .. } => "execute",
        }
    }
}

/// Where a button or overflow click leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionRoute {
    Execute { action: Action, target: String },
    ShowList,
    ShowMenu,
    Unknown,
}

impl InteractionRoute {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Execute { .. } => "execute",
            Self::ShowList => "list",
            Self::ShowMenu => "menu",
            Self::Unknown => "unknown",
        }
    }
}

fn is_alias(text: &str, aliases: &[&str]) -> bool {
    aliases.iter().any(|alias| alias.eq_ignore_ascii_case(text))
}

/// Parses trimmed slash command text.
///
/// One-token errors list every action; two-token errors omit `list`, since it
/// takes no target.
pub fn parse_slash_text(text: &str, command: &str) -> GatewayResult<SlashCommand> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(SlashCommand::Menu);
    }
    if is_alias(text, &HELP_ALIASES) {
        return Err(GatewayError::invalid_action("help", &Action::ALL));
    }
    if is_alias(text, &LIST_ALIASES) {
        return Ok(SlashCommand::List);
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    match tokens.as_slice() {
        [token] => Action::parse_targeted(token)
            .map(SlashCommand::Choose)
            .ok_or_else(|| GatewayError::invalid_action(token, &Action::ALL)),
        [token, target] => Action::parse_targeted(token)
            .map(|action| SlashCommand::Execute {
                action,
                target: target.to_string(),
            })
            .ok_or_else(|| GatewayError::invalid_action(token, &Action::TARGETED)),
        _ => Err(GatewayError::invalid_format(command)),
    }
}

/// Routes one triggered interaction action by its `action_id`.
///
/// Overflow selections carry `<action>_<name>` in their value. Buttons carry
/// `instance_<action>_<name>` in the id, or `instance_<action>` with the name
/// in the value. Names keep any underscores after the action segment.
pub fn parse_interaction(action: &InteractionAction) -> GatewayResult<InteractionRoute> {
    let action_id = action.action_id.as_str();

    if action_id.starts_with(INSTANCE_MENU_PREFIX) {
        return match action.value().split_once('_') {
            Some((token, target)) => targeted(token, target),
            None => Ok(InteractionRoute::Unknown),
        };
    }

    if let Some(rest) = action_id.strip_prefix(INSTANCE_ACTION_PREFIX) {
        return match rest.split_once('_') {
            Some((token, target)) => targeted(token, target),
            None => targeted(rest, action.value()),
        };
    }

    Ok(match action_id {
        SHOW_LIST_ACTION_ID => InteractionRoute::ShowList,
        SHOW_HELP_ACTION_ID => InteractionRoute::ShowMenu,
        _ => InteractionRoute::Unknown,
    })
}

fn targeted(token: &str, target: &str) -> GatewayResult<InteractionRoute> {
    Action::parse_targeted(token)
        .map(|action| InteractionRoute::Execute {
            action,
            target: target.to_string(),
        })
        .ok_or_else(|| GatewayError::invalid_action(token, &Action::TARGETED))
}
