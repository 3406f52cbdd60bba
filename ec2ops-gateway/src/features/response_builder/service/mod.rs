use crate::features::response_builder::blocks::{
    Block, Button, ButtonStyle, Message, Overflow, OverflowOption, BUTTONS_PER_ACTION_BLOCK,
    MAX_CHOOSER_BUTTONS, MAX_LISTED_INSTANCES, MAX_QUICK_ACTIONS,
};
use crate::shared::error::{GatewayError, ERROR_GLYPH};
use crate::shared::types::ExecutionOutcome;
use ec2ops_core::{Action, Instance, InstanceState};

pub const SHOW_LIST_ACTION_ID: &str = "show_list";
pub const SHOW_HELP_ACTION_ID: &str = "show_help";
pub const INSTANCE_ACTION_PREFIX: &str = "instance_";
pub const INSTANCE_MENU_PREFIX: &str = "instance_menu_";

/// `instance_<action>_<name>`. Ambiguous when a name contains `_<action>`.
pub fn instance_action_id(action: Action, name: &str) -> String {
    format!("{INSTANCE_ACTION_PREFIX}{action}_{name}")
}

/// `<action>_<name>`, carried as an overflow option value.
pub fn overflow_value(action: Action, name: &str) -> String {
    format!("{action}_{name}")
}

/// Renders every reply the gateway sends.
pub struct MessageRenderer {
    region: String,
    command: String,
}

impl MessageRenderer {
    pub fn new(region: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            command: command.into(),
        }
    }

    pub fn error(&self, error: &GatewayError) -> Message {
        Message::Text(error.user_message())
    }

    pub fn unknown_action(&self) -> Message {
        Message::text(format!("{ERROR_GLYPH} Unknown action"))
    }

    /// Header, list button, up to three quick start/stop buttons each, help text.
    pub fn interactive_menu(&self, instances: &[Instance]) -> Message {
        let mut blocks = vec![
            Block::section("🤖 *EC2 Controller* - Choose an action:"),
            Block::actions(vec![Button::new("📋 List All Instances", SHOW_LIST_ACTION_ID)
                .styled(Some(ButtonStyle::Primary))]),
        ];

        let quick_start: Vec<Button> = instances
            .iter()
            .filter(|instance| instance.state == InstanceState::Stopped)
            .take(MAX_QUICK_ACTIONS)
            .map(|instance| {
                Button::new(
                    format!("▶️ Start {}", instance.name),
                    instance_action_id(Action::Start, &instance.name),
                )
                .styled(Some(ButtonStyle::Primary))
            })
            .collect();
        if !quick_start.is_empty() {
            blocks.push(Block::section("*Quick Start:*"));
            blocks.push(Block::actions(quick_start));
        }

        let quick_stop: Vec<Button> = instances
            .iter()
            .filter(|instance| instance.state == InstanceState::Running)
            .take(MAX_QUICK_ACTIONS)
            .map(|instance| {
                Button::new(
                    format!("⏹️ Stop {}", instance.name),
                    instance_action_id(Action::Stop, &instance.name),
                )
                .styled(Some(ButtonStyle::Danger))
            })
            .collect();
        if !quick_stop.is_empty() {
            blocks.push(Block::section("*Quick Stop:*"));
            blocks.push(Block::actions(quick_stop));
        }

        let cmd = &self.command;
        blocks.push(Block::section(format!(
            "*Available Commands:*\n\
             • `{cmd}` - Show this interactive menu\n\
             • `{cmd} list` - List all instances\n\
             • `{cmd} start <name>` - Start instance\n\
             • `{cmd} stop <name>` - Stop instance\n\
             • `{cmd} status <name>` - Get status"
        )));

        Message::Blocks(blocks)
    }

    /// Header with total count, the first ten instances with overflow menus,
    /// and an "N more" notice for the rest.
    pub fn directory_listing(&self, instances: &[Instance]) -> Message {
        if instances.is_empty() {
            return Message::text(format!("📋 No instances found in {} region", self.region));
        }

        let mut blocks = vec![Block::section(format!(
            "📋 *EC2 Instances in {}* ({} total)",
            self.region,
            instances.len()
        ))];

        for instance in instances.iter().take(MAX_LISTED_INSTANCES) {
            let mut options = Vec::with_capacity(2);
            match instance.state {
                InstanceState::Stopped => options.push(OverflowOption::new(
                    "▶️ Start",
                    overflow_value(Action::Start, &instance.name),
                )),
                InstanceState::Running => options.push(OverflowOption::new(
                    "⏹️ Stop",
                    overflow_value(Action::Stop, &instance.name),
                )),
                _ => {}
            }
            options.push(OverflowOption::new(
                "📊 Status",
                overflow_value(Action::Status, &instance.name),
            ));

            blocks.push(Block::section_with_overflow(
                format!(
                    "*{}* {}\n`{}` • {} • {}",
                    instance.name,
                    instance.state.emoji(),
                    instance.id,
                    instance.instance_type,
                    instance.state
                ),
                Overflow {
                    options,
                    action_id: format!("{INSTANCE_MENU_PREFIX}{}", instance.name),
                },
            ));
        }

        if instances.len() > MAX_LISTED_INSTANCES {
            blocks.push(Block::section(format!(
                "... and {} more instances. Use `{} <action> <name>` for specific instances.",
                instances.len() - MAX_LISTED_INSTANCES,
                self.command
            )));
        }

        Message::Blocks(blocks)
    }

    /// Buttons for the instances eligible for `action`, five per block, at most fifteen.
    pub fn action_chooser(&self, action: Action, instances: &[Instance]) -> Message {
        let (description, emoji, style) = match action {
            Action::Start => ("start", "▶️", Some(ButtonStyle::Primary)),
            Action::Stop => ("stop", "⏹️", Some(ButtonStyle::Danger)),
            Action::Status | Action::List => ("check status of", "📊", None),
        };

        let eligible: Vec<&Instance> = instances
            .iter()
            .filter(|instance| match action {
                Action::Start => instance.state == InstanceState::Stopped,
                Action::Stop => instance.state == InstanceState::Running,
                Action::Status | Action::List => true,
            })
            .take(MAX_CHOOSER_BUTTONS)
            .collect();

        if eligible.is_empty() {
            return Message::text(format!("No instances available to {description}"));
        }

        let mut blocks = vec![Block::section(format!(
            "{emoji} *Instances you can {description}:*"
        ))];
        for row in eligible.chunks(BUTTONS_PER_ACTION_BLOCK) {
            blocks.push(Block::actions(
                row.iter()
                    .map(|instance| {
                        Button::new(
                            format!("{emoji} {}", instance.name),
                            instance_action_id(action, &instance.name),
                        )
                        .styled(style)
                    })
                    .collect(),
            ));
        }

        Message::Blocks(blocks)
    }

    pub fn execution_outcome(&self, outcome: &ExecutionOutcome) -> Message {
        let text = match outcome {
            ExecutionOutcome::AlreadyInState { name, state } => {
                format!("ℹ️ Instance '{name}' is already {state}")
            }
            ExecutionOutcome::InTransition { name, state } => {
                format!("ℹ️ Instance '{name}' is currently {state}. Please wait.")
            }
            ExecutionOutcome::Transitioned {
                action: Action::Stop,
                name,
                from,
                to,
            } => format!("🛑 Stopping instance '{name}'\nCurrent state: {from} → {to}"),
            ExecutionOutcome::Transitioned { name, from, to, .. } => {
                format!("✅ Starting instance '{name}'\nCurrent state: {from} → {to}")
            }
            ExecutionOutcome::Status { name, instance } => format!(
                "📊 Instance '{name}' Status:\n\
                 • State: {}\n\
                 • Type: {}\n\
                 • Private IP: {}\n\
                 • Public IP: {}",
                instance.state,
                instance.instance_type,
                instance.private_ip.as_deref().unwrap_or("N/A"),
                instance.public_ip.as_deref().unwrap_or("N/A"),
            ),
        };
        Message::Text(text)
    }
}
