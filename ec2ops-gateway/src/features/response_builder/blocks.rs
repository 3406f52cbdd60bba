//! Typed chat message model, serialized only at the HTTP boundary.

use serde::Serialize;

/// Maximum instances rendered (with overflow menus) in a directory listing.
pub const MAX_LISTED_INSTANCES: usize = 10;
/// Maximum buttons offered by a per-action chooser.
pub const MAX_CHOOSER_BUTTONS: usize = 15;
/// Maximum buttons in a single actions block.
pub const BUTTONS_PER_ACTION_BLOCK: usize = 5;
/// Maximum quick-start or quick-stop buttons on the interactive menu.
pub const MAX_QUICK_ACTIONS: usize = 3;

/// A reply: plain text or a list of layout blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Text(String),
    Blocks(Vec<Block>),
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Blocks(_) => None,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        match self {
            Self::Text(_) => &[],
            Self::Blocks(blocks) => blocks,
        }
    }

    /// JSON body posted to the platform, inline or via callback.
    pub fn to_payload(&self) -> MessagePayload<'_> {
        match self {
            Self::Text(text) => MessagePayload {
                response_type: "in_channel",
                text: Some(text),
                blocks: None,
            },
            Self::Blocks(blocks) => MessagePayload {
                response_type: "in_channel",
                text: None,
                blocks: Some(blocks),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessagePayload<'a> {
    pub response_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<&'a [Block]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section {
        text: TextObject,
        #[serde(skip_serializing_if = "Option::is_none")]
        accessory: Option<Accessory>,
    },
    Actions {
        elements: Vec<Button>,
    },
}

impl Block {
    pub fn section(markdown: impl Into<String>) -> Self {
        Self::Section {
            text: TextObject::Mrkdwn {
                text: markdown.into(),
            },
            accessory: None,
        }
    }

    pub fn section_with_overflow(markdown: impl Into<String>, overflow: Overflow) -> Self {
        Self::Section {
            text: TextObject::Mrkdwn {
                text: markdown.into(),
            },
            accessory: Some(Accessory::Overflow(overflow)),
        }
    }

    pub fn actions(elements: Vec<Button>) -> Self {
        Self::Actions { elements }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Section { text, .. } => Some(text.as_str()),
            Self::Actions { .. } => None,
        }
    }

    pub fn buttons(&self) -> &[Button] {
        match self {
            Self::Actions { elements } => elements,
            Self::Section { .. } => &[],
        }
    }

    pub fn overflow(&self) -> Option<&Overflow> {
        match self {
            Self::Section {
                accessory: Some(Accessory::Overflow(overflow)),
                ..
            } => Some(overflow),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    Mrkdwn { text: String },
    PlainText { text: String },
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::PlainText { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Mrkdwn { text } | Self::PlainText { text } => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Accessory {
    Overflow(Overflow),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overflow {
    pub options: Vec<OverflowOption>,
    pub action_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverflowOption {
    pub text: TextObject,
    pub value: String,
}

impl OverflowOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: TextObject::plain(label),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    #[serde(rename = "type")]
    kind: &'static str,
    pub text: TextObject,
    pub action_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ButtonStyle>,
}

impl Button {
    pub fn new(label: impl Into<String>, action_id: impl Into<String>) -> Self {
        Self {
            kind: "button",
            text: TextObject::plain(label),
            action_id: action_id.into(),
            style: None,
        }
    }

    pub fn styled(mut self, style: Option<ButtonStyle>) -> Self {
        self.style = style;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_payload_shape() {
        let message = Message::text("hello");
        let value = serde_json::to_value(message.to_payload()).unwrap();
        assert_eq!(value, json!({"response_type": "in_channel", "text": "hello"}));
    }

    #[test]
    fn test_blocks_payload_shape() {
        let message = Message::Blocks(vec![
            Block::section("*header*"),
            Block::actions(vec![
                Button::new("📋 List All Instances", "show_list").styled(Some(ButtonStyle::Primary))
            ]),
        ]);
        let value = serde_json::to_value(message.to_payload()).unwrap();
        assert_eq!(
            value,
            json!({
                "response_type": "in_channel",
                "blocks": [
                    {"type": "section", "text": {"type": "mrkdwn", "text": "*header*"}},
                    {"type": "actions", "elements": [{
                        "type": "button",
                        "text": {"type": "plain_text", "text": "📋 List All Instances"},
                        "action_id": "show_list",
                        "style": "primary"
                    }]}
                ]
            })
        );
    }

    #[test]
    fn test_overflow_accessory_shape() {
        let block = Block::section_with_overflow(
            "*web*",
            Overflow {
                options: vec![OverflowOption::new("📊 Status", "status_web")],
                action_id: "instance_menu_web".to_string(),
            },
        );
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(
            value["accessory"],
            json!({
                "type": "overflow",
                "options": [{"text": {"type": "plain_text", "text": "📊 Status"}, "value": "status_web"}],
                "action_id": "instance_menu_web"
            })
        );
    }

    #[test]
    fn test_unstyled_button_omits_style() {
        let value = serde_json::to_value(Button::new("📊 web", "instance_status_web")).unwrap();
        assert!(value.get("style").is_none());
    }
}
