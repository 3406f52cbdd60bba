use serde::{Deserialize, Serialize};
use std::fmt;

/// Command vocabulary accepted from slash commands and buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Start,
    Stop,
    Status,
    List,
}

impl Action {
    /// Every action, in the order they are advertised to users.
    pub const ALL: [Action; 4] = [Action::Start, Action::Stop, Action::Status, Action::List];

    /// Actions that operate on a single instance.
    pub const TARGETED: [Action; 3] = [Action::Start, Action::Stop, Action::Status];

    /// Case-insensitive lookup over the full vocabulary.
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(token))
    }

    /// Case-insensitive lookup restricted to actions that take a target.
    pub fn parse_targeted(token: &str) -> Option<Self> {
        Self::parse(token).filter(Action::takes_target)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Status => "status",
            Self::List => "list",
        }
    }

    pub fn takes_target(&self) -> bool {
        !matches!(self, Self::List)
    }

    /// Renders an action set as `start, stop, status`.
    pub fn join(actions: &[Action]) -> String {
        actions
            .iter()
            .map(Action::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
