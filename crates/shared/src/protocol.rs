use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Actor, ChannelId, EditMode, GuildId};

/// Where an event was raised: the guild and the channel the user is looking at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<GuildId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<ChannelId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Command {
    Navi,
    NaviEdit {
        mode: EditMode,
    },
    NaviAdd {
        category: String,
    },
    NaviRemove {
        category: String,
    },
    NaviCategoryAdd {
        name: String,
        #[serde(default)]
        order: Option<u32>,
    },
    NaviCategoryRemove {
        category: String,
    },
    NaviRegister {
        category: String,
    },
    NaviUnregister,
    NaviView,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Navi => "navi",
            Command::NaviEdit { .. } => "navi_edit",
            Command::NaviAdd { .. } => "navi_add",
            Command::NaviRemove { .. } => "navi_remove",
            Command::NaviCategoryAdd { .. } => "navi_category_add",
            Command::NaviCategoryRemove { .. } => "navi_category_remove",
            Command::NaviRegister { .. } => "navi_register",
            Command::NaviUnregister => "navi_unregister",
            Command::NaviView => "navi_view",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum InboundEvent {
    Command {
        actor: Actor,
        #[serde(default)]
        context: InvocationContext,
        command: Command,
    },
    Component {
        actor: Actor,
        #[serde(default)]
        context: InvocationContext,
        custom_id: String,
        #[serde(default)]
        values: Vec<String>,
    },
    ModalSubmit {
        actor: Actor,
        #[serde(default)]
        context: InvocationContext,
        custom_id: String,
        #[serde(default)]
        fields: BTreeMap<String, String>,
    },
    Autocomplete {
        actor: Actor,
        #[serde(default)]
        context: InvocationContext,
        command: String,
        #[serde(default)]
        focused: String,
    },
}

impl InboundEvent {
    pub fn actor(&self) -> &Actor {
        match self {
            InboundEvent::Command { actor, .. }
            | InboundEvent::Component { actor, .. }
            | InboundEvent::ModalSubmit { actor, .. }
            | InboundEvent::Autocomplete { actor, .. } => actor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub custom_id: String,
    pub label: String,
    pub style: ButtonStyle,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComponentRow {
    Buttons {
        buttons: Vec<Button>,
    },
    StringSelect {
        custom_id: String,
        placeholder: String,
        options: Vec<SelectOption>,
    },
    ChannelSelect {
        custom_id: String,
        placeholder: String,
        max_values: u8,
    },
}

impl ComponentRow {
    /// Custom ids of every interactive element in the row.
    pub fn custom_ids(&self) -> Vec<&str> {
        match self {
            ComponentRow::Buttons { buttons } => {
                buttons.iter().map(|b| b.custom_id.as_str()).collect()
            }
            ComponentRow::StringSelect { custom_id, .. }
            | ComponentRow::ChannelSelect { custom_id, .. } => vec![custom_id.as_str()],
        }
    }
}

/// Rendered display payload: text plus selectable options and navigation buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    pub content: String,
    #[serde(default)]
    pub components: Vec<ComponentRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
}

impl Screen {
    pub fn has_component(&self, custom_id: &str) -> bool {
        self.components
            .iter()
            .any(|row| row.custom_ids().contains(&custom_id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalPrompt {
    pub custom_id: String,
    pub title: String,
    pub input_id: String,
    pub input_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Reply {
    /// A new ephemeral message.
    Message(Screen),
    /// Replace the message the component belongs to.
    Update(Screen),
    Modal(ModalPrompt),
    Choices(Vec<Choice>),
    /// Nothing to send; the event was stale or not ours.
    Ignored,
}

impl Reply {
    pub fn screen(&self) -> Option<&Screen> {
        match self {
            Reply::Message(screen) | Reply::Update(screen) => Some(screen),
            _ => None,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Reply::Ignored)
    }
}
