//! Small builders for the display payloads in `shared::protocol`.

use shared::{
    domain::ChannelId,
    protocol::{Button, ButtonStyle, ComponentRow, ModalPrompt, Screen, SelectOption},
};

use tracing::debug;

use crate::access::ChannelInfo;

pub const EDIT_ACCENT: &str = "#ed0000";
pub const VIEW_ACCENT: &str = "#0073ed";

/// Platform cap on options per select menu.
pub const MAX_SELECT_OPTIONS: usize = 25;

/// A channel as shown inside a step: id plus the label captured when the step
/// was entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelOption {
    pub channel_id: ChannelId,
    pub name: String,
}

impl From<ChannelInfo> for ChannelOption {
    fn from(info: ChannelInfo) -> Self {
        Self {
            channel_id: info.channel_id,
            name: info.name,
        }
    }
}

pub fn button(
    custom_id: impl Into<String>,
    label: impl Into<String>,
    style: ButtonStyle,
) -> Button {
    Button {
        custom_id: custom_id.into(),
        label: label.into(),
        style,
        disabled: false,
    }
}

pub fn buttons(buttons: Vec<Button>) -> ComponentRow {
    ComponentRow::Buttons { buttons }
}

pub fn option(label: impl Into<String>, value: impl Into<String>) -> SelectOption {
    SelectOption {
        label: label.into(),
        value: value.into(),
        description: None,
    }
}

pub fn string_select(
    custom_id: impl Into<String>,
    placeholder: impl Into<String>,
    mut options: Vec<SelectOption>,
) -> ComponentRow {
    let custom_id = custom_id.into();
    if options.len() > MAX_SELECT_OPTIONS {
        debug!(
            custom_id = %custom_id,
            total = options.len(),
            kept = MAX_SELECT_OPTIONS,
            "select options truncated"
        );
        options.truncate(MAX_SELECT_OPTIONS);
    }
    ComponentRow::StringSelect {
        custom_id,
        placeholder: placeholder.into(),
        options,
    }
}

pub fn channel_select(
    custom_id: impl Into<String>,
    placeholder: impl Into<String>,
    max_values: u8,
) -> ComponentRow {
    ComponentRow::ChannelSelect {
        custom_id: custom_id.into(),
        placeholder: placeholder.into(),
        max_values,
    }
}

/// Numbered slot options; values are zero-based indices.
/// Appends a line telling the user that a select offering `total` options
/// only lists the first `MAX_SELECT_OPTIONS`.
pub fn note_overflow(mut content: String, total: usize) -> String {
    if total > MAX_SELECT_OPTIONS {
        content.push_str(&format!(
            "\nOnly the first {MAX_SELECT_OPTIONS} of {total} choices can be listed here."
        ));
    }
    content
}

pub fn slot_options(count: usize) -> Vec<SelectOption> {
    (0..count)
        .map(|idx| option(format!("Position {}", idx + 1), idx.to_string()))
        .collect()
}

pub fn screen(content: impl Into<String>, components: Vec<ComponentRow>, accent: &str) -> Screen {
    Screen {
        content: content.into(),
        components,
        accent_color: Some(accent.to_string()),
    }
}

/// Plain text message without components.
pub fn notice(content: impl Into<String>) -> Screen {
    Screen {
        content: content.into(),
        components: Vec::new(),
        accent_color: None,
    }
}

/// Prefixes `notice` above the screen body.
pub fn with_notice(mut screen: Screen, notice: Option<&str>) -> Screen {
    if let Some(notice) = notice.filter(|text| !text.is_empty()) {
        screen.content = format!("{notice}\n\n{}", screen.content);
    }
    screen
}

pub fn modal(
    custom_id: impl Into<String>,
    title: impl Into<String>,
    input_id: impl Into<String>,
    input_label: impl Into<String>,
) -> ModalPrompt {
    ModalPrompt {
        custom_id: custom_id.into(),
        title: title.into(),
        input_id: input_id.into(),
        input_label: input_label.into(),
    }
}
