use std::fmt::Write as _;

use shared::{
    domain::{channel_mention, ChannelId},
    protocol::{ButtonStyle, ComponentRow, Screen},
};

use super::steps::{CategoryOption, DeleteGroup, EditStep, Override, MAX_PICKED_CHANNELS};
use crate::ui::{
    button, buttons, channel_select, note_overflow, option, screen, slot_options, string_select,
    EDIT_ACCENT,
};

pub fn nav_row() -> ComponentRow {
    buttons(vec![
        button("naviedit:back", "Back", ButtonStyle::Secondary),
        button("naviedit:home", "Start over", ButtonStyle::Secondary),
    ])
}

pub fn render(step: &EditStep) -> Screen {
    match step {
        EditStep::PickAddChannels { channels } => screen(
            format!(
                "Select the channels to add (up to {MAX_PICKED_CHANNELS}).\nSelected: {}",
                channels.len()
            ),
            vec![
                channel_select(
                    "naviedit:add:channels",
                    "Channels to add",
                    MAX_PICKED_CHANNELS as u8,
                ),
                buttons(vec![button(
                    "naviedit:add:channels:confirm",
                    "Next",
                    ButtonStyle::Primary,
                )]),
                nav_row(),
            ],
            EDIT_ACCENT,
        ),
        EditStep::AddMethod { channels } => screen(
            format!(
                "Add {} channel(s) to an existing category or to a new one?",
                channels.len()
            ),
            vec![
                buttons(vec![
                    button(
                        "naviedit:add:method:existing",
                        "Existing category",
                        ButtonStyle::Primary,
                    ),
                    button("naviedit:add:method:new", "New category", ButtonStyle::Success),
                ]),
                nav_row(),
            ],
            EDIT_ACCENT,
        ),
        EditStep::AddExistingCategory { categories, .. } => {
            if categories.is_empty() {
                return screen(
                    "There are no categories yet. Go back and create a new one.",
                    vec![nav_row()],
                    EDIT_ACCENT,
                );
            }
            screen(
                note_overflow(
                    "Pick the category the channels should join.".to_string(),
                    categories.len(),
                ),
                vec![
                    category_select("naviedit:add:existing:category", categories),
                    nav_row(),
                ],
                EDIT_ACCENT,
            )
        }
        EditStep::AddNewCategoryOrder {
            category_name,
            categories,
            ..
        } => {
            let mut content = format!("Choose where **{category_name}** appears.");
            if !categories.is_empty() {
                content.push_str("\nCurrent order:");
                for (idx, category) in categories.iter().enumerate() {
                    let _ = write!(content, "\n{}. {}", idx + 1, category.name);
                }
            }
            screen(
                note_overflow(content, categories.len() + 1),
                vec![
                    string_select(
                        "naviedit:add:new:order",
                        "Position",
                        slot_options(categories.len() + 1),
                    ),
                    nav_row(),
                ],
                EDIT_ACCENT,
            )
        }
        EditStep::AddConfirm {
            channels,
            category_name,
            overrides,
            ..
        } => screen(
            confirm_text(
                &format!("Add {} channel(s) to **{category_name}**?", channels.len()),
                channels,
                overrides,
            ),
            vec![
                buttons(vec![
                    button("naviedit:add:confirm:submit", "Confirm", ButtonStyle::Success),
                    button("naviedit:add:confirm:cancel", "Cancel", ButtonStyle::Secondary),
                ]),
                nav_row(),
            ],
            EDIT_ACCENT,
        ),
        EditStep::AddNewConfirm {
            channels,
            category_name,
            position,
            overrides,
        } => screen(
            confirm_text(
                &format!(
                    "Create **{category_name}** at position {} and add {} channel(s)?",
                    position + 1,
                    channels.len()
                ),
                channels,
                overrides,
            ),
            vec![
                buttons(vec![
                    button(
                        "naviedit:add:newconfirm:submit",
                        "Confirm",
                        ButtonStyle::Success,
                    ),
                    button(
                        "naviedit:add:newconfirm:cancel",
                        "Cancel",
                        ButtonStyle::Secondary,
                    ),
                ]),
                nav_row(),
            ],
            EDIT_ACCENT,
        ),
        EditStep::DeletePickChannels { channels } => screen(
            format!(
                "Select the channels to remove from the navigator (up to {MAX_PICKED_CHANNELS}).\nSelected: {}",
                channels.len()
            ),
            vec![
                channel_select(
                    "naviedit:delete:channels",
                    "Channels to remove",
                    MAX_PICKED_CHANNELS as u8,
                ),
                buttons(vec![button(
                    "naviedit:delete:confirm",
                    "Next",
                    ButtonStyle::Primary,
                )]),
                nav_row(),
            ],
            EDIT_ACCENT,
        ),
        EditStep::DeleteConfirm { groups, .. } => screen(
            delete_text(groups),
            vec![
                buttons(vec![button(
                    "naviedit:delete:submit",
                    "Remove",
                    ButtonStyle::Danger,
                )]),
                nav_row(),
            ],
            EDIT_ACCENT,
        ),
        EditStep::OrderPickCategory { categories } => {
            pick_category_screen("naviedit:order:category", categories)
        }
        EditStep::OrderPickChannel {
            category_name,
            channels,
            ..
        } => screen(
            note_overflow(
                format!("Which channel in **{category_name}** should move?"),
                channels.len(),
            ),
            vec![
                string_select(
                    "naviedit:order:channel",
                    "Channel",
                    channels
                        .iter()
                        .map(|channel| option(&channel.name, channel.channel_id.to_string()))
                        .collect(),
                ),
                nav_row(),
            ],
            EDIT_ACCENT,
        ),
        EditStep::OrderPickPosition {
            category_name,
            channel_id,
            channels,
            ..
        } => screen(
            note_overflow(
                format!(
                    "Move {} to which position in **{category_name}**?",
                    channel_mention(*channel_id)
                ),
                channels.len(),
            ),
            vec![
                string_select(
                    "naviedit:order:position",
                    "Position",
                    slot_options(channels.len()),
                ),
                nav_row(),
            ],
            EDIT_ACCENT,
        ),
        EditStep::CategoryOrderPick { categories } => {
            pick_category_screen("naviedit:catorder:category", categories)
        }
        EditStep::CategoryOrderPosition {
            category_name,
            categories,
            ..
        } => screen(
            note_overflow(
                format!("Move **{category_name}** to which position?"),
                categories.len(),
            ),
            vec![
                string_select(
                    "naviedit:catorder:position",
                    "Position",
                    slot_options(categories.len()),
                ),
                nav_row(),
            ],
            EDIT_ACCENT,
        ),
    }
}

/// Terminal screen once a change is applied. The session is gone, so no
/// components are offered.
pub fn done(message: &str) -> Screen {
    screen(message, Vec::new(), EDIT_ACCENT)
}

fn category_select(custom_id: &str, categories: &[CategoryOption]) -> ComponentRow {
    string_select(
        custom_id,
        "Category",
        categories
            .iter()
            .map(|category| option(&category.name, category.id.as_str()))
            .collect(),
    )
}

fn pick_category_screen(custom_id: &str, categories: &[CategoryOption]) -> Screen {
    if categories.is_empty() {
        return screen("There are no categories yet.", vec![nav_row()], EDIT_ACCENT);
    }
    screen(
        note_overflow("Pick a category.".to_string(), categories.len()),
        vec![category_select(custom_id, categories), nav_row()],
        EDIT_ACCENT,
    )
}

fn confirm_text(headline: &str, channels: &[ChannelId], overrides: &[Override]) -> String {
    let mut content = headline.to_string();
    for channel_id in channels {
        let _ = write!(content, "\n- {}", channel_mention(*channel_id));
    }
    if !overrides.is_empty() {
        content.push_str("\n\nThese channels will move out of their current category:");
        for moved in overrides {
            let _ = write!(
                content,
                "\n- {} ({})",
                channel_mention(moved.channel_id),
                moved.from_category
            );
        }
    }
    content
}

fn delete_text(groups: &[DeleteGroup]) -> String {
    if groups.is_empty() {
        return "None of the selected channels are registered. Nothing will change.".to_string();
    }
    let mut content = "These channels will be removed from the navigator:".to_string();
    for group in groups {
        let _ = write!(content, "\n**{}**", group.category_name);
        for channel_id in &group.channels {
            let _ = write!(content, "\n- {}", channel_mention(*channel_id));
        }
    }
    content
}
