use std::fmt::Write as _;

use shared::{
    domain::channel_mention,
    protocol::{ButtonStyle, ComponentRow, Screen, SelectOption},
};

use super::steps::{FavoriteMenu, NaviStep, VisibleFavorite};
use crate::{
    edit::CategoryOption,
    ui::{
        button, buttons, note_overflow, option, screen, string_select, ChannelOption, VIEW_ACCENT,
    },
};

pub fn render(step: &NaviStep, can_go_back: bool) -> Screen {
    let nav = nav_row(can_go_back);
    match step {
        NaviStep::Home { favorites } => {
            let mut content = "**Channel navigator**\n".to_string();
            if favorites.is_empty() {
                content.push_str("You have no favorites yet.");
            } else {
                content.push_str("Favorites: ");
                let mentions: Vec<String> = favorites
                    .iter()
                    .map(|fav| channel_mention(fav.channel_id))
                    .collect();
                content.push_str(&mentions.join(" "));
            }
            let mut components = vec![buttons(vec![
                button("navi:home:go", "Browse categories", ButtonStyle::Primary),
                button("navi:home:edit", "Edit favorites", ButtonStyle::Secondary),
            ])];
            if can_go_back {
                components.push(nav);
            }
            screen(content, components, VIEW_ACCENT)
        }
        NaviStep::PickCategory { categories } => {
            category_screen("navi:pickcat", "Pick a category to browse.", categories, nav)
        }
        NaviStep::ChannelList {
            category_name,
            channels,
            ..
        } => {
            if channels.is_empty() {
                return screen(
                    format!("There are no channels you can open in **{category_name}**."),
                    vec![nav],
                    VIEW_ACCENT,
                );
            }
            let mut content = format!("**{category_name}**");
            for channel in channels {
                let _ = write!(content, "\n- {}", channel_mention(channel.channel_id));
            }
            screen(
                content,
                vec![channel_menu("navi:chanlist", "Channel to open", channels), nav],
                VIEW_ACCENT,
            )
        }
        NaviStep::ChannelPicked { channel, link, .. } => screen(
            format!("Go to {}: {link}", channel_mention(channel.channel_id)),
            vec![
                buttons(vec![button(
                    "navi:picked:favorite",
                    "Add to favorites",
                    ButtonStyle::Success,
                )]),
                nav,
            ],
            VIEW_ACCENT,
        ),
        NaviStep::EditFavorites {
            has_current_channel,
        } => {
            let options = FavoriteMenu::ALL
                .into_iter()
                .filter(|item| *has_current_channel || *item != FavoriteMenu::AddCurrent)
                .map(|item| option(item.label(), item.value()))
                .collect();
            screen(
                "What would you like to do with your favorites?",
                vec![string_select("navi:editfav", "Favorites", options), nav],
                VIEW_ACCENT,
            )
        }
        NaviStep::FavoritePickCategory { categories } => category_screen(
            "navi:favcat",
            "Pick the category of the channel to add.",
            categories,
            nav,
        ),
        NaviStep::FavoritePickChannel {
            category_name,
            channels,
            ..
        } => {
            if channels.is_empty() {
                return screen(
                    format!("There are no channels you can add from **{category_name}**."),
                    vec![nav],
                    VIEW_ACCENT,
                );
            }
            screen(
                format!("Pick a channel from **{category_name}**."),
                vec![channel_menu("navi:favchan", "Channel to add", channels), nav],
                VIEW_ACCENT,
            )
        }
        NaviStep::RemoveFavorite { favorites } => screen(
            "Which favorite should be removed?",
            vec![
                string_select(
                    "navi:removefav",
                    "Favorite",
                    favorites
                        .iter()
                        .map(|fav| option(&fav.channel.name, fav.channel.channel_id.to_string()))
                        .collect(),
                ),
                nav,
            ],
            VIEW_ACCENT,
        ),
        NaviStep::ReorderFavorite {
            favorites,
            source_index: None,
        } => screen(
            "Which favorite should move?",
            vec![
                string_select("navi:reorder:pick", "Favorite", indexed_options(favorites)),
                nav,
            ],
            VIEW_ACCENT,
        ),
        NaviStep::ReorderFavorite {
            favorites,
            source_index: Some(source),
        } => {
            let name = favorites
                .get(*source)
                .map(|fav| fav.channel.name.as_str())
                .unwrap_or("favorite");
            screen(
                format!("Move **{name}** to which position?"),
                vec![
                    string_select("navi:reorder:target", "Position", indexed_options(favorites)),
                    nav,
                ],
                VIEW_ACCENT,
            )
        }
    }
}

/// Plain informational screen that keeps navigation available.
pub fn info(message: &str, can_go_back: bool) -> Screen {
    screen(message, vec![nav_row(can_go_back)], VIEW_ACCENT)
}

fn nav_row(can_go_back: bool) -> ComponentRow {
    let mut row = Vec::new();
    if can_go_back {
        row.push(button("navi:nav:back", "Back", ButtonStyle::Secondary));
    }
    row.push(button("navi:nav:home", "Home", ButtonStyle::Secondary));
    buttons(row)
}

fn category_screen(
    custom_id: &str,
    prompt: &str,
    categories: &[CategoryOption],
    nav: ComponentRow,
) -> Screen {
    if categories.is_empty() {
        return screen("No categories are registered yet.", vec![nav], VIEW_ACCENT);
    }
    let options = categories
        .iter()
        .map(|category| option(&category.name, category.id.as_str()))
        .collect();
    screen(
        note_overflow(prompt.to_string(), categories.len()),
        vec![string_select(custom_id, "Category", options), nav],
        VIEW_ACCENT,
    )
}

fn channel_menu(custom_id: &str, placeholder: &str, channels: &[ChannelOption]) -> ComponentRow {
    string_select(
        custom_id,
        placeholder,
        channels
            .iter()
            .map(|channel| option(&channel.name, channel.channel_id.to_string()))
            .collect(),
    )
}

fn indexed_options(favorites: &[VisibleFavorite]) -> Vec<SelectOption> {
    favorites
        .iter()
        .enumerate()
        .map(|(idx, fav)| option(format!("{}. {}", idx + 1, fav.channel.name), idx.to_string()))
        .collect()
}
