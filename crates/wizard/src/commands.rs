//! Slash commands and `category` autocomplete.

use std::fmt::Write as _;

use shared::{
    domain::{channel_mention, Actor},
    error::ApiError,
    protocol::{Choice, Command, InvocationContext, Reply},
};
use storage::{document::NavigatorDocument, Category};
use tracing::info;

use crate::{
    access::{Capability, ChannelInfo},
    confirm::confirm_buttons,
    edit, internal, navi,
    pending::{PendingAction, PendingEntry},
    ui::{notice, screen, EDIT_ACCENT, VIEW_ACCENT},
    Navigator, CATEGORY_NOT_FOUND, PERMISSION_DENIED,
};

/// Platform cap on autocomplete suggestions.
pub const MAX_CHOICES: usize = 25;

const STAGED_WARNING: &str =
    "This change applies to everyone in the server. Changing it often can confuse members.";

pub async fn handle_command(
    nav: &Navigator,
    actor: &Actor,
    context: &InvocationContext,
    command: Command,
) -> Result<Reply, ApiError> {
    match command {
        Command::Navi => navi::open(nav, actor, context).await,
        Command::NaviEdit { mode } => edit::open(nav, actor, mode).await,
        Command::NaviAdd { category } => stage_channel_add(nav, actor, context, &category).await,
        Command::NaviRemove { category } => {
            stage_channel_remove(nav, actor, context, &category).await
        }
        Command::NaviCategoryAdd { name, order } => {
            stage_category_add(nav, actor, &name, order).await
        }
        Command::NaviCategoryRemove { category } => {
            stage_category_remove(nav, actor, &category).await
        }
        Command::NaviRegister { category } => register_current(nav, actor, context, &category).await,
        Command::NaviUnregister => unregister_current(nav, actor, context).await,
        Command::NaviView => view(nav).await,
    }
}

/// Suggestions for the `category` option of `command`.
pub async fn autocomplete(
    nav: &Navigator,
    context: &InvocationContext,
    command: &str,
    focused: &str,
) -> Result<Reply, ApiError> {
    let needle = focused.trim().to_lowercase();
    let matches = |category: &Category| {
        needle.is_empty()
            || category.name.to_lowercase().contains(&needle)
            || category.id.as_str().to_lowercase().contains(&needle)
    };
    let doc = nav.storage.read_all().await.map_err(internal)?;
    let choices = match command {
        "navi_remove" => context
            .channel_id
            .and_then(|channel_id| doc.entry(channel_id))
            .and_then(|entry| doc.category(&entry.category_id))
            .filter(|category| matches(*category))
            .map(|category| vec![choice(category)])
            .unwrap_or_default(),
        "navi_add" | "navi_register" | "navi_category_remove" => doc
            .sorted_categories()
            .into_iter()
            .filter(|category| matches(*category))
            .take(MAX_CHOICES)
            .map(choice)
            .collect(),
        _ => Vec::new(),
    };
    Ok(Reply::Choices(choices))
}

fn choice(category: &Category) -> Choice {
    Choice {
        name: category.name.clone(),
        value: category.id.to_string(),
    }
}

async fn stage_channel_add(
    nav: &Navigator,
    actor: &Actor,
    context: &InvocationContext,
    category_input: &str,
) -> Result<Reply, ApiError> {
    if !nav.permissions.allows(actor, Capability::ManageChannels) {
        return Ok(Reply::Message(notice(PERMISSION_DENIED)));
    }
    let channel = match current_channel(nav, actor, context).await? {
        Ok(channel) => channel,
        Err(reply) => return Ok(reply),
    };
    let doc = nav.storage.read_all().await.map_err(internal)?;
    let Some(category) = doc.find_category_by_input(category_input) else {
        return Ok(Reply::Message(notice(CATEGORY_NOT_FOUND)));
    };
    let content = format!(
        "Register \"{}\" in the \"{}\" category? {STAGED_WARNING}",
        channel.name, category.name
    );
    let action = PendingAction::ChannelAdd {
        channel_id: channel.channel_id,
        channel_name: channel.name,
        category_id: category.id.clone(),
        category_name: category.name.clone(),
    };
    Ok(stage(nav, actor, action, content))
}

async fn stage_channel_remove(
    nav: &Navigator,
    actor: &Actor,
    context: &InvocationContext,
    category_input: &str,
) -> Result<Reply, ApiError> {
    if !nav.permissions.allows(actor, Capability::ManageChannels) {
        return Ok(Reply::Message(notice(PERMISSION_DENIED)));
    }
    let channel = match current_channel(nav, actor, context).await? {
        Ok(channel) => channel,
        Err(reply) => return Ok(reply),
    };
    let doc = nav.storage.read_all().await.map_err(internal)?;
    let Some(entry) = doc.entry(channel.channel_id) else {
        return Ok(Reply::Message(notice(
            "This channel is not registered in the navigator.",
        )));
    };
    let Some(category) = doc.find_category_by_input(category_input) else {
        return Ok(Reply::Message(notice(CATEGORY_NOT_FOUND)));
    };
    if category.id != entry.category_id {
        return Ok(Reply::Message(notice(
            "This channel is not registered in that category.",
        )));
    }
    let content = format!(
        "Remove \"{}\" from the \"{}\" category? {STAGED_WARNING}",
        channel.name, category.name
    );
    let action = PendingAction::ChannelRemove {
        channel_id: channel.channel_id,
        channel_name: channel.name,
        category_id: category.id.clone(),
        category_name: category.name.clone(),
    };
    Ok(stage(nav, actor, action, content))
}

async fn stage_category_add(
    nav: &Navigator,
    actor: &Actor,
    name: &str,
    order: Option<u32>,
) -> Result<Reply, ApiError> {
    if !nav.permissions.allows(actor, Capability::Administrator) {
        return Ok(Reply::Message(notice(PERMISSION_DENIED)));
    }
    let name = name.trim();
    if name.is_empty() {
        return Ok(Reply::Message(notice("A category needs a name.")));
    }
    let doc = nav.storage.read_all().await.map_err(internal)?;
    let id = doc.unique_category_id(name);
    let order = order.filter(|order| *order >= 1);
    let position = order
        .map(|order| order.min(doc.categories.len() as u32 + 1))
        .unwrap_or(doc.categories.len() as u32 + 1);
    let content = format!(
        "Create the category \"{name}\" (id `{id}`) at position {position}? {STAGED_WARNING}"
    );
    let action = PendingAction::CatAdd {
        id,
        name: name.to_string(),
        order,
    };
    Ok(stage(nav, actor, action, content))
}

async fn stage_category_remove(
    nav: &Navigator,
    actor: &Actor,
    category_input: &str,
) -> Result<Reply, ApiError> {
    if !nav.permissions.allows(actor, Capability::Administrator) {
        return Ok(Reply::Message(notice(PERMISSION_DENIED)));
    }
    let doc = nav.storage.read_all().await.map_err(internal)?;
    let Some(category) = doc.find_category_by_input(category_input) else {
        return Ok(Reply::Message(notice(CATEGORY_NOT_FOUND)));
    };
    let registered = doc.channels_in(&category.id).len();
    let content = format!(
        "Delete the category \"{}\" and unregister its {registered} channel(s)? {STAGED_WARNING}",
        category.name
    );
    let action = PendingAction::CatRemove {
        category_id: category.id.clone(),
        name: category.name.clone(),
    };
    Ok(stage(nav, actor, action, content))
}

async fn register_current(
    nav: &Navigator,
    actor: &Actor,
    context: &InvocationContext,
    category_input: &str,
) -> Result<Reply, ApiError> {
    if !nav.permissions.allows(actor, Capability::ManageChannels) {
        return Ok(Reply::Message(notice(PERMISSION_DENIED)));
    }
    let channel = match current_channel(nav, actor, context).await? {
        Ok(channel) => channel,
        Err(reply) => return Ok(reply),
    };
    let input = category_input.to_string();
    let registered = nav
        .storage
        .update_navigator(|doc| {
            let category = doc.find_category_by_input(&input)?.clone();
            let moved = doc
                .entry(channel.channel_id)
                .is_some_and(|entry| entry.category_id != category.id);
            doc.register_channel(channel.channel_id, &category.id);
            if moved {
                doc.remove_empty_categories();
            }
            Some(category)
        })
        .await
        .map_err(internal)?;
    let Some(category) = registered else {
        return Ok(Reply::Message(notice(CATEGORY_NOT_FOUND)));
    };
    info!(
        user_id = %actor.user_id,
        channel_id = %channel.channel_id,
        category_id = %category.id,
        "channel registered"
    );
    Ok(Reply::Message(notice(format!(
        "Registered {} in \"{}\".",
        channel_mention(channel.channel_id),
        category.name
    ))))
}

async fn unregister_current(
    nav: &Navigator,
    actor: &Actor,
    context: &InvocationContext,
) -> Result<Reply, ApiError> {
    if !nav.permissions.allows(actor, Capability::ManageChannels) {
        return Ok(Reply::Message(notice(PERMISSION_DENIED)));
    }
    let Some(channel_id) = context.channel_id else {
        return Ok(Reply::Message(notice("Could not determine the current channel.")));
    };
    let removed = nav
        .storage
        .update_navigator(|doc| {
            let removed = doc.unregister_channel(channel_id);
            if removed.is_some() {
                doc.remove_empty_categories();
            }
            removed
        })
        .await
        .map_err(internal)?;
    Ok(Reply::Message(notice(match removed {
        Some(_) => {
            info!(user_id = %actor.user_id, channel_id = %channel_id, "channel unregistered");
            format!("Unregistered {}.", channel_mention(channel_id))
        }
        None => "This channel is not registered in the navigator.".to_string(),
    })))
}

async fn view(nav: &Navigator) -> Result<Reply, ApiError> {
    let doc = nav.storage.read_all().await.map_err(internal)?;
    Ok(Reply::Message(screen(
        render_layout(&doc),
        Vec::new(),
        VIEW_ACCENT,
    )))
}

/// Categories in order with their channels by position.
pub fn render_layout(doc: &NavigatorDocument) -> String {
    if doc.categories.is_empty() {
        return "No categories are registered yet.".to_string();
    }
    let mut content = String::new();
    for category in doc.sorted_categories() {
        if !content.is_empty() {
            content.push('\n');
        }
        let _ = write!(content, "{}. **{}** (`{}`)", category.order, category.name, category.id);
        let channels = doc.channels_in(&category.id);
        if channels.is_empty() {
            content.push_str("\n   (no channels)");
        }
        for (idx, channel_id) in channels.into_iter().enumerate() {
            let _ = write!(content, "\n   {}. {}", idx + 1, channel_mention(channel_id));
        }
    }
    content
}

fn stage(nav: &Navigator, actor: &Actor, action: PendingAction, content: String) -> Reply {
    let kind = action.kind();
    let token = nav.pending.create(PendingEntry::new(actor.user_id, action));
    info!(user_id = %actor.user_id, token = %token, kind, "pending action staged");
    Reply::Message(screen(content, vec![confirm_buttons(&token)], EDIT_ACCENT))
}

/// The channel the command was used in, or the reply explaining why it could
/// not be resolved.
async fn current_channel(
    nav: &Navigator,
    actor: &Actor,
    context: &InvocationContext,
) -> Result<Result<ChannelInfo, Reply>, ApiError> {
    let (Some(guild_id), Some(channel_id)) = (context.guild_id, context.channel_id) else {
        return Ok(Err(Reply::Message(notice(
            "This command only works inside a server channel.",
        ))));
    };
    let info = nav
        .directory
        .lookup(Some(guild_id), channel_id, actor)
        .await
        .map_err(internal)?;
    Ok(info.ok_or_else(|| Reply::Message(notice("Could not load this channel."))))
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
