//! `admin:<action>:<token>` buttons that settle a staged mutation.

use shared::{
    domain::{Actor, CategoryId},
    error::ApiError,
    protocol::{ButtonStyle, ComponentRow, Reply},
};
use storage::{document::random_suffix, Category};
use tracing::{info, warn};

use crate::{
    access::Capability,
    internal,
    pending::PendingAction,
    ui::{button, buttons, notice},
    Navigator, PERMISSION_DENIED,
};

const REQUEST_NOT_FOUND: &str = "That request could not be found. Please try again.";

pub fn confirm_buttons(token: &str) -> ComponentRow {
    buttons(vec![
        button(format!("admin:confirm:{token}"), "Confirm", ButtonStyle::Success),
        button(format!("admin:cancel:{token}"), "Cancel", ButtonStyle::Danger),
    ])
}

pub fn required_capability(action: &PendingAction) -> Capability {
    match action {
        PendingAction::CatAdd { .. } | PendingAction::CatRemove { .. } => Capability::Administrator,
        PendingAction::ChannelAdd { .. } | PendingAction::ChannelRemove { .. } => {
            Capability::ManageChannels
        }
    }
}

pub async fn handle_component(
    nav: &Navigator,
    actor: &Actor,
    custom_id: &str,
) -> Result<Reply, ApiError> {
    let mut parts = custom_id.splitn(3, ':');
    let _prefix = parts.next();
    let action = parts.next().unwrap_or_default();
    let Some(token) = parts.next().filter(|token| !token.is_empty()) else {
        return Ok(Reply::Update(notice("Could not read the request.")));
    };

    let owned = nav
        .pending
        .peek(token)
        .filter(|entry| entry.user_id == actor.user_id);
    let Some(entry) = owned else {
        nav.pending.cancel(token);
        warn!(
            user_id = %actor.user_id,
            token,
            "pending action missing or owned by someone else"
        );
        return Ok(Reply::Update(notice(REQUEST_NOT_FOUND)));
    };

    match action {
        "cancel" => {
            nav.pending.cancel(token);
            info!(
                user_id = %actor.user_id,
                token,
                kind = entry.action.kind(),
                "pending action cancelled"
            );
            return Ok(Reply::Update(notice("Cancelled.")));
        }
        "confirm" => {}
        other => {
            nav.pending.cancel(token);
            warn!(
                user_id = %actor.user_id,
                token,
                action = other,
                "unknown pending action verb"
            );
            return Ok(Reply::Update(notice("Invalid request.")));
        }
    }

    if !nav.permissions.allows(actor, required_capability(&entry.action)) {
        nav.pending.cancel(token);
        return Ok(Reply::Update(notice(PERMISSION_DENIED)));
    }

    let Some(entry) = nav.pending.consume(token) else {
        return Ok(Reply::Update(notice(REQUEST_NOT_FOUND)));
    };
    info!(
        user_id = %actor.user_id,
        token,
        kind = entry.action.kind(),
        "pending action confirmed"
    );
    let message = apply(nav, entry.action).await?;
    Ok(Reply::Update(notice(message)))
}

/// Applies a confirmed action, re-validating it against the current document.
async fn apply(nav: &Navigator, action: PendingAction) -> Result<String, ApiError> {
    match action {
        PendingAction::CatAdd { id, name, order } => {
            let (id, position) = nav
                .storage
                .update_navigator(|doc| {
                    let id = if doc.category(&id).is_some() {
                        CategoryId(format!("{id}-{}", random_suffix(4)))
                    } else {
                        id
                    };
                    let index = order
                        .filter(|order| *order >= 1)
                        .map(|order| order as usize - 1)
                        .unwrap_or(doc.categories.len());
                    doc.insert_category_at(Category::new(id.clone(), name.clone()), index);
                    let position = doc.category(&id).map(|c| c.order).unwrap_or_default();
                    (id, position)
                })
                .await
                .map_err(internal)?;
            Ok(format!("Category added.\nId: {id}\nName: {name}\nPosition: {position}"))
        }
        PendingAction::CatRemove { category_id, name } => {
            let removed = nav
                .storage
                .remove_category(&category_id)
                .await
                .map_err(internal)?;
            Ok(match removed {
                Some(_) => format!("Removed the category \"{name}\"."),
                None => "That category no longer exists.".to_string(),
            })
        }
        PendingAction::ChannelAdd {
            channel_id,
            channel_name,
            category_id,
            category_name,
        } => {
            let registered = nav
                .storage
                .update_navigator(|doc| {
                    if doc.category(&category_id).is_none() {
                        return false;
                    }
                    let moved = doc
                        .entry(channel_id)
                        .is_some_and(|entry| entry.category_id != category_id);
                    doc.register_channel(channel_id, &category_id);
                    if moved {
                        doc.remove_empty_categories();
                    }
                    true
                })
                .await
                .map_err(internal)?;
            Ok(if registered {
                format!("Registered \"{channel_name}\" in \"{category_name}\".")
            } else {
                "That category could not be found.".to_string()
            })
        }
        PendingAction::ChannelRemove {
            channel_id,
            channel_name,
            category_id,
            category_name,
        } => {
            let removed = nav
                .storage
                .update_navigator(|doc| {
                    let registered_here = doc
                        .entry(channel_id)
                        .is_some_and(|entry| entry.category_id == category_id);
                    if !registered_here {
                        return false;
                    }
                    doc.unregister_channel(channel_id);
                    doc.remove_empty_categories();
                    true
                })
                .await
                .map_err(internal)?;
            Ok(if removed {
                format!("Removed \"{channel_name}\" from \"{category_name}\".")
            } else {
                "That channel is not registered in the selected category.".to_string()
            })
        }
    }
}

#[cfg(test)]
#[path = "tests/confirm_tests.rs"]
mod tests;
