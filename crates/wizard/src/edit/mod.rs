//! Admin edit wizard (`naviedit:*`): add, remove and reorder channels, and
//! reorder categories.

pub mod screens;
pub mod steps;

use std::collections::BTreeMap;

use shared::{
    domain::{Actor, CategoryId, ChannelId, EditMode, UserId},
    error::ApiError,
    protocol::{InvocationContext, Reply, Screen},
};
use storage::{Category, NavigatorDocument};
use tracing::{debug, info};

use crate::{
    access::Capability,
    internal,
    session::Session,
    ui::{modal, notice, with_notice, ChannelOption},
    Navigator, CATEGORY_NOT_FOUND, PERMISSION_DENIED,
};

pub use steps::{
    CategoryOption, DeleteGroup, EditAction, EditFlow, EditStep, EditStepKind, Override,
    MAX_PICKED_CHANNELS, NEW_NAME_INPUT, NEW_NAME_MODAL,
};

type EditSession = Session<EditFlow>;

const SELECT_SOMETHING: &str = "Select at least one channel first.";

/// `navi_edit`: (re)starts the user's edit session in `mode`.
pub async fn open(nav: &Navigator, actor: &Actor, mode: EditMode) -> Result<Reply, ApiError> {
    if !nav.permissions.allows(actor, Capability::ManageChannels) {
        return Ok(Reply::Message(notice(PERMISSION_DENIED)));
    }
    let screen = restart(nav, actor, mode).await?;
    info!(user_id = %actor.user_id, mode = ?mode, "edit wizard opened");
    Ok(Reply::Message(screen))
}

pub async fn handle_component(
    nav: &Navigator,
    actor: &Actor,
    context: &InvocationContext,
    custom_id: &str,
    values: &[String],
) -> Result<Reply, ApiError> {
    match EditAction::parse(custom_id, values) {
        Ok(action) => handle_action(nav, actor, context, action).await,
        Err(err) => {
            debug!(user_id = %actor.user_id, error = %err, "ignoring edit component");
            Ok(Reply::Ignored)
        }
    }
}

pub async fn handle_modal(
    nav: &Navigator,
    actor: &Actor,
    context: &InvocationContext,
    custom_id: &str,
    fields: &BTreeMap<String, String>,
) -> Result<Reply, ApiError> {
    if custom_id != NEW_NAME_MODAL {
        debug!(user_id = %actor.user_id, custom_id, "ignoring unknown edit modal");
        return Ok(Reply::Ignored);
    }
    let name = fields.get(NEW_NAME_INPUT).cloned().unwrap_or_default();
    handle_action(nav, actor, context, EditAction::NewCategoryName(name)).await
}

async fn handle_action(
    nav: &Navigator,
    actor: &Actor,
    context: &InvocationContext,
    action: EditAction,
) -> Result<Reply, ApiError> {
    if !nav.permissions.allows(actor, Capability::ManageChannels) {
        return Ok(Reply::Message(notice(PERMISSION_DENIED)));
    }
    let user_id = actor.user_id;
    let Some(session) = nav.edit_sessions.get(user_id) else {
        debug!(user_id = %user_id, ?action, "edit event without session");
        return Ok(Reply::Ignored);
    };

    let Some((mode, kind)) = action.expected() else {
        return match action {
            EditAction::Home => Ok(Reply::Update(restart(nav, actor, session.mode).await?)),
            _ => back(nav, actor, &session).await,
        };
    };
    if session.mode != mode || session.current.kind() != kind {
        debug!(
            user_id = %user_id,
            mode = ?session.mode,
            step = ?session.current.kind(),
            ?action,
            "ignoring stale edit event"
        );
        return Ok(Reply::Ignored);
    }

    match (action, session.current) {
        (EditAction::AddChannelsSelected(channels), EditStep::PickAddChannels { .. }) => {
            advance(nav, user_id, EditStep::PickAddChannels { channels }, false)
        }
        (EditAction::DeleteSelected(channels), EditStep::DeletePickChannels { .. }) => {
            advance(nav, user_id, EditStep::DeletePickChannels { channels }, false)
        }
        (EditAction::AddChannelsConfirm, current @ EditStep::PickAddChannels { .. }) => {
            let EditStep::PickAddChannels { channels } = &current else {
                return Ok(Reply::Ignored);
            };
            if channels.is_empty() {
                return Ok(rerender(&current, SELECT_SOMETHING));
            }
            let next = EditStep::AddMethod {
                channels: channels.clone(),
            };
            advance(nav, user_id, next, true)
        }
        (EditAction::MethodExisting, EditStep::AddMethod { channels }) => {
            let doc = nav.storage.read_all().await.map_err(internal)?;
            let next = EditStep::AddExistingCategory {
                channels,
                categories: steps::category_options(&doc),
            };
            advance(nav, user_id, next, true)
        }
        (EditAction::MethodNew, EditStep::AddMethod { .. }) => Ok(Reply::Modal(modal(
            NEW_NAME_MODAL,
            "New category",
            NEW_NAME_INPUT,
            "Name of the new category",
        ))),
        (EditAction::NewCategoryName(name), current @ EditStep::AddMethod { .. }) => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Ok(rerender(&current, "Enter a name for the new category."));
            }
            let EditStep::AddMethod { channels } = current else {
                return Ok(Reply::Ignored);
            };
            let doc = nav.storage.read_all().await.map_err(internal)?;
            let next = EditStep::AddNewCategoryOrder {
                channels,
                category_name: name,
                categories: steps::category_options(&doc),
            };
            advance(nav, user_id, next, true)
        }
        (
            EditAction::ExistingCategory(category_id),
            EditStep::AddExistingCategory { channels, .. },
        ) => {
            let doc = nav.storage.read_all().await.map_err(internal)?;
            let Some(category) = doc.category(&category_id) else {
                return Ok(Reply::Message(notice(CATEGORY_NOT_FOUND)));
            };
            let next = EditStep::AddConfirm {
                overrides: overrides_for(&doc, &channels, Some(&category_id)),
                category_name: category.name.clone(),
                category_id,
                channels,
            };
            advance(nav, user_id, next, true)
        }
        (
            EditAction::NewCategoryOrder(position),
            EditStep::AddNewCategoryOrder {
                channels,
                category_name,
                categories,
            },
        ) => {
            let doc = nav.storage.read_all().await.map_err(internal)?;
            let next = EditStep::AddNewConfirm {
                overrides: overrides_for(&doc, &channels, None),
                position: position.min(categories.len()),
                category_name,
                channels,
            };
            advance(nav, user_id, next, true)
        }
        (EditAction::AddConfirm { submit: false }, _)
        | (EditAction::AddNewConfirm { submit: false }, _) => rewind_to_method(nav, user_id),
        (
            EditAction::AddConfirm { submit: true },
            EditStep::AddConfirm {
                channels,
                category_id,
                category_name,
                ..
            },
        ) => {
            let applied = nav
                .storage
                .update_navigator(|doc| {
                    if doc.category(&category_id).is_none() {
                        return false;
                    }
                    doc.assign_channels(&channels, &category_id);
                    doc.remove_empty_categories();
                    true
                })
                .await
                .map_err(internal)?;
            if !applied {
                return Ok(Reply::Message(notice(CATEGORY_NOT_FOUND)));
            }
            info!(
                user_id = %user_id,
                category_id = %category_id,
                count = channels.len(),
                "channels added"
            );
            finish(
                nav,
                user_id,
                &format!("Added {} channel(s) to **{category_name}**.", channels.len()),
            )
        }
        (
            EditAction::AddNewConfirm { submit: true },
            EditStep::AddNewConfirm {
                channels,
                category_name,
                position,
                ..
            },
        ) => {
            let category_id = nav
                .storage
                .update_navigator(|doc| {
                    let id = doc.unique_category_id(&category_name);
                    let category = Category::new(id.clone(), category_name.clone());
                    doc.insert_category_at(category, position);
                    doc.assign_channels(&channels, &id);
                    doc.remove_empty_categories();
                    id
                })
                .await
                .map_err(internal)?;
            info!(
                user_id = %user_id,
                category_id = %category_id,
                count = channels.len(),
                "category created with channels"
            );
            finish(
                nav,
                user_id,
                &format!(
                    "Created **{category_name}** and added {} channel(s).",
                    channels.len()
                ),
            )
        }
        (EditAction::DeleteConfirmPrompt, current @ EditStep::DeletePickChannels { .. }) => {
            let EditStep::DeletePickChannels { channels } = &current else {
                return Ok(Reply::Ignored);
            };
            if channels.is_empty() {
                return Ok(rerender(&current, SELECT_SOMETHING));
            }
            let doc = nav.storage.read_all().await.map_err(internal)?;
            let next = EditStep::DeleteConfirm {
                groups: group_by_category(&doc, channels),
                channels: channels.clone(),
            };
            advance(nav, user_id, next, true)
        }
        (EditAction::DeleteSubmit, EditStep::DeleteConfirm { channels, .. }) => {
            let removed = nav
                .storage
                .update_navigator(|doc| {
                    let removed = channels
                        .iter()
                        .filter(|channel_id| doc.unregister_channel(**channel_id).is_some())
                        .count();
                    doc.remove_empty_categories();
                    removed
                })
                .await
                .map_err(internal)?;
            info!(user_id = %user_id, removed, "channels removed");
            finish(
                nav,
                user_id,
                &format!("Removed {removed} channel(s) from the navigator."),
            )
        }
        (EditAction::OrderCategory(category_id), EditStep::OrderPickCategory { .. }) => {
            let doc = nav.storage.read_all().await.map_err(internal)?;
            let Some(category) = doc.category(&category_id) else {
                return Ok(Reply::Message(notice(CATEGORY_NOT_FOUND)));
            };
            let mut channels = Vec::new();
            for channel_id in doc.channels_in(&category_id) {
                channels.push(describe(nav, actor, context, channel_id).await?);
            }
            let next = EditStep::OrderPickChannel {
                category_name: category.name.clone(),
                category_id,
                channels,
            };
            advance(nav, user_id, next, true)
        }
        (
            EditAction::OrderChannel(channel_id),
            EditStep::OrderPickChannel {
                category_id,
                category_name,
                channels,
            },
        ) => {
            let doc = nav.storage.read_all().await.map_err(internal)?;
            let belongs = doc
                .entry(channel_id)
                .is_some_and(|entry| entry.category_id == category_id);
            if !belongs {
                return Ok(Reply::Message(notice(
                    "That channel is not in the selected category.",
                )));
            }
            let next = EditStep::OrderPickPosition {
                category_id,
                category_name,
                channel_id,
                channels,
            };
            advance(nav, user_id, next, true)
        }
        (
            EditAction::OrderPosition(target),
            EditStep::OrderPickPosition {
                category_id,
                category_name,
                channel_id,
                ..
            },
        ) => {
            let moved = nav
                .storage
                .reorder_channels(&category_id, channel_id, target)
                .await
                .map_err(internal)?;
            if !moved {
                return Ok(Reply::Message(notice(
                    "That channel is no longer in the selected category.",
                )));
            }
            info!(
                user_id = %user_id,
                category_id = %category_id,
                channel_id = %channel_id,
                to_index = target,
                "channel reordered"
            );
            finish(
                nav,
                user_id,
                &format!("Updated the channel order in **{category_name}**."),
            )
        }
        (EditAction::CatOrderCategory(category_id), EditStep::CategoryOrderPick { .. }) => {
            let doc = nav.storage.read_all().await.map_err(internal)?;
            let Some(category) = doc.category(&category_id) else {
                return Ok(Reply::Message(notice(CATEGORY_NOT_FOUND)));
            };
            let next = EditStep::CategoryOrderPosition {
                category_name: category.name.clone(),
                categories: steps::category_options(&doc),
                category_id,
            };
            advance(nav, user_id, next, true)
        }
        (
            EditAction::CatOrderPosition(target),
            EditStep::CategoryOrderPosition {
                category_id,
                category_name,
                ..
            },
        ) => {
            let moved = nav
                .storage
                .reorder_category(&category_id, target)
                .await
                .map_err(internal)?;
            if !moved {
                return Ok(Reply::Message(notice(CATEGORY_NOT_FOUND)));
            }
            info!(
                user_id = %user_id,
                category_id = %category_id,
                to_index = target,
                "category reordered"
            );
            finish(
                nav,
                user_id,
                &format!("Moved **{category_name}** to position {}.", target + 1),
            )
        }
        (action, current) => {
            debug!(user_id = %user_id, ?action, step = ?current.kind(), "unhandled edit event");
            Ok(Reply::Ignored)
        }
    }
}

/// Starts `mode` from its first step, loading the category snapshot the
/// ordering modes open with.
async fn restart(nav: &Navigator, actor: &Actor, mode: EditMode) -> Result<Screen, ApiError> {
    let session = nav.edit_sessions.start(actor.user_id, mode);
    let first = match mode {
        EditMode::AddChannel | EditMode::DeleteChannel => {
            return Ok(screens::render(&session.current));
        }
        EditMode::OrderChannel => EditStep::OrderPickCategory {
            categories: steps::category_options(&nav.storage.read_all().await.map_err(internal)?),
        },
        EditMode::OrderCategory => EditStep::CategoryOrderPick {
            categories: steps::category_options(&nav.storage.read_all().await.map_err(internal)?),
        },
    };
    let screen = screens::render(&first);
    nav.edit_sessions.set_step(actor.user_id, first, false);
    Ok(screen)
}

async fn back(nav: &Navigator, actor: &Actor, session: &EditSession) -> Result<Reply, ApiError> {
    if !session.can_go_back() {
        return Ok(Reply::Update(restart(nav, actor, session.mode).await?));
    }
    match nav.edit_sessions.go_back(actor.user_id) {
        Some(session) => Ok(Reply::Update(screens::render(&session.current))),
        None => Ok(Reply::Ignored),
    }
}

fn advance(
    nav: &Navigator,
    user_id: UserId,
    next: EditStep,
    push: bool,
) -> Result<Reply, ApiError> {
    match nav.edit_sessions.set_step(user_id, next, push) {
        Some(session) => Ok(Reply::Update(screens::render(&session.current))),
        None => Ok(Reply::Ignored),
    }
}

/// Pops history until the method choice is live again, keeping the channel
/// list collected before it.
fn rewind_to_method(nav: &Navigator, user_id: UserId) -> Result<Reply, ApiError> {
    while let Some(session) = nav.edit_sessions.go_back(user_id) {
        if session.current.kind() == EditStepKind::AddMethod {
            return Ok(Reply::Update(screens::render(&session.current)));
        }
        if !session.can_go_back() {
            return Ok(Reply::Update(screens::render(&session.current)));
        }
    }
    Ok(Reply::Ignored)
}

fn finish(nav: &Navigator, user_id: UserId, message: &str) -> Result<Reply, ApiError> {
    nav.edit_sessions.end(user_id);
    Ok(Reply::Update(screens::done(message)))
}

fn rerender(current: &EditStep, message: &str) -> Reply {
    Reply::Update(with_notice(screens::render(current), Some(message)))
}

async fn describe(
    nav: &Navigator,
    actor: &Actor,
    context: &InvocationContext,
    channel_id: ChannelId,
) -> Result<ChannelOption, ApiError> {
    let info = nav
        .directory
        .lookup(context.guild_id, channel_id, actor)
        .await
        .map_err(internal)?;
    Ok(info.map(ChannelOption::from).unwrap_or_else(|| ChannelOption {
        channel_id,
        name: channel_id.to_string(),
    }))
}

/// Picked channels registered somewhere other than `target`.
fn overrides_for(
    doc: &NavigatorDocument,
    channels: &[ChannelId],
    target: Option<&CategoryId>,
) -> Vec<Override> {
    channels
        .iter()
        .filter_map(|channel_id| {
            let entry = doc.entry(*channel_id)?;
            if Some(&entry.category_id) == target {
                return None;
            }
            Some(Override {
                channel_id: *channel_id,
                from_category: doc
                    .category(&entry.category_id)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| entry.category_id.to_string()),
            })
        })
        .collect()
}

/// Registered picks grouped under their category, in category order.
fn group_by_category(doc: &NavigatorDocument, channels: &[ChannelId]) -> Vec<DeleteGroup> {
    doc.sorted_categories()
        .into_iter()
        .filter_map(|category| {
            let members: Vec<ChannelId> = channels
                .iter()
                .copied()
                .filter(|channel_id| {
                    doc.entry(*channel_id)
                        .is_some_and(|entry| entry.category_id == category.id)
                })
                .collect();
            (!members.is_empty()).then(|| DeleteGroup {
                category_name: category.name.clone(),
                channels: members,
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "../tests/edit_tests.rs"]
mod tests;
