//! Navigation wizard (`navi:*`): browse categories to a channel link and
//! manage personal favorites.

pub mod screens;
pub mod steps;

use shared::{
    domain::{channel_mention, Actor, CategoryId, ChannelId, GuildId, UserId},
    error::ApiError,
    protocol::{InvocationContext, Reply, Screen},
};
use storage::{AddFavoriteOutcome, FavoriteRejection, MAX_FAVORITES};
use tracing::{debug, info};

use crate::{
    edit::steps::category_options,
    internal,
    session::Session,
    ui::{with_notice, ChannelOption},
    Navigator,
};

pub use steps::{
    FavoriteMenu, NaviAction, NaviFlow, NaviMode, NaviStep, NaviStepKind, VisibleFavorite,
};

type NaviSession = Session<NaviFlow>;

/// `navi`: resets the user's session and shows home.
pub async fn open(
    nav: &Navigator,
    actor: &Actor,
    context: &InvocationContext,
) -> Result<Reply, ApiError> {
    let session = reset_home(nav, actor, context).await?;
    info!(user_id = %actor.user_id, "navigator opened");
    Ok(Reply::Message(render(&session)))
}

pub async fn handle_component(
    nav: &Navigator,
    actor: &Actor,
    context: &InvocationContext,
    custom_id: &str,
    values: &[String],
) -> Result<Reply, ApiError> {
    let action = match NaviAction::parse(custom_id, values) {
        Ok(action) => action,
        Err(err) => {
            debug!(user_id = %actor.user_id, error = %err, "ignoring navi component");
            return Ok(Reply::Ignored);
        }
    };
    let user_id = actor.user_id;
    let Some(session) = nav.navi_sessions.get(user_id) else {
        debug!(user_id = %user_id, ?action, "navi event without session");
        return Ok(Reply::Ignored);
    };

    let Some(kind) = action.expected() else {
        return match action {
            NaviAction::Home => {
                let session = reset_home(nav, actor, context).await?;
                Ok(Reply::Update(render(&session)))
            }
            _ => back(nav, actor, context, &session).await,
        };
    };
    if session.current.kind() != kind {
        debug!(
            user_id = %user_id,
            step = ?session.current.kind(),
            ?action,
            "ignoring stale navi event"
        );
        return Ok(Reply::Ignored);
    }

    match (action, session.current) {
        (NaviAction::Browse, _) => {
            let doc = nav.storage.read_all().await.map_err(internal)?;
            let categories = category_options(&doc);
            if categories.is_empty() {
                return Ok(not_found(&session.stack, "No categories are registered yet."));
            }
            advance(nav, user_id, NaviStep::PickCategory { categories }, true)
        }
        (NaviAction::EditFavorites, _) => advance(nav, user_id, edit_favorites(context), true),
        (NaviAction::PickCategory(category_id), _) => {
            match category_channels(nav, actor, context, &category_id).await? {
                Some((category_name, channels)) => {
                    let next = NaviStep::ChannelList {
                        category_id,
                        category_name,
                        channels,
                    };
                    advance(nav, user_id, next, true)
                }
                None => Ok(not_found(&session.stack, "That category no longer exists.")),
            }
        }
        (
            NaviAction::PickChannel(channel_id),
            NaviStep::ChannelList {
                category_name,
                channels,
                ..
            },
        ) => {
            let Some(channel) = channels.into_iter().find(|c| c.channel_id == channel_id) else {
                return Ok(not_found(&session.stack, "That channel is not available."));
            };
            let Some(info) = nav
                .directory
                .lookup(context.guild_id, channel_id, actor)
                .await
                .map_err(internal)?
            else {
                return Ok(not_found(&session.stack, "That channel is not available."));
            };
            let next = NaviStep::ChannelPicked {
                category_name,
                channel,
                link: deep_link(info.guild_id, channel_id),
            };
            advance(nav, user_id, next, true)
        }
        (NaviAction::FavoritePicked, current @ NaviStep::ChannelPicked { .. }) => {
            let NaviStep::ChannelPicked { channel, .. } = &current else {
                return Ok(Reply::Ignored);
            };
            let notice = add_checked(nav, actor, context, channel.channel_id).await?;
            let can_go_back = !session.stack.is_empty();
            Ok(Reply::Update(with_notice(
                screens::render(&current, can_go_back),
                Some(&notice),
            )))
        }
        (NaviAction::Menu(item), current) => {
            let can_go_back = !session.stack.is_empty();
            let stay = |notice: &str| -> Result<Reply, ApiError> {
                Ok(Reply::Update(with_notice(
                    screens::render(&current, can_go_back),
                    Some(notice),
                )))
            };
            match item {
                FavoriteMenu::AddCurrent => {
                    let Some(channel_id) = context.channel_id else {
                        return stay("Could not determine the current channel.");
                    };
                    let notice = add_checked(nav, actor, context, channel_id).await?;
                    stay(&notice)
                }
                FavoriteMenu::AddFromCategory => {
                    let doc = nav.storage.read_all().await.map_err(internal)?;
                    let categories = category_options(&doc);
                    if categories.is_empty() {
                        return stay("No categories are registered yet.");
                    }
                    advance(nav, user_id, NaviStep::FavoritePickCategory { categories }, true)
                }
                FavoriteMenu::Remove => {
                    let favorites = visible_favorites(nav, actor, context).await?;
                    if favorites.is_empty() {
                        return stay("You have no favorites to remove.");
                    }
                    advance(nav, user_id, NaviStep::RemoveFavorite { favorites }, true)
                }
                FavoriteMenu::Reorder => {
                    let favorites = visible_favorites(nav, actor, context).await?;
                    if favorites.is_empty() {
                        return stay("You have no favorites to reorder.");
                    }
                    let next = NaviStep::ReorderFavorite {
                        favorites,
                        source_index: None,
                    };
                    advance(nav, user_id, next, true)
                }
            }
        }
        (NaviAction::FavoriteCategory(category_id), _) => {
            match category_channels(nav, actor, context, &category_id).await? {
                Some((category_name, channels)) => {
                    let next = NaviStep::FavoritePickChannel {
                        category_id,
                        category_name,
                        channels,
                    };
                    advance(nav, user_id, next, true)
                }
                None => Ok(not_found(&session.stack, "That category no longer exists.")),
            }
        }
        (
            NaviAction::FavoriteChannel(channel_id),
            NaviStep::FavoritePickChannel { channels, .. },
        ) => {
            if !channels.iter().any(|c| c.channel_id == channel_id) {
                return Ok(not_found(&session.stack, "That channel is not available."));
            }
            let notice = add_checked(nav, actor, context, channel_id).await?;
            back_to_favorites(nav, actor, context, &notice).await
        }
        (NaviAction::RemoveFavorite(channel_id), _) => {
            nav.storage
                .remove_favorite(user_id, channel_id)
                .await
                .map_err(internal)?;
            info!(user_id = %user_id, channel_id = %channel_id, "favorite removed");
            back_to_favorites(nav, actor, context, "Removed from your favorites.").await
        }
        (NaviAction::ReorderSource(source), NaviStep::ReorderFavorite { favorites, .. }) => {
            if source >= favorites.len() {
                return Ok(Reply::Ignored);
            }
            let next = NaviStep::ReorderFavorite {
                favorites,
                source_index: Some(source),
            };
            advance(nav, user_id, next, true)
        }
        (
            NaviAction::ReorderTarget(target),
            NaviStep::ReorderFavorite {
                favorites,
                source_index: Some(source),
            },
        ) => {
            let (Some(from), Some(to)) = (favorites.get(source), favorites.get(target)) else {
                return Ok(Reply::Ignored);
            };
            nav.storage
                .reorder_favorites(user_id, from.stored_index, to.stored_index)
                .await
                .map_err(internal)?;
            info!(
                user_id = %user_id,
                from = from.stored_index,
                to = to.stored_index,
                "favorites reordered"
            );
            back_to_favorites(nav, actor, context, "Your favorites were reordered.").await
        }
        (action, current) => {
            debug!(user_id = %user_id, ?action, step = ?current.kind(), "unhandled navi event");
            Ok(Reply::Ignored)
        }
    }
}

pub fn deep_link(guild_id: GuildId, channel_id: ChannelId) -> String {
    format!("https://discord.com/channels/{guild_id}/{channel_id}")
}

fn render(session: &NaviSession) -> Screen {
    screens::render(&session.current, session.can_go_back())
}

fn advance(
    nav: &Navigator,
    user_id: UserId,
    next: NaviStep,
    push: bool,
) -> Result<Reply, ApiError> {
    match nav.navi_sessions.set_step(user_id, next, push) {
        Some(session) => Ok(Reply::Update(render(&session))),
        None => Ok(Reply::Ignored),
    }
}

fn not_found(stack: &[NaviStep], message: &str) -> Reply {
    Reply::Message(screens::info(message, !stack.is_empty()))
}

fn edit_favorites(context: &InvocationContext) -> NaviStep {
    NaviStep::EditFavorites {
        has_current_channel: context.channel_id.is_some(),
    }
}

async fn back(
    nav: &Navigator,
    actor: &Actor,
    context: &InvocationContext,
    session: &NaviSession,
) -> Result<Reply, ApiError> {
    if !session.can_go_back() {
        let session = reset_home(nav, actor, context).await?;
        return Ok(Reply::Update(render(&session)));
    }
    match nav.navi_sessions.go_back(actor.user_id) {
        Some(session) => Ok(Reply::Update(render(&session))),
        None => Ok(Reply::Ignored),
    }
}

/// Fresh session sitting on home with the viewer's visible favorites.
async fn reset_home(
    nav: &Navigator,
    actor: &Actor,
    context: &InvocationContext,
) -> Result<NaviSession, ApiError> {
    let favorites = visible_favorites(nav, actor, context)
        .await?
        .into_iter()
        .map(|fav| fav.channel)
        .collect();
    let session = nav.navi_sessions.start(actor.user_id, NaviMode::Navigate);
    Ok(nav
        .navi_sessions
        .set_step(actor.user_id, NaviStep::Home { favorites }, false)
        .unwrap_or(session))
}

/// Resets history to home, then opens the favorites menu with `notice`.
async fn back_to_favorites(
    nav: &Navigator,
    actor: &Actor,
    context: &InvocationContext,
    notice: &str,
) -> Result<Reply, ApiError> {
    reset_home(nav, actor, context).await?;
    match nav
        .navi_sessions
        .set_step(actor.user_id, edit_favorites(context), true)
    {
        Some(session) => Ok(Reply::Update(with_notice(render(&session), Some(notice)))),
        None => Ok(Reply::Ignored),
    }
}

async fn visible_favorites(
    nav: &Navigator,
    actor: &Actor,
    context: &InvocationContext,
) -> Result<Vec<VisibleFavorite>, ApiError> {
    let stored = nav
        .storage
        .get_favorites(actor.user_id)
        .await
        .map_err(internal)?;
    let mut visible = Vec::new();
    for (stored_index, channel_id) in stored.into_iter().enumerate() {
        let info = nav
            .directory
            .lookup(context.guild_id, channel_id, actor)
            .await
            .map_err(internal)?;
        if let Some(info) = info {
            visible.push(VisibleFavorite {
                stored_index,
                channel: ChannelOption::from(info),
            });
        }
    }
    Ok(visible)
}

/// Registered channels of a category the viewer can see, by position.
async fn category_channels(
    nav: &Navigator,
    actor: &Actor,
    context: &InvocationContext,
    category_id: &CategoryId,
) -> Result<Option<(String, Vec<ChannelOption>)>, ApiError> {
    let doc = nav.storage.read_all().await.map_err(internal)?;
    let Some(category) = doc.category(category_id) else {
        return Ok(None);
    };
    let mut channels = Vec::new();
    for channel_id in doc.channels_in(category_id) {
        let info = nav
            .directory
            .lookup(context.guild_id, channel_id, actor)
            .await
            .map_err(internal)?;
        if let Some(info) = info {
            channels.push(ChannelOption::from(info));
        }
    }
    Ok(Some((category.name.clone(), channels)))
}

/// Adds a favorite after checking the channel resolves for the viewer.
/// Returns the notice to show.
async fn add_checked(
    nav: &Navigator,
    actor: &Actor,
    context: &InvocationContext,
    channel_id: ChannelId,
) -> Result<String, ApiError> {
    let visible = nav
        .directory
        .lookup(context.guild_id, channel_id, actor)
        .await
        .map_err(internal)?
        .is_some();
    if !visible {
        return Ok("That channel could not be found or you cannot see it.".to_string());
    }
    let outcome = nav
        .storage
        .add_favorite(actor.user_id, channel_id)
        .await
        .map_err(internal)?;
    Ok(match outcome {
        AddFavoriteOutcome::Added(_) => {
            info!(user_id = %actor.user_id, channel_id = %channel_id, "favorite added");
            format!("Added {} to your favorites.", channel_mention(channel_id))
        }
        AddFavoriteOutcome::Rejected(FavoriteRejection::Duplicate) => {
            "That channel is already one of your favorites.".to_string()
        }
        AddFavoriteOutcome::Rejected(FavoriteRejection::Max) => {
            format!("You can keep at most {MAX_FAVORITES} favorites.")
        }
    })
}

#[cfg(test)]
#[path = "../tests/navi_tests.rs"]
mod tests;
