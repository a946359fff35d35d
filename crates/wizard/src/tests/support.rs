use shared::{
    domain::{Actor, CategoryId, ChannelId, ChannelKind, GuildId, Role, UserId},
    protocol::{InvocationContext, Reply, Screen},
};
use storage::{Category, Storage};

use crate::Navigator;

pub const GUILD: GuildId = GuildId(1);
pub const OTHER_GUILD: GuildId = GuildId(2);

pub fn owner() -> Actor {
    Actor::new(UserId(1), Role::Owner)
}

pub fn moderator() -> Actor {
    Actor::new(UserId(2), Role::Mod)
}

pub fn member() -> Actor {
    Actor::member(UserId(3))
}

pub fn in_channel(channel_id: i64) -> InvocationContext {
    InvocationContext {
        guild_id: Some(GUILD),
        channel_id: Some(ChannelId(channel_id)),
    }
}

/// Navigator over an in-memory database whose directory knows channels
/// 101..=106 in `GUILD` and channel 900 in `OTHER_GUILD`.
pub async fn navigator() -> Navigator {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    for id in 101..=106 {
        storage
            .upsert_channel(ChannelId(id), GUILD, &format!("chan-{id}"), ChannelKind::Text)
            .await
            .expect("channel");
    }
    storage
        .upsert_channel(ChannelId(900), OTHER_GUILD, "elsewhere", ChannelKind::Text)
        .await
        .expect("channel");
    Navigator::new(storage)
}

/// `lobby` holds 101 and 102, `games` holds 103.
pub async fn seeded_navigator() -> Navigator {
    let nav = navigator().await;
    nav.storage
        .update_navigator(|doc| {
            doc.insert_category_at(Category::new("lobby", "Lobby"), 0);
            doc.insert_category_at(Category::new("games", "Games"), 1);
            let lobby = CategoryId::from("lobby");
            doc.register_channel(ChannelId(101), &lobby);
            doc.register_channel(ChannelId(102), &lobby);
            doc.register_channel(ChannelId(103), &CategoryId::from("games"));
        })
        .await
        .expect("seed");
    nav
}

pub fn screen_of(reply: &Reply) -> &Screen {
    reply.screen().expect("reply carries a screen")
}

pub fn values(ids: &[i64]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}
