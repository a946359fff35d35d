use async_trait::async_trait;
use shared::domain::{Actor, ChannelId, GuildId, Role};
use storage::Storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageChannels,
    Administrator,
}

pub trait PermissionCheck: Send + Sync {
    fn allows(&self, actor: &Actor, capability: Capability) -> bool;
}

/// Grants capabilities from the role the platform reported on the actor.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActorPermissions;

impl PermissionCheck for ActorPermissions {
    fn allows(&self, actor: &Actor, capability: Capability) -> bool {
        match actor.role {
            Role::Owner => true,
            Role::Mod => capability == Capability::ManageChannels,
            Role::Member => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub channel_id: ChannelId,
    pub guild_id: GuildId,
    pub name: String,
}

/// Resolves platform channels and decides whether `viewer` may see them.
#[async_trait]
pub trait ChannelDirectory: Send + Sync {
    async fn lookup(
        &self,
        guild_id: Option<GuildId>,
        channel_id: ChannelId,
        viewer: &Actor,
    ) -> anyhow::Result<Option<ChannelInfo>>;
}

/// Directory backed by the `channels` table. A channel is visible when it
/// belongs to the guild the event came from.
#[derive(Clone)]
pub struct StorageDirectory {
    storage: Storage,
}

impl StorageDirectory {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl ChannelDirectory for StorageDirectory {
    async fn lookup(
        &self,
        guild_id: Option<GuildId>,
        channel_id: ChannelId,
        _viewer: &Actor,
    ) -> anyhow::Result<Option<ChannelInfo>> {
        let Some(stored) = self.storage.channel(channel_id).await? else {
            return Ok(None);
        };
        if guild_id.is_some_and(|guild| guild != stored.guild_id) {
            return Ok(None);
        }
        Ok(Some(ChannelInfo {
            channel_id: stored.channel_id,
            guild_id: stored.guild_id,
            name: stored.name,
        }))
    }
}
