//! Staged admin mutations addressed by single-use confirm tokens.

use chrono::{DateTime, Duration, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use shared::domain::{CategoryId, ChannelId, UserId};

const TOKEN_LENGTH: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PendingAction {
    CatAdd {
        id: CategoryId,
        name: String,
        /// 1-based insertion slot; `None` appends.
        order: Option<u32>,
    },
    CatRemove {
        category_id: CategoryId,
        name: String,
    },
    ChannelAdd {
        channel_id: ChannelId,
        channel_name: String,
        category_id: CategoryId,
        category_name: String,
    },
    ChannelRemove {
        channel_id: ChannelId,
        channel_name: String,
        category_id: CategoryId,
        category_name: String,
    },
}

impl PendingAction {
    pub fn kind(&self) -> &'static str {
        match self {
            PendingAction::CatAdd { .. } => "CAT_ADD",
            PendingAction::CatRemove { .. } => "CAT_REMOVE",
            PendingAction::ChannelAdd { .. } => "CHANNEL_ADD",
            PendingAction::ChannelRemove { .. } => "CHANNEL_REMOVE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    pub user_id: UserId,
    pub action: PendingAction,
    pub created_at: DateTime<Utc>,
}

impl PendingEntry {
    pub fn new(user_id: UserId, action: PendingAction) -> Self {
        Self {
            user_id,
            action,
            created_at: Utc::now(),
        }
    }
}

/// Token-keyed registry. With a TTL configured, entries older than it read as
/// absent even before a sweep removes them.
#[derive(Default)]
pub struct PendingActions {
    entries: DashMap<String, PendingEntry>,
    ttl: Option<Duration>,
}

impl PendingActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Some(ttl),
        }
    }

    pub fn create(&self, entry: PendingEntry) -> String {
        loop {
            let token = generate_token();
            if let Entry::Vacant(slot) = self.entries.entry(token.clone()) {
                slot.insert(entry);
                return token;
            }
        }
    }

    pub fn peek(&self, token: &str) -> Option<PendingEntry> {
        let entry = self.entries.get(token)?.value().clone();
        (!self.is_expired(&entry, Utc::now())).then_some(entry)
    }

    /// Removes and returns the entry. A second call for the same token
    /// returns `None`.
    pub fn consume(&self, token: &str) -> Option<PendingEntry> {
        let (_, entry) = self.entries.remove(token)?;
        (!self.is_expired(&entry, Utc::now())).then_some(entry)
    }

    pub fn cancel(&self, token: &str) -> bool {
        self.entries.remove(token).is_some()
    }

    pub fn sweep_expired(&self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = now.signed_duration_since(entry.created_at) <= ttl;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_expired(&self, entry: &PendingEntry, now: DateTime<Utc>) -> bool {
        self.ttl
            .is_some_and(|ttl| now.signed_duration_since(entry.created_at) > ttl)
    }
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
#[path = "tests/pending_tests.rs"]
mod tests;
