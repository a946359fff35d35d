use anyhow::Result;
use sqlx::{Row, SqliteConnection};

use shared::domain::{ChannelId, UserId};

use crate::Storage;

pub const MAX_FAVORITES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteRejection {
    Duplicate,
    Max,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddFavoriteOutcome {
    Added(Vec<ChannelId>),
    Rejected(FavoriteRejection),
}

/// Splice-move: remove at `from`, insert at `to`. Out-of-range indices leave
/// the list untouched and return `false`.
pub fn move_item<T>(list: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= list.len() || to >= list.len() {
        return false;
    }
    let moved = list.remove(from);
    list.insert(to, moved);
    true
}

impl Storage {
    pub async fn get_favorites(&self, user_id: UserId) -> Result<Vec<ChannelId>> {
        let mut conn = self.pool().acquire().await?;
        load_favorites(&mut conn, user_id).await
    }

    pub async fn add_favorite(
        &self,
        user_id: UserId,
        channel_id: ChannelId,
    ) -> Result<AddFavoriteOutcome> {
        let mut tx = self.pool().begin().await?;
        let mut list = load_favorites(&mut tx, user_id).await?;
        if list.contains(&channel_id) {
            return Ok(AddFavoriteOutcome::Rejected(FavoriteRejection::Duplicate));
        }
        if list.len() >= MAX_FAVORITES {
            return Ok(AddFavoriteOutcome::Rejected(FavoriteRejection::Max));
        }
        list.push(channel_id);
        replace_favorites(&mut tx, user_id, &list).await?;
        tx.commit().await?;
        Ok(AddFavoriteOutcome::Added(list))
    }

    pub async fn remove_favorite(
        &self,
        user_id: UserId,
        channel_id: ChannelId,
    ) -> Result<Vec<ChannelId>> {
        let mut tx = self.pool().begin().await?;
        let mut list = load_favorites(&mut tx, user_id).await?;
        let before = list.len();
        list.retain(|id| *id != channel_id);
        if list.len() != before {
            replace_favorites(&mut tx, user_id, &list).await?;
        }
        tx.commit().await?;
        Ok(list)
    }

    pub async fn reorder_favorites(
        &self,
        user_id: UserId,
        from: usize,
        to: usize,
    ) -> Result<Vec<ChannelId>> {
        let mut tx = self.pool().begin().await?;
        let mut list = load_favorites(&mut tx, user_id).await?;
        if move_item(&mut list, from, to) {
            replace_favorites(&mut tx, user_id, &list).await?;
        }
        tx.commit().await?;
        Ok(list)
    }
}

async fn load_favorites(conn: &mut SqliteConnection, user_id: UserId) -> Result<Vec<ChannelId>> {
    let rows =
        sqlx::query("SELECT channel_id FROM favorites WHERE user_id = ? ORDER BY position ASC")
            .bind(user_id.0)
            .fetch_all(&mut *conn)
            .await?;
    Ok(rows
        .into_iter()
        .map(|r| ChannelId(r.get::<i64, _>(0)))
        .collect())
}

async fn replace_favorites(
    conn: &mut SqliteConnection,
    user_id: UserId,
    list: &[ChannelId],
) -> Result<()> {
    sqlx::query("DELETE FROM favorites WHERE user_id = ?")
        .bind(user_id.0)
        .execute(&mut *conn)
        .await?;
    for (idx, channel_id) in list.iter().enumerate() {
        sqlx::query("INSERT INTO favorites (user_id, channel_id, position) VALUES (?, ?, ?)")
            .bind(user_id.0)
            .bind(channel_id.0)
            .bind(idx as i64 + 1)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
