use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite, SqliteConnection,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{CategoryId, ChannelId, ChannelKind, GuildId};

pub mod document;
mod favorites;

pub use document::{Category, NavigatorDocument, RegistryEntry};
pub use favorites::{move_item, AddFavoriteOutcome, FavoriteRejection, MAX_FAVORITES};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

/// A platform channel known to the directory table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredChannel {
    pub channel_id: ChannelId,
    pub guild_id: GuildId,
    pub name: String,
    pub kind: ChannelKind,
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id         TEXT PRIMARY KEY,
        name       TEXT NOT NULL,
        sort_order INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS channel_registry (
        channel_id  INTEGER PRIMARY KEY,
        category_id TEXT NOT NULL,
        position    INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS favorites (
        user_id    INTEGER NOT NULL,
        channel_id INTEGER NOT NULL,
        position   INTEGER NOT NULL,
        PRIMARY KEY (user_id, channel_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS channels (
        id       INTEGER PRIMARY KEY,
        guild_id INTEGER NOT NULL,
        name     TEXT NOT NULL,
        kind     TEXT NOT NULL DEFAULT 'text'
    )
    "#,
];

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every in-memory connection is its own database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        let storage = Self { pool };
        storage.ensure_schema().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("failed to ensure navigator schema")?;
        }
        Ok(())
    }

    /// Whole-document read of categories and the channel registry.
    pub async fn read_all(&self) -> Result<NavigatorDocument> {
        let mut conn = self.pool.acquire().await?;
        load_document(&mut conn).await
    }

    /// Whole-document replace, committed in one transaction.
    pub async fn write_all(&self, document: &NavigatorDocument) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        store_document(&mut tx, document).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Read-modify-write of the navigator document inside one transaction.
    /// Nothing is written when `apply` leaves the document unchanged.
    pub async fn update_navigator<T, F>(&self, apply: F) -> Result<T>
    where
        F: FnOnce(&mut NavigatorDocument) -> T + Send,
        T: Send,
    {
        let mut tx = self.pool.begin().await?;
        let before = load_document(&mut tx).await?;
        let mut document = before.clone();
        let outcome = apply(&mut document);
        if document != before {
            store_document(&mut tx, &document).await?;
        }
        tx.commit().await?;
        Ok(outcome)
    }

    pub async fn insert_category_at(&self, category: Category, index: usize) -> Result<()> {
        self.update_navigator(|doc| doc.insert_category_at(category, index))
            .await
    }

    pub async fn reorder_category(&self, id: &CategoryId, target_index: usize) -> Result<bool> {
        self.update_navigator(|doc| doc.reorder_category(id, target_index))
            .await
    }

    pub async fn reorder_channels(
        &self,
        category_id: &CategoryId,
        channel_id: ChannelId,
        target_index: usize,
    ) -> Result<bool> {
        self.update_navigator(|doc| doc.reorder_channels(category_id, channel_id, target_index))
            .await
    }

    pub async fn register_channel(
        &self,
        channel_id: ChannelId,
        category_id: &CategoryId,
    ) -> Result<()> {
        self.update_navigator(|doc| doc.register_channel(channel_id, category_id))
            .await
    }

    pub async fn unregister_channel(&self, channel_id: ChannelId) -> Result<Option<RegistryEntry>> {
        self.update_navigator(|doc| doc.unregister_channel(channel_id))
            .await
    }

    pub async fn remove_category(&self, id: &CategoryId) -> Result<Option<Category>> {
        self.update_navigator(|doc| doc.remove_category(id)).await
    }

    pub async fn remove_empty_categories(&self) -> Result<Vec<CategoryId>> {
        self.update_navigator(|doc| doc.remove_empty_categories())
            .await
    }

    pub async fn upsert_channel(
        &self,
        channel_id: ChannelId,
        guild_id: GuildId,
        name: &str,
        kind: ChannelKind,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO channels (id, guild_id, name, kind) VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET guild_id=excluded.guild_id, name=excluded.name, kind=excluded.kind",
        )
        .bind(channel_id.0)
        .bind(guild_id.0)
        .bind(name)
        .bind(match kind {
            ChannelKind::Text => "text",
            ChannelKind::Voice => "voice",
        })
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn channel(&self, channel_id: ChannelId) -> Result<Option<StoredChannel>> {
        let row = sqlx::query("SELECT id, guild_id, name, kind FROM channels WHERE id = ?")
            .bind(channel_id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| StoredChannel {
            channel_id: ChannelId(r.get::<i64, _>(0)),
            guild_id: GuildId(r.get::<i64, _>(1)),
            name: r.get::<String, _>(2),
            kind: match r.get::<String, _>(3).as_str() {
                "voice" => ChannelKind::Voice,
                _ => ChannelKind::Text,
            },
        }))
    }

    pub async fn list_channels_for_guild(&self, guild_id: GuildId) -> Result<Vec<StoredChannel>> {
        let rows = sqlx::query(
            "SELECT id, guild_id, name, kind FROM channels WHERE guild_id = ? ORDER BY id ASC",
        )
        .bind(guild_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| StoredChannel {
                channel_id: ChannelId(r.get::<i64, _>(0)),
                guild_id: GuildId(r.get::<i64, _>(1)),
                name: r.get::<String, _>(2),
                kind: match r.get::<String, _>(3).as_str() {
                    "voice" => ChannelKind::Voice,
                    _ => ChannelKind::Text,
                },
            })
            .collect())
    }
}

async fn load_document(conn: &mut SqliteConnection) -> Result<NavigatorDocument> {
    let category_rows =
        sqlx::query("SELECT id, name, sort_order FROM categories ORDER BY sort_order ASC, id ASC")
            .fetch_all(&mut *conn)
            .await
            .context("failed to load categories")?;
    let registry_rows = sqlx::query("SELECT channel_id, category_id, position FROM channel_registry")
        .fetch_all(&mut *conn)
        .await
        .context("failed to load channel registry")?;

    let categories = category_rows
        .into_iter()
        .map(|r| Category {
            id: CategoryId(r.get::<String, _>(0)),
            name: r.get::<String, _>(1),
            order: r.get::<i64, _>(2).max(0) as u32,
        })
        .collect();
    let registry = registry_rows
        .into_iter()
        .map(|r| {
            (
                ChannelId(r.get::<i64, _>(0)),
                RegistryEntry {
                    category_id: CategoryId(r.get::<String, _>(1)),
                    position: r.get::<i64, _>(2).max(0) as u32,
                },
            )
        })
        .collect();

    Ok(NavigatorDocument {
        categories,
        registry,
    })
}

async fn store_document(conn: &mut SqliteConnection, document: &NavigatorDocument) -> Result<()> {
    sqlx::query("DELETE FROM channel_registry")
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM categories")
        .execute(&mut *conn)
        .await?;

    for category in &document.categories {
        sqlx::query("INSERT INTO categories (id, name, sort_order) VALUES (?, ?, ?)")
            .bind(category.id.as_str())
            .bind(&category.name)
            .bind(i64::from(category.order))
            .execute(&mut *conn)
            .await
            .with_context(|| format!("failed to write category '{}'", category.id))?;
    }
    for (channel_id, entry) in &document.registry {
        sqlx::query(
            "INSERT INTO channel_registry (channel_id, category_id, position) VALUES (?, ?, ?)",
        )
        .bind(channel_id.0)
        .bind(entry.category_id.as_str())
        .bind(i64::from(entry.position))
        .execute(&mut *conn)
        .await
        .with_context(|| format!("failed to write registry entry for channel {channel_id}"))?;
    }
    Ok(())
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/document_tests.rs"]
mod document_tests;
