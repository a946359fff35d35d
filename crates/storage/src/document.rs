//! The navigator document: ordered categories plus the channel registry.
//!
//! Every mutating helper leaves category `order` and per-category channel
//! `position` values contiguous and 1-based.

use std::collections::{BTreeMap, BTreeSet};

use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use shared::domain::{CategoryId, ChannelId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub order: u32,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            order: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub category_id: CategoryId,
    pub position: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigatorDocument {
    pub categories: Vec<Category>,
    pub registry: BTreeMap<ChannelId, RegistryEntry>,
}

impl NavigatorDocument {
    pub fn sorted_categories(&self) -> Vec<&Category> {
        let mut categories: Vec<&Category> = self.categories.iter().collect();
        categories.sort_by_key(|c| c.order);
        categories
    }

    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    /// Exact id match first, then a case-insensitive name match.
    pub fn find_category_by_input(&self, input: &str) -> Option<&Category> {
        let trimmed = input.trim();
        let normalized = trimmed.to_lowercase();
        self.categories
            .iter()
            .find(|c| c.id.as_str() == trimmed)
            .or_else(|| {
                self.categories
                    .iter()
                    .find(|c| c.name.to_lowercase() == normalized)
            })
    }

    pub fn entry(&self, channel_id: ChannelId) -> Option<&RegistryEntry> {
        self.registry.get(&channel_id)
    }

    /// Channels of a category ordered by position.
    pub fn channels_in(&self, category_id: &CategoryId) -> Vec<ChannelId> {
        let mut members: Vec<(u32, ChannelId)> = self
            .registry
            .iter()
            .filter(|(_, entry)| &entry.category_id == category_id)
            .map(|(channel_id, entry)| (entry.position, *channel_id))
            .collect();
        members.sort();
        members.into_iter().map(|(_, channel_id)| channel_id).collect()
    }

    pub fn insert_category_at(&mut self, category: Category, index: usize) {
        let mut ordered = self.take_sorted_categories();
        let index = index.min(ordered.len());
        ordered.insert(index, category);
        self.categories = ordered;
        self.renumber_categories();
    }

    /// Returns `false` when the category does not exist.
    pub fn reorder_category(&mut self, id: &CategoryId, target_index: usize) -> bool {
        let mut ordered = self.take_sorted_categories();
        let Some(from) = ordered.iter().position(|c| &c.id == id) else {
            self.categories = ordered;
            return false;
        };
        let moved = ordered.remove(from);
        let target = target_index.min(ordered.len());
        ordered.insert(target, moved);
        self.categories = ordered;
        self.renumber_categories();
        true
    }

    /// Returns `false` when the channel is not registered in `category_id`.
    pub fn reorder_channels(
        &mut self,
        category_id: &CategoryId,
        channel_id: ChannelId,
        target_index: usize,
    ) -> bool {
        let mut members = self.channels_in(category_id);
        let Some(from) = members.iter().position(|id| *id == channel_id) else {
            return false;
        };
        members.remove(from);
        let target = target_index.min(members.len());
        members.insert(target, channel_id);
        self.write_positions(&members);
        true
    }

    /// Appends the channel to the end of `category_id`. A channel already in
    /// another category is moved and its old category renumbered.
    pub fn register_channel(&mut self, channel_id: ChannelId, category_id: &CategoryId) {
        if self
            .registry
            .get(&channel_id)
            .is_some_and(|entry| &entry.category_id == category_id)
        {
            return;
        }
        self.unregister_channel(channel_id);
        let position = self.channels_in(category_id).len() as u32 + 1;
        self.registry.insert(
            channel_id,
            RegistryEntry {
                category_id: category_id.clone(),
                position,
            },
        );
    }

    pub fn unregister_channel(&mut self, channel_id: ChannelId) -> Option<RegistryEntry> {
        let removed = self.registry.remove(&channel_id)?;
        self.renumber_channels(&removed.category_id);
        Some(removed)
    }

    /// Moves every channel in `channels` to the end of `category_id`, in the
    /// given order, renumbering the categories they leave.
    pub fn assign_channels(&mut self, channels: &[ChannelId], category_id: &CategoryId) {
        let mut touched = BTreeSet::new();
        for channel_id in channels {
            if let Some(previous) = self.registry.remove(channel_id) {
                touched.insert(previous.category_id);
            }
        }
        for vacated in &touched {
            self.renumber_channels(vacated);
        }
        let base = self.channels_in(category_id).len() as u32;
        let mut appended = 0;
        for channel_id in channels {
            if self.registry.contains_key(channel_id) {
                continue;
            }
            appended += 1;
            self.registry.insert(
                *channel_id,
                RegistryEntry {
                    category_id: category_id.clone(),
                    position: base + appended,
                },
            );
        }
    }

    /// Removes the category together with every registry entry pointing at it.
    pub fn remove_category(&mut self, id: &CategoryId) -> Option<Category> {
        let mut ordered = self.take_sorted_categories();
        let Some(index) = ordered.iter().position(|c| &c.id == id) else {
            self.categories = ordered;
            return None;
        };
        let removed = ordered.remove(index);
        self.categories = ordered;
        self.registry.retain(|_, entry| &entry.category_id != id);
        self.renumber_categories();
        Some(removed)
    }

    /// Drops categories without registered channels; returns the removed ids.
    pub fn remove_empty_categories(&mut self) -> Vec<CategoryId> {
        let used: BTreeSet<CategoryId> = self
            .registry
            .values()
            .map(|entry| entry.category_id.clone())
            .collect();
        let (kept, removed): (Vec<Category>, Vec<Category>) = self
            .take_sorted_categories()
            .into_iter()
            .partition(|category| used.contains(&category.id));
        self.categories = kept;
        self.renumber_categories();
        removed.into_iter().map(|category| category.id).collect()
    }

    /// Slug of `name` that does not collide with an existing category id.
    pub fn unique_category_id(&self, name: &str) -> CategoryId {
        let base = make_slug(name);
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.categories.iter().any(|c| c.id.as_str() == candidate) {
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
        CategoryId(candidate)
    }

    fn take_sorted_categories(&mut self) -> Vec<Category> {
        let mut ordered = std::mem::take(&mut self.categories);
        ordered.sort_by_key(|c| c.order);
        ordered
    }

    /// Assigns 1..N in the current vector order; callers keep the vector sorted.
    fn renumber_categories(&mut self) {
        for (idx, category) in self.categories.iter_mut().enumerate() {
            category.order = idx as u32 + 1;
        }
    }

    fn renumber_channels(&mut self, category_id: &CategoryId) {
        let members = self.channels_in(category_id);
        self.write_positions(&members);
    }

    fn write_positions(&mut self, members: &[ChannelId]) {
        for (idx, channel_id) in members.iter().enumerate() {
            if let Some(entry) = self.registry.get_mut(channel_id) {
                entry.position = idx as u32 + 1;
            }
        }
    }
}

/// Lowercases `name` and collapses every run of characters outside
/// `[a-z0-9ㄱ-ㅎ가-힣]` into a single `-`.
pub fn make_slug(name: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for ch in name.trim().to_lowercase().chars() {
        let keep = ch.is_ascii_lowercase()
            || ch.is_ascii_digit()
            || ('ㄱ'..='ㅎ').contains(&ch)
            || ('가'..='힣').contains(&ch);
        if keep {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        format!("cat-{}", random_suffix(6))
    } else {
        slug
    }
}

pub fn random_suffix(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}
