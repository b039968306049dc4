use super::types::{EntryId, EntryPatch, JournalEntry, now_ms};

use std::sync::Arc;
use tokio::sync::RwLock;

pub struct FallbackStore {
    entries: RwLock<Vec<JournalEntry>>,
}

impl FallbackStore {
    /// Creates an empty store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates a store holding the two sample entries served before anything
    /// has been written.
    pub fn seeded() -> Arc<Self> {
        Arc::new(Self {
            entries: RwLock::new(seed_entries()),
        })
    }

    /// Returns at most `limit` entries starting at `offset`, in insertion order.
    pub async fn list(&self, limit: usize, offset: usize) -> Vec<JournalEntry> {
        self.entries
            .read()
            .await
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn append(&self, title: String, content: String) -> JournalEntry {
        let entry = JournalEntry {
            id: EntryId::new(),
            title,
            content,
            created_at: now_ms(),
            updated_at: None,
        };

        self.entries.write().await.push(entry.clone());
        tracing::debug!("Appended fallback entry {}", entry.id);

        entry
    }

    pub async fn get(&self, id: &str) -> Option<JournalEntry> {
        self.entries
            .read()
            .await
            .iter()
            .find(|entry| entry.id.0 == id)
            .cloned()
    }

    /// Shallow-merges `patch` onto the entry with the given id and stamps
    /// `updated_at`. Returns `None` without touching the store if the id is unknown.
    pub async fn update(&self, id: &str, patch: EntryPatch) -> Option<JournalEntry> {
        let mut entries = self.entries.write().await;
        let index = entries.iter().position(|entry| entry.id.0 == id)?;

        let entry = &mut entries[index];
        if let Some(title) = patch.title {
            entry.title = title;
        }
        if let Some(content) = patch.content {
            entry.content = content;
        }
        entry.updated_at = Some(now_ms());

        Some(entry.clone())
    }

    /// Removes and returns the entry with the given id.
    pub async fn remove(&self, id: &str) -> Option<JournalEntry> {
        let mut entries = self.entries.write().await;
        let index = entries.iter().position(|entry| entry.id.0 == id)?;
        Some(entries.remove(index))
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for FallbackStore {
    fn default() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

fn seed_entries() -> Vec<JournalEntry> {
    vec![
        JournalEntry {
            id: EntryId("1".to_string()),
            title: "First Entry".to_string(),
            content: "Hello World! This is my first journal entry.".to_string(),
            created_at: 1_725_451_200_000,
            updated_at: None,
        },
        JournalEntry {
            id: EntryId("2".to_string()),
            title: "Second Entry".to_string(),
            content: "Day 2 test entry - building the SwiftUI interface.".to_string(),
            created_at: 1_725_454_800_000,
            updated_at: None,
        },
    ]
}
