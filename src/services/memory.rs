//! In-memory content repository.
//!
//! A simple repository backed by a read-write-locked vector. Useful as the
//! default backend for tests and for hosts that hydrate the corpus from
//! their own storage layer before handing it to the engine.

use crate::error::{ResurfaceError, Result};
use crate::services::{ContentRepository, ItemFilter};
use crate::types::{ItemId, StoredItem};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;

/// Vector-backed repository
#[derive(Default)]
pub struct InMemoryRepository {
    items: RwLock<Vec<StoredItem>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository with an initial corpus
    pub fn with_items(items: Vec<StoredItem>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl ContentRepository for InMemoryRepository {
    async fn list<'a>(&self, filter: Option<&'a ItemFilter>) -> Result<Vec<StoredItem>> {
        let items = self.items.read().await;
        let Some(filter) = filter else {
            return Ok(items.clone());
        };

        let cutoff = filter
            .updated_within_days
            .map(|days| Utc::now() - Duration::days(i64::from(days)));

        Ok(items
            .iter()
            .filter(|item| {
                filter
                    .category
                    .map(|category| item.category == category)
                    .unwrap_or(true)
            })
            .filter(|item| cutoff.map(|c| item.updated_at >= c).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn read(&self, id: ItemId) -> Result<Option<StoredItem>> {
        let items = self.items.read().await;
        Ok(items.iter().find(|item| item.id == id).cloned())
    }

    async fn create(&self, item: StoredItem) -> Result<ItemId> {
        let mut items = self.items.write().await;
        if items.iter().any(|existing| existing.id == item.id) {
            return Err(ResurfaceError::Storage(format!(
                "item {} already exists",
                item.id
            )));
        }
        let id = item.id;
        items.push(item);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PageCategory;

    fn item(category: PageCategory, updated_days_ago: i64) -> StoredItem {
        StoredItem {
            id: ItemId::new(),
            url: "https://example.com/x".to_string(),
            title: "x".to_string(),
            content: String::new(),
            category,
            tags: vec![],
            concepts: vec![],
            importance: 5,
            access_count: 0,
            last_accessed_at: None,
            created_at: Utc::now() - Duration::days(updated_days_ago),
            updated_at: Utc::now() - Duration::days(updated_days_ago),
            size_bytes: 0,
        }
    }

    #[tokio::test]
    async fn test_create_and_read() {
        let repo = InMemoryRepository::new();
        let stored = item(PageCategory::Article, 0);
        let id = repo.create(stored.clone()).await.unwrap();

        assert_eq!(repo.read(id).await.unwrap(), Some(stored));
        assert_eq!(repo.read(ItemId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let repo = InMemoryRepository::new();
        let stored = item(PageCategory::Article, 0);
        repo.create(stored.clone()).await.unwrap();

        let err = repo.create(stored).await.unwrap_err();
        assert!(matches!(err, ResurfaceError::Storage(_)));
    }

    #[tokio::test]
    async fn test_list_honors_filter() {
        let repo = InMemoryRepository::with_items(vec![
            item(PageCategory::Article, 1),
            item(PageCategory::Documentation, 1),
            item(PageCategory::Documentation, 60),
        ]);

        let all = repo.list(None).await.unwrap();
        assert_eq!(all.len(), 3);

        let docs = repo
            .list(Some(&ItemFilter {
                category: Some(PageCategory::Documentation),
                updated_within_days: None,
            }))
            .await
            .unwrap();
        assert_eq!(docs.len(), 2);

        let fresh_docs = repo
            .list(Some(&ItemFilter {
                category: Some(PageCategory::Documentation),
                updated_within_days: Some(30),
            }))
            .await
            .unwrap();
        assert_eq!(fresh_docs.len(), 1);
    }
}
