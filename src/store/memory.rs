//! In-memory grid item store

use super::traits::{GridItemStore, StoreError};
use async_trait::async_trait;
use grid_dispatch_shared::{defaults, now_ms, GridItem, NewGridItem};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Holds grid items keyed by id, enforcing one item per position
pub struct InMemoryGridStore {
    items: Arc<RwLock<HashMap<i64, GridItem>>>,
    next_id: AtomicI64,
}

impl InMemoryGridStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicI64::new(0),
        }
    }

    /// Insert a new grid item, assigning its id and creation time
    pub async fn create(&self, input: NewGridItem) -> Result<GridItem, StoreError> {
        if !(defaults::MIN_POSITION..=defaults::MAX_POSITION).contains(&input.position) {
            return Err(StoreError::InvalidPosition(input.position));
        }
        if input.title.trim().is_empty() {
            return Err(StoreError::EmptyTitle);
        }

        // Hold the write lock across the check so two creates can't share a position
        let mut items = self.items.write().await;
        if items.values().any(|item| item.position == input.position) {
            return Err(StoreError::PositionOccupied(input.position));
        }

        let item = GridItem {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            position: input.position,
            title: input.title,
            command: input.command,
            created_at: now_ms(),
        };
        items.insert(item.id, item.clone());

        debug!(
            "[STORE] Created grid item {} at position {}",
            item.id, item.position
        );
        Ok(item)
    }

    /// All items ordered by grid position
    pub async fn list(&self) -> Vec<GridItem> {
        let items = self.items.read().await;
        let mut list: Vec<GridItem> = items.values().cloned().collect();
        list.sort_by_key(|item| item.position);
        list
    }

    /// Remove an item, freeing its position
    #[cfg(test)]
    pub async fn remove(&self, id: i64) -> Option<GridItem> {
        self.items.write().await.remove(&id)
    }

    /// Get the number of stored items
    pub async fn count(&self) -> usize {
        self.items.read().await.len()
    }
}

impl Default for InMemoryGridStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GridItemStore for InMemoryGridStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<GridItem>, StoreError> {
        Ok(self.items.read().await.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_item(position: u8, title: &str, command: &str) -> NewGridItem {
        NewGridItem {
            position,
            title: title.into(),
            command: command.into(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_ids() {
        let store = InMemoryGridStore::new();

        let first = store.create(new_item(1, "Top Left", "img-1")).await.unwrap();
        let second = store.create(new_item(2, "Top Center", "img-2")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(first.created_at > 0);
        assert_eq!(store.count().await, 2);
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let store = InMemoryGridStore::new();
        let created = store
            .create(new_item(5, "Center Item", "img-center"))
            .await
            .unwrap();

        let found = store.find_by_id(created.id).await.unwrap();
        assert_eq!(found, Some(created));
        assert_eq!(store.find_by_id(999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_position_must_be_unique() {
        let store = InMemoryGridStore::new();
        store.create(new_item(3, "First", "img-3")).await.unwrap();

        let result = store.create(new_item(3, "Second", "img-3b")).await;
        let err = result.unwrap_err();
        assert!(matches!(err, StoreError::PositionOccupied(3)));
        assert_eq!(err.to_string(), "Grid position 3 is already occupied");
    }

    #[tokio::test]
    async fn test_position_range() {
        let store = InMemoryGridStore::new();
        assert!(matches!(
            store.create(new_item(0, "Zero", "x")).await,
            Err(StoreError::InvalidPosition(0))
        ));
        assert!(matches!(
            store.create(new_item(10, "Ten", "x")).await,
            Err(StoreError::InvalidPosition(10))
        ));
        assert!(store.create(new_item(9, "Bottom Right", "img-9")).await.is_ok());
    }

    #[tokio::test]
    async fn test_empty_title_rejected() {
        let store = InMemoryGridStore::new();
        assert!(matches!(
            store.create(new_item(1, "  ", "img-1")).await,
            Err(StoreError::EmptyTitle)
        ));
    }

    #[tokio::test]
    async fn test_list_ordered_by_position() {
        let store = InMemoryGridStore::new();
        for position in [7, 2, 9, 1] {
            store
                .create(new_item(position, &format!("Item {}", position), "cmd"))
                .await
                .unwrap();
        }

        let positions: Vec<u8> = store
            .list()
            .await
            .iter()
            .map(|i| i.position)
            .collect();
        assert_eq!(positions, vec![1, 2, 7, 9]);
    }

    #[tokio::test]
    async fn test_remove_frees_position() {
        let store = InMemoryGridStore::new();
        let item = store.create(new_item(4, "Left", "img-4")).await.unwrap();

        assert_eq!(store.remove(item.id).await, Some(item.clone()));
        assert_eq!(store.find_by_id(item.id).await.unwrap(), None);
        assert!(store.create(new_item(4, "Left Again", "img-4")).await.is_ok());
    }
}
