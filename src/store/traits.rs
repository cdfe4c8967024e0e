//! Storage boundary required by the dispatch core

use async_trait::async_trait;
use grid_dispatch_shared::GridItem;
use thiserror::Error;

/// Failures raised by a grid item store
///
/// A missing item is not an error: lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("Grid position {0} is outside 1-9")]
    InvalidPosition(u8),

    #[error("Grid position {0} is already occupied")]
    PositionOccupied(u8),

    #[error("Grid item title must not be empty")]
    EmptyTitle,
}

/// Single-item lookup the dispatcher needs from persistence
#[async_trait]
pub trait GridItemStore: Send + Sync {
    /// Find a grid item by id, `Ok(None)` when there is none
    async fn find_by_id(&self, id: i64) -> Result<Option<GridItem>, StoreError>;
}
