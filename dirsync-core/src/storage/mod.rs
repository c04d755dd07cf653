//! Persistence seams.
//!
//! The registry and the intake only see these traits. Two implementations
//! exist: PostgreSQL through [`DatabaseProcessor`] and [`MemoryStore`].
//!
//! [`DatabaseProcessor`]: crate::framework::DatabaseProcessor

mod memory;
mod postgres;

pub use memory::MemoryStore;

use crate::entities::channel::{Channel, ChannelInsert};
use crate::entities::notification::{Notification, NotificationInsert};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistent storage for subscription channels.
///
/// Implementations must make `insert` and `delete` atomic per `channel_id`.
#[async_trait]
pub trait ChannelStore: Send + Sync {
    /// Returns `None` when the `channel_id` is already stored.
    async fn insert(&self, channel: ChannelInsert) -> Result<Option<Channel>, StoreError>;
    async fn get(&self, channel_id: &str) -> Result<Option<Channel>, StoreError>;
    /// Newest first.
    async fn list(&self) -> Result<Vec<Channel>, StoreError>;
    /// Returns the removed channel, or `None` if nothing was stored.
    async fn delete(&self, channel_id: &str) -> Result<Option<Channel>, StoreError>;
}

/// Append-only storage for received notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn append(&self, notification: NotificationInsert) -> Result<Notification, StoreError>;
    /// Newest first, optionally restricted to one channel.
    async fn list(
        &self,
        limit: i64,
        offset: i64,
        channel_id: Option<String>,
    ) -> Result<Vec<Notification>, StoreError>;
    async fn count(&self) -> Result<i64, StoreError>;
}
