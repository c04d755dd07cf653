//! Channel registry.
//!
//! Owns the local record of every subscription channel we believe is live at
//! the provider. Uniqueness of `channel_id` is enforced by the store.

use crate::entities::channel::{Channel, ChannelInsert};
use crate::storage::{ChannelStore, StoreError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("channel already registered: {channel_id}")]
    DuplicateChannel { channel_id: String },

    #[error("channel not found: {channel_id}")]
    NotFound { channel_id: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct ChannelRegistry {
    store: Arc<dyn ChannelStore>,
}

impl ChannelRegistry {
    pub fn new(store: Arc<dyn ChannelStore>) -> Self {
        Self { store }
    }

    /// Store a new active channel.
    ///
    /// Fails with [`RegistryError::DuplicateChannel`] if the `channel_id` is
    /// already present, including when a concurrent insert won the race.
    pub async fn register(&self, channel: ChannelInsert) -> Result<Channel, RegistryError> {
        let channel_id = channel.channel_id.clone();
        match self.store.insert(channel).await? {
            Some(stored) => {
                debug!(channel_id = %stored.channel_id, id = stored.id, "Channel registered");
                Ok(stored)
            }
            None => {
                warn!(channel_id = %channel_id, "Rejected duplicate channel registration");
                Err(RegistryError::DuplicateChannel { channel_id })
            }
        }
    }

    pub async fn get(&self, channel_id: &str) -> Result<Channel, RegistryError> {
        self.store
            .get(channel_id)
            .await?
            .ok_or_else(|| RegistryError::NotFound {
                channel_id: channel_id.to_owned(),
            })
    }

    /// Like [`get`](Self::get), but absence is not an error.
    pub async fn find(&self, channel_id: &str) -> Result<Option<Channel>, RegistryError> {
        Ok(self.store.get(channel_id).await?)
    }

    /// All stored channels, newest first.
    pub async fn list_active(&self) -> Result<Vec<Channel>, RegistryError> {
        Ok(self.store.list().await?)
    }

    /// Delete a channel record.
    ///
    /// Not idempotent: removing an id that is already gone yields
    /// [`RegistryError::NotFound`].
    pub async fn remove(&self, channel_id: &str) -> Result<Channel, RegistryError> {
        let removed = self
            .store
            .delete(channel_id)
            .await?
            .ok_or_else(|| RegistryError::NotFound {
                channel_id: channel_id.to_owned(),
            })?;
        debug!(channel_id = %channel_id, "Channel removed");
        Ok(removed)
    }
}
