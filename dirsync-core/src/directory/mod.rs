//! Directory watch client.
//!
//! The provider's subscription protocol behind a trait, so the lifecycle
//! coordinator never talks HTTP itself.

mod google;

pub use google::GoogleDirectoryClient;

use async_trait::async_trait;
use dirsync_sdk::objects::DirectoryEvent;
use thiserror::Error;
use time::OffsetDateTime;

/// Any failure reported by, or while reaching, the directory provider.
///
/// `status` is the HTTP status when the provider answered at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("provider error: {message} (status {status:?})")]
pub struct ProviderError {
    pub status: Option<u16>,
    pub message: String,
}

impl ProviderError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        Self {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

/// A channel as created by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDescriptor {
    pub channel_id: String,
    pub resource_id: String,
    pub resource_uri: Option<String>,
    pub event: DirectoryEvent,
    pub token: String,
    pub expiration: Option<OffsetDateTime>,
}

#[async_trait]
pub trait DirectoryWatchClient: Send + Sync {
    /// Ask the provider to start pushing `event` notifications.
    async fn start_watch(&self, event: DirectoryEvent) -> Result<ChannelDescriptor, ProviderError>;

    /// Ask the provider to stop pushing on a channel.
    async fn stop_watch(&self, channel_id: &str, resource_id: &str) -> Result<(), ProviderError>;
}
