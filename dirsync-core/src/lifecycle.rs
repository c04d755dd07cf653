//! Lifecycle coordinator.
//!
//! Drives a channel through its phases:
//!
//! ```text
//! Requested --start_watch ok--> Active --end_watch--> Retiring --stop_watch ok--> Retired
//! ```
//!
//! No lock is held across provider calls. A failed stop leaves the channel in
//! `Retiring` with its record still in the registry so the stop can be retried;
//! dropping the record would leave a remote subscription with no local trace.

use crate::directory::{ChannelDescriptor, DirectoryWatchClient, ProviderError};
use crate::entities::channel::{Channel, ChannelInsert};
use crate::registry::{ChannelRegistry, RegistryError};
use crate::storage::StoreError;
use dirsync_sdk::objects::DirectoryEvent;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Where a channel is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelPhase {
    Requested,
    Active,
    Retiring,
    Retired,
}

impl ChannelPhase {
    /// The only phase reachable from this one, if any.
    pub fn next(self) -> Option<ChannelPhase> {
        match self {
            ChannelPhase::Requested => Some(ChannelPhase::Active),
            ChannelPhase::Active => Some(ChannelPhase::Retiring),
            ChannelPhase::Retiring => Some(ChannelPhase::Retired),
            ChannelPhase::Retired => None,
        }
    }

    pub fn can_transition_to(self, to: ChannelPhase) -> bool {
        self.next() == Some(to)
    }
}

impl std::fmt::Display for ChannelPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelPhase::Requested => write!(f, "requested"),
            ChannelPhase::Active => write!(f, "active"),
            ChannelPhase::Retiring => write!(f, "retiring"),
            ChannelPhase::Retired => write!(f, "retired"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The provider call failed; `phase` is where the channel was left.
    #[error("{source} while channel was {phase}")]
    Provider {
        phase: ChannelPhase,
        #[source]
        source: ProviderError,
    },

    #[error("unknown channel: {channel_id}")]
    UnknownChannel { channel_id: String },

    #[error("channel already registered: {channel_id}")]
    DuplicateChannel { channel_id: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<RegistryError> for LifecycleError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::DuplicateChannel { channel_id } => {
                LifecycleError::DuplicateChannel { channel_id }
            }
            RegistryError::NotFound { channel_id } => LifecycleError::UnknownChannel { channel_id },
            RegistryError::Store(e) => LifecycleError::Store(e),
        }
    }
}

#[derive(Clone)]
pub struct LifecycleCoordinator {
    directory: Arc<dyn DirectoryWatchClient>,
    registry: ChannelRegistry,
}

fn transition(channel_id: &str, from: ChannelPhase, to: ChannelPhase) {
    debug_assert!(from.can_transition_to(to), "invalid transition {from} -> {to}");
    debug!(channel_id = %channel_id, from = %from, to = %to, "Channel phase transition");
}

impl LifecycleCoordinator {
    pub fn new(directory: Arc<dyn DirectoryWatchClient>, registry: ChannelRegistry) -> Self {
        Self {
            directory,
            registry,
        }
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Create a watch at the provider and register the resulting channel.
    ///
    /// Nothing is persisted when the provider call fails.
    pub async fn begin_watch(&self, event: DirectoryEvent) -> Result<Channel, LifecycleError> {
        debug!(event = %event, "Requesting watch");

        let descriptor = self.directory.start_watch(event).await.map_err(|source| {
            warn!(event = %event, error = %source, "Watch request failed");
            LifecycleError::Provider {
                phase: ChannelPhase::Requested,
                source,
            }
        })?;

        let insert = ChannelInsert {
            channel_id: descriptor.channel_id.clone(),
            resource_id: descriptor.resource_id.clone(),
            resource_uri: descriptor.resource_uri.clone(),
            event: descriptor.event.into(),
            token: descriptor.token.clone(),
            expiration: descriptor.expiration,
        };

        match self.registry.register(insert).await {
            Ok(channel) => {
                transition(&channel.channel_id, ChannelPhase::Requested, ChannelPhase::Active);
                info!(
                    channel_id = %channel.channel_id,
                    resource_id = %channel.resource_id,
                    event = %event,
                    expiration = ?channel.expiration,
                    "Channel active"
                );
                Ok(channel)
            }
            Err(RegistryError::Store(e)) => {
                error!(
                    channel_id = %descriptor.channel_id,
                    error = %e,
                    "Failed to register channel created at provider"
                );
                self.discard_remote(&descriptor).await;
                Err(LifecycleError::Store(e))
            }
            Err(e @ RegistryError::DuplicateChannel { .. }) => {
                // The remote channel belongs to the stored record and stays up.
                error!(
                    channel_id = %descriptor.channel_id,
                    resource_id = %descriptor.resource_id,
                    error = %e,
                    "Provider returned a channel id that is already registered"
                );
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Stop a channel at the provider, then drop its record.
    ///
    /// With `force`, a failed stop is logged and the record is dropped
    /// anyway. Without it the record is kept so the stop can be retried.
    pub async fn end_watch(
        &self,
        channel_id: &str,
        force: bool,
    ) -> Result<Channel, LifecycleError> {
        let channel = self.registry.get(channel_id).await?;
        transition(channel_id, ChannelPhase::Active, ChannelPhase::Retiring);

        if let Err(source) = self
            .directory
            .stop_watch(&channel.channel_id, &channel.resource_id)
            .await
        {
            if !force {
                warn!(
                    channel_id = %channel_id,
                    error = %source,
                    "Stop request failed, channel record kept for retry"
                );
                return Err(LifecycleError::Provider {
                    phase: ChannelPhase::Retiring,
                    source,
                });
            }
            warn!(
                channel_id = %channel_id,
                error = %source,
                "Stop request failed, removing channel record as forced"
            );
        }

        let retired = self.registry.remove(channel_id).await?;
        transition(channel_id, ChannelPhase::Retiring, ChannelPhase::Retired);
        info!(channel_id = %channel_id, "Channel retired");
        Ok(retired)
    }

    /// All registered channels, newest first.
    pub async fn list_channels(&self) -> Result<Vec<Channel>, LifecycleError> {
        Ok(self.registry.list_active().await?)
    }

    /// Best-effort stop of a remote channel we could not record locally.
    async fn discard_remote(&self, descriptor: &ChannelDescriptor) {
        match self
            .directory
            .stop_watch(&descriptor.channel_id, &descriptor.resource_id)
            .await
        {
            Ok(()) => info!(
                channel_id = %descriptor.channel_id,
                "Stopped unregistered remote channel"
            ),
            Err(e) => error!(
                channel_id = %descriptor.channel_id,
                resource_id = %descriptor.resource_id,
                error = %e,
                "Unregistered remote channel could not be stopped"
            ),
        }
    }
}
