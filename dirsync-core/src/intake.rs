//! Notification intake.
//!
//! Validates the shape of an inbound push and appends it to the notification
//! store. Delivery metadata comes from headers, the affected user from the
//! body. Correlation with the channel registry is audit-only: pushes for
//! unknown or retired channels are stored like any other.

use crate::entities::notification::{Notification, NotificationInsert};
use crate::registry::ChannelRegistry;
use crate::storage::{NotificationStore, StoreError};
use dirsync_sdk::headers::{CHANNEL_ID_HEADER, MESSAGE_NUMBER_HEADER, RESOURCE_STATE_HEADER};
use dirsync_sdk::objects::{DirectoryUserPayload, PayloadError, ResourceState};
use std::sync::Arc;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, warn};

/// Raw push headers, as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushHeaders {
    pub channel_id: Option<String>,
    pub channel_token: Option<String>,
    pub resource_state: Option<String>,
    pub message_number: Option<String>,
}

/// Why a push was rejected before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedPayload {
    #[error("missing header {0}")]
    MissingHeader(&'static str),

    #[error("invalid header {header}: {value:?}")]
    InvalidHeader { header: &'static str, value: String },

    #[error(transparent)]
    Body(#[from] PayloadError),
}

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("malformed payload: {0}")]
    Malformed(#[from] MalformedPayload),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct NotificationIntake {
    notifications: Arc<dyn NotificationStore>,
    registry: ChannelRegistry,
}

fn required(value: Option<String>, header: &'static str) -> Result<String, MalformedPayload> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(MalformedPayload::MissingHeader(header))
}

impl NotificationIntake {
    pub fn new(notifications: Arc<dyn NotificationStore>, registry: ChannelRegistry) -> Self {
        Self {
            notifications,
            registry,
        }
    }

    /// Validate and record one push.
    ///
    /// Exactly one append per accepted call; nothing is written on rejection.
    pub async fn accept(
        &self,
        body: &[u8],
        headers: PushHeaders,
    ) -> Result<Notification, IntakeError> {
        let insert = match Self::parse(body, &headers) {
            Ok(insert) => insert,
            Err(reason) => {
                warn!(
                    channel_id = ?headers.channel_id,
                    reason = %reason,
                    "Rejected malformed push notification"
                );
                return Err(reason.into());
            }
        };

        self.audit(&insert.channel_id, headers.channel_token.as_deref())
            .await;

        let stored = self.notifications.append(insert).await?;
        info!(
            id = stored.id,
            channel_id = %stored.channel_id,
            state = %stored.state,
            sequence_number = stored.sequence_number,
            "Push notification recorded"
        );
        Ok(stored)
    }

    /// Recorded notifications, newest first.
    pub async fn list(
        &self,
        limit: i64,
        offset: i64,
        channel_id: Option<String>,
    ) -> Result<Vec<Notification>, StoreError> {
        self.notifications.list(limit, offset, channel_id).await
    }

    fn parse(body: &[u8], headers: &PushHeaders) -> Result<NotificationInsert, MalformedPayload> {
        let channel_id = required(headers.channel_id.clone(), CHANNEL_ID_HEADER)?;
        let state = required(headers.resource_state.clone(), RESOURCE_STATE_HEADER)?;
        let number = required(headers.message_number.clone(), MESSAGE_NUMBER_HEADER)?;
        let sequence_number =
            number
                .trim()
                .parse::<i64>()
                .map_err(|_| MalformedPayload::InvalidHeader {
                    header: MESSAGE_NUMBER_HEADER,
                    value: number.clone(),
                })?;

        let user = DirectoryUserPayload::parse(body)?.validate()?;

        Ok(NotificationInsert {
            channel_id,
            state: ResourceState::from(state.trim()),
            sequence_number,
            subject_id: user.id,
            subject_email: user.primary_email,
            received_at: OffsetDateTime::now_utc(),
        })
    }

    /// Log pushes that do not match a registered channel. Never rejects.
    async fn audit(&self, channel_id: &str, token: Option<&str>) {
        match self.registry.find(channel_id).await {
            Ok(Some(channel)) if token != Some(channel.token.as_str()) => {
                warn!(channel_id = %channel_id, "Push token does not match registered channel");
            }
            Ok(Some(_)) => {}
            Ok(None) => {
                warn!(channel_id = %channel_id, "Push for unknown or retired channel");
            }
            Err(e) => {
                warn!(channel_id = %channel_id, error = %e, "Channel lookup failed during intake");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::WatchedEvent;
    use crate::entities::channel::ChannelInsert;
    use crate::storage::MemoryStore;
    use dirsync_sdk::objects::DirectoryEvent;

    fn intake() -> (NotificationIntake, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let registry = ChannelRegistry::new(store.clone());
        (NotificationIntake::new(store.clone(), registry), store)
    }

    fn headers(channel_id: &str, state: &str, number: &str) -> PushHeaders {
        PushHeaders {
            channel_id: Some(channel_id.to_string()),
            channel_token: Some("token".to_string()),
            resource_state: Some(state.to_string()),
            message_number: Some(number.to_string()),
        }
    }

    const BODY: &[u8] = br#"{"id":"u1","primaryEmail":"a@x.com"}"#;

    #[tokio::test]
    async fn test_accept_records_notification() {
        let (intake, store) = intake();
        store_channel(&store, "c1").await;

        let n = intake
            .accept(BODY, headers("c1", "delete", "1"))
            .await
            .unwrap();

        assert_eq!(n.channel_id, "c1");
        assert_eq!(n.state, ResourceState::Event(DirectoryEvent::Delete));
        assert_eq!(n.sequence_number, 1);
        assert_eq!(n.subject_id, "u1");
        assert_eq!(n.subject_email, "a@x.com");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_malformed_payload_rejected_repeatedly_without_writes() {
        let (intake, store) = intake();
        let body = br#"{"id":"u1"}"#;

        for _ in 0..2 {
            let err = intake
                .accept(body, headers("c1", "delete", "1"))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                IntakeError::Malformed(MalformedPayload::Body(PayloadError::MissingField(
                    "primaryEmail"
                )))
            ));
        }
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_channel_still_accepted() {
        let (intake, store) = intake();

        intake
            .accept(BODY, headers("never-registered", "delete", "3"))
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_token_mismatch_still_accepted() {
        let (intake, store) = intake();
        store_channel(&store, "c1").await;
        let mut headers = headers("c1", "delete", "1");
        headers.channel_token = Some("forged".to_string());

        intake.accept(BODY, headers).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_redelivery_is_stored_twice() {
        let (intake, store) = intake();
        intake.accept(BODY, headers("c1", "delete", "5")).await.unwrap();
        intake.accept(BODY, headers("c1", "delete", "5")).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);

        let listed = intake.list(10, 0, Some("c1".to_string())).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].id > listed[1].id);
    }

    #[tokio::test]
    async fn test_header_validation() {
        let (intake, store) = intake();

        let mut missing_state = headers("c1", "delete", "1");
        missing_state.resource_state = None;
        assert!(matches!(
            intake.accept(BODY, missing_state).await,
            Err(IntakeError::Malformed(MalformedPayload::MissingHeader(
                RESOURCE_STATE_HEADER
            )))
        ));

        let mut blank_channel = headers("c1", "delete", "1");
        blank_channel.channel_id = Some(" ".to_string());
        assert!(matches!(
            intake.accept(BODY, blank_channel).await,
            Err(IntakeError::Malformed(MalformedPayload::MissingHeader(
                CHANNEL_ID_HEADER
            )))
        ));

        assert!(matches!(
            intake.accept(BODY, headers("c1", "delete", "one")).await,
            Err(IntakeError::Malformed(MalformedPayload::InvalidHeader { .. }))
        ));

        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unrecognised_state_kept_verbatim() {
        let (intake, _store) = intake();
        let n = intake
            .accept(BODY, headers("c1", "suspend", "2"))
            .await
            .unwrap();
        assert_eq!(n.state, ResourceState::Other("suspend".to_string()));
    }

    async fn store_channel(store: &MemoryStore, channel_id: &str) {
        crate::storage::ChannelStore::insert(
            store,
            ChannelInsert {
                channel_id: channel_id.to_string(),
                resource_id: "r1".to_string(),
                resource_uri: None,
                event: WatchedEvent::Delete,
                token: "token".to_string(),
                expiration: None,
            },
        )
        .await
        .unwrap();
    }
}
