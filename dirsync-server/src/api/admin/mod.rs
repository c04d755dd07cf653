//! Admin API handlers.
//!
//! These endpoints are called by the operator and require the
//! `Dirsync-Admin-Authorization` header with the plaintext admin secret.
//!
//! # Endpoints
//!
//! - `GET    /channels`              – list registered channels
//! - `POST   /channels/watch`        – start a watch at the provider
//! - `POST   /channels/{channel_id}/stop` – stop a watch and drop its record
//! - `GET    /notifications`         – list received notifications (paginated)

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use dirsync_core::entities::channel::Channel;
use dirsync_core::entities::notification::Notification;
use dirsync_core::lifecycle::LifecycleError;
use dirsync_core::storage::StoreError;
use dirsync_sdk::objects::admin::{ChannelResponse, NotificationResponse};
use time::OffsetDateTime;

use crate::state::AppState;

mod begin_watch;
mod end_watch;
mod list_channels;
mod list_notifications;

/// Build the Admin API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/channels", get(list_channels::list_channels))
        .route("/channels/watch", post(begin_watch::begin_watch))
        .route("/channels/{channel_id}/stop", post(end_watch::end_watch))
        .route(
            "/notifications",
            get(list_notifications::list_notifications),
        )
}

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

/// Errors that can occur in Admin API handlers.
#[derive(Debug)]
pub(crate) enum AdminApiError {
    Lifecycle(LifecycleError),
    Store(StoreError),
}

impl From<LifecycleError> for AdminApiError {
    fn from(e: LifecycleError) -> Self {
        AdminApiError::Lifecycle(e)
    }
}

impl From<StoreError> for AdminApiError {
    fn from(e: StoreError) -> Self {
        AdminApiError::Store(e)
    }
}

fn internal_error(e: &dyn std::error::Error) -> axum::response::Response {
    tracing::error!(error = %e, "Admin API storage error");
    (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
}

impl IntoResponse for AdminApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AdminApiError::Lifecycle(LifecycleError::Provider { phase, source }) => {
                // Provider failures are surfaced to the operator verbatim.
                (
                    StatusCode::BAD_GATEWAY,
                    format!("provider call failed while channel was {phase}: {source}"),
                )
                    .into_response()
            }
            AdminApiError::Lifecycle(LifecycleError::UnknownChannel { channel_id }) => (
                StatusCode::NOT_FOUND,
                format!("unknown channel: {channel_id}"),
            )
                .into_response(),
            AdminApiError::Lifecycle(LifecycleError::DuplicateChannel { channel_id }) => (
                StatusCode::CONFLICT,
                format!("channel already registered: {channel_id}"),
            )
                .into_response(),
            AdminApiError::Lifecycle(LifecycleError::Store(e)) | AdminApiError::Store(e) => {
                internal_error(&e)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

pub(crate) fn channel_to_response(c: &Channel, now: OffsetDateTime) -> ChannelResponse {
    ChannelResponse {
        id: c.id,
        channel_id: c.channel_id.clone(),
        resource_id: c.resource_id.clone(),
        resource_uri: c.resource_uri.clone(),
        event: c.event.into(),
        expiration: c.expiration.map(|t| t.unix_timestamp()),
        expired: c.is_expired(now),
        created_at: c.created_at.unix_timestamp(),
    }
}

pub(crate) fn notification_to_response(n: &Notification) -> NotificationResponse {
    NotificationResponse {
        id: n.id,
        channel_id: n.channel_id.clone(),
        state: n.state.clone(),
        sequence_number: n.sequence_number,
        subject_id: n.subject_id.clone(),
        subject_email: n.subject_email.clone(),
        received_at: n.received_at.unix_timestamp(),
    }
}
