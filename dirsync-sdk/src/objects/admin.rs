//! Operator API request and response types.

use serde::{Deserialize, Serialize};

use super::directory::{DirectoryEvent, ResourceState};

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// An active subscription channel.
///
/// The channel token is a secret and is never part of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelResponse {
    pub id: i64,
    pub channel_id: String,
    pub resource_id: String,
    pub resource_uri: Option<String>,
    pub event: DirectoryEvent,
    /// Unix timestamp in seconds.
    pub expiration: Option<i64>,
    /// Whether `expiration` has already passed.
    pub expired: bool,
    pub created_at: i64,
}

/// A received push notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub id: i64,
    pub channel_id: String,
    pub state: ResourceState,
    pub sequence_number: i64,
    pub subject_id: String,
    pub subject_email: String,
    pub received_at: i64,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `POST /channels/watch`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchRequest {
    #[serde(default)]
    pub event: DirectoryEvent,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Query parameters of `POST /channels/{channel_id}/stop`.
///
/// `force` drops the local record even when the provider refuses the stop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StopQuery {
    #[serde(default)]
    pub force: bool,
}

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;
const MAX_OFFSET: i64 = 100_000;

/// Query parameters for listing notifications.
#[derive(Debug, Clone, Deserialize)]
pub struct ListNotificationsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub channel_id: Option<String>,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// Clamp limit and offset to safe maximums.
pub fn clamp_pagination(limit: i64, offset: i64) -> (i64, i64) {
    (limit.clamp(1, MAX_LIMIT), offset.clamp(0, MAX_OFFSET))
}
