//! HTTP header names used on the wire.

/// Channel id echoed by the provider on every push.
pub const CHANNEL_ID_HEADER: &str = "X-Goog-Channel-ID";

/// Secret token we handed to the provider when the watch was created.
pub const CHANNEL_TOKEN_HEADER: &str = "X-Goog-Channel-Token";

/// Nature of the change (`sync`, `delete`, ...).
pub const RESOURCE_STATE_HEADER: &str = "X-Goog-Resource-State";

/// Per-channel message sequence number.
pub const MESSAGE_NUMBER_HEADER: &str = "X-Goog-Message-Number";

/// Plaintext admin secret carried by operator API requests.
pub const ADMIN_AUTH_HEADER: &str = "Dirsync-Admin-Authorization";
