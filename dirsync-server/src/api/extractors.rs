//! Custom Axum extractors.
//!
//! Provides:
//! - `AdminAuth` checks the `Dirsync-Admin-Authorization` header against the
//!   argon2 hash of the admin secret.
//! - `PushMetadata` collects the provider's push headers without rejecting;
//!   validation happens in the intake so that every rejection is logged there.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use dirsync_core::intake::PushHeaders;
use dirsync_sdk::headers::{
    ADMIN_AUTH_HEADER, CHANNEL_ID_HEADER, CHANNEL_TOKEN_HEADER, MESSAGE_NUMBER_HEADER,
    RESOURCE_STATE_HEADER,
};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// AdminAuth
// ---------------------------------------------------------------------------

/// Proof that the request carried the admin secret.
///
/// ```text
/// Dirsync-Admin-Authorization: {plaintext_admin_secret}
/// ```
pub struct AdminAuth;

/// Errors returned by the [`AdminAuth`] extractor.
#[derive(Debug)]
pub enum AdminAuthError {
    MissingHeader,
    InvalidHeader,
    WrongSecret,
}

impl IntoResponse for AdminAuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AdminAuthError::MissingHeader => "missing Dirsync-Admin-Authorization header",
            AdminAuthError::InvalidHeader => "invalid Dirsync-Admin-Authorization header",
            AdminAuthError::WrongSecret => "invalid admin secret",
        };
        (StatusCode::UNAUTHORIZED, message).into_response()
    }
}

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AdminAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let secret = parts
            .headers
            .get(ADMIN_AUTH_HEADER)
            .ok_or(AdminAuthError::MissingHeader)?
            .to_str()
            .map_err(|_| AdminAuthError::InvalidHeader)?;

        let admin = state.config.admin.read().await;
        if admin.verify_secret(secret) {
            Ok(AdminAuth)
        } else {
            drop(admin);
            tracing::warn!("Rejected admin request with wrong secret");
            Err(AdminAuthError::WrongSecret)
        }
    }
}

// ---------------------------------------------------------------------------
// PushMetadata
// ---------------------------------------------------------------------------

/// The `X-Goog-*` headers of a push delivery, as sent.
///
/// Headers that are absent or not valid UTF-8 come through as `None`.
pub struct PushMetadata(pub PushHeaders);

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

impl From<&HeaderMap> for PushMetadata {
    fn from(headers: &HeaderMap) -> Self {
        PushMetadata(PushHeaders {
            channel_id: header(headers, CHANNEL_ID_HEADER),
            channel_token: header(headers, CHANNEL_TOKEN_HEADER),
            resource_state: header(headers, RESOURCE_STATE_HEADER),
            message_number: header(headers, MESSAGE_NUMBER_HEADER),
        })
    }
}

impl<S: Send + Sync> FromRequestParts<S> for PushMetadata {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(PushMetadata::from(&parts.headers))
    }
}
