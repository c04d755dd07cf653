//! Push notification receiver.
//!
//! Store failures answer 500 so the provider redelivers. Malformed pushes
//! answer 400.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dirsync_core::intake::IntakeError;

use crate::api::extractors::PushMetadata;
use crate::state::AppState;

/// `POST /receive`: record one push notification.
pub async fn receive(
    State(state): State<AppState>,
    PushMetadata(headers): PushMetadata,
    body: Bytes,
) -> Response {
    match state.intake.accept(&body, headers).await {
        Ok(_) => (StatusCode::OK, "ok").into_response(),
        Err(IntakeError::Malformed(reason)) => {
            (StatusCode::BAD_REQUEST, reason.to_string()).into_response()
        }
        Err(IntakeError::Store(e)) => {
            tracing::error!(error = %e, "Failed to store push notification");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
        }
    }
}
