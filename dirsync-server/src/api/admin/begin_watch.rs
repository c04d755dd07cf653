use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use dirsync_sdk::objects::admin::WatchRequest;
use time::OffsetDateTime;

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::{AdminApiError, channel_to_response};

/// `POST /channels/watch`: open a new watch channel at the provider.
///
/// The body is optional; without one the `delete` event is watched.
/// Responds `201` with the registered channel. Provider failures map to `502`.
pub async fn begin_watch(
    State(state): State<AppState>,
    _auth: AdminAuth,
    request: Option<Json<WatchRequest>>,
) -> Result<impl IntoResponse, AdminApiError> {
    let Json(request) = request.unwrap_or_default();
    let channel = state.coordinator.begin_watch(request.event).await?;

    Ok((
        StatusCode::CREATED,
        Json(channel_to_response(&channel, OffsetDateTime::now_utc())),
    ))
}
