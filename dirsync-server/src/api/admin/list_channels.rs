use axum::{Json, extract::State, response::IntoResponse};
use time::OffsetDateTime;

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::{AdminApiError, channel_to_response};

/// `GET /channels`: list registered channels, newest first.
pub async fn list_channels(
    State(state): State<AppState>,
    _auth: AdminAuth,
) -> Result<impl IntoResponse, AdminApiError> {
    let channels = state.coordinator.list_channels().await?;

    let now = OffsetDateTime::now_utc();
    let response: Vec<_> = channels
        .iter()
        .map(|c| channel_to_response(c, now))
        .collect();
    Ok(Json(response))
}
