use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use dirsync_sdk::objects::admin::StopQuery;
use time::OffsetDateTime;

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::{AdminApiError, channel_to_response};

/// `POST /channels/{channel_id}/stop`: stop the channel at the provider and
/// drop its record.
///
/// If the provider refuses, the record is kept and `502` is returned so the
/// call can be repeated. `?force=true` drops the record regardless.
pub async fn end_watch(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Path(channel_id): Path<String>,
    Query(query): Query<StopQuery>,
) -> Result<impl IntoResponse, AdminApiError> {
    let retired = state
        .coordinator
        .end_watch(&channel_id, query.force)
        .await?;
    Ok(Json(channel_to_response(&retired, OffsetDateTime::now_utc())))
}
