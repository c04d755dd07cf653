use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use dirsync_sdk::objects::admin::{ListNotificationsQuery, clamp_pagination};

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::{AdminApiError, notification_to_response};

/// `GET /notifications`: list received notifications with pagination and an
/// optional channel filter.
pub async fn list_notifications(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<impl IntoResponse, AdminApiError> {
    let (limit, offset) = clamp_pagination(query.limit, query.offset);

    let notifications = state
        .intake
        .list(limit, offset, query.channel_id)
        .await?;

    let response: Vec<_> = notifications.iter().map(notification_to_response).collect();
    Ok(Json(response))
}
