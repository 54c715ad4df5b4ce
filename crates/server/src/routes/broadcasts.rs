use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::JsonApiError;
use crate::routes::ServerState;
use service::broadcast::{self, Audience, Draft};

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub audience: Audience,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub audience: Audience,
    pub recipients: u64,
}

/// Count the recipients a broadcast to this audience would reach. Uses the
/// same audience resolution as the send itself, so preview and delivery
/// counts always agree.
#[utoipa::path(get, path = "/admin/broadcasts/preview", tag = "broadcasts",
    params(("audience" = String, Query, description = "all, active or pending")),
    responses((status = 200, description = "OK"), (status = 401, description = "Unauthorized")))]
pub async fn preview(
    State(state): State<ServerState>,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<PreviewResponse>, JsonApiError> {
    let recipients = broadcast::preview_count(&state.db, query.audience).await?;
    Ok(Json(PreviewResponse { audience: query.audience, recipients }))
}

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub audience: Audience,
    #[serde(flatten)]
    pub draft: Draft,
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub sent: u64,
}

#[utoipa::path(post, path = "/admin/broadcasts", tag = "broadcasts",
    request_body = crate::openapi::SendRequestDoc,
    responses((status = 200, description = "OK"), (status = 400, description = "Bad Request"), (status = 401, description = "Unauthorized")))]
pub async fn send(
    State(state): State<ServerState>,
    Json(payload): Json<SendRequest>,
) -> Result<Json<SendResponse>, JsonApiError> {
    let sent = broadcast::send_broadcast(&state.db, payload.audience, &payload.draft).await?;
    Ok(Json(SendResponse { sent }))
}
