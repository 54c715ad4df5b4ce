use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::routes::ServerState;
use service::feed::{self, FeedView};

/// The customer-facing notification feed: latest items newest-first with the
/// unread badge already computed.
#[utoipa::path(get, path = "/clients/{id}/notifications", tag = "notifications",
    params(("id" = Uuid, Path, description = "Client id")),
    responses((status = 200, description = "OK")))]
pub async fn get_feed(
    State(state): State<ServerState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<FeedView>, JsonApiError> {
    let view = feed::load_feed(&state.db, client_id, feed::now_fixed()).await?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct MarkReadQuery {
    pub client_id: Uuid,
}

/// Mark one notification read and return the reloaded feed.
#[utoipa::path(post, path = "/notifications/{id}/read", tag = "notifications",
    params(
        ("id" = Uuid, Path, description = "Notification id"),
        ("client_id" = Uuid, Query, description = "Owning client, for the reload"),
    ),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn mark_read(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(query): Query<MarkReadQuery>,
) -> Result<Json<FeedView>, JsonApiError> {
    let view =
        feed::mark_read_and_reload(&state.db, query.client_id, id, feed::now_fixed()).await?;
    Ok(Json(view))
}

/// Mark every unread notification read and return the reloaded feed.
#[utoipa::path(post, path = "/clients/{id}/notifications/read-all", tag = "notifications",
    params(("id" = Uuid, Path, description = "Client id")),
    responses((status = 200, description = "OK")))]
pub async fn mark_all_read(
    State(state): State<ServerState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<FeedView>, JsonApiError> {
    let view = feed::mark_all_read_and_reload(&state.db, client_id, feed::now_fixed()).await?;
    Ok(Json(view))
}
