use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::JsonApiError;
use crate::routes::ServerState;
use service::services::{self, ServiceFilter, ServiceTable};

#[derive(Debug, Deserialize, Default)]
pub struct ServiceListQuery {
    pub category: Option<String>,
    pub status: Option<String>,
}

/// List contracted services, optionally narrowed by category and status.
/// The stats block always covers the whole collection.
#[utoipa::path(get, path = "/admin/services", tag = "services",
    params(
        ("category" = Option<String>, Query, description = "Exact category match"),
        ("status" = Option<String>, Query, description = "active, paused or cancelled"),
    ),
    responses((status = 200, description = "OK"), (status = 401, description = "Unauthorized")))]
pub async fn list_services(
    State(state): State<ServerState>,
    Query(query): Query<ServiceListQuery>,
) -> Result<Json<ServiceTable>, JsonApiError> {
    let filter = ServiceFilter { category: query.category, status: query.status };
    let table = services::load_service_table(&state.db, &filter).await?;
    Ok(Json(table))
}
