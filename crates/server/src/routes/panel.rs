use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::routes::ServerState;
use service::panel::{self, PanelOverview};

/// The client dashboard: header stats plus recent services and invoices.
#[utoipa::path(get, path = "/clients/{id}/panel", tag = "panel",
    params(("id" = Uuid, Path, description = "Client id")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get_overview(
    State(state): State<ServerState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<PanelOverview>, JsonApiError> {
    let overview = panel::load_overview(&state.db, client_id).await?;
    Ok(Json(overview))
}

#[utoipa::path(get, path = "/clients/{id}/services", tag = "panel",
    params(("id" = Uuid, Path, description = "Client id")),
    responses((status = 200, description = "OK")))]
pub async fn list_services(
    State(state): State<ServerState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<Vec<models::service::Model>>, JsonApiError> {
    let services = panel::client_services(&state.db, client_id).await?;
    Ok(Json(services))
}

#[utoipa::path(get, path = "/clients/{id}/invoices", tag = "panel",
    params(("id" = Uuid, Path, description = "Client id")),
    responses((status = 200, description = "OK")))]
pub async fn list_invoices(
    State(state): State<ServerState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<Vec<models::invoice::Model>>, JsonApiError> {
    let invoices = panel::client_invoices(&state.db, client_id).await?;
    Ok(Json(invoices))
}
