use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::routes::ServerState;
use service::metrics::{self, DashboardView};

fn now() -> chrono::DateTime<chrono::FixedOffset> {
    chrono::Local::now().fixed_offset()
}

/// Assemble every dashboard section in one response. Sections that failed to
/// load come back as `null`; the rest render anyway.
#[utoipa::path(get, path = "/admin/dashboard", tag = "dashboard",
    responses((status = 200, description = "OK"), (status = 401, description = "Unauthorized")))]
pub async fn get_dashboard(State(state): State<ServerState>) -> Json<DashboardView> {
    Json(metrics::load_dashboard(&state.db, now()).await)
}

#[utoipa::path(post, path = "/admin/invoices/{id}/reminder", tag = "dashboard",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses((status = 200, description = "OK"), (status = 401, description = "Unauthorized")))]
pub async fn send_reminder(
    State(_state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, JsonApiError> {
    metrics::send_payment_reminder(id).await?;
    Ok(Json(serde_json::json!({"ok": true})))
}
