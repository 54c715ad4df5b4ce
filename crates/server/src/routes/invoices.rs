use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::JsonApiError;
use crate::routes::ServerState;
use service::invoices::{self, InvoiceTable};

#[derive(Debug, Deserialize, Default)]
pub struct InvoiceListQuery {
    pub status: Option<String>,
}

#[utoipa::path(get, path = "/admin/invoices", tag = "invoices",
    params(("status" = Option<String>, Query, description = "paid or pending")),
    responses((status = 200, description = "OK"), (status = 401, description = "Unauthorized")))]
pub async fn list_invoices(
    State(state): State<ServerState>,
    Query(query): Query<InvoiceListQuery>,
) -> Result<Json<InvoiceTable>, JsonApiError> {
    let table = invoices::load_invoice_table(&state.db, query.status.as_deref()).await?;
    Ok(Json(table))
}
