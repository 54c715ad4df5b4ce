use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::routes::ServerState;
use common::pagination::Pagination;
use service::clients::{self, ClientDetail, ClientTable};

#[derive(Debug, Deserialize, Default)]
pub struct ClientListQuery {
    #[serde(default)]
    pub search: String,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ClientListQuery {
    fn pagination(&self) -> Pagination {
        let d = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(d.page),
            per_page: self.per_page.unwrap_or(d.per_page),
        }
    }
}

#[utoipa::path(get, path = "/admin/clients", tag = "clients",
    params(
        ("search" = Option<String>, Query, description = "Match against name, email or company"),
        ("page" = Option<u32>, Query, description = "Page number, 1-based"),
        ("per_page" = Option<u32>, Query, description = "Rows per page, max 100"),
    ),
    responses((status = 200, description = "OK"), (status = 401, description = "Unauthorized")))]
pub async fn list_clients(
    State(state): State<ServerState>,
    Query(query): Query<ClientListQuery>,
) -> Result<Json<ClientTable>, JsonApiError> {
    let now = chrono::Local::now().fixed_offset();
    let table = clients::load_client_table(&state.db, &query.search, query.pagination(), now).await?;
    Ok(Json(table))
}

#[utoipa::path(get, path = "/admin/clients/{id}", tag = "clients",
    params(("id" = Uuid, Path, description = "Client id")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get_client(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientDetail>, JsonApiError> {
    let detail = clients::client_detail(&state.db, id).await?;
    Ok(Json(detail))
}
