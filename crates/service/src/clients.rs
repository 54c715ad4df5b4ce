//! Admin clients table.
//!
//! The whole collection is fetched newest-first, then searched and paged in
//! memory; per-client service counts are joined through one batched query
//! over the visible page.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, FixedOffset};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use uuid::Uuid;

use common::pagination::{PageInfo, Pagination};
use models::client;

use crate::errors::ServiceError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientStats {
    pub total: u64,
    pub new_this_month: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientRow {
    pub id: Uuid,
    pub name: String,
    pub initials: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub registered_at: DateTime<FixedOffset>,
    pub service_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientTable {
    pub stats: ClientStats,
    pub rows: Vec<ClientRow>,
    pub page: PageInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientDetail {
    pub client: client::Model,
    pub services: Vec<models::service::Model>,
}

pub fn client_stats(clients: &[client::Model], now: DateTime<FixedOffset>) -> ClientStats {
    let tz = now.timezone();
    let (year, month) = (now.year(), now.month());
    let new_this_month = clients
        .iter()
        .filter(|c| {
            let local = c.registered_at.with_timezone(&tz);
            local.year() == year && local.month() == month
        })
        .count() as u64;
    ClientStats { total: clients.len() as u64, new_this_month }
}

/// Case-insensitive substring match over name, email and company. An empty
/// query keeps everything.
pub fn search_clients<'a>(clients: &'a [client::Model], query: &str) -> Vec<&'a client::Model> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return clients.iter().collect();
    }
    clients
        .iter()
        .filter(|c| {
            c.name.as_deref().is_some_and(|n| n.to_lowercase().contains(&q))
                || c.email.to_lowercase().contains(&q)
                || c.company.as_deref().is_some_and(|co| co.to_lowercase().contains(&q))
        })
        .collect()
}

/// Avatar initials: first letters of the first two words, else the first
/// two characters, uppercased. "XX" when there is nothing to draw from.
pub fn initials(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return "XX".to_string();
    }
    let mut words = trimmed.split_whitespace();
    match (words.next(), words.next()) {
        (Some(first), Some(second)) => {
            let mut out = String::new();
            out.extend(first.chars().next().into_iter().flat_map(|c| c.to_uppercase()));
            out.extend(second.chars().next().into_iter().flat_map(|c| c.to_uppercase()));
            out
        }
        _ => trimmed.chars().take(2).flat_map(|c| c.to_uppercase()).collect(),
    }
}

pub fn client_rows(
    page: &[&client::Model],
    service_counts_by_client: &HashMap<Uuid, u64>,
) -> Vec<ClientRow> {
    page.iter()
        .map(|c| ClientRow {
            id: c.id,
            name: c.display_name().to_string(),
            initials: initials(c.display_name()),
            email: c.email.clone(),
            phone: c.phone.clone(),
            company: c.company.clone(),
            registered_at: c.registered_at,
            service_count: service_counts_by_client.get(&c.id).copied().unwrap_or(0),
        })
        .collect()
}

/// Load one page of the clients table: stats over the whole collection,
/// search + pagination in memory, service counts joined for the visible
/// rows only.
pub async fn load_client_table(
    db: &DatabaseConnection,
    query: &str,
    page: Pagination,
    now: DateTime<FixedOffset>,
) -> Result<ClientTable, ServiceError> {
    let all = client::Entity::find()
        .order_by_desc(client::Column::RegisteredAt)
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    let stats = client_stats(&all, now);
    let filtered = search_clients(&all, query);
    let (slice, info) = page.page_of(&filtered);

    let ids: Vec<Uuid> = slice.iter().map(|c| c.id).collect();
    let services = models::service::Entity::find()
        .filter(models::service::Column::ClientId.is_in(ids))
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    let mut counts: HashMap<Uuid, u64> = HashMap::new();
    for s in &services {
        *counts.entry(s.client_id).or_default() += 1;
    }

    Ok(ClientTable { stats, rows: client_rows(slice, &counts), page: info })
}

/// A client plus their contracted services, for the detail modal.
pub async fn client_detail(db: &DatabaseConnection, id: Uuid) -> Result<ClientDetail, ServiceError> {
    let found = client::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("client"))?;
    let services = models::service::Entity::find()
        .filter(models::service::Column::ClientId.eq(id))
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    Ok(ClientDetail { client: found, services })
}
