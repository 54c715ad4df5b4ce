//! Admin services table: combined category/status filter over the whole
//! collection, client names joined through an index map.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use serde::Serialize;
use uuid::Uuid;

use models::client;

use crate::errors::ServiceError;
use crate::metrics::{service_counts, ServiceCounts};

#[derive(Debug, Clone, Default)]
pub struct ServiceFilter {
    pub category: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRow {
    pub id: Uuid,
    pub client_name: String,
    pub category: String,
    pub description: Option<String>,
    pub monthly_rate: f64,
    pub status: String,
    pub started_at: Option<DateTime<FixedOffset>>,
    pub expires_at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceTable {
    pub stats: ServiceCounts,
    pub rows: Vec<ServiceRow>,
}

/// Keep services matching every set filter field; `None` or empty string
/// means no constraint on that field.
pub fn filter_services<'a>(
    services: &'a [models::service::Model],
    filter: &ServiceFilter,
) -> Vec<&'a models::service::Model> {
    let wanted = |sel: &Option<String>, value: &str| match sel.as_deref() {
        Some(s) if !s.is_empty() => s == value,
        _ => true,
    };
    services
        .iter()
        .filter(|s| wanted(&filter.category, &s.category) && wanted(&filter.status, &s.status))
        .collect()
}

pub fn service_rows(
    services: &[&models::service::Model],
    client_names: &HashMap<Uuid, String>,
) -> Vec<ServiceRow> {
    services
        .iter()
        .map(|s| ServiceRow {
            id: s.id,
            client_name: client_names
                .get(&s.client_id)
                .cloned()
                .unwrap_or_else(|| "unknown".to_string()),
            category: s.category.clone(),
            description: s.description.clone(),
            monthly_rate: s.monthly_rate.unwrap_or(0.0),
            status: s.status.clone(),
            started_at: s.started_at,
            expires_at: s.expires_at,
        })
        .collect()
}

/// Load the services table: stats over the whole collection, then the
/// filtered rows with client names resolved once per batch.
pub async fn load_service_table(
    db: &DatabaseConnection,
    filter: &ServiceFilter,
) -> Result<ServiceTable, ServiceError> {
    let services = models::service::Entity::find()
        .order_by_desc(models::service::Column::StartedAt)
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    let clients = client::Entity::find().all(db).await.map_err(ServiceError::db)?;
    let names: HashMap<Uuid, String> = clients
        .iter()
        .map(|c| (c.id, c.display_name().to_string()))
        .collect();

    let stats = service_counts(&services);
    let filtered = filter_services(&services, filter);
    Ok(ServiceTable { stats, rows: service_rows(&filtered, &names) })
}
