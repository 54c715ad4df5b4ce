//! Admin invoices table: status filter, paid/pending totals, client names
//! joined through an index map.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use serde::Serialize;
use uuid::Uuid;

use models::{client, invoice};

use crate::errors::ServiceError;
use crate::metrics::{paid_vs_pending, StatusAmounts};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceStats {
    pub total: u64,
    pub amounts: StatusAmounts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceRow {
    pub id: Uuid,
    pub client_name: String,
    pub amount: f64,
    pub status: String,
    pub issued_at: DateTime<FixedOffset>,
    pub due_at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceTable {
    pub stats: InvoiceStats,
    pub rows: Vec<InvoiceRow>,
}

pub fn invoice_stats(invoices: &[invoice::Model]) -> InvoiceStats {
    InvoiceStats { total: invoices.len() as u64, amounts: paid_vs_pending(invoices) }
}

/// Keep invoices in the given status; `None` or empty keeps everything.
pub fn filter_by_status<'a>(
    invoices: &'a [invoice::Model],
    status: Option<&str>,
) -> Vec<&'a invoice::Model> {
    match status {
        Some(s) if !s.is_empty() => invoices.iter().filter(|i| i.status == s).collect(),
        _ => invoices.iter().collect(),
    }
}

pub fn invoice_rows(
    invoices: &[&invoice::Model],
    client_names: &HashMap<Uuid, String>,
) -> Vec<InvoiceRow> {
    invoices
        .iter()
        .map(|i| InvoiceRow {
            id: i.id,
            client_name: client_names
                .get(&i.client_id)
                .cloned()
                .unwrap_or_else(|| "unknown".to_string()),
            amount: i.amount_or_zero(),
            status: i.status.clone(),
            issued_at: i.issued_at,
            due_at: i.due_at,
        })
        .collect()
}

/// Load the invoices table newest-first. Stats cover the whole collection
/// regardless of the active filter, matching what the cards above the table
/// show.
pub async fn load_invoice_table(
    db: &DatabaseConnection,
    status: Option<&str>,
) -> Result<InvoiceTable, ServiceError> {
    let invoices = invoice::Entity::find()
        .order_by_desc(invoice::Column::IssuedAt)
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    let clients = client::Entity::find().all(db).await.map_err(ServiceError::db)?;
    let names: HashMap<Uuid, String> = clients
        .iter()
        .map(|c| (c.id, c.display_name().to_string()))
        .collect();

    let stats = invoice_stats(&invoices);
    let filtered = filter_by_status(&invoices, status);
    Ok(InvoiceTable { stats, rows: invoice_rows(&filtered, &names) })
}
