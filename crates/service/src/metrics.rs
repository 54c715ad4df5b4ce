//! Admin dashboard aggregator.
//!
//! Every metric is computed by a pure function over already-fetched rows and
//! a caller-supplied `now`, so the month arithmetic is testable without a
//! database. The `load_*` wrappers fetch and delegate; `load_dashboard` runs
//! them concurrently and tolerates partial failure: a metric that cannot be
//! fetched is logged and left unset instead of aborting its siblings.
//!
//! Month buckets compare calendar year/month of each timestamp re-expressed
//! in the timezone of `now`, never elapsed-duration windows.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, FixedOffset};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use models::{client, invoice};

use crate::errors::ServiceError;

/// Rows shown in the dashboard's bounded tables (recent registrations,
/// overdue invoices).
pub const DASHBOARD_PAGE_SIZE: u64 = 10;

/// Months covered by the signup time series, current month included.
pub const SERIES_MONTHS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserGrowth {
    pub total: u64,
    /// Percent vs the count registered before the previous month began,
    /// one decimal. 0.0 when there was no prior base to compare against;
    /// callers cannot distinguish that from "no change".
    pub growth_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueSnapshot {
    pub monthly_revenue: f64,
    pub growth_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceCounts {
    pub total: u64,
    pub active: u64,
    pub paused: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceBacklog {
    pub pending_count: u64,
    pub pending_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: f64,
}

/// Paid revenue grouped by the category of the linked service. Invoices
/// whose service cannot be resolved are excluded from the buckets; the
/// `unmatched` count surfaces how many were dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRevenue {
    pub buckets: Vec<CategoryAmount>,
    pub unmatched: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusAmounts {
    pub paid: f64,
    pub pending: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverdueInvoice {
    pub invoice_id: Uuid,
    pub client_name: String,
    pub amount: f64,
    pub due_at: DateTime<FixedOffset>,
    pub days_overdue: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentClient {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub registered_at: DateTime<FixedOffset>,
    pub service_count: u64,
}

/// Point-in-time dashboard state. `None` sections mean the fetch behind
/// them failed and the UI region stays unset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardView {
    pub users: Option<UserGrowth>,
    pub revenue: Option<RevenueSnapshot>,
    pub services: Option<ServiceCounts>,
    pub invoices: Option<InvoiceBacklog>,
    pub signup_series: Option<Vec<MonthBucket>>,
    pub services_by_category: Option<Vec<CategoryCount>>,
    pub revenue_by_category: Option<CategoryRevenue>,
    pub paid_vs_pending: Option<StatusAmounts>,
    pub recent_clients: Option<Vec<RecentClient>>,
    pub overdue_invoices: Option<Vec<OverdueInvoice>>,
}

// ---------------------------------------------------------------------------
// calendar helpers

/// (year, month) of a timestamp in the reference timezone.
fn month_key(ts: &DateTime<FixedOffset>, reference: &DateTime<FixedOffset>) -> (i32, u32) {
    let local = ts.with_timezone(&reference.timezone());
    (local.year(), local.month())
}

/// (year, month) `back` months before the given key.
fn months_back(key: (i32, u32), back: u32) -> (i32, u32) {
    let total = key.0 * 12 + key.1 as i32 - 1 - back as i32;
    (total.div_euclid(12), (total.rem_euclid(12) + 1) as u32)
}

const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn month_label(key: (i32, u32)) -> String {
    format!("{} {}", MONTH_ABBREV[(key.1 - 1) as usize], key.0)
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Month-over-month growth percent, one decimal. Defined as 0.0 when the
/// previous total is 0 so there is no division by zero.
fn growth_pct(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        round1((current - previous) / previous * 100.0)
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// pure aggregation

/// Total clients and growth vs the base registered strictly before the
/// first day of the previous calendar month.
pub fn user_growth(clients: &[client::Model], now: DateTime<FixedOffset>) -> UserGrowth {
    let now_key = month_key(&now, &now);
    let prev_key = months_back(now_key, 1);
    let total = clients.len() as u64;
    let previous = clients
        .iter()
        .filter(|c| month_key(&c.registered_at, &now) < prev_key)
        .count() as u64;
    UserGrowth { total, growth_pct: growth_pct(total as f64, previous as f64) }
}

/// Paid revenue issued in the current calendar month, with growth vs the
/// immediately preceding month (January rolls over to December).
pub fn monthly_revenue(invoices: &[invoice::Model], now: DateTime<FixedOffset>) -> RevenueSnapshot {
    let now_key = month_key(&now, &now);
    let prev_key = months_back(now_key, 1);
    let sum_for = |key: (i32, u32)| -> f64 {
        invoices
            .iter()
            .filter(|i| i.is_paid() && month_key(&i.issued_at, &now) == key)
            .map(|i| i.amount_or_zero())
            .sum()
    };
    let current = sum_for(now_key);
    let previous = sum_for(prev_key);
    RevenueSnapshot { monthly_revenue: current, growth_pct: growth_pct(current, previous) }
}

pub fn service_counts(services: &[models::service::Model]) -> ServiceCounts {
    ServiceCounts {
        total: services.len() as u64,
        active: services.iter().filter(|s| s.status == models::service::STATUS_ACTIVE).count() as u64,
        paused: services.iter().filter(|s| s.status == models::service::STATUS_PAUSED).count() as u64,
    }
}

pub fn invoice_backlog(invoices: &[invoice::Model]) -> InvoiceBacklog {
    let pending: Vec<_> = invoices.iter().filter(|i| i.is_pending()).collect();
    InvoiceBacklog {
        pending_count: pending.len() as u64,
        pending_amount: pending.iter().map(|i| i.amount_or_zero()).sum(),
    }
}

/// Registrations per month for the trailing six calendar months including
/// the current one, oldest first. Months without registrations are present
/// with count 0.
pub fn signup_series(clients: &[client::Model], now: DateTime<FixedOffset>) -> Vec<MonthBucket> {
    let now_key = month_key(&now, &now);
    (0..SERIES_MONTHS)
        .rev()
        .map(|back| {
            let key = months_back(now_key, back);
            let count = clients
                .iter()
                .filter(|c| month_key(&c.registered_at, &now) == key)
                .count() as u64;
            MonthBucket { label: month_label(key), count }
        })
        .collect()
}

pub fn services_by_category(services: &[models::service::Model]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for s in services {
        *counts.entry(s.category.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category: category.to_string(), count })
        .collect()
}

/// Paid amounts grouped by the category of the linked service, resolved
/// through an index built once per batch. Unresolvable links (no service id
/// or a dangling one) are counted in `unmatched` rather than bucketed.
pub fn revenue_by_category(
    invoices: &[invoice::Model],
    services: &[models::service::Model],
) -> CategoryRevenue {
    let by_id: HashMap<Uuid, &str> =
        services.iter().map(|s| (s.id, s.category.as_str())).collect();
    let mut buckets: BTreeMap<&str, f64> = BTreeMap::new();
    let mut unmatched = 0u64;
    for inv in invoices.iter().filter(|i| i.is_paid()) {
        match inv.service_id.and_then(|id| by_id.get(&id)) {
            Some(category) => *buckets.entry(category).or_default() += inv.amount_or_zero(),
            None => unmatched += 1,
        }
    }
    CategoryRevenue {
        buckets: buckets
            .into_iter()
            .map(|(category, amount)| CategoryAmount { category: category.to_string(), amount })
            .collect(),
        unmatched,
    }
}

pub fn paid_vs_pending(invoices: &[invoice::Model]) -> StatusAmounts {
    StatusAmounts {
        paid: invoices.iter().filter(|i| i.is_paid()).map(|i| i.amount_or_zero()).sum(),
        pending: invoices.iter().filter(|i| i.is_pending()).map(|i| i.amount_or_zero()).sum(),
    }
}

/// Filter a pre-fetched pending page down to invoices whose due date is
/// strictly in the past, annotated with whole days overdue and a display
/// client name. An invoice due exactly at `now` is not overdue. The page is
/// already ordered ascending by due date and capped upstream.
pub fn overdue_invoices(
    pending_page: &[invoice::Model],
    clients_by_id: &HashMap<Uuid, client::Model>,
    now: DateTime<FixedOffset>,
) -> Vec<OverdueInvoice> {
    pending_page
        .iter()
        .filter(|i| i.is_pending())
        .filter_map(|i| {
            let due = i.due_at?;
            if due >= now {
                return None;
            }
            let client_name = clients_by_id
                .get(&i.client_id)
                .map(|c| c.display_name().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            Some(OverdueInvoice {
                invoice_id: i.id,
                client_name,
                amount: i.amount_or_zero(),
                due_at: due,
                days_overdue: (now - due).num_days() as u64,
            })
        })
        .collect()
}

/// Map the newest registrations page to table rows, joining the per-client
/// service counts computed from one batched query.
pub fn recent_clients(
    page: &[client::Model],
    service_counts_by_client: &HashMap<Uuid, u64>,
) -> Vec<RecentClient> {
    page.iter()
        .map(|c| RecentClient {
            id: c.id,
            name: c.display_name().to_string(),
            email: c.email.clone(),
            registered_at: c.registered_at,
            service_count: service_counts_by_client.get(&c.id).copied().unwrap_or(0),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// fetch wrappers

pub async fn load_user_growth(
    db: &DatabaseConnection,
    now: DateTime<FixedOffset>,
) -> Result<UserGrowth, ServiceError> {
    let clients = client::Entity::find().all(db).await.map_err(ServiceError::db)?;
    Ok(user_growth(&clients, now))
}

pub async fn load_revenue(
    db: &DatabaseConnection,
    now: DateTime<FixedOffset>,
) -> Result<RevenueSnapshot, ServiceError> {
    let invoices = invoice::Entity::find().all(db).await.map_err(ServiceError::db)?;
    Ok(monthly_revenue(&invoices, now))
}

pub async fn load_service_counts(db: &DatabaseConnection) -> Result<ServiceCounts, ServiceError> {
    let services = models::service::Entity::find().all(db).await.map_err(ServiceError::db)?;
    Ok(service_counts(&services))
}

pub async fn load_invoice_backlog(db: &DatabaseConnection) -> Result<InvoiceBacklog, ServiceError> {
    let invoices = invoice::Entity::find().all(db).await.map_err(ServiceError::db)?;
    Ok(invoice_backlog(&invoices))
}

pub async fn load_signup_series(
    db: &DatabaseConnection,
    now: DateTime<FixedOffset>,
) -> Result<Vec<MonthBucket>, ServiceError> {
    let clients = client::Entity::find().all(db).await.map_err(ServiceError::db)?;
    Ok(signup_series(&clients, now))
}

pub async fn load_services_by_category(
    db: &DatabaseConnection,
) -> Result<Vec<CategoryCount>, ServiceError> {
    let services = models::service::Entity::find().all(db).await.map_err(ServiceError::db)?;
    Ok(services_by_category(&services))
}

pub async fn load_revenue_by_category(
    db: &DatabaseConnection,
) -> Result<CategoryRevenue, ServiceError> {
    let invoices = invoice::Entity::find()
        .filter(invoice::Column::Status.eq(invoice::STATUS_PAID))
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    let services = models::service::Entity::find().all(db).await.map_err(ServiceError::db)?;
    Ok(revenue_by_category(&invoices, &services))
}

pub async fn load_paid_vs_pending(db: &DatabaseConnection) -> Result<StatusAmounts, ServiceError> {
    let invoices = invoice::Entity::find().all(db).await.map_err(ServiceError::db)?;
    Ok(paid_vs_pending(&invoices))
}

pub async fn load_recent_clients(
    db: &DatabaseConnection,
) -> Result<Vec<RecentClient>, ServiceError> {
    let page = client::Entity::find()
        .order_by_desc(client::Column::RegisteredAt)
        .limit(DASHBOARD_PAGE_SIZE)
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    let ids: Vec<Uuid> = page.iter().map(|c| c.id).collect();
    let services = models::service::Entity::find()
        .filter(models::service::Column::ClientId.is_in(ids))
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    let mut counts: HashMap<Uuid, u64> = HashMap::new();
    for s in &services {
        *counts.entry(s.client_id).or_default() += 1;
    }
    Ok(recent_clients(&page, &counts))
}

pub async fn load_overdue_invoices(
    db: &DatabaseConnection,
    now: DateTime<FixedOffset>,
) -> Result<Vec<OverdueInvoice>, ServiceError> {
    // The cap applies to the pending page before the overdue filter, so a
    // backlog of future-dated invoices can shrink the visible overdue list.
    let page = invoice::Entity::find()
        .filter(invoice::Column::Status.eq(invoice::STATUS_PENDING))
        .order_by_asc(invoice::Column::DueAt)
        .limit(DASHBOARD_PAGE_SIZE)
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    let ids: Vec<Uuid> = page.iter().map(|i| i.client_id).collect();
    let clients = client::Entity::find()
        .filter(client::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    let by_id: HashMap<Uuid, client::Model> = clients.into_iter().map(|c| (c.id, c)).collect();
    Ok(overdue_invoices(&page, &by_id, now))
}

fn section<T>(name: &'static str, res: Result<T, ServiceError>) -> Option<T> {
    match res {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(section = name, error = %e, "dashboard section failed to load");
            None
        }
    }
}

/// Load the whole dashboard. The independent fetches run concurrently and a
/// failed section leaves its field `None` without cancelling the others.
pub async fn load_dashboard(db: &DatabaseConnection, now: DateTime<FixedOffset>) -> DashboardView {
    let (
        users,
        revenue,
        services,
        invoices,
        signups,
        by_category,
        revenue_cat,
        totals,
        recent,
        overdue,
    ) = tokio::join!(
        load_user_growth(db, now),
        load_revenue(db, now),
        load_service_counts(db),
        load_invoice_backlog(db),
        load_signup_series(db, now),
        load_services_by_category(db),
        load_revenue_by_category(db),
        load_paid_vs_pending(db),
        load_recent_clients(db),
        load_overdue_invoices(db, now),
    );
    DashboardView {
        users: section("users", users),
        revenue: section("revenue", revenue),
        services: section("services", services),
        invoices: section("invoices", invoices),
        signup_series: section("signup_series", signups),
        services_by_category: section("services_by_category", by_category),
        revenue_by_category: section("revenue_by_category", revenue_cat),
        paid_vs_pending: section("paid_vs_pending", totals),
        recent_clients: section("recent_clients", recent),
        overdue_invoices: section("overdue_invoices", overdue),
    }
}

/// Acknowledge a payment reminder for an overdue invoice. There is no
/// delivery mechanism behind this yet; the action is fire-and-forget.
pub async fn send_payment_reminder(invoice_id: Uuid) -> Result<(), ServiceError> {
    info!(%invoice_id, "payment reminder acknowledged");
    Ok(())
}
