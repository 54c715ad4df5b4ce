//! Customer self-service panel.
//!
//! The client-facing read views: a stats block for the dashboard header,
//! short recent-activity lists, and full listings of the client's own
//! services and invoices. Everything is scoped to one client id; names need
//! no joining since the client is looking at their own data.

use chrono::{DateTime, FixedOffset};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use uuid::Uuid;

use models::{client, invoice};

use crate::errors::ServiceError;

/// Active services shown on the dashboard card.
pub const RECENT_SERVICES: usize = 3;
/// Newest invoices shown on the dashboard card.
pub const RECENT_INVOICES: usize = 5;

/// Header stats for the client dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelStats {
    pub active_services: u64,
    pub pending_invoices: u64,
    pub pending_amount: f64,
    /// Earliest expiry among the client's active services; `None` renders
    /// as a dash.
    pub next_expiry: Option<DateTime<FixedOffset>>,
}

/// Dashboard payload: stats plus the two recent-activity lists.
#[derive(Debug, Clone, Serialize)]
pub struct PanelOverview {
    pub stats: PanelStats,
    pub recent_services: Vec<models::service::Model>,
    pub recent_invoices: Vec<invoice::Model>,
}

/// Stats over one client's rows. Pending amounts treat a missing amount as
/// zero; the next expiry skips services without one.
pub fn panel_stats(
    services: &[models::service::Model],
    invoices: &[invoice::Model],
) -> PanelStats {
    let pending: Vec<_> = invoices.iter().filter(|i| i.is_pending()).collect();
    let next_expiry = services
        .iter()
        .filter(|s| s.is_active())
        .filter_map(|s| s.expires_at)
        .min();
    PanelStats {
        active_services: services.iter().filter(|s| s.is_active()).count() as u64,
        pending_invoices: pending.len() as u64,
        pending_amount: pending.iter().map(|i| i.amount_or_zero()).sum(),
        next_expiry,
    }
}

/// Assemble the overview from already-fetched rows. Invoices must arrive
/// newest-first; the recent lists are head slices.
pub fn build_overview(
    services: Vec<models::service::Model>,
    invoices: Vec<invoice::Model>,
) -> PanelOverview {
    let stats = panel_stats(&services, &invoices);
    let recent_services: Vec<_> = services
        .into_iter()
        .filter(|s| s.is_active())
        .take(RECENT_SERVICES)
        .collect();
    let recent_invoices: Vec<_> = invoices.into_iter().take(RECENT_INVOICES).collect();
    PanelOverview { stats, recent_services, recent_invoices }
}

/// Load the client dashboard: one fetch per table, stats and recents derived
/// in memory. `NotFound` for an unknown client id.
pub async fn load_overview(
    db: &DatabaseConnection,
    client_id: Uuid,
) -> Result<PanelOverview, ServiceError> {
    client::Entity::find_by_id(client_id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("client"))?;
    let services = client_services(db, client_id).await?;
    let invoices = client_invoices(db, client_id).await?;
    Ok(build_overview(services, invoices))
}

/// Every service contracted by the client.
pub async fn client_services(
    db: &DatabaseConnection,
    client_id: Uuid,
) -> Result<Vec<models::service::Model>, ServiceError> {
    models::service::Entity::find()
        .filter(models::service::Column::ClientId.eq(client_id))
        .all(db)
        .await
        .map_err(ServiceError::db)
}

/// Every invoice issued to the client, newest first.
pub async fn client_invoices(
    db: &DatabaseConnection,
    client_id: Uuid,
) -> Result<Vec<invoice::Model>, ServiceError> {
    invoice::Entity::find()
        .filter(invoice::Column::ClientId.eq(client_id))
        .order_by_desc(invoice::Column::IssuedAt)
        .all(db)
        .await
        .map_err(ServiceError::db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use models::invoice::{STATUS_PAID, STATUS_PENDING};
    use models::service::{STATUS_ACTIVE, STATUS_CANCELLED, STATUS_PAUSED};

    fn at(y: i32, mo: u32, d: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(y, mo, d, 10, 0, 0).unwrap()
    }

    fn svc(status: &str, expires_at: Option<DateTime<FixedOffset>>) -> models::service::Model {
        models::service::Model {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            category: "hosting".into(),
            description: None,
            monthly_rate: Some(10.0),
            status: status.into(),
            started_at: None,
            expires_at,
        }
    }

    fn inv(status: &str, amount: Option<f64>, issued: DateTime<FixedOffset>) -> invoice::Model {
        invoice::Model {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            service_id: None,
            amount,
            status: status.into(),
            issued_at: issued,
            due_at: None,
        }
    }

    #[test]
    fn stats_count_active_and_pending_with_missing_amount_as_zero() {
        let services = vec![
            svc(STATUS_ACTIVE, None),
            svc(STATUS_PAUSED, None),
            svc(STATUS_CANCELLED, None),
        ];
        let invoices = vec![
            inv(STATUS_PENDING, Some(30.0), at(2024, 6, 1)),
            inv(STATUS_PENDING, None, at(2024, 6, 2)),
            inv(STATUS_PAID, Some(99.0), at(2024, 6, 3)),
        ];
        let stats = panel_stats(&services, &invoices);
        assert_eq!(stats.active_services, 1);
        assert_eq!(stats.pending_invoices, 2);
        assert_eq!(stats.pending_amount, 30.0);
    }

    #[test]
    fn next_expiry_is_earliest_active_expiry() {
        let services = vec![
            svc(STATUS_ACTIVE, Some(at(2024, 9, 1))),
            svc(STATUS_ACTIVE, Some(at(2024, 7, 15))),
            svc(STATUS_ACTIVE, None),
            // a paused service expiring sooner must not win
            svc(STATUS_PAUSED, Some(at(2024, 6, 20))),
        ];
        let stats = panel_stats(&services, &[]);
        assert_eq!(stats.next_expiry, Some(at(2024, 7, 15)));
    }

    #[test]
    fn next_expiry_none_without_dated_active_services() {
        assert_eq!(panel_stats(&[], &[]).next_expiry, None);
        let undated = vec![svc(STATUS_ACTIVE, None), svc(STATUS_CANCELLED, Some(at(2024, 8, 1)))];
        assert_eq!(panel_stats(&undated, &[]).next_expiry, None);
    }

    #[test]
    fn overview_recents_are_capped_head_slices() {
        let services: Vec<_> = (0..5).map(|_| svc(STATUS_ACTIVE, None)).collect();
        let invoices: Vec<_> =
            (0..7).map(|d| inv(STATUS_PAID, Some(1.0), at(2024, 6, 7 - d))).collect();
        let newest = invoices[0].id;
        let overview = build_overview(services, invoices);
        assert_eq!(overview.recent_services.len(), RECENT_SERVICES);
        assert_eq!(overview.recent_invoices.len(), RECENT_INVOICES);
        assert_eq!(overview.recent_invoices[0].id, newest);
    }

    #[test]
    fn overview_recent_services_only_active() {
        let services = vec![svc(STATUS_PAUSED, None), svc(STATUS_ACTIVE, None)];
        let overview = build_overview(services, vec![]);
        assert_eq!(overview.recent_services.len(), 1);
        assert_eq!(overview.recent_services[0].status, STATUS_ACTIVE);
    }
}
