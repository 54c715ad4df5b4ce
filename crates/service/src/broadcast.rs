//! Notification fan-out.
//!
//! An audience selector resolves to a concrete set of client ids, and one
//! notification row is inserted per recipient in a single batch. Preview and
//! send share the same resolution path so the recipient count shown before
//! sending can never drift from the set actually written.

use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use models::{client, invoice, notification};

use crate::errors::ServiceError;

/// Who receives a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    /// Every registered client.
    All,
    /// Clients with at least one active service.
    Active,
    /// Clients with at least one pending invoice.
    Pending,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Draft {
    pub title: String,
    pub body: String,
    pub kind: String,
}

impl Draft {
    fn validate(&self) -> Result<(), ServiceError> {
        if self.title.trim().is_empty() {
            return Err(ServiceError::Validation("title required".into()));
        }
        if self.body.trim().is_empty() {
            return Err(ServiceError::Validation("body required".into()));
        }
        Ok(())
    }
}

/// Keep the first occurrence of each id, dropping later duplicates.
pub fn distinct_ids(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Resolve the audience to concrete client ids. A client qualifying through
/// several rows (two active services, say) appears exactly once.
pub async fn resolve_audience(
    db: &DatabaseConnection,
    audience: Audience,
) -> Result<Vec<Uuid>, ServiceError> {
    let ids = match audience {
        Audience::All => client::Entity::find()
            .select_only()
            .column(client::Column::Id)
            .into_tuple::<Uuid>()
            .all(db)
            .await
            .map_err(ServiceError::db)?,
        Audience::Active => models::service::Entity::find()
            .filter(models::service::Column::Status.eq(models::service::STATUS_ACTIVE))
            .select_only()
            .column(models::service::Column::ClientId)
            .into_tuple::<Uuid>()
            .all(db)
            .await
            .map_err(ServiceError::db)?,
        Audience::Pending => invoice::Entity::find()
            .filter(invoice::Column::Status.eq(invoice::STATUS_PENDING))
            .select_only()
            .column(invoice::Column::ClientId)
            .into_tuple::<Uuid>()
            .all(db)
            .await
            .map_err(ServiceError::db)?,
    };
    Ok(distinct_ids(ids))
}

/// Recipient count shown in the form before sending. Same resolution rule
/// as [`send_broadcast`] by construction.
pub async fn preview_count(db: &DatabaseConnection, audience: Audience) -> Result<u64, ServiceError> {
    Ok(resolve_audience(db, audience).await?.len() as u64)
}

/// Resolve the audience and insert one unread notification per recipient in
/// a single batch write. Returns the number of notifications sent. The batch
/// either succeeds or surfaces one aggregate error; there is no per-recipient
/// retry.
pub async fn send_broadcast(
    db: &DatabaseConnection,
    audience: Audience,
    draft: &Draft,
) -> Result<u64, ServiceError> {
    draft.validate()?;
    let recipients = resolve_audience(db, audience).await?;
    if recipients.is_empty() {
        return Ok(0);
    }

    let now = Utc::now();
    let rows: Vec<notification::ActiveModel> = recipients
        .iter()
        .map(|client_id| notification::ActiveModel {
            id: Set(Uuid::new_v4()),
            client_id: Set(*client_id),
            title: Set(draft.title.clone()),
            body: Set(draft.body.clone()),
            kind: Set(draft.kind.clone()),
            read: Set(false),
            created_at: Set(now.into()),
        })
        .collect();

    notification::Entity::insert_many(rows)
        .exec(db)
        .await
        .map_err(ServiceError::db)?;

    let sent = recipients.len() as u64;
    info!(audience = ?audience, sent, "broadcast delivered");
    Ok(sent)
}
