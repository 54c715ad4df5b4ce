//! Per-client notification feed.
//!
//! The feed is a bounded view of the newest notifications plus an unread
//! badge. Mutations (mark one read, mark all read) are followed by a full
//! reload rather than a local patch, so what the caller renders is always a
//! fresh fetch.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use uuid::Uuid;

use models::notification;

use crate::errors::ServiceError;

/// Notifications kept in the feed view.
pub const FEED_PAGE_SIZE: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub kind: String,
    pub unread: bool,
    pub age: String,
    pub created_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedView {
    pub items: Vec<FeedItem>,
    pub unread_count: u64,
    /// Badge text: `None` hides the badge, "99+" caps three digits.
    pub badge: Option<String>,
}

/// Badge text for an unread count: hidden at zero, exact digits up to 99,
/// "99+" beyond.
pub fn badge_label(unread: u64) -> Option<String> {
    match unread {
        0 => None,
        1..=99 => Some(unread.to_string()),
        _ => Some("99+".to_string()),
    }
}

/// Relative age in coarse buckets, half-open on elapsed seconds.
pub fn relative_age(created_at: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> String {
    let seconds = (now - created_at).num_seconds();
    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 3_600 {
        format!("{} min", seconds / 60)
    } else if seconds < 86_400 {
        format!("{} h", seconds / 3_600)
    } else if seconds < 604_800 {
        format!("{} days", seconds / 86_400)
    } else {
        created_at.format("%d/%m/%Y").to_string()
    }
}

/// Map fetched rows (newest first) to the rendered feed view.
pub fn build_feed_view(rows: &[notification::Model], now: DateTime<FixedOffset>) -> FeedView {
    let items: Vec<FeedItem> = rows
        .iter()
        .map(|n| FeedItem {
            id: n.id,
            title: n.title.clone(),
            body: n.body.clone(),
            kind: n.kind.clone(),
            unread: !n.read,
            age: relative_age(n.created_at, now),
            created_at: n.created_at,
        })
        .collect();
    let unread_count = items.iter().filter(|i| i.unread).count() as u64;
    FeedView { items, unread_count, badge: badge_label(unread_count) }
}

/// Fetch the newest [`FEED_PAGE_SIZE`] notifications for a client and build
/// the view.
pub async fn load_feed(
    db: &DatabaseConnection,
    client_id: Uuid,
    now: DateTime<FixedOffset>,
) -> Result<FeedView, ServiceError> {
    let rows = notification::Entity::find()
        .filter(notification::Column::ClientId.eq(client_id))
        .order_by_desc(notification::Column::CreatedAt)
        .limit(FEED_PAGE_SIZE)
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    Ok(build_feed_view(&rows, now))
}

/// Mark one notification read. Callers reload the feed afterwards; there is
/// no optimistic local update.
pub async fn mark_read(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let found = notification::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("notification"))?;
    let mut am = found.into_active_model();
    am.read = Set(true);
    am.update(db).await.map_err(ServiceError::db)?;
    Ok(())
}

/// Mark every unread notification for a client read in one batch update.
pub async fn mark_all_read(db: &DatabaseConnection, client_id: Uuid) -> Result<(), ServiceError> {
    notification::Entity::update_many()
        .col_expr(notification::Column::Read, sea_orm::sea_query::Expr::value(true))
        .filter(notification::Column::ClientId.eq(client_id))
        .filter(notification::Column::Read.eq(false))
        .exec(db)
        .await
        .map_err(ServiceError::db)?;
    Ok(())
}

/// Mark one notification read, then reload. This is the observable behavior
/// of the feed click handler.
pub async fn mark_read_and_reload(
    db: &DatabaseConnection,
    client_id: Uuid,
    id: Uuid,
    now: DateTime<FixedOffset>,
) -> Result<FeedView, ServiceError> {
    mark_read(db, id).await?;
    load_feed(db, client_id, now).await
}

/// Mark all read, then reload.
pub async fn mark_all_read_and_reload(
    db: &DatabaseConnection,
    client_id: Uuid,
    now: DateTime<FixedOffset>,
) -> Result<FeedView, ServiceError> {
    mark_all_read(db, client_id).await?;
    load_feed(db, client_id, now).await
}

/// Current instant in the fixed-offset form the view functions take.
pub fn now_fixed() -> DateTime<FixedOffset> {
    Utc::now().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn tz() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn at(y: i32, mo: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        tz().with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    fn row(read: bool, created_at: DateTime<FixedOffset>) -> notification::Model {
        notification::Model {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            title: "title".into(),
            body: "body".into(),
            kind: "info".into(),
            read,
            created_at,
        }
    }

    #[test]
    fn badge_hidden_at_zero() {
        assert_eq!(badge_label(0), None);
    }

    #[test]
    fn badge_exact_digits_up_to_99() {
        assert_eq!(badge_label(1).as_deref(), Some("1"));
        assert_eq!(badge_label(99).as_deref(), Some("99"));
    }

    #[test]
    fn badge_caps_at_99_plus() {
        assert_eq!(badge_label(100).as_deref(), Some("99+"));
        assert_eq!(badge_label(4200).as_deref(), Some("99+"));
    }

    #[test]
    fn relative_age_buckets() {
        let now = at(2024, 6, 10, 12);
        assert_eq!(relative_age(now - Duration::seconds(30), now), "just now");
        assert_eq!(relative_age(now - Duration::seconds(59), now), "just now");
        assert_eq!(relative_age(now - Duration::seconds(60), now), "1 min");
        assert_eq!(relative_age(now - Duration::minutes(59), now), "59 min");
        assert_eq!(relative_age(now - Duration::hours(1), now), "1 h");
        assert_eq!(relative_age(now - Duration::hours(23), now), "23 h");
        assert_eq!(relative_age(now - Duration::days(1), now), "1 days");
        assert_eq!(relative_age(now - Duration::days(6), now), "6 days");
        assert_eq!(relative_age(now - Duration::days(7), now), "03/06/2024");
    }

    #[test]
    fn feed_view_counts_unread_and_sets_badge() {
        let now = at(2024, 6, 10, 12);
        let rows = vec![
            row(false, now - Duration::minutes(5)),
            row(true, now - Duration::hours(2)),
            row(false, now - Duration::days(1)),
        ];
        let view = build_feed_view(&rows, now);
        assert_eq!(view.items.len(), 3);
        assert_eq!(view.unread_count, 2);
        assert_eq!(view.badge.as_deref(), Some("2"));
        assert!(view.items[0].unread);
        assert!(!view.items[1].unread);
    }

    #[test]
    fn feed_view_all_read_hides_badge() {
        let now = at(2024, 6, 10, 12);
        let rows = vec![row(true, now - Duration::minutes(5))];
        let view = build_feed_view(&rows, now);
        assert_eq!(view.unread_count, 0);
        assert_eq!(view.badge, None);
    }

    #[test]
    fn empty_feed() {
        let view = build_feed_view(&[], at(2024, 6, 10, 12));
        assert!(view.items.is_empty());
        assert_eq!(view.badge, None);
    }

    #[tokio::test]
    async fn mark_read_reload_round_trip() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = match models::db::connect().await {
            Ok(db) => db,
            Err(_) => return Ok(()),
        };
        use migration::MigratorTrait;
        if migration::Migrator::up(&db, None).await.is_err() {
            return Ok(());
        }

        let client = models::client::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(Some("Feed".into())),
            email: Set(format!("feed_{}@example.com", Uuid::new_v4())),
            phone: Set(None),
            company: Set(None),
            registered_at: Set(Utc::now().into()),
        }
        .insert(&db)
        .await?;

        for _ in 0..3 {
            notification::ActiveModel {
                id: Set(Uuid::new_v4()),
                client_id: Set(client.id),
                title: Set("hello".into()),
                body: Set("world".into()),
                kind: Set("info".into()),
                read: Set(false),
                created_at: Set(Utc::now().into()),
            }
            .insert(&db)
            .await?;
        }

        let now = now_fixed();
        let view = load_feed(&db, client.id, now).await?;
        assert_eq!(view.unread_count, 3);

        let first = view.items[0].id;
        let after_one = mark_read_and_reload(&db, client.id, first, now).await?;
        assert_eq!(after_one.unread_count, 2);

        let after_all = mark_all_read_and_reload(&db, client.id, now).await?;
        assert_eq!(after_all.unread_count, 0);
        assert_eq!(after_all.badge, None);

        models::client::Entity::delete_by_id(client.id).exec(&db).await?;
        Ok(())
    }
}
