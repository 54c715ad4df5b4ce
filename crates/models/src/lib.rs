pub mod client;
pub mod db;
pub mod errors;
pub mod invoice;
pub mod notification;
pub mod service;

#[cfg(test)]
mod schema_tests {
    use chrono::Utc;
    use migration::MigratorTrait;
    use sea_orm::{ActiveModelTrait, EntityTrait, Set};
    use uuid::Uuid;

    use crate::{client, db, invoice, notification, service};

    #[tokio::test]
    async fn schema_round_trip() {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return;
        }
        let db = match db::connect().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return;
            }
        };
        if let Err(e) = migration::Migrator::up(&db, None).await {
            eprintln!("skip: migrate up failed: {}", e);
            return;
        }

        let now = Utc::now();
        let c = client::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(Some("Schema Test".into())),
            email: Set(format!("schema_{}@example.com", Uuid::new_v4())),
            phone: Set(None),
            company: Set(None),
            registered_at: Set(now.into()),
        }
        .insert(&db)
        .await
        .expect("insert client");

        let s = service::ActiveModel {
            id: Set(Uuid::new_v4()),
            client_id: Set(c.id),
            category: Set("hosting".into()),
            description: Set(None),
            monthly_rate: Set(Some(25.0)),
            status: Set(service::STATUS_ACTIVE.into()),
            started_at: Set(Some(now.into())),
            expires_at: Set(None),
        }
        .insert(&db)
        .await
        .expect("insert service");

        let i = invoice::ActiveModel {
            id: Set(Uuid::new_v4()),
            client_id: Set(c.id),
            service_id: Set(Some(s.id)),
            amount: Set(Some(25.0)),
            status: Set(invoice::STATUS_PENDING.into()),
            issued_at: Set(now.into()),
            due_at: Set(Some(now.into())),
        }
        .insert(&db)
        .await
        .expect("insert invoice");

        let n = notification::ActiveModel {
            id: Set(Uuid::new_v4()),
            client_id: Set(c.id),
            title: Set("hello".into()),
            body: Set("world".into()),
            kind: Set("info".into()),
            read: Set(false),
            created_at: Set(now.into()),
        }
        .insert(&db)
        .await
        .expect("insert notification");

        assert!(i.is_pending());
        assert!(s.is_active());
        assert!(!n.read);

        // cascade removes service/invoice/notification rows
        client::Entity::delete_by_id(c.id).exec(&db).await.expect("delete client");
        let gone = invoice::Entity::find_by_id(i.id).one(&db).await.expect("query");
        assert!(gone.is_none());
    }
}
