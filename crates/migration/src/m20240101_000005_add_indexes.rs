use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Service: audience resolution and per-client lookups filter on these
        manager
            .create_index(
                Index::create()
                    .name("idx_service_client")
                    .table(Service::Table)
                    .col(Service::ClientId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_service_status")
                    .table(Service::Table)
                    .col(Service::Status)
                    .to_owned(),
            )
            .await?;

        // Invoice: backlog/overdue queries filter on status and order by due_at
        manager
            .create_index(
                Index::create()
                    .name("idx_invoice_client")
                    .table(Invoice::Table)
                    .col(Invoice::ClientId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_invoice_status_due")
                    .table(Invoice::Table)
                    .col(Invoice::Status)
                    .col(Invoice::DueAt)
                    .to_owned(),
            )
            .await?;

        // Notification: feed reads the newest rows per client
        manager
            .create_index(
                Index::create()
                    .name("idx_notification_client_created")
                    .table(Notification::Table)
                    .col(Notification::ClientId)
                    .col(Notification::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_index(Index::drop().name("idx_service_client").table(Service::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_service_status").table(Service::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_invoice_client").table(Invoice::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_invoice_status_due").table(Invoice::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_notification_client_created").table(Notification::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Service { Table, ClientId, Status }

#[derive(DeriveIden)]
enum Invoice { Table, ClientId, Status, DueAt }

#[derive(DeriveIden)]
enum Notification { Table, ClientId, CreatedAt }
