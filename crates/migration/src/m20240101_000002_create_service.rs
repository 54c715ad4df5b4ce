//! Create `service` table with FK to `client`.
//!
//! One row per contracted product; `status` is the lifecycle state
//! (active/paused/cancelled) the dashboard buckets on.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(uuid(Service::Id).primary_key())
                    .col(uuid(Service::ClientId).not_null())
                    .col(string_len(Service::Category, 64).not_null())
                    .col(ColumnDef::new(Service::Description).text().null())
                    .col(ColumnDef::new(Service::MonthlyRate).double().null())
                    .col(string_len(Service::Status, 32).not_null())
                    .col(
                        ColumnDef::new(Service::StartedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Service::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_client")
                            .from(Service::Table, Service::ClientId)
                            .to(Client::Table, Client::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Service::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Service { Table, Id, ClientId, Category, Description, MonthlyRate, Status, StartedAt, ExpiresAt }

#[derive(DeriveIden)]
enum Client { Table, Id }
