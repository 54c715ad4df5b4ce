//! Create `invoice` table with FK to `client` and optional FK to `service`.
//!
//! Amount is nullable; aggregates treat a missing amount as zero.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invoice::Table)
                    .if_not_exists()
                    .col(uuid(Invoice::Id).primary_key())
                    .col(uuid(Invoice::ClientId).not_null())
                    .col(ColumnDef::new(Invoice::ServiceId).uuid().null())
                    .col(ColumnDef::new(Invoice::Amount).double().null())
                    .col(string_len(Invoice::Status, 32).not_null())
                    .col(timestamp_with_time_zone(Invoice::IssuedAt).not_null())
                    .col(
                        ColumnDef::new(Invoice::DueAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoice_client")
                            .from(Invoice::Table, Invoice::ClientId)
                            .to(Client::Table, Client::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoice_service")
                            .from(Invoice::Table, Invoice::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Invoice::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Invoice { Table, Id, ClientId, ServiceId, Amount, Status, IssuedAt, DueAt }

#[derive(DeriveIden)]
enum Client { Table, Id }

#[derive(DeriveIden)]
enum Service { Table, Id }
