//! Create `notification` table with FK to `client`.
//!
//! Rows are written in bulk by broadcast fan-out; only the `read` flag is
//! ever mutated afterwards.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notification::Table)
                    .if_not_exists()
                    .col(uuid(Notification::Id).primary_key())
                    .col(uuid(Notification::ClientId).not_null())
                    .col(string_len(Notification::Title, 255).not_null())
                    .col(text(Notification::Body).not_null())
                    .col(string_len(Notification::Kind, 32).not_null())
                    .col(boolean(Notification::Read).not_null())
                    .col(timestamp_with_time_zone(Notification::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_client")
                            .from(Notification::Table, Notification::ClientId)
                            .to(Client::Table, Client::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Notification::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Notification { Table, Id, ClientId, Title, Body, Kind, Read, CreatedAt }

#[derive(DeriveIden)]
enum Client { Table, Id }
