//! Create `client` table.
//!
//! Panel accounts; email is the unique login identity, name/phone/company
//! are optional profile fields.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Client::Table)
                    .if_not_exists()
                    .col(uuid(Client::Id).primary_key())
                    .col(
                        ColumnDef::new(Client::Name)
                            .string_len(128)
                            .null(),
                    )
                    .col(string_len(Client::Email, 255).unique_key().not_null())
                    .col(ColumnDef::new(Client::Phone).string_len(64).null())
                    .col(ColumnDef::new(Client::Company).string_len(128).null())
                    .col(timestamp_with_time_zone(Client::RegisteredAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Client::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Client { Table, Id, Name, Email, Phone, Company, RegisteredAt }
