//! Create authorities table migration

use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Authorities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Authorities::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Authorities::Authority)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Authorities::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Authorities::CreateAt).date().not_null())
                    .col(ColumnDef::new(Authorities::UpdateAt).date().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_authorities_user_id")
                            .from(Authorities::Table, Authorities::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_authorities_authority_user_id")
                    .table(Authorities::Table)
                    .col(Authorities::Authority)
                    .col(Authorities::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Authorities::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Authorities {
    Table,
    Id,
    Authority,
    UserId,
    CreateAt,
    UpdateAt,
}
