//! Create countries table migration

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Countries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Countries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Countries::CountryName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Countries::Code).string_len(10).not_null())
                    .col(ColumnDef::new(Countries::CreateAt).date().not_null())
                    .col(ColumnDef::new(Countries::UpdateAt).date().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_countries_name_code")
                    .table(Countries::Table)
                    .col(Countries::CountryName)
                    .col(Countries::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Countries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Countries {
    Table,
    Id,
    CountryName,
    Code,
    CreateAt,
    UpdateAt,
}
