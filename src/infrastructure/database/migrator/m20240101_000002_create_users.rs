//! Create users table migration

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_countries::Countries;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Username).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Password).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Firstname).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Lastname).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Birthdate).date().null())
                    .col(ColumnDef::new(Users::PhoneNumber).string_len(50).null())
                    .col(ColumnDef::new(Users::ProfileImage).string_len(512).null())
                    .col(
                        ColumnDef::new(Users::Status)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Users::CountryId).big_integer().null())
                    .col(ColumnDef::new(Users::StatusChangeAt).date().not_null())
                    .col(ColumnDef::new(Users::CreateAt).date().not_null())
                    .col(ColumnDef::new(Users::UpdateAt).date().not_null())
                    .col(ColumnDef::new(Users::LastLogin).date().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_country_id")
                            .from(Users::Table, Users::CountryId)
                            .to(Countries::Table, Countries::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_email_username")
                    .table(Users::Table)
                    .col(Users::Email)
                    .col(Users::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Users {
    Table,
    Id,
    Email,
    Username,
    Password,
    Firstname,
    Lastname,
    Birthdate,
    PhoneNumber,
    ProfileImage,
    Status,
    CountryId,
    StatusChangeAt,
    CreateAt,
    UpdateAt,
    LastLogin,
}
