use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, LoaderTrait,
    ModelTrait, QueryFilter, Set, TransactionTrait,
};

use crate::domain::{
    CountryRef, CreateUserDto, DomainError, DomainResult, User, UserRepositoryInterface, ROLE_USER,
};
use crate::infrastructure::database::entities::{authority, country, user};

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn authority_to_domain(model: authority::Model) -> crate::domain::Authority {
    crate::domain::Authority {
        id: model.id,
        authority: model.authority,
        create_at: model.create_at,
        update_at: model.update_at,
    }
}

fn country_to_domain(model: country::Model) -> crate::domain::Country {
    crate::domain::Country {
        id: model.id,
        country_name: model.country_name,
        code: model.code,
        create_at: model.create_at,
        update_at: model.update_at,
    }
}

fn user_to_domain(
    model: user::Model,
    authorities: Vec<authority::Model>,
    country: Option<country::Model>,
) -> User {
    User {
        id: model.id,
        email: model.email,
        username: model.username,
        password_hash: model.password,
        firstname: model.firstname,
        lastname: model.lastname,
        birthdate: model.birthdate,
        phone_number: model.phone_number,
        profile_image: model.profile_image,
        status: model.status,
        authorities: authorities.into_iter().map(authority_to_domain).collect(),
        country: country.map(country_to_domain),
        status_change_at: model.status_change_at,
        create_at: model.create_at,
        update_at: model.update_at,
        last_login: model.last_login,
    }
}

fn unique_violation(e: sea_orm::DbErr) -> DomainError {
    if e.to_string().contains("UNIQUE") || e.to_string().contains("duplicate") {
        DomainError::Conflict("Email or username already exists".to_string())
    } else {
        e.into()
    }
}

/// Resolve the country reference inside the given connection: an explicit
/// id must exist; a (name, code) pair is found or created.
async fn resolve_country<C: ConnectionTrait>(
    conn: &C,
    country_ref: &CountryRef,
) -> DomainResult<country::Model> {
    if let Some(id) = country_ref.id {
        return country::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Country",
                field: "id",
                value: id.to_string(),
            });
    }

    let existing = country::Entity::find()
        .filter(country::Column::CountryName.eq(&country_ref.country_name))
        .filter(country::Column::Code.eq(&country_ref.code))
        .one(conn)
        .await?;

    if let Some(model) = existing {
        return Ok(model);
    }

    let today = Utc::now().date_naive();
    let new_country = country::ActiveModel {
        country_name: Set(country_ref.country_name.clone()),
        code: Set(country_ref.code.clone()),
        create_at: Set(today),
        update_at: Set(today),
        ..Default::default()
    };
    Ok(new_country.insert(conn).await?)
}

/// Load a user's relations and assemble the domain model.
async fn load_user<C: ConnectionTrait>(conn: &C, model: user::Model) -> DomainResult<User> {
    let authorities = model.find_related(authority::Entity).all(conn).await?;
    let country = model.find_related(country::Entity).one(conn).await?;
    Ok(user_to_domain(model, authorities, country))
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for UserRepository {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User> {
        let txn = self.db.begin().await?;
        let today = Utc::now().date_naive();

        let country = resolve_country(&txn, &dto.country).await?;

        let new_user = user::ActiveModel {
            email: Set(dto.email),
            username: Set(dto.username),
            password: Set(dto.password),
            firstname: Set(dto.firstname),
            lastname: Set(dto.lastname),
            birthdate: Set(dto.birthdate),
            phone_number: Set(dto.phone_number),
            profile_image: Set(dto.profile_image),
            status: Set(true),
            country_id: Set(Some(country.id)),
            status_change_at: Set(today),
            create_at: Set(today),
            update_at: Set(today),
            last_login: Set(None),
            ..Default::default()
        };
        let inserted = new_user.insert(&txn).await.map_err(unique_violation)?;

        let default_authority = authority::ActiveModel {
            authority: Set(ROLE_USER.to_string()),
            user_id: Set(inserted.id),
            create_at: Set(today),
            update_at: Set(today),
            ..Default::default()
        };
        let granted = default_authority.insert(&txn).await?;

        txn.commit().await?;

        Ok(user_to_domain(inserted, vec![granted], Some(country)))
    }

    async fn find_all(&self) -> DomainResult<Vec<User>> {
        let models = user::Entity::find().all(&self.db).await?;
        let authorities = models.load_many(authority::Entity, &self.db).await?;
        let countries = models.load_one(country::Entity, &self.db).await?;

        Ok(models
            .into_iter()
            .zip(authorities)
            .zip(countries)
            .map(|((model, auths), ctry)| user_to_domain(model, auths, ctry))
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id).one(&self.db).await?;
        match model {
            Some(model) => Ok(Some(load_user(&self.db, model).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;
        match model {
            Some(model) => Ok(Some(load_user(&self.db, model).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        match model {
            Some(model) => Ok(Some(load_user(&self.db, model).await?)),
            None => Ok(None),
        }
    }

    async fn set_status(&self, id: i64, status: bool) -> DomainResult<Option<User>> {
        let txn = self.db.begin().await?;

        let Some(existing) = user::Entity::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };

        let today = Utc::now().date_naive();
        let mut active: user::ActiveModel = existing.into();
        active.status = Set(status);
        active.status_change_at = Set(today);
        active.update_at = Set(today);
        let updated = active.update(&txn).await?;

        let assembled = load_user(&txn, updated).await?;
        txn.commit().await?;

        Ok(Some(assembled))
    }

    async fn record_login(&self, id: i64) -> DomainResult<()> {
        let Some(existing) = user::Entity::find_by_id(id).one(&self.db).await? else {
            return Err(DomainError::user_not_found(id));
        };

        let mut active: user::ActiveModel = existing.into();
        active.last_login = Set(Some(Utc::now().date_naive()));
        active.update(&self.db).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::migrator::Migrator;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    async fn repository() -> UserRepository {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("in-memory database");
        Migrator::up(&db, None).await.expect("migrations");
        UserRepository::new(db)
    }

    fn create_dto(email: &str, username: &str) -> CreateUserDto {
        CreateUserDto {
            email: email.to_string(),
            username: username.to_string(),
            password: "{pbkdf2}deadbeef".to_string(),
            firstname: "Javier".to_string(),
            lastname: "Gonzalez".to_string(),
            birthdate: None,
            phone_number: Some("1234567890".to_string()),
            profile_image: None,
            country: CountryRef {
                id: None,
                country_name: "Mexico".to_string(),
                code: "MX".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn create_sets_defaults_and_grants_role_user() {
        let repo = repository().await;
        let user = repo
            .create_user(create_dto("user@gmail.com", "user"))
            .await
            .unwrap();

        let today = Utc::now().date_naive();
        assert!(user.status);
        assert_eq!(user.create_at, today);
        assert_eq!(user.update_at, today);
        assert_eq!(user.status_change_at, today);
        assert!(user.has_authority(ROLE_USER));
        assert_eq!(user.country.as_ref().unwrap().code, "MX");
        assert!(user.last_login.is_none());
    }

    #[tokio::test]
    async fn create_reuses_existing_country() {
        let repo = repository().await;
        let first = repo
            .create_user(create_dto("a@gmail.com", "a"))
            .await
            .unwrap();
        let second = repo
            .create_user(create_dto("b@gmail.com", "b"))
            .await
            .unwrap();

        assert_eq!(
            first.country.as_ref().unwrap().id,
            second.country.as_ref().unwrap().id
        );
    }

    #[tokio::test]
    async fn duplicate_email_and_username_conflicts() {
        let repo = repository().await;
        repo.create_user(create_dto("dup@gmail.com", "dup"))
            .await
            .unwrap();

        let err = repo
            .create_user(create_dto("dup@gmail.com", "dup"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn find_by_id_returns_none_when_absent() {
        let repo = repository().await;
        assert!(repo.find_by_id(404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_all_empty_store_is_empty_vec() {
        let repo = repository().await;
        assert!(repo.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_all_loads_relations() {
        let repo = repository().await;
        repo.create_user(create_dto("user@gmail.com", "user"))
            .await
            .unwrap();

        let users = repo.find_all().await.unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].has_authority(ROLE_USER));
        assert_eq!(users[0].country.as_ref().unwrap().country_name, "Mexico");
    }

    #[tokio::test]
    async fn set_status_restamps_even_when_unchanged() {
        let repo = repository().await;
        let user = repo
            .create_user(create_dto("user@gmail.com", "user"))
            .await
            .unwrap();

        let disabled = repo.set_status(user.id, false).await.unwrap().unwrap();
        assert!(!disabled.status);

        // Same flag again still succeeds and keeps the stamp current.
        let again = repo.set_status(user.id, false).await.unwrap().unwrap();
        assert!(!again.status);
        assert_eq!(again.status_change_at, Utc::now().date_naive());
    }

    #[tokio::test]
    async fn set_status_absent_user_is_none() {
        let repo = repository().await;
        assert!(repo.set_status(404, true).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn record_login_stamps_last_login() {
        let repo = repository().await;
        let user = repo
            .create_user(create_dto("user@gmail.com", "user"))
            .await
            .unwrap();

        repo.record_login(user.id).await.unwrap();
        let reloaded = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.last_login, Some(Utc::now().date_naive()));
    }
}
