//! User management service — application-layer orchestration
//!
//! All user-related business logic lives here.
//! HTTP handlers should be thin wrappers that delegate to this service.

use std::sync::Arc;

use tracing::info;

use crate::domain::{
    CreateUserDto, DomainError, DomainResult, User, UserRepositoryInterface,
};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::DelegatingPasswordEncoder;

/// Authentication result returned after a successful login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

/// User service — orchestrates all identity / user-management use-cases.
///
/// Generic over `R: UserRepositoryInterface` so it stays decoupled from
/// the concrete persistence layer.
pub struct UserService<R: UserRepositoryInterface> {
    repo: Arc<R>,
    encoder: Arc<DelegatingPasswordEncoder>,
    jwt_config: JwtConfig,
}

impl<R: UserRepositoryInterface> UserService<R> {
    pub fn new(
        repo: Arc<R>,
        encoder: Arc<DelegatingPasswordEncoder>,
        jwt_config: JwtConfig,
    ) -> Self {
        Self {
            repo,
            encoder,
            jwt_config,
        }
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Get a single user by ID, or NotFound when absent.
    pub async fn find_by_id(&self, id: i64) -> DomainResult<User> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::user_not_found(id))
    }

    /// All users; empty vec when none exist (not an error).
    pub async fn find_all(&self) -> DomainResult<Vec<User>> {
        self.repo.find_all().await
    }

    /// Raw stored user by username. Used by the authentication
    /// integration, not exposed over HTTP.
    pub async fn find_by_username(&self, username: &str) -> DomainResult<User> {
        self.repo
            .find_by_username(username)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "User",
                field: "username",
                value: username.to_string(),
            })
    }

    // ── Creation ────────────────────────────────────────────────

    /// Create a new user: uniqueness checks, password hashing through the
    /// encoding strategy, enabled status and fresh lifecycle stamps.
    pub async fn create_user(&self, mut dto: CreateUserDto) -> DomainResult<User> {
        if self.repo.find_by_email(&dto.email).await?.is_some() {
            return Err(DomainError::Conflict("Email already exists".into()));
        }
        if self.repo.find_by_username(&dto.username).await?.is_some() {
            return Err(DomainError::Conflict("Username already exists".into()));
        }

        dto.password = self
            .encoder
            .encode(&dto.password)
            .map_err(|e| DomainError::Validation(format!("Failed to hash password: {}", e)))?;

        let user = self.repo.create_user(dto).await?;
        info!(user_id = user.id, username = %user.username, "New user created");
        Ok(user)
    }

    // ── Status toggles ──────────────────────────────────────────

    pub async fn enable_user(&self, id: i64) -> DomainResult<User> {
        self.change_status(id, true).await
    }

    pub async fn disable_user(&self, id: i64) -> DomainResult<User> {
        self.change_status(id, false).await
    }

    async fn change_status(&self, id: i64, status: bool) -> DomainResult<User> {
        let user = self
            .repo
            .set_status(id, status)
            .await?
            .ok_or(DomainError::user_not_found(id))?;
        info!(user_id = id, status, "User status changed");
        Ok(user)
    }

    // ── Authentication ──────────────────────────────────────────

    /// Authenticate by username + password and return a JWT carrying the
    /// user's authority strings. Credential failures are indistinguishable
    /// to the caller.
    pub async fn login(&self, username: &str, password: &str) -> DomainResult<AuthResult> {
        let user = match self.find_by_username(username).await {
            Ok(user) => user,
            Err(DomainError::NotFound { .. }) => {
                return Err(DomainError::Unauthorized("Invalid credentials".into()));
            }
            Err(e) => return Err(e),
        };

        if !user.status {
            return Err(DomainError::Unauthorized("Account is disabled".into()));
        }

        if !self.encoder.matches(password, &user.password_hash) {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        }

        self.repo.record_login(user.id).await?;

        let authorities: Vec<String> =
            user.authorities.iter().map(|a| a.authority.clone()).collect();
        let token = create_token(user.id, &user.username, authorities, &self.jwt_config)
            .map_err(|e| DomainError::Validation(format!("Failed to create token: {}", e)))?;

        info!(user_id = user.id, username = %user.username, "User logged in");

        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.expiration_hours * 3600,
            user,
        })
    }
}
