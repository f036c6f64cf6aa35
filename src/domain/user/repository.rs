use async_trait::async_trait;

use super::{CreateUserDto, User};
use crate::domain::DomainResult;

#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    /// Persist a new user with its country reference and default
    /// `ROLE_USER` authority. Returns the stored user with relations loaded.
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User>;

    async fn find_all(&self) -> DomainResult<Vec<User>>;
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// Set the enabled/disabled flag, re-stamping `status_change_at` and
    /// `update_at` even when the flag is unchanged. `None` when absent.
    async fn set_status(&self, id: i64, status: bool) -> DomainResult<Option<User>>;

    /// Stamp `last_login` after a successful authentication.
    async fn record_login(&self, id: i64) -> DomainResult<()>;
}
