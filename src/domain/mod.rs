//! Core domain: models, errors and repository traits.

pub mod error;
pub mod user;

pub use error::{DomainError, DomainResult};
pub use user::{Authority, Country, CountryRef, CreateUserDto, User, UserRepositoryInterface};

/// Authority strings used by the authorization rule table.
pub const ROLE_USER: &str = "ROLE_USER";
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
