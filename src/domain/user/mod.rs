//! User aggregate
//!
//! Contains the User/Authority/Country models, DTOs, and repository interface.

pub mod model;
pub mod repository;

mod dto_create;

pub use model::{Authority, Country, User};

pub use dto_create::{CountryRef, CreateUserDto};

pub use repository::UserRepositoryInterface;
