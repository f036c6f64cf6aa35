//! # User Service
//!
//! User-management microservice: user records with country and authority
//! associations, read/enable/disable operations over REST, role-based
//! access control, and a multi-algorithm password-hashing strategy.
//!
//! ## Architecture
//!
//! - **domain**: Core models, errors and repository traits
//! - **application**: Business logic and use-case orchestration
//! - **infrastructure**: Database (Sea-ORM) and crypto (JWT, password hashing)
//! - **interfaces**: REST API with Swagger documentation

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

// Re-export API router
pub use interfaces::create_api_router;
