//! Application layer: business logic and use-case orchestration.

pub mod identity;

pub use identity::{AuthResult, UserService};
