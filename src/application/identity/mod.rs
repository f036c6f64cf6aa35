//! Identity use-cases: user management and authentication.

pub mod service;

pub use service::{AuthResult, UserService};
