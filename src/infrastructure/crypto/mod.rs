//! Cryptographic utilities: JWT signing and password hashing.

pub mod jwt;
pub mod password;

pub use password::{DelegatingPasswordEncoder, PasswordEncoderError};
