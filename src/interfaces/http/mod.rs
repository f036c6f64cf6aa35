//! HTTP REST API interfaces
//!
//! - `access_rules`: the static authorization rule table
//! - `middleware`: bearer-token decoding + rule enforcement
//! - `modules`: request handlers for all resources
//! - `router`: API router with Swagger documentation

pub mod access_rules;
pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::create_api_router;
