//! Shared HTTP plumbing: error envelope and validated JSON extraction.

pub mod validated_json;

pub use validated_json::ValidatedJson;

use serde::Serialize;
use utoipa::ToSchema;

/// Error/status envelope for non-2xx responses. Successful responses
/// return the transfer representation directly.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}
