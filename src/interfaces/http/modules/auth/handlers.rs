//! Authentication API handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use super::dto::{LoginRequest, LoginResponse};
use crate::application::UserService;
use crate::domain::DomainError;
use crate::infrastructure::database::repositories::UserRepository;
use crate::interfaces::http::common::{ApiResponse, ValidatedJson};
use crate::interfaces::http::modules::users::UserDto;

/// Auth handler state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub user_service: Arc<UserService<UserRepository>>,
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<ApiResponse<()>>)> {
    match state
        .user_service
        .login(&request.username, &request.password)
        .await
    {
        Ok(result) => Ok(Json(LoginResponse {
            token: result.token,
            token_type: result.token_type,
            expires_in: result.expires_in,
            user: UserDto::from(result.user),
        })),
        Err(DomainError::Unauthorized(reason)) => {
            Err((StatusCode::UNAUTHORIZED, Json(ApiResponse::error(reason))))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        )),
    }
}
