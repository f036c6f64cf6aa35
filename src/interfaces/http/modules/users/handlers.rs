//! User management API handlers
//!
//! Thin wrappers over `UserService`; the authorization middleware has
//! already decided whether the caller may reach them.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::{CreateUserRequest, ToggleParams, UserDto};
use crate::application::UserService;
use crate::domain::DomainError;
use crate::infrastructure::database::repositories::UserRepository;
use crate::interfaces::http::common::{ApiResponse, ValidatedJson};

/// User handler state — concrete over `UserRepository` for Axum compatibility.
#[derive(Clone)]
pub struct UserHandlerState {
    pub user_service: Arc<UserService<UserRepository>>,
}

fn internal_error(e: DomainError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error(e.to_string())),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/v1/user/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "ID of the user to be searched")),
    responses(
        (status = 200, description = "Found the user", body = UserDto),
        (status = 204, description = "User not found"),
        (status = 403, description = "Access forbidden: insufficient permissions")
    )
)]
pub async fn find_user_by_id(
    State(state): State<UserHandlerState>,
    Path(id): Path<i64>,
) -> Response {
    match state.user_service.find_by_id(id).await {
        Ok(user) => (StatusCode::OK, Json(UserDto::from(user))).into_response(),
        Err(DomainError::NotFound { .. }) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => internal_error(e),
    }
}

#[utoipa::path(
    get,
    path = "/v1/user/all-users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Find all users", body = [UserDto]),
        (status = 204, description = "No users found"),
        (status = 403, description = "Access forbidden: insufficient permissions")
    )
)]
pub async fn find_all_users(State(state): State<UserHandlerState>) -> Response {
    match state.user_service.find_all().await {
        Ok(users) if users.is_empty() => StatusCode::NO_CONTENT.into_response(),
        Ok(users) => {
            let body: Vec<UserDto> = users.into_iter().map(UserDto::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => internal_error(e),
    }
}

#[utoipa::path(
    post,
    path = "/v1/user/toggle-user/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "ID of the user to be enabled/disabled"),
        ToggleParams
    ),
    responses(
        (status = 200, description = "User successfully enabled/disabled", body = UserDto),
        (status = 404, description = "User not found"),
        (status = 403, description = "Access forbidden: insufficient permissions")
    )
)]
pub async fn toggle_user(
    State(state): State<UserHandlerState>,
    Path(id): Path<i64>,
    Query(params): Query<ToggleParams>,
) -> Response {
    let result = if params.enabled {
        state.user_service.enable_user(id).await
    } else {
        state.user_service.disable_user(id).await
    };

    match result {
        Ok(user) => (StatusCode::OK, Json(UserDto::from(user))).into_response(),
        Err(DomainError::NotFound { .. }) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error(format!("User '{}' not found", id))),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

#[utoipa::path(
    post,
    path = "/v1/user",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserDto),
        (status = 409, description = "Email or username already exists"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_user(
    State(state): State<UserHandlerState>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Response {
    match state.user_service.create_user(request.into()).await {
        Ok(user) => (StatusCode::CREATED, Json(UserDto::from(user))).into_response(),
        Err(e) => {
            let status = match &e {
                DomainError::Conflict(_) => StatusCode::CONFLICT,
                DomainError::NotFound { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                DomainError::Validation(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(ApiResponse::<()>::error(e.to_string()))).into_response()
        }
    }
}
