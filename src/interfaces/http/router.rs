//! API Router with Swagger UI

use std::sync::Arc;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::middleware::{authorize_middleware, AuthState};
use super::modules::metrics::MetricsState;
use super::modules::{auth, health, metrics, request_id, users};
use crate::application::UserService;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::database::repositories::UserRepository;

/// Unified state for all routes. Axum extracts the specific handler
/// state via `FromRef`.
#[derive(Clone)]
pub struct ApiState {
    pub user_service: Arc<UserService<UserRepository>>,
    pub auth: AuthState,
    pub metrics: MetricsState,
}

// -- FromRef implementations so each handler keeps its own State<T> extractor --

impl FromRef<ApiState> for users::UserHandlerState {
    fn from_ref(s: &ApiState) -> Self {
        users::UserHandlerState {
            user_service: Arc::clone(&s.user_service),
        }
    }
}

impl FromRef<ApiState> for auth::AuthHandlerState {
    fn from_ref(s: &ApiState) -> Self {
        auth::AuthHandlerState {
            user_service: Arc::clone(&s.user_service),
        }
    }
}

impl FromRef<ApiState> for AuthState {
    fn from_ref(s: &ApiState) -> Self {
        s.auth.clone()
    }
}

impl FromRef<ApiState> for MetricsState {
    fn from_ref(s: &ApiState) -> Self {
        s.metrics.clone()
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::handlers::login,
        users::handlers::find_user_by_id,
        users::handlers::find_all_users,
        users::handlers::toggle_user,
        users::handlers::create_user,
    ),
    components(schemas(
        users::UserDto,
        users::CountryDto,
        users::CreateUserRequest,
        users::CountryRequest,
        auth::LoginRequest,
        auth::LoginResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "User management endpoints"),
        (name = "Authentication", description = "Login endpoint issuing JWTs"),
        (name = "Health", description = "Service health"),
    )
)]
struct ApiDoc;

/// Build the API router. The authorization middleware sits below the
/// observability layers so denied requests are still traced and counted.
pub fn create_api_router(
    user_service: Arc<UserService<UserRepository>>,
    jwt_config: JwtConfig,
    prometheus_handle: PrometheusHandle,
) -> Router {
    let state = ApiState {
        user_service,
        auth: AuthState::new(jwt_config),
        metrics: MetricsState {
            handle: prometheus_handle,
        },
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::prometheus_metrics))
        .route("/v1/auth/login", post(auth::handlers::login))
        .route("/v1/user", post(users::handlers::create_user))
        .route("/v1/user/all-users", get(users::handlers::find_all_users))
        .route("/v1/user/{id}", get(users::handlers::find_user_by_id))
        .route(
            "/v1/user/toggle-user/{id}",
            post(users::handlers::toggle_user),
        )
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            authorize_middleware,
        ))
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;
    use serde_json::{json, Value};
    use tower::Service;

    use crate::domain::{ROLE_ADMIN, ROLE_USER};
    use crate::infrastructure::crypto::jwt::create_token;
    use crate::infrastructure::crypto::DelegatingPasswordEncoder;
    use crate::infrastructure::database::migrator::Migrator;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".into(),
            expiration_hours: 1,
            issuer: "user-service".into(),
        }
    }

    async fn test_app() -> Router {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let repo = Arc::new(UserRepository::new(db));
        let encoder = Arc::new(DelegatingPasswordEncoder::new(SECRET).unwrap());
        let service = Arc::new(UserService::new(repo, encoder, jwt_config()));
        let handle = PrometheusBuilder::new().build_recorder().handle();

        create_api_router(service, jwt_config(), handle)
    }

    fn token(authorities: &[&str]) -> String {
        let authorities = authorities.iter().map(|a| a.to_string()).collect();
        create_token(1, "tester", authorities, &jwt_config()).unwrap()
    }

    fn request(method: &str, uri: &str, bearer: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        match body {
            Some(value) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&value).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: axum::http::Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn create_body() -> Value {
        json!({
            "email": "user@gmail.com",
            "username": "user",
            "password": "password",
            "firstname": "Javier",
            "lastname": "Gonzalez",
            "phoneNumber": "1234567890",
            "country": {"countryName": "Mexico", "code": "MX"}
        })
    }

    #[tokio::test]
    async fn create_user_returns_created_body() {
        let mut app = test_app().await.into_service();

        let resp = app
            .call(request("POST", "/v1/user", None, Some(create_body())))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = body_json(resp).await;
        assert_eq!(body["email"], "user@gmail.com");
        assert_eq!(body["username"], "user");
        assert_eq!(body["country"]["countryName"], "Mexico");
        assert!(body.get("password").is_none());
    }

    #[tokio::test]
    async fn create_user_invalid_email_is_unprocessable() {
        let mut app = test_app().await.into_service();

        let mut body = create_body();
        body["email"] = json!("not-an-email");
        let resp = app
            .call(request("POST", "/v1/user", None, Some(body)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn duplicate_user_conflicts() {
        let mut app = test_app().await.into_service();

        let first = app
            .call(request("POST", "/v1/user", None, Some(create_body())))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = app
            .call(request("POST", "/v1/user", None, Some(create_body())))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn get_user_anonymous_is_forbidden() {
        let mut app = test_app().await.into_service();
        let resp = app
            .call(request("GET", "/v1/user/1", None, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn get_missing_user_is_no_content() {
        let mut app = test_app().await.into_service();
        let user_token = token(&[ROLE_USER]);
        let resp = app
            .call(request("GET", "/v1/user/999", Some(&user_token), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn login_then_read_own_record() {
        let mut app = test_app().await.into_service();

        let created = app
            .call(request("POST", "/v1/user", None, Some(create_body())))
            .await
            .unwrap();
        let id = body_json(created).await["id"].as_i64().unwrap();

        let login = app
            .call(request(
                "POST",
                "/v1/auth/login",
                None,
                Some(json!({"username": "user", "password": "password"})),
            ))
            .await
            .unwrap();
        assert_eq!(login.status(), StatusCode::OK);
        let login_body = body_json(login).await;
        let bearer = login_body["token"].as_str().unwrap().to_string();
        assert_eq!(login_body["tokenType"], "Bearer");

        let resp = app
            .call(request(
                "GET",
                &format!("/v1/user/{}", id),
                Some(&bearer),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["username"], "user");
    }

    #[tokio::test]
    async fn login_wrong_password_is_unauthorized() {
        let mut app = test_app().await.into_service();

        app.call(request("POST", "/v1/user", None, Some(create_body())))
            .await
            .unwrap();

        let resp = app
            .call(request(
                "POST",
                "/v1/auth/login",
                None,
                Some(json!({"username": "user", "password": "wrong"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn all_users_empty_store_is_no_content() {
        let mut app = test_app().await.into_service();
        let admin = token(&[ROLE_ADMIN]);
        let resp = app
            .call(request("GET", "/v1/user/all-users", Some(&admin), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn all_users_forbidden_for_user_role() {
        let mut app = test_app().await.into_service();
        let user_token = token(&[ROLE_USER]);
        let resp = app
            .call(request("GET", "/v1/user/all-users", Some(&user_token), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn all_users_for_admin_lists_users() {
        let mut app = test_app().await.into_service();
        app.call(request("POST", "/v1/user", None, Some(create_body())))
            .await
            .unwrap();

        let admin = token(&[ROLE_ADMIN]);
        let resp = app
            .call(request("GET", "/v1/user/all-users", Some(&admin), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn toggle_missing_user_is_not_found() {
        let mut app = test_app().await.into_service();
        let admin = token(&[ROLE_ADMIN]);
        let resp = app
            .call(request(
                "POST",
                "/v1/user/toggle-user/999?enabled=true",
                Some(&admin),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn toggle_forbidden_for_user_role() {
        let mut app = test_app().await.into_service();
        let user_token = token(&[ROLE_USER]);
        let resp = app
            .call(request(
                "POST",
                "/v1/user/toggle-user/1?enabled=false",
                Some(&user_token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_toggles_user_status() {
        let mut app = test_app().await.into_service();
        let created = app
            .call(request("POST", "/v1/user", None, Some(create_body())))
            .await
            .unwrap();
        let id = body_json(created).await["id"].as_i64().unwrap();

        let admin = token(&[ROLE_ADMIN]);
        let resp = app
            .call(request(
                "POST",
                &format!("/v1/user/toggle-user/{}?enabled=false", id),
                Some(&admin),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["id"], id);

        // A disabled account can no longer log in.
        let login = app
            .call(request(
                "POST",
                "/v1/auth/login",
                None,
                Some(json!({"username": "user", "password": "password"})),
            ))
            .await
            .unwrap();
        assert_eq!(login.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn health_is_open() {
        let mut app = test_app().await.into_service();
        let resp = app
            .call(request("GET", "/health", None, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
