//! Request authorization middleware
//!
//! Decodes an optional `Authorization: Bearer <jwt>` header into an
//! [`AuthenticatedUser`] request extension, then evaluates the static
//! access rule table. Requests failing a protected rule receive 403 with
//! no body, whether anonymous or under-privileged.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::access_rules::{Access, AccessRules};
use crate::infrastructure::crypto::jwt::{verify_token, Claims, JwtConfig};

/// Authorization state: token verification config plus the rule table.
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
    pub rules: Arc<AccessRules>,
}

impl AuthState {
    pub fn new(jwt_config: JwtConfig) -> Self {
        Self {
            jwt_config,
            rules: Arc::new(AccessRules::standard()),
        }
    }
}

/// Authenticated caller, available to handlers via request extensions.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: String,
    pub authorities: Vec<String>,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            authorities: claims.authorities,
        }
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }
}

/// Extract token from Authorization header
fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Authorization middleware: authentication is optional, the rule table
/// decides whether it was required.
pub async fn authorize_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_token);

    if let Some(token) = bearer {
        if let Ok(claims) = verify_token(token, &auth_state.jwt_config) {
            if !claims.is_expired() {
                request
                    .extensions_mut()
                    .insert(AuthenticatedUser::from_claims(claims));
            }
        }
    }

    match auth_state
        .rules
        .decide(request.method(), request.uri().path())
    {
        Access::PermitAll => next.run(request).await,
        Access::AnyAuthority(required) => {
            let user = request.extensions().get::<AuthenticatedUser>();
            match user {
                Some(user) if required.iter().any(|a| user.has_authority(a)) => {
                    next.run(request).await
                }
                // 403 without a body: nothing leaks about why.
                _ => StatusCode::FORBIDDEN.into_response(),
            }
        }
    }
}
