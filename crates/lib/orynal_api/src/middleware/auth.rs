//! Authentication middleware: bearer token extraction and JWT verification.
//!
//! Two resolvers share the header rules. [`validate_auth`] guards protected
//! routes and rejects any token it cannot decode. [`role_to_ctx`] serves
//! public routes that behave differently for signed-in callers and lets
//! undecodable tokens through as anonymous.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use orynal_core::auth::SessionIssuer;
use orynal_core::auth::jwt::TokenError;
use orynal_core::models::auth::Role;
use tracing::{debug, warn};

use crate::AppState;
use crate::error::AppError;

/// Identity resolved from a valid access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: i64,
    pub role: Role,
}

/// Identity resolved by the tolerant resolver; `None` for anonymous callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewer(pub Option<CurrentUser>);

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively on its first six characters and
/// the token starts after the seventh.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Forbidden("Missing authorization header".into()))?
        .to_str()
        .map_err(|_| AppError::Forbidden("Invalid authorization header".into()))?;

    if header.len() <= 7 || !header[..6].eq_ignore_ascii_case("bearer") {
        return Err(AppError::Forbidden("Invalid authorization scheme".into()));
    }
    Ok(&header[7..])
}

/// Decode an access token into the identity it carries. Refresh tokens have
/// no role claim and are rejected.
pub fn resolve_identity(
    issuer: &SessionIssuer<'_>,
    token: &str,
) -> Result<CurrentUser, TokenError> {
    let role = issuer.jwt_user_role(token)?;
    let user_id = issuer.jwt_user_id(token)?;
    Ok(CurrentUser { user_id, role })
}

/// Axum middleware for protected routes: verifies the bearer token and
/// injects [`CurrentUser`] into request extensions.
pub async fn validate_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;

    let user = match resolve_identity(&state.issuer(), token) {
        Ok(user) => user,
        Err(e) => {
            if e.is_expired() {
                debug!("rejected expired access token");
            } else {
                warn!(error = %e, "rejected access token");
            }
            return Err(AppError::from(e));
        }
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Axum middleware for public routes with optional identity: injects a
/// [`Viewer`], anonymous when the token does not decode.
pub async fn role_to_ctx(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let viewer = if request.headers().contains_key(AUTHORIZATION) {
        let token = bearer_token(request.headers())?;
        match resolve_identity(&state.issuer(), token) {
            Ok(user) => Viewer(Some(user)),
            Err(e) => {
                debug!(error = %e, "treating undecodable token as anonymous");
                Viewer(None)
            }
        }
    } else {
        Viewer(None)
    };

    request.extensions_mut().insert(viewer);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{HeaderValue, StatusCode};
    use axum::routing::get;
    use axum::{Extension, Router};
    use chrono::Utc;
    use orynal_core::auth::jwt::{self, ACCESS_TOKEN_TTL, REFRESH_TOKEN_TTL};
    use orynal_core::models::auth::{AccessClaims, RefreshClaims};
    use orynal_core::store::MemoryStore;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::ApiConfig;

    const SECRET: &str = "middleware-secret";

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_token(&headers("Bearer abc")).unwrap(), "abc");
        assert_eq!(bearer_token(&headers("bEaReR abc")).unwrap(), "abc");
    }

    #[test]
    fn missing_header_is_forbidden() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn other_schemes_are_forbidden() {
        assert!(matches!(
            bearer_token(&headers("Basic dXNlcjpwYXNz")),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn bare_scheme_is_forbidden() {
        assert!(matches!(
            bearer_token(&headers("Bearer ")),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn access_tokens_resolve_to_their_identity() {
        let store = MemoryStore::new();
        let issuer = SessionIssuer::new(&store, &store, SECRET.as_bytes());
        let token = token_issued_at(Utc::now());
        assert_eq!(
            resolve_identity(&issuer, &token).unwrap(),
            CurrentUser {
                user_id: 42,
                role: Role::Owner
            }
        );
    }

    #[test]
    fn refresh_tokens_do_not_resolve() {
        let store = MemoryStore::new();
        let issuer = SessionIssuer::new(&store, &store, SECRET.as_bytes());
        let refresh = jwt::sign(
            &RefreshClaims {
                email: "o@example.com".into(),
                user_id: 42,
            },
            SECRET.as_bytes(),
            REFRESH_TOKEN_TTL,
        )
        .unwrap();
        assert!(resolve_identity(&issuer, &refresh).is_err());
    }

    // -----------------------------------------------------------------------
    // Tolerant resolver
    // -----------------------------------------------------------------------

    fn viewer_echo() -> Router {
        let store = Arc::new(MemoryStore::new());
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost:5432/orynal_test")
            .unwrap();
        let config = ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            pg_connection_url: "postgres://localhost:5432/orynal_test".into(),
            jwt_secret: SECRET.into(),
            shutdown_timeout: Duration::from_secs(1),
        };
        let state = AppState::with_stores(pool, config, store.clone(), store.clone(), store);
        Router::new()
            .route(
                "/whoami",
                get(|Extension(viewer): Extension<Viewer>| async move {
                    match viewer.0 {
                        Some(user) => format!("{} {}", user.user_id, user.role),
                        None => "anonymous".to_string(),
                    }
                }),
            )
            .route_layer(axum::middleware::from_fn_with_state(
                state.clone(),
                role_to_ctx,
            ))
            .with_state(state)
    }

    async fn request_with(authorization: Option<String>) -> (StatusCode, String) {
        let mut builder = axum::http::Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let resp = viewer_echo()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn token_issued_at(issued_at: chrono::DateTime<Utc>) -> String {
        jwt::sign_at(
            &AccessClaims {
                email: "o@example.com".into(),
                user_id: 42,
                role: Role::Owner,
            },
            SECRET.as_bytes(),
            ACCESS_TOKEN_TTL,
            issued_at,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn tolerant_resolver_passes_anonymous_callers() {
        assert_eq!(request_with(None).await, (StatusCode::OK, "anonymous".into()));
    }

    #[tokio::test]
    async fn tolerant_resolver_injects_valid_identity() {
        let token = token_issued_at(Utc::now());
        assert_eq!(
            request_with(Some(format!("Bearer {token}"))).await,
            (StatusCode::OK, "42 owner".into())
        );
    }

    #[tokio::test]
    async fn tolerant_resolver_treats_expired_token_as_anonymous() {
        let token = token_issued_at(Utc::now() - chrono::Duration::hours(2));
        assert_eq!(
            request_with(Some(format!("Bearer {token}"))).await,
            (StatusCode::OK, "anonymous".into())
        );
    }

    #[tokio::test]
    async fn tolerant_resolver_rejects_other_schemes() {
        let (status, _) = request_with(Some("Basic dXNlcjpwYXNz".into())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
