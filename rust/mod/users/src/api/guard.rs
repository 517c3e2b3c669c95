//! Access guard: bearer token middleware.
//!
//! Each stage either short-circuits with a [`ServiceError`] or hands the
//! request on with an [`Identity`] in its extensions:
//!
//! 1. [`bearer_token`] pulls the token out of `Authorization: Bearer <token>`.
//! 2. [`authenticate`] verifies it with the [`TokenCodec`].
//! 3. [`ensure_admin`] additionally requires the `admin` role.
//!
//! The middlewares below compose these stages for use with
//! `axum::middleware::from_fn_with_state`.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use accounts_core::ServiceError;

use crate::model::Identity;
use crate::service::token::{TokenCodec, TokenError};

pub const TOKEN_NOT_PROVIDED: &str = "token not provided";
pub const TOKEN_EXPIRED: &str = "token expired";
pub const TOKEN_INVALID: &str = "invalid token";
pub const ADMIN_REQUIRED: &str = "admin privileges required";

/// Extract the Bearer token from the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ServiceError> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ServiceError::TokenMissing(TOKEN_NOT_PROVIDED.into()))
}

/// Verify the request's bearer token and return the caller identity.
pub fn authenticate(codec: &TokenCodec, headers: &HeaderMap) -> Result<Identity, ServiceError> {
    let token = bearer_token(headers)?;
    let claims = codec.verify(token).map_err(|e| {
        debug!("rejecting bearer token: {}", e);
        match e {
            TokenError::Expired => ServiceError::TokenExpired(TOKEN_EXPIRED.into()),
            _ => ServiceError::TokenInvalid(TOKEN_INVALID.into()),
        }
    })?;
    Ok(claims.identity())
}

/// Require the `admin` role.
pub fn ensure_admin(identity: &Identity) -> Result<(), ServiceError> {
    if identity.is_admin() {
        Ok(())
    } else {
        debug!(subject = %identity.subject_id, "admin route refused");
        Err(ServiceError::PermissionDenied(ADMIN_REQUIRED.into()))
    }
}

/// Middleware: a valid token is required.
pub async fn require_token(
    State(codec): State<Arc<TokenCodec>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let identity = authenticate(&codec, req.headers())?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Middleware: a valid token carrying the `admin` role is required.
pub async fn require_admin(
    State(codec): State<Arc<TokenCodec>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let identity = authenticate(&codec, req.headers())?;
    ensure_admin(&identity)?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Middleware: a token is optional, but one that is presented must verify.
pub async fn optional_token(
    State(codec): State<Arc<TokenCodec>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    if req.headers().contains_key(axum::http::header::AUTHORIZATION) {
        let identity = authenticate(&codec, req.headers())?;
        req.extensions_mut().insert(identity);
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{HeaderValue, StatusCode};
    use axum::routing::get;
    use axum::{Extension, Router};
    use tower::ServiceExt;

    use super::*;
    use crate::model::Role;
    use crate::service::token::TokenConfig;

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(TokenConfig::new("guard-test-secret")))
    }

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    async fn whoami(Extension(identity): Extension<Identity>) -> String {
        format!("{}:{}", identity.subject_id, identity.role)
    }

    fn router(codec: Arc<TokenCodec>) -> Router {
        Router::new()
            .route(
                "/token",
                get(whoami).layer(axum::middleware::from_fn_with_state(codec.clone(), require_token)),
            )
            .route(
                "/admin",
                get(whoami).layer(axum::middleware::from_fn_with_state(codec, require_admin)),
            )
    }

    async fn call(router: &Router, uri: &str, auth: Option<&str>) -> (StatusCode, String) {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        let resp = router.clone().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[test]
    fn test_bearer_prefix_is_required() {
        assert_eq!(bearer_token(&headers("Bearer abc")).unwrap(), "abc");
        assert!(matches!(bearer_token(&headers("Basic abc")), Err(ServiceError::TokenMissing(_))));
        assert!(matches!(bearer_token(&headers("Bearer ")), Err(ServiceError::TokenMissing(_))));
        assert!(matches!(bearer_token(&HeaderMap::new()), Err(ServiceError::TokenMissing(_))));
    }

    #[test]
    fn test_authenticate_distinguishes_expired_from_invalid() {
        let codec = codec();
        let expired = codec.issue_at("1", "x", Role::User, 0, 1_000).unwrap();
        let err = authenticate(&codec, &headers(&format!("Bearer {}", expired))).unwrap_err();
        assert!(matches!(err, ServiceError::TokenExpired(ref m) if m == TOKEN_EXPIRED));

        let err = authenticate(&codec, &headers("Bearer not-a-token")).unwrap_err();
        assert!(matches!(err, ServiceError::TokenInvalid(ref m) if m == TOKEN_INVALID));
    }

    #[tokio::test]
    async fn test_missing_header_is_rejected() {
        let (status, body) = call(&router(codec()), "/token", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["message"], "token not provided");
        assert_eq!(json["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler_with_identity() {
        let codec = codec();
        let token = codec.issue("7", "52998224725", Role::User).unwrap();
        let (status, body) = call(&router(codec), "/token", Some(&format!("Bearer {}", token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "7:user");
    }

    #[tokio::test]
    async fn test_admin_route_refuses_user_token() {
        let codec = codec();
        let token = codec.issue("7", "52998224725", Role::User).unwrap();
        let (status, body) = call(&router(codec), "/admin", Some(&format!("Bearer {}", token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["message"], "admin privileges required");
    }

    #[tokio::test]
    async fn test_admin_route_accepts_admin_token() {
        let codec = codec();
        let token = codec.issue("1", "11144477735", Role::Admin).unwrap();
        let (status, body) = call(&router(codec), "/admin", Some(&format!("Bearer {}", token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "1:admin");
    }

    #[tokio::test]
    async fn test_admin_route_checks_token_before_role() {
        let (status, body) = call(&router(codec()), "/admin", Some("Bearer garbage")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["code"], "TOKEN_INVALID");
    }
}
