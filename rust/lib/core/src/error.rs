use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Clients match on these,
// never on the human-readable message string.

/// Stable error code constants.
///
/// Clients should match on `code` from `{"code": "TOKEN_EXPIRED", "message": "..."}`.
/// Codes never change; messages may be reworded.
pub mod error_code {
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const TOKEN_MISSING: &str = "TOKEN_MISSING";
    pub const TOKEN_INVALID: &str = "TOKEN_INVALID";
    pub const TOKEN_EXPIRED: &str = "TOKEN_EXPIRED";
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const REMOTE_ERROR: &str = "REMOTE_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
}

// ── ServiceError ────────────────────────────────────────────────────

/// Unified service error type returned at the HTTP boundary.
///
/// Each variant maps to a stable error code (see [`error_code`]) and an
/// HTTP status code. The JSON response always includes both:
///
/// ```json
/// {"code": "TOKEN_MISSING", "message": "token not provided"}
/// ```
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Malformed identifier, date or missing field. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// No user matches the supplied credentials. HTTP 401.
    #[error("{0}")]
    Unauthenticated(String),

    /// Request carried no usable bearer token. HTTP 401.
    #[error("{0}")]
    TokenMissing(String),

    /// Bearer token failed signature or structure checks. HTTP 401.
    #[error("{0}")]
    TokenInvalid(String),

    /// Bearer token is past its expiry. HTTP 401.
    #[error("{0}")]
    TokenExpired(String),

    /// Authenticated but lacks the required privilege. HTTP 403.
    #[error("{0}")]
    PermissionDenied(String),

    /// Resource does not exist. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate key / resource already exists. HTTP 409.
    #[error("{0}")]
    Conflict(String),

    /// The remote directory call failed. HTTP 500, message passed through.
    #[error("{0}")]
    Remote(String),

    /// Unexpected internal error. HTTP 500.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => error_code::VALIDATION_FAILED,
            ServiceError::Unauthenticated(_) => error_code::UNAUTHENTICATED,
            ServiceError::TokenMissing(_) => error_code::TOKEN_MISSING,
            ServiceError::TokenInvalid(_) => error_code::TOKEN_INVALID,
            ServiceError::TokenExpired(_) => error_code::TOKEN_EXPIRED,
            ServiceError::PermissionDenied(_) => error_code::PERMISSION_DENIED,
            ServiceError::NotFound(_) => error_code::NOT_FOUND,
            ServiceError::Conflict(_) => error_code::ALREADY_EXISTS,
            ServiceError::Remote(_) => error_code::REMOTE_ERROR,
            ServiceError::Internal(_) => error_code::INTERNAL,
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthenticated(_)
            | ServiceError::TokenMissing(_)
            | ServiceError::TokenInvalid(_)
            | ServiceError::TokenExpired(_) => StatusCode::UNAUTHORIZED,
            ServiceError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Remote(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "code": self.error_code(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(ServiceError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::Unauthenticated("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ServiceError::TokenMissing("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ServiceError::TokenInvalid("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ServiceError::TokenExpired("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ServiceError::PermissionDenied("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ServiceError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(ServiceError::Remote("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ServiceError::Internal("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_code_mapping() {
        assert_eq!(ServiceError::Validation("x".into()).error_code(), "VALIDATION_FAILED");
        assert_eq!(ServiceError::Unauthenticated("x".into()).error_code(), "UNAUTHENTICATED");
        assert_eq!(ServiceError::TokenMissing("x".into()).error_code(), "TOKEN_MISSING");
        assert_eq!(ServiceError::TokenInvalid("x".into()).error_code(), "TOKEN_INVALID");
        assert_eq!(ServiceError::TokenExpired("x".into()).error_code(), "TOKEN_EXPIRED");
        assert_eq!(ServiceError::PermissionDenied("x".into()).error_code(), "PERMISSION_DENIED");
        assert_eq!(ServiceError::NotFound("x".into()).error_code(), "NOT_FOUND");
        assert_eq!(ServiceError::Conflict("x".into()).error_code(), "ALREADY_EXISTS");
        assert_eq!(ServiceError::Remote("x".into()).error_code(), "REMOTE_ERROR");
        assert_eq!(ServiceError::Internal("x".into()).error_code(), "INTERNAL");
    }

    #[tokio::test]
    async fn test_json_response_format() {
        let err = ServiceError::TokenMissing("token not provided".into());
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["code"], "TOKEN_MISSING");
        assert_eq!(json["message"], "token not provided");
    }

    #[test]
    fn test_remote_message_is_passed_through_verbatim() {
        let err = ServiceError::Remote("connection refused (os error 111)".into());
        assert_eq!(err.to_string(), "connection refused (os error 111)");
    }
}
