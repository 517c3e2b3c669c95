pub mod token;
pub mod user;

use std::sync::Arc;

use thiserror::Error;
use tracing::error;

use accounts_directory::{Directory, DirectoryError, Row};

use crate::model::User;
use crate::service::token::{TokenCodec, TokenError};

/// Users service error type.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("{0}")]
    Validation(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Remote(String),

    #[error("{0}")]
    Internal(String),
}

impl From<DirectoryError> for UserError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::Conflict(m) => UserError::Conflict(m),
            DirectoryError::Remote(m) => {
                error!("directory failure: {}", m);
                UserError::Remote(m)
            }
            other @ DirectoryError::Decode(_) => {
                error!("directory failure: {}", other);
                UserError::Remote(other.to_string())
            }
        }
    }
}

impl From<TokenError> for UserError {
    fn from(e: TokenError) -> Self {
        UserError::Internal(e.to_string())
    }
}

impl From<UserError> for accounts_core::ServiceError {
    fn from(e: UserError) -> Self {
        use accounts_core::ServiceError;
        match e {
            UserError::Validation(m) => ServiceError::Validation(m),
            e @ UserError::InvalidCredentials => ServiceError::Unauthenticated(e.to_string()),
            UserError::NotFound(m) => ServiceError::NotFound(m),
            UserError::Conflict(m) => ServiceError::Conflict(m),
            UserError::Remote(m) => ServiceError::Remote(m),
            UserError::Internal(m) => ServiceError::Internal(m),
        }
    }
}

/// The users service. Holds the directory and the token codec.
pub struct UserService {
    pub(crate) directory: Arc<dyn Directory>,
    pub(crate) tokens: Arc<TokenCodec>,
}

impl UserService {
    pub fn new(directory: Arc<dyn Directory>, tokens: TokenCodec) -> Arc<Self> {
        Arc::new(Self {
            directory,
            tokens: Arc::new(tokens),
        })
    }

    /// The codec shared with the access guard.
    pub fn tokens(&self) -> &Arc<TokenCodec> {
        &self.tokens
    }

    /// Find the first row matching the filters and decode it.
    pub(crate) async fn find_one(&self, filters: &[(&str, &str)]) -> Result<Option<User>, UserError> {
        let rows = self.directory.select_by(filters).await?;
        rows.into_iter().next().map(user_from_row).transpose()
    }
}

/// Decode a directory row into a [`User`].
pub(crate) fn user_from_row(row: Row) -> Result<User, UserError> {
    serde_json::from_value(serde_json::Value::Object(row))
        .map_err(|e| UserError::Internal(format!("malformed user row: {}", e)))
}
