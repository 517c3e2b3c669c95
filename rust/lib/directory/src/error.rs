use thiserror::Error;

/// Failure of a directory call.
///
/// Messages are carried verbatim from the backend so callers can surface
/// them unchanged.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// A unique column already holds the value.
    #[error("{0}")]
    Conflict(String),

    /// Transport failure or error reported by the remote store.
    #[error("{0}")]
    Remote(String),

    /// The store answered with something that is not a row set.
    #[error("unexpected directory response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for DirectoryError {
    fn from(e: reqwest::Error) -> Self {
        DirectoryError::Remote(e.to_string())
    }
}
