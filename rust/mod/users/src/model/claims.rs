use serde::{Deserialize, Serialize};

use crate::model::Role;

/// JWT claims payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id, always a string.
    pub sub: String,

    /// National identifier the token was issued for.
    pub cpf: String,

    pub role: Role,

    /// Issued at (unix timestamp).
    pub iat: i64,

    /// Expiration (unix timestamp).
    pub exp: i64,
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity {
            subject_id: self.sub.clone(),
            role: self.role,
        }
    }
}

/// Caller identity attached to a request by the access guard.
///
/// Lives in the request extensions for the lifetime of one request only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject_id: String,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True if the caller is an admin or is the user `target_id`.
    pub fn can_access(&self, target_id: &str) -> bool {
        self.is_admin() || self.subject_id == target_id
    }
}
