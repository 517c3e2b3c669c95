use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Privilege level carried by a user record and by its tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user record as held by the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque identifier assigned by the directory. Numeric ids are kept
    /// in their decimal string form.
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub full_name: Option<String>,

    /// National identifier, digits only. Empty when the directory row
    /// carries none.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cpf: String,

    /// `YYYY-MM-DD`, or empty when the row carries none.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub birth_date: String,

    #[serde(default = "default_status")]
    pub status: String,

    #[serde(default)]
    pub role: Role,

    #[serde(default)]
    pub last_login: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Input for registering a user. Every field is optional at the wire
/// level so missing ones can be reported by name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUser {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Login request body. `username` is accepted as an alias for `cpf`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default, alias = "username")]
    pub cpf: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
}

/// Login response body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: User,
}

pub(crate) const DEFAULT_STATUS: &str = "active";

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "user id must be a string or number, got {}",
            other
        ))),
    }
}
