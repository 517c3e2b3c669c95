use serde_json::Value;
use tracing::{debug, info, warn};

use accounts_core::now_rfc3339;
use accounts_directory::Row;

use crate::model::{CreateUser, Identity, LoginRequest, LoginResponse, Role, User, DEFAULT_STATUS};
use crate::service::{user_from_row, UserError, UserService};
use crate::validate::{normalize_identifier, validate_date, validate_identifier};

const INVALID_IDENTIFIER: &str = "invalid identifier format";
const INVALID_DATE: &str = "invalid birth date format, use YYYY-MM-DD";

/// Fields a caller can never write through an update.
const IMMUTABLE_FIELDS: &[&str] = &["id", "created_at"];

impl UserService {
    /// Register a new user.
    ///
    /// `role` is only honoured when `caller` is an admin; everyone else
    /// registers as [`Role::User`].
    pub async fn create_user(
        &self,
        input: CreateUser,
        caller: Option<&Identity>,
    ) -> Result<User, UserError> {
        let email = required(input.email, "email")?;
        let full_name = required(input.full_name, "full_name")?;
        let cpf = required(input.cpf, "cpf")?;
        let birth_date = required(input.birth_date, "birth_date")?;

        if !validate_identifier(&cpf) {
            return Err(UserError::Validation(INVALID_IDENTIFIER.into()));
        }
        if !validate_date(&birth_date) {
            return Err(UserError::Validation(INVALID_DATE.into()));
        }
        let cpf = normalize_identifier(&cpf);

        let role = match input.role {
            Some(role) if caller.is_some_and(Identity::is_admin) => role,
            Some(role) => {
                if role != Role::User {
                    debug!("dropping role '{}' from unprivileged registration", role);
                }
                Role::User
            }
            None => Role::User,
        };

        if self.find_one(&[("cpf", cpf.as_str())]).await?.is_some() {
            return Err(UserError::Conflict("identifier already registered".into()));
        }

        let mut fields = Row::new();
        fields.insert("email".into(), Value::String(email));
        fields.insert("full_name".into(), Value::String(full_name));
        fields.insert("cpf".into(), Value::String(cpf));
        fields.insert("birth_date".into(), Value::String(birth_date));
        fields.insert(
            "status".into(),
            Value::String(input.status.unwrap_or_else(|| DEFAULT_STATUS.to_string())),
        );
        fields.insert("role".into(), Value::String(role.to_string()));

        let row = self.directory.insert(fields).await?;
        let user = user_from_row(row)?;
        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Look up a user by identifier + birth date and stamp `last_login`.
    ///
    /// The pair is a weak credential: a birth date is low-entropy and often
    /// public.
    pub async fn authenticate(&self, cpf: &str, birth_date: &str) -> Result<User, UserError> {
        if !validate_identifier(cpf) {
            return Err(UserError::Validation(INVALID_IDENTIFIER.into()));
        }
        if !validate_date(birth_date) {
            return Err(UserError::Validation(INVALID_DATE.into()));
        }
        let cpf = normalize_identifier(cpf);

        let Some(user) = self
            .find_one(&[("cpf", cpf.as_str()), ("birth_date", birth_date)])
            .await?
        else {
            warn!("authentication failed: no matching user");
            return Err(UserError::InvalidCredentials);
        };

        let mut stamp = Row::new();
        stamp.insert("last_login".into(), Value::String(now_rfc3339()));
        let row = self
            .directory
            .update(&user.id, stamp)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        user_from_row(row)
    }

    /// Authenticate and mint a bearer token for the user.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, UserError> {
        let (Some(cpf), Some(birth_date)) = (req.cpf, req.birth_date) else {
            return Err(UserError::Validation(
                "cpf and birth_date are required".into(),
            ));
        };

        let user = self.authenticate(&cpf, &birth_date).await?;
        if user.cpf.is_empty() {
            warn!(user_id = %user.id, "matched user row carries no identifier");
            return Err(UserError::InvalidCredentials);
        }
        let token = self.tokens.issue(&user.id, &user.cpf, user.role)?;
        info!(user_id = %user.id, role = %user.role, "login succeeded");

        Ok(LoginResponse {
            message: "login succeeded".into(),
            token,
            token_type: "Bearer".into(),
            expires_in: self.tokens.ttl_secs(),
            user,
        })
    }

    /// Get a user by id.
    pub async fn get_user(&self, id: &str) -> Result<User, UserError> {
        self.find_one(&[("id", id)])
            .await?
            .ok_or_else(|| UserError::NotFound("user not found".into()))
    }

    /// List every user.
    pub async fn list_users(&self) -> Result<Vec<User>, UserError> {
        let rows = self.directory.select_by(&[]).await?;
        rows.into_iter().map(user_from_row).collect()
    }

    /// Update a user with the fields in `patch`.
    ///
    /// `role` is silently removed unless `caller` is an admin; `id` and
    /// `created_at` are always removed. `cpf` and `birth_date` are
    /// revalidated when present.
    pub async fn update_user(
        &self,
        caller: &Identity,
        id: &str,
        patch: Value,
    ) -> Result<User, UserError> {
        let Value::Object(mut fields) = patch else {
            return Err(UserError::Validation(
                "update payload must be a JSON object".into(),
            ));
        };

        for field in IMMUTABLE_FIELDS {
            fields.remove(*field);
        }

        if !caller.is_admin() {
            if fields.remove("role").is_some() {
                debug!(caller = %caller.subject_id, "dropping role from unprivileged update");
            }
        } else if let Some(role) = fields.get("role") {
            serde_json::from_value::<Role>(role.clone())
                .map_err(|_| UserError::Validation(format!("unknown role: {}", role)))?;
        }

        if let Some(cpf) = fields.get("cpf") {
            let cpf = cpf.as_str().filter(|s| validate_identifier(s)).ok_or_else(|| {
                UserError::Validation(INVALID_IDENTIFIER.into())
            })?;
            let cpf = normalize_identifier(cpf);
            fields.insert("cpf".into(), Value::String(cpf));
        }

        if let Some(birth_date) = fields.get("birth_date") {
            if !birth_date.as_str().is_some_and(validate_date) {
                return Err(UserError::Validation(INVALID_DATE.into()));
            }
        }

        fields.insert("updated_at".into(), Value::String(now_rfc3339()));

        let row = self
            .directory
            .update(id, fields)
            .await?
            .ok_or_else(|| UserError::NotFound("user not found".into()))?;
        user_from_row(row)
    }

    /// Delete a user by id.
    pub async fn delete_user(&self, id: &str) -> Result<(), UserError> {
        if !self.directory.delete(id).await? {
            return Err(UserError::NotFound("user not found".into()));
        }
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, UserError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| UserError::Validation(format!("missing required field: {}", field)))
}
