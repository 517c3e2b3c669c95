use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::json;

use accounts_core::ServiceError;

use crate::api::AppState;
use crate::model::{CreateUser, Identity, LoginRequest, LoginResponse};

/// Routes open to anyone.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Registration, behind the optional-token guard.
pub fn register_routes() -> Router<AppState> {
    Router::new().route("/register", post(register))
}

/// Routes behind the token guard.
pub fn token_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
}

/// Routes behind the admin guard.
pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/", get(list_users))
}

/// Self-or-admin rule for per-user routes.
fn ensure_self_or_admin(identity: &Identity, id: &str) -> Result<(), ServiceError> {
    if identity.can_access(id) {
        Ok(())
    } else {
        Err(ServiceError::PermissionDenied("access denied".into()))
    }
}

async fn register(
    State(svc): State<AppState>,
    caller: Option<Extension<Identity>>,
    Json(input): Json<CreateUser>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let caller = caller.map(|Extension(identity)| identity);
    let user = svc.create_user(input, caller.as_ref()).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "user registered", "user": user})),
    ))
}

async fn login(
    State(svc): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServiceError> {
    let resp = svc.login(body).await?;
    Ok(Json(resp))
}

async fn list_users(
    State(svc): State<AppState>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let users = svc.list_users().await?;
    Ok(Json(json!({"message": "users retrieved", "users": users})))
}

async fn me(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let user = svc.get_user(&identity.subject_id).await?;
    Ok(Json(json!({"message": "user retrieved", "user": user})))
}

async fn get_user(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    ensure_self_or_admin(&identity, &id)?;
    let user = svc.get_user(&id).await?;
    Ok(Json(json!({"message": "user retrieved", "user": user})))
}

async fn update_user(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    ensure_self_or_admin(&identity, &id)?;
    let user = svc.update_user(&identity, &id, patch).await?;
    Ok(Json(json!({"message": "user updated", "user": user})))
}

async fn delete_user(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    ensure_self_or_admin(&identity, &id)?;
    svc.delete_user(&id).await?;
    Ok(Json(json!({"message": "user deleted"})))
}
