pub mod guard;
mod users;

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::Router;

use crate::service::UserService;

/// Shared application state.
pub type AppState = Arc<UserService>;

/// Build the users API router.
///
/// All routes are relative; the caller nests them under `/api/users`.
/// Each route group is wrapped in the guard it needs:
///
/// - `POST /login`: public
/// - `POST /register`: optional token (an admin token may set `role`)
/// - `GET /me`, `GET|PUT|DELETE /{id}`: token required
/// - `GET /`: admin required
pub fn build_router(svc: Arc<UserService>) -> Router {
    let codec = svc.tokens().clone();

    let register = users::register_routes()
        .route_layer(from_fn_with_state(codec.clone(), guard::optional_token));
    let authenticated = users::token_routes()
        .route_layer(from_fn_with_state(codec.clone(), guard::require_token));
    let admin = users::admin_routes()
        .route_layer(from_fn_with_state(codec, guard::require_admin));

    Router::new()
        .merge(users::public_routes())
        .merge(register)
        .merge(authenticated)
        .merge(admin)
        .with_state(svc)
}
