//! Route registration: module routes under `/api/{name}` plus system endpoints.

use axum::http::{header, HeaderValue, Method};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsConfig;

/// Build the CORS layer from configured origins. `None` when no origin is
/// configured.
pub fn build_cors(config: &CorsConfig) -> anyhow::Result<Option<CorsLayer>> {
    if config.origins.is_empty() {
        return Ok(None);
    }

    let origin = if config.origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins = config
            .origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o).map_err(|e| anyhow::anyhow!("invalid CORS origin '{}': {}", o, e))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    Ok(Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
    ))
}

/// Build the complete router with all routes.
pub fn build_router(module_routes: Vec<(&str, Router)>, cors: Option<CorsLayer>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    // Module routes are already Router<()> (they called .with_state() internally).
    for (name, router) in module_routes {
        app = app.nest(&format!("/api/{}", name), router);
    }

    if let Some(cors) = cors {
        app = app.layer(cors);
    }
    app.layer(TraceLayer::new_for_http())
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "accountd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
