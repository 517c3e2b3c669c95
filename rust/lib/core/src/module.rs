use axum::Router;

/// A service module that contributes HTTP routes.
///
/// The server binary collects modules and nests each one under
/// `/api/{name}`.
pub trait Module: Send + Sync {
    /// Module name, used for logging and route prefixes.
    fn name(&self) -> &str;

    /// Return the module's routes, to be nested under `/api/{name}`.
    fn routes(&self) -> Router;
}
