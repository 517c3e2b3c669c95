//! Users module: account records behind bearer-token access control.
//!
//! # Pieces
//!
//! - [`validate`]: identifier (CPF) checksum and `YYYY-MM-DD` date checks
//! - [`service::token`]: HS256 token issuance and verification
//! - [`api::guard`]: `require_token` / `require_admin` middleware
//! - [`service::UserService`]: user operations against a [`Directory`]
//!
//! # Usage
//!
//! ```ignore
//! use users::{UsersModule, service::token::{TokenCodec, TokenConfig}};
//!
//! let module = UsersModule::new(directory, TokenCodec::new(TokenConfig::new(secret)));
//! let router = module.routes(); // Mount under /api/users
//! ```
//!
//! [`Directory`]: accounts_directory::Directory

pub mod api;
pub mod model;
pub mod service;
pub mod validate;

use std::sync::Arc;

use axum::Router;

use accounts_core::Module;
use accounts_directory::Directory;

use crate::service::token::TokenCodec;
use crate::service::UserService;

/// Users module implementing the Module trait.
pub struct UsersModule {
    service: Arc<UserService>,
}

impl UsersModule {
    pub fn new(directory: Arc<dyn Directory>, tokens: TokenCodec) -> Self {
        Self {
            service: UserService::new(directory, tokens),
        }
    }

    /// Get a reference to the underlying UserService.
    pub fn service(&self) -> &Arc<UserService> {
        &self.service
    }
}

impl Module for UsersModule {
    fn name(&self) -> &str {
        "users"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
