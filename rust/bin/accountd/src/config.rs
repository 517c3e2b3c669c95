//! Server configuration.
//!
//! Read from an optional TOML file, then overridden by environment
//! variables:
//!
//! ```toml
//! [server]
//! listen = "0.0.0.0:8080"
//!
//! [jwt]
//! secret = "..."
//! ttl_hours = 1
//!
//! [directory]
//! backend = "rest"            # or "memory"
//! url = "https://xyz.supabase.co"
//! api_key = "..."
//! table = "users"
//! timeout_secs = 10
//!
//! [cors]
//! origins = ["https://app.example.com"]
//! ```

use std::fmt;
use std::path::Path;

use serde::Deserialize;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ListenConfig,
    #[serde(default)]
    pub jwt: JwtConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListenConfig {
    #[serde(default)]
    pub listen: Option<String>,
}

#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    /// Signing secret. Empty means "not configured"; startup refuses it.
    #[serde(default)]
    pub secret: String,
    /// Token lifetime in hours.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u32,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            ttl_hours: default_ttl_hours(),
        }
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &redacted(&self.secret))
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

/// Which directory implementation to run against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-process store; data is lost on restart.
    #[default]
    Memory,
    /// PostgREST-style remote table.
    Rest,
}

#[derive(Clone, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    /// Per-request timeout for the REST backend, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            url: String::new(),
            api_key: String::new(),
            table: default_table(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("backend", &self.backend)
            .field("url", &self.url)
            .field("api_key", &redacted(&self.api_key))
            .field("table", &self.table)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. `["*"]` allows any origin; empty disables CORS.
    #[serde(default)]
    pub origins: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment overrides. `lookup` is `std::env::var` in
    /// production and a map in tests.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `JWT_SECRET_KEY` | `jwt.secret` |
    /// | `JWT_TTL_HOURS` | `jwt.ttl_hours` |
    /// | `DIRECTORY_URL` / `SUPABASE_URL` | `directory.url` (selects the REST backend) |
    /// | `DIRECTORY_KEY` / `SUPABASE_KEY` | `directory.api_key` |
    /// | `CORS_ORIGINS` | `cors.origins` (comma separated) |
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| names.iter().filter_map(|n| lookup(n)).find(|v| !v.is_empty());

        if let Some(secret) = first(&["JWT_SECRET_KEY"]) {
            self.jwt.secret = secret;
        }
        if let Some(ttl) = first(&["JWT_TTL_HOURS"]) {
            self.jwt.ttl_hours = ttl
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("JWT_TTL_HOURS must be a non-negative integer: {}", e))?;
        }
        if let Some(url) = first(&["DIRECTORY_URL", "SUPABASE_URL"]) {
            self.directory.url = url;
            self.directory.backend = Backend::Rest;
        }
        if let Some(key) = first(&["DIRECTORY_KEY", "SUPABASE_KEY"]) {
            self.directory.api_key = key;
        }
        if let Some(origins) = first(&["CORS_ORIGINS"]) {
            self.cors.origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        Ok(())
    }

    /// Effective listen address.
    pub fn listen(&self) -> &str {
        self.server.listen.as_deref().unwrap_or(DEFAULT_LISTEN)
    }
}

fn default_ttl_hours() -> u32 {
    users::service::token::DEFAULT_TTL_HOURS
}

fn default_table() -> String {
    "users".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        "[REDACTED]"
    }
}
