//! Bootstrap: first-start checks and directory construction.
//!
//! When accountd starts:
//! 1. Verify the signing secret, token lifetime and directory settings.
//!    If any is unusable, refuse to start.
//! 2. Build the configured [`Directory`] backend.

use std::sync::Arc;
use std::time::Duration;

use accounts_directory::{Directory, MemoryDirectory, RestDirectory};
use tracing::{info, warn};

use crate::config::{Backend, DirectoryConfig, ServerConfig};

/// Secrets shorter than this are accepted with a warning.
pub const MIN_SECRET_LEN: usize = 32;

/// Verify server configuration is ready to serve.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.jwt.secret.is_empty() {
        anyhow::bail!(
            "JWT secret is empty.\n\
             Set [jwt] secret in the config file or JWT_SECRET_KEY in the environment."
        );
    }
    if config.jwt.ttl_hours == 0 {
        anyhow::bail!("JWT ttl_hours must be at least 1.");
    }
    if config.directory.backend == Backend::Rest {
        if config.directory.url.is_empty() {
            anyhow::bail!("Directory backend is rest but no url is configured (DIRECTORY_URL).");
        }
        if config.directory.api_key.is_empty() {
            anyhow::bail!("Directory backend is rest but no api_key is configured (DIRECTORY_KEY).");
        }
    }
    if config.directory.table.is_empty() {
        anyhow::bail!("Directory table name is empty.");
    }
    if config.directory.timeout_secs == 0 {
        anyhow::bail!("Directory timeout_secs must be at least 1.");
    }
    Ok(())
}

/// Log warnings for settings that work but should not reach production.
/// Returns the number of warnings emitted.
pub fn warn_weak_settings(config: &ServerConfig) -> usize {
    let mut warnings = 0;
    if config.jwt.secret.len() < MIN_SECRET_LEN {
        warn!(
            "JWT secret is {} bytes; use at least {} random bytes",
            config.jwt.secret.len(),
            MIN_SECRET_LEN
        );
        warnings += 1;
    }
    // Login takes a CPF and a birth date, neither of which is secret.
    warn!("login credentials (CPF + birth date) are not secrets; do not expose this service publicly without an extra factor");
    warnings += 1;
    if config.directory.backend == Backend::Memory {
        warn!("using in-memory directory; users are lost on restart");
        warnings += 1;
    }
    warnings
}

/// Build the configured directory backend.
pub fn build_directory(config: &DirectoryConfig) -> anyhow::Result<Arc<dyn Directory>> {
    match config.backend {
        Backend::Memory => {
            info!("Directory: in-memory table '{}'", config.table);
            Ok(Arc::new(MemoryDirectory::new().with_unique_column("cpf")))
        }
        Backend::Rest => {
            let directory = RestDirectory::new(
                &config.url,
                config.api_key.clone(),
                &config.table,
                Duration::from_secs(config.timeout_secs),
            )
            .map_err(|e| anyhow::anyhow!("failed to build directory client: {}", e))?;
            info!("Directory: {} (timeout {}s)", directory.endpoint(), config.timeout_secs);
            Ok(Arc::new(directory))
        }
    }
}
