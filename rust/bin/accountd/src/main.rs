//! `accountd`: the user account server binary.
//!
//! Usage:
//!   accountd [-c <path>] [--listen <addr>]
//!
//! Without `-c`, configuration comes from the environment alone
//! (`JWT_SECRET_KEY`, `DIRECTORY_URL`, `DIRECTORY_KEY`, ...).

mod bootstrap;
mod config;
mod routes;

use std::path::PathBuf;

use accounts_core::Module;
use clap::Parser;
use tracing::info;

use config::ServerConfig;
use users::service::token::{TokenCodec, TokenConfig};

/// User account server.
#[derive(Parser, Debug)]
#[command(name = "accountd", about = "User account server")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Listen address (overrides the config file, default 0.0.0.0:8080).
    #[arg(long = "listen")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let mut server_config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            ServerConfig::load(path)?
        }
        None => ServerConfig::default(),
    };
    server_config.apply_env(|key| std::env::var(key).ok())?;
    if let Some(listen) = cli.listen {
        server_config.server.listen = Some(listen);
    }

    // Verify configuration is valid.
    bootstrap::verify_config(&server_config)?;
    bootstrap::warn_weak_settings(&server_config);

    let directory = bootstrap::build_directory(&server_config.directory)?;
    let tokens = TokenCodec::new(
        TokenConfig::new(server_config.jwt.secret.clone()).with_ttl_hours(server_config.jwt.ttl_hours),
    );
    info!("Tokens expire after {} hour(s)", tokens.ttl_hours());

    let users_module = users::UsersModule::new(directory, tokens);
    info!("Users module initialized");

    let module_routes = vec![(users_module.name(), users_module.routes())];
    let cors = routes::build_cors(&server_config.cors)?;
    let app = routes::build_router(module_routes, cors);

    // Start server.
    let listen = server_config.listen();
    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!("accountd listening on {}", listen);
    axum::serve(listener, app).await?;

    Ok(())
}
