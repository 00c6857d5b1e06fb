//! `openerpd`: the OpenERP server binary.
//!
//! Usage:
//!   openerpd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/openerp/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use openerp_core::Module;
use tracing::info;

use config::ServerConfig;

/// OpenERP server.
#[derive(Parser, Debug)]
#[command(name = "openerpd", about = "OpenERP server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides the config file and the 0.0.0.0:8080 default).
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
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let mut core_config = openerp_core::ServiceConfig {
        data_dir: Some(data_dir),
        ..Default::default()
    };
    if let Some(listen) = cli.listen.or(server_config.server.listen) {
        core_config.listen = listen;
    }

    let sql_path = core_config.resolve_sqlite_path();
    let sql: Arc<dyn openerp_sql::SQLStore> = Arc::new(
        openerp_sql::SqliteStore::open(&sql_path)
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );
    info!("SQL store opened at {}", sql_path.display());

    // Register modules. Registration creates and migrates their tables.
    let product_module = product::ProductModule::new(Arc::clone(&sql))
        .map_err(|e| anyhow::anyhow!("failed to initialize product module: {}", e))?;
    info!(
        "Product module initialized ({})",
        product_module.models().join(", ")
    );

    let module_routes = vec![(product_module.name(), product_module.routes())];
    let app = routes::build_router(module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&core_config.listen).await?;
    info!("OpenERP server listening on {}", core_config.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
