use anyhow::Context;
use clap::Parser;
use people_graph::{
    AppState, Config, GraphStore, HttpServer, PersistenceManager, PersonRepository,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "people-graph", version, about = "REST API over an embedded graph of people")]
struct Cli {
    /// YAML config file
    #[arg(long, env = "PEOPLE_GRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(long, env = "PEOPLE_GRAPH_HOST")]
    host: Option<String>,

    /// HTTP port
    #[arg(long, env = "PEOPLE_GRAPH_PORT")]
    port: Option<u16>,

    /// Database directory
    #[arg(long, env = "PEOPLE_GRAPH_DATA_PATH")]
    data_path: Option<PathBuf>,

    /// Run without the on-disk database
    #[arg(long, env = "PEOPLE_GRAPH_IN_MEMORY")]
    in_memory: bool,

    /// Tracing filter used when RUST_LOG is unset
    #[arg(long, env = "PEOPLE_GRAPH_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(data_path) = self.data_path {
            config.storage.data_path = data_path;
        }
        if self.in_memory {
            config.storage.in_memory = true;
        }
        if let Some(log_level) = self.log_level {
            config.log_level = log_level;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_config()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    fmt().with_env_filter(filter).init();

    info!("People Graph v{}", people_graph::version());

    let store = Arc::new(RwLock::new(GraphStore::new()));
    let persistence = if config.storage.in_memory {
        info!("Running in-memory, nothing will be persisted");
        None
    } else {
        let manager = PersistenceManager::open(&config.storage.data_path).with_context(|| {
            format!("failed to open database at {:?}", config.storage.data_path)
        })?;
        manager
            .recover_into(&mut *store.write().await)
            .context("failed to recover stored nodes")?;
        Some(Arc::new(manager))
    };

    let people = PersonRepository::new(Arc::clone(&store), persistence.clone()).await;
    let state = AppState::new(people, config.server.base_url());
    let server = HttpServer::new(state, config.server.host.clone(), config.server.port);

    let served = server
        .start(shutdown_signal())
        .await
        .with_context(|| format!("failed to serve on {}", config.server.base_url()));

    if let Some(persistence) = persistence {
        if let Err(e) = persistence.shutdown() {
            error!("Failed to shut down storage cleanly: {}", e);
        }
    }

    served
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
