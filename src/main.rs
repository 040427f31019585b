use std::fs;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use spechub::config::ServerConfig;
use spechub::server::{AppState, create_router};
use spechub::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "spechub")]
#[command(about = "A collaborative SRS and source-code hub", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database, uploads, and extraction outputs
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("spechub=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            data_dir,
        } => {
            let config = ServerConfig::from_env(host, port, data_dir.into())?;

            fs::create_dir_all(&config.data_dir)?;
            fs::create_dir_all(config.uploads_dir())?;
            fs::create_dir_all(config.extracted_dir())?;

            let store = SqliteStore::new(config.db_path())?;
            store.initialize()?;

            let addr = config.socket_addr()?;
            let state = Arc::new(AppState::new(Arc::new(store), config)?);
            let app = create_router(state);

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
