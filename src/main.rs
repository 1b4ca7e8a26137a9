use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use mockable::DefaultClock;
use tracing_subscriber::EnvFilter;

use tijdkaart_api::auth::TokenService;
use tijdkaart_api::config::AppConfig;
use tijdkaart_api::database::{DatabaseManager, MemoryStore, PgStore, Store};
use tijdkaart_api::server::{app, AppState};

#[derive(Debug, Parser)]
#[command(name = "tijdkaart-api", version, about = "Time and mileage tracking API server")]
struct Args {
    /// Port to listen on (overrides PORT / API_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind (overrides API_BIND_ADDRESS)
    #[arg(short, long)]
    bind: Option<String>,

    /// Serve from the in-process store instead of PostgreSQL
    #[arg(long)]
    in_memory: bool,

    /// Do not run embedded migrations on startup
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")))
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(bind) = args.bind {
        config.api.bind_address = bind;
    }
    tracing::info!("Starting Tijdkaart API in {:?} mode", config.environment);

    let tokens = TokenService::new(&config.security).context("invalid token settings")?;

    let mut pool = None;
    let store: Arc<dyn Store> = if args.in_memory {
        tracing::warn!("Using the in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let pg = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to the database")?;
        if !args.skip_migrations {
            DatabaseManager::migrate(&pg).await.context("failed to run migrations")?;
        }
        pool = Some(pg.clone());
        Arc::new(PgStore::new(pg))
    };

    let addr: SocketAddr = format!("{}:{}", config.api.bind_address, config.api.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.api.bind_address, config.api.port))?;

    let state = AppState::new(Arc::new(config), Arc::new(tokens), store, Arc::new(DefaultClock));
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Tijdkaart API listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(pool) = pool {
        DatabaseManager::close(&pool).await;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
