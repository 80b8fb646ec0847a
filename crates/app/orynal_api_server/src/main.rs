//! Orynal API server binary.
//!
//! Connects to PostgreSQL, applies migrations, seeds the first admin when
//! configured and serves the REST API until ctrl-c.

use std::future::IntoFuture;
use std::time::Duration;

use clap::Parser;
use orynal_api::config::ApiConfig;
use orynal_core::store::PgStore;
use orynal_core::users::{AdminSeed, seed_admin};
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "orynal_api_server", about = "Orynal restaurant API server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3100")]
    bind_addr: String,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/orynal"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 10)]
    max_connections: u32,

    /// Secret used to sign and verify every token. Unset means a random
    /// secret per process, so tokens do not survive a restart.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Seconds to wait for in-flight requests after ctrl-c.
    #[arg(long, env = "SHUTDOWN_TIMEOUT_SECS", default_value_t = 10)]
    shutdown_timeout_secs: u64,

    /// Email of the admin account created on startup when missing.
    #[arg(long, env = "ADMIN_EMAIL", requires = "admin_password")]
    admin_email: Option<String>,

    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,

    #[arg(long, env = "ADMIN_PHONE", default_value = "")]
    admin_phone: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,orynal_api=debug,orynal_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    info!(bind_addr = %args.bind_addr, "starting orynal_api_server");
    info!(max_connections = args.max_connections, "configuring connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&args.database_url)
        .await?;

    info!("running database migrations");
    orynal_api::migrate(&pool).await?;

    match (args.admin_email, args.admin_password) {
        (Some(email), Some(password)) => {
            let store = PgStore::new(pool.clone());
            let seed = AdminSeed {
                email,
                password,
                phone: args.admin_phone,
            };
            if !seed_admin(&store, seed).await? {
                info!("admin account already present");
            }
        }
        _ => warn!("ADMIN_EMAIL not set; no admin account will be seeded"),
    }

    let config = ApiConfig::new(
        args.bind_addr,
        args.database_url,
        args.jwt_secret,
        Duration::from_secs(args.shutdown_timeout_secs),
    );

    let state = orynal_api::AppState::new(pool.clone(), config.clone());
    let app = orynal_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "REST API listening");

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("failed to listen for ctrl-c: {e}");
                return;
            }
            info!("ctrl-c received, shutting down");
            shutdown.cancel();
        }
    });

    let server = axum::serve(listener, app)
        .with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move { shutdown.cancelled().await }
        })
        .into_future();

    tokio::select! {
        result = server => result?,
        _ = async {
            shutdown.cancelled().await;
            tokio::time::sleep(config.shutdown_timeout).await;
        } => {
            warn!(
                timeout_secs = config.shutdown_timeout.as_secs(),
                "in-flight requests did not finish in time"
            );
        }
    }

    pool.close().await;
    info!("server stopped");
    Ok(())
}
