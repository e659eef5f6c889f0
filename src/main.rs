use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use clap::Parser;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crud_base::config::{AppConfig, Environment, SecurityConfig};
use crud_base::database::{InMemoryRepository, PgRepository, Repository};
use crud_base::demo::{self, Note};

#[derive(Parser, Debug)]
#[command(name = "crud-base", version, about = "Demo notes API built on the crud-base contracts")]
struct Args {
    /// Port to listen on (overrides configuration)
    #[arg(short, long)]
    port: Option<u16>,

    /// YAML configuration file; environment variables still take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so SECURITY_JWT_SECRET etc. can live there
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => AppConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::from_env(),
    };
    tracing::info!("Starting crud-base in {:?} mode", config.environment);
    if config.environment == Environment::Production && config.security.jwt_issuer.is_none() {
        tracing::warn!("No JWT issuer configured; tokens from any issuer sharing the secret are accepted");
    }

    let repository = note_repository().await?;
    let mut app = demo::app_with_repository(&config, repository).context("failed to set up token service")?;
    if config.security.enable_cors {
        app = app.layer(cors_layer(&config.security));
    }
    if config.server.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", config.server.host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

/// Postgres when DATABASE_URL is set, memory otherwise
async fn note_repository() -> anyhow::Result<Arc<dyn Repository<Note, i64>>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        tracing::info!("DATABASE_URL not set; notes are kept in memory");
        return Ok(Arc::new(InMemoryRepository::<Note>::new()));
    };

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .context("failed to connect to DATABASE_URL")?;
    sqlx::query(demo::CREATE_NOTES_TABLE)
        .execute(&pool)
        .await
        .context("failed to create notes table")?;

    tracing::info!("Storing notes in Postgres");
    Ok(Arc::new(PgRepository::<Note>::new("notes", pool)?))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    }
}
