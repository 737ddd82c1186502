use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use campus_api::auth::jwt::JwtConfig;
use campus_api::config::Config;
use campus_api::db::{create_pool, run_migrations};
use campus_api::llm_client::LlmClient;
use campus_api::routes::build_router;
use campus_api::state::AppState;
use campus_api::storage::LocalFileStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Campus API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and bring the schema up to date
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    // Initialize LLM client
    let llm = LlmClient::new(config.ollama_url.clone(), config.ollama_model.clone())?;
    info!(
        "LLM client initialized (server: {}, model: {})",
        config.ollama_url,
        llm.model()
    );

    // Initialize file store (LocalFileStore by default; any FileStore impl fits)
    let files = Arc::new(LocalFileStore::new(&config.upload_dir).await?);

    let jwt = JwtConfig::new(config.jwt_secret.clone(), config.jwt_expiry_mins);

    // Build app state
    let state = AppState {
        db,
        llm,
        files,
        jwt,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
