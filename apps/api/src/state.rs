use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::jwt::JwtConfig;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::storage::FileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    /// Pluggable byte-blob store. Default: `LocalFileStore` rooted at `UPLOAD_DIR`.
    pub files: Arc<dyn FileStore>,
    pub jwt: JwtConfig,
    pub config: Config,
}
