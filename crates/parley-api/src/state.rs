//! Application state wiring all services together.
//!
//! `ChatService` is generic over its repository; AppState pins it to the
//! SQLite implementation and holds the Gemini model chosen at startup.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use parley_core::chat::service::ChatService;
use parley_core::llm::box_provider::BoxChatModel;
use parley_infra::config::{gemini_api_key, jwt_secret, resolve_database_url};
use parley_infra::llm::create_chat_model;
use parley_infra::sqlite::pool::DatabasePool;
use parley_infra::sqlite::user::SqliteUserRepository;
use parley_types::config::AppConfig;

use crate::http::extractors::auth::TokenKeys;

/// Concrete type alias for the service generic pinned to the infra implementation.
pub type ConcreteChatService = ChatService<SqliteUserRepository>;

/// Shared application state for the REST API.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub tokens: Arc<TokenKeys>,
    pub config: Arc<AppConfig>,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Connect to the database, build the Gemini model, wire services.
    pub async fn init(config: AppConfig, data_dir: &Path) -> anyhow::Result<Self> {
        let db_pool = open_database(&config, data_dir).await?;
        let tokens = token_keys(&config)?;

        let model = create_chat_model(&config.gemini, gemini_api_key())
            .context("GEMINI_API_KEY (or GEMINI_API) must be set to serve chat requests")?;

        Ok(Self::new(config, db_pool, model, tokens))
    }

    /// Assemble state from already-built parts.
    pub fn new(
        config: AppConfig,
        db_pool: DatabasePool,
        model: BoxChatModel,
        tokens: TokenKeys,
    ) -> Self {
        let chat_service = ChatService::new(SqliteUserRepository::new(db_pool.clone()), model);

        Self {
            chat_service: Arc::new(chat_service),
            tokens: Arc::new(tokens),
            config: Arc::new(config),
            db_pool,
        }
    }
}

/// Open the SQLite database, running migrations.
pub async fn open_database(config: &AppConfig, data_dir: &Path) -> anyhow::Result<DatabasePool> {
    tokio::fs::create_dir_all(data_dir)
        .await
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    let db_url = resolve_database_url(config, data_dir);
    let pool = DatabasePool::new(&db_url)
        .await
        .with_context(|| format!("failed to open database {db_url}"))?;
    tracing::debug!(url = %db_url, "database ready");
    Ok(pool)
}

/// Build session token keys from `JWT_SECRET` and the `[auth]` section.
pub fn token_keys(config: &AppConfig) -> anyhow::Result<TokenKeys> {
    let secret = jwt_secret().context("JWT_SECRET must be set")?;
    Ok(TokenKeys::new(&secret, config.auth.token_ttl_days))
}
