//! Configuration loading for Parley.
//!
//! Reads `config.toml` from the data directory (`~/.parley/` in production)
//! into [`AppConfig`], falling back to defaults when the file is missing or
//! malformed. Secrets are never part of the file; they are read from the
//! environment here and handed out as [`SecretString`]s.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use parley_types::config::AppConfig;

/// Environment variable holding the Gemini API key.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";
/// Older name for the Gemini API key, still honored.
pub const GEMINI_API_KEY_LEGACY_VAR: &str = "GEMINI_API";
/// Environment variable holding the session token signing secret.
pub const JWT_SECRET_VAR: &str = "JWT_SECRET";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `PARLEY_DATA_DIR` environment variable
/// 2. `~/.parley`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PARLEY_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".parley");
    }

    PathBuf::from(".parley")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: returns [`AppConfig::default()`].
/// - Unreadable or unparseable file: logs a warning and returns the default.
pub async fn load_config(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// SQLite URL to open: the configured override, or `parley.db` in `data_dir`.
pub fn resolve_database_url(config: &AppConfig, data_dir: &Path) -> String {
    config
        .database_url
        .clone()
        .unwrap_or_else(|| crate::sqlite::pool::database_url_for(data_dir))
}

/// Gemini API key from `GEMINI_API_KEY`, else `GEMINI_API`.
pub fn gemini_api_key() -> Option<SecretString> {
    non_empty_var(GEMINI_API_KEY_VAR).or_else(|| non_empty_var(GEMINI_API_KEY_LEGACY_VAR))
}

/// Session token signing secret from `JWT_SECRET`.
pub fn jwt_secret() -> Option<SecretString> {
    non_empty_var(JWT_SECRET_VAR)
}

fn non_empty_var(name: &str) -> Option<SecretString> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
}
