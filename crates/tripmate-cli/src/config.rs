use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CliError;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    // Secret (from ENV only)
    #[serde(skip)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Sent with every request when set; otherwise the server picks
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: None,
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> u32 {
    20
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Token kept in memory only when unset
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. TRIPMATE_* variables, `__` between section and key
    ///    (e.g. `TRIPMATE_API__BASE_URL`)
    pub fn load() -> Result<Self, CliError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("TRIPMATE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        cfg.token = std::env::var("TRIPMATE_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CliError> {
        let config = ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_structure() {
        let toml = r#"
            [api]
            base_url = "https://trips.example.com/api"
            request_timeout_ms = 5000
            connect_timeout_ms = 2000

            [chat]
            model = "trip-planner"
            page_size = 50

            [auth]
            token_file = "/tmp/tripmate/token"

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.base_url, "https://trips.example.com/api");
        assert_eq!(config.api.connect_timeout(), Duration::from_secs(2));
        assert_eq!(config.chat.model.as_deref(), Some("trip-planner"));
        assert_eq!(config.chat.page_size, 50);
        assert_eq!(config.auth.token_file, Some(PathBuf::from("/tmp/tripmate/token")));
        assert_eq!(config.logging.format, "json");
        assert!(config.token.is_none());
    }

    #[test]
    fn test_sections_default() {
        let config: Config = toml::from_str(
            r#"
            [api]
            base_url = "http://localhost:8000/api"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.request_timeout(), Duration::from_secs(10));
        assert!(config.chat.model.is_none());
        assert_eq!(config.chat.page_size, 20);
        assert!(config.auth.token_file.is_none());
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("tripmate-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[api]\nbase_url = \"http://127.0.0.1:9000/api\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:9000/api");

        std::fs::remove_file(&path).ok();
    }
}
