use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const DEFAULT_DATABASE_URL: &str = "sqlite://Resources/hawaii.sqlite";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_HTTP_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Station served by /tobs; resolved from observation counts when unset
    pub most_active_station: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub database: Option<DatabaseConfig>,
    pub http: Option<HttpConfig>,
    pub api: Option<ApiConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppConfig {
    /// Load configuration from CLIMATE_CONFIG path (TOML) if present, with
    /// reasonable defaults. DATABASE_URL overrides the configured database.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CLIMATE_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        let mut cfg = Self::load_from(&path)?;
        if let Ok(url) = std::env::var("DATABASE_URL") {
            cfg.set_database_url(url);
        }
        Ok(cfg)
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let s = fs::read_to_string(path)?;
        Ok(toml::from_str::<AppConfig>(&s)?)
    }

    pub fn set_database_url(&mut self, url: String) {
        match self.database.as_mut() {
            Some(db) => db.url = Some(url),
            None => {
                self.database = Some(DatabaseConfig {
                    url: Some(url),
                    max_connections: None,
                })
            }
        }
    }

    /// Get database URL (default sqlite://Resources/hawaii.sqlite)
    pub fn database_url(&self) -> String {
        self.database
            .as_ref()
            .and_then(|d| d.url.clone())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
    }

    pub fn max_connections(&self) -> u32 {
        self.database
            .as_ref()
            .and_then(|d| d.max_connections)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    /// Get HTTP bind address (default 0.0.0.0:8080)
    pub fn http_bind(&self) -> String {
        self.http
            .as_ref()
            .and_then(|h| h.bind.clone())
            .unwrap_or_else(|| DEFAULT_HTTP_BIND.to_string())
    }

    pub fn most_active_station(&self) -> Option<String> {
        self.api
            .as_ref()
            .and_then(|a| a.most_active_station.clone())
    }
}
