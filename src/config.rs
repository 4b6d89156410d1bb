use std::env;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cms: CmsConfig,
    pub radiocult: RadioCultConfig,
    pub sync: SyncConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CmsConfig {
    /// Base URL of the headless CMS REST API.
    pub api_url: String,
    /// Bucket slug holding the station's content.
    pub bucket_slug: String,
    pub read_key: String,
    /// Required for persisting platform event ids back onto show records
    /// after a sync.
    pub write_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RadioCultConfig {
    pub api_url: String,
    pub station_id: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Whether the periodic background sync worker is enabled. The manual
    /// HTTP trigger works either way.
    pub enabled: bool,
    /// How often (seconds) the background worker runs a full sync pass.
    pub interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Allowed requests per second (per IP) for the sync trigger endpoint
    pub sync_per_second: u32,
    /// Burst size for the sync trigger endpoint
    pub sync_burst: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,
                frontend_url: env::var("FRONTEND_URL")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            },
            cms: CmsConfig {
                api_url: env::var("CMS_API_URL")
                    .unwrap_or_else(|_| "https://api.cosmicjs.com/v3".to_string()),
                bucket_slug: env::var("CMS_BUCKET_SLUG")
                    .map_err(|_| ConfigError::MissingEnv("CMS_BUCKET_SLUG".to_string()))?,
                read_key: env::var("CMS_READ_KEY")
                    .map_err(|_| ConfigError::MissingEnv("CMS_READ_KEY".to_string()))?,
                write_key: env::var("CMS_WRITE_KEY")
                    .map_err(|_| ConfigError::MissingEnv("CMS_WRITE_KEY".to_string()))?,
            },
            radiocult: RadioCultConfig {
                api_url: env::var("RADIOCULT_API_URL")
                    .unwrap_or_else(|_| "https://api.radiocult.fm/api".to_string()),
                station_id: env::var("RADIOCULT_STATION_ID")
                    .map_err(|_| ConfigError::MissingEnv("RADIOCULT_STATION_ID".to_string()))?,
                api_key: env::var("RADIOCULT_API_KEY")
                    .map_err(|_| ConfigError::MissingEnv("RADIOCULT_API_KEY".to_string()))?,
            },
            sync: SyncConfig {
                enabled: match env::var("SYNC_ENABLED") {
                    Ok(v) => match v.to_lowercase().as_str() {
                        "1" | "true" | "yes" => true,
                        "0" | "false" | "no" => false,
                        _ => true,
                    },
                    Err(_) => true,
                },
                interval_seconds: env::var("SYNC_INTERVAL_SECONDS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()
                    .unwrap_or(3600u64),
            },
            rate_limit: RateLimitConfig {
                sync_per_second: env::var("RATE_LIMIT_SYNC_PER_SECOND")
                    .unwrap_or_else(|_| "1".to_string())
                    .parse()
                    .unwrap_or(1),
                sync_burst: env::var("RATE_LIMIT_SYNC_BURST")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            },
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                frontend_url: "http://localhost:3000".to_string(),
            },
            cms: CmsConfig {
                api_url: "https://api.cosmicjs.com/v3".to_string(),
                bucket_slug: String::new(),
                read_key: String::new(),
                write_key: String::new(),
            },
            radiocult: RadioCultConfig {
                api_url: "https://api.radiocult.fm/api".to_string(),
                station_id: String::new(),
                api_key: String::new(),
            },
            sync: SyncConfig {
                enabled: true,
                interval_seconds: 3600,
            },
            rate_limit: RateLimitConfig {
                sync_per_second: 1,
                sync_burst: 5,
            },
        }
    }
}
