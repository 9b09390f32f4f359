use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub dev: DevConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory served under /static (CSS, JS, images)
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Carts untouched for this long are dropped from memory
    #[serde(default = "default_cart_idle_minutes")]
    pub cart_idle_minutes: u64,
    /// Seconds between sweeps of idle carts and expired sessions
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            static_dir: default_static_dir(),
            max_connections: default_max_connections(),
            cart_idle_minutes: default_cart_idle_minutes(),
            cleanup_interval: default_cleanup_interval(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("./static")
}

fn default_max_connections() -> u32 {
    5
}

fn default_cart_idle_minutes() -> u64 {
    120
}

fn default_cleanup_interval() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Lifetime of a regular login session
    #[serde(default = "default_session_hours")]
    pub session_hours: i64,
    /// Lifetime of a "remember me" login session
    #[serde(default = "default_remember_days")]
    pub remember_days: i64,
    /// Mark session cookies as Secure (requires HTTPS in front of the service)
    #[serde(default)]
    pub cookie_secure: bool,
    /// Return password reset tokens in the API response instead of only logging them.
    /// Only meant for local development where no mailer is configured.
    #[serde(default)]
    pub expose_reset_tokens: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_hours: default_session_hours(),
            remember_days: default_remember_days(),
            cookie_secure: false,
            expose_reset_tokens: false,
        }
    }
}

fn default_session_hours() -> i64 {
    24
}

fn default_remember_days() -> i64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Root folder holding one sub-folder per image category
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,
    /// Insert the built-in venues and suppliers when the catalog tables are empty
    #[serde(default = "default_seed_on_startup")]
    pub seed_on_startup: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            images_dir: default_images_dir(),
            seed_on_startup: default_seed_on_startup(),
        }
    }
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("./static/images")
}

fn default_seed_on_startup() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DevConfig {
    /// Expose POST /api/dev/seed-* routes
    #[serde(default)]
    pub seed_routes: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse configuration file")
    }

    pub fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            catalog: CatalogConfig::default(),
            dev: DevConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
