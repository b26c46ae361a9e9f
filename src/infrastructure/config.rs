//! Configuration infrastructure
//!
//! Settings are layered, later sources win:
//! 1. Built-in defaults
//! 2. Optional config file (TOML/JSON, chosen by extension)
//! 3. `SHOWCASE_*` environment variables (`__` separates nested keys)
//! 4. Legacy `ADMIN_PASSWORD` / `UPLOADS_DIR` variables
//! 5. Command line flags (applied by the binary)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. "0.0.0.0:8000"
    pub listen: String,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Admin panel password; empty leaves the admin pages open
    pub admin_password: String,

    /// Directory for uploaded images, served under /uploads/
    pub uploads_dir: PathBuf,

    /// Directory for CSS/JS/ads.txt, served under /static/
    pub static_dir: PathBuf,

    /// Store imported when the bulk import form is left empty
    pub default_store_url: String,

    pub scraper: ScraperConfig,

    pub logging: LoggingConfig,
}

/// Outbound HTTP settings for scraping and the image proxy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub page_timeout_secs: u64,
    pub page_max_bytes: usize,
    pub store_timeout_secs: u64,
    pub store_max_bytes: usize,
    pub proxy_timeout_secs: u64,
    pub desktop_user_agent: String,
    pub mobile_user_agent: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted console logs
    pub json_format: bool,

    /// Also write a daily rolling log file
    pub file_output: bool,

    /// Directory for log files when `file_output` is on
    pub log_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: defaults::LISTEN.to_string(),
            database_path: PathBuf::from(defaults::DATABASE_PATH),
            admin_password: String::new(),
            uploads_dir: PathBuf::from("uploads"),
            static_dir: PathBuf::from("static"),
            default_store_url: defaults::STORE_URL.to_string(),
            scraper: ScraperConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            page_timeout_secs: 15,
            page_max_bytes: 2 * 1024 * 1024,
            store_timeout_secs: 30,
            store_max_bytes: 5 * 1024 * 1024,
            proxy_timeout_secs: 10,
            desktop_user_agent: defaults::DESKTOP_USER_AGENT.to_string(),
            mobile_user_agent: defaults::MOBILE_USER_AGENT.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            file_output: false,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl ServerConfig {
    /// Load defaults, the optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(defaults::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Self = settings.try_deserialize()?;
        config.apply_legacy_env();
        config.validate()?;
        Ok(config)
    }

    /// Honor the bare variables older deployments set
    fn apply_legacy_env(&mut self) {
        if let Ok(password) = std::env::var("ADMIN_PASSWORD") {
            if self.admin_password.is_empty() && !password.is_empty() {
                self.admin_password = password;
            }
        }
        if let Ok(dir) = std::env::var("UPLOADS_DIR") {
            if !dir.is_empty() {
                self.uploads_dir = PathBuf::from(dir);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| {
            Err(ConfigError::Validation {
                message: message.to_string(),
            })
        };

        if self.listen.trim().is_empty() {
            return invalid("listen address must not be empty");
        }
        let s = &self.scraper;
        if s.page_timeout_secs == 0 || s.store_timeout_secs == 0 || s.proxy_timeout_secs == 0 {
            return invalid("scraper timeouts must be greater than 0");
        }
        if s.page_max_bytes == 0 || s.store_max_bytes == 0 {
            return invalid("scraper body limits must be greater than 0");
        }
        Ok(())
    }

    /// Database URL understood by sqlx
    pub fn database_url(&self) -> String {
        format!("sqlite:{}", self.database_path.display())
    }
}

/// Default values and fixed identifiers
pub mod defaults {
    pub const ENV_PREFIX: &str = "SHOWCASE";

    pub const LISTEN: &str = "0.0.0.0:8000";

    pub const DATABASE_PATH: &str = "db.sqlite3";

    /// Supplier store imported when no store URL is given
    pub const STORE_URL: &str = "https://www.meesho.com/ShuKarshEnterprises";

    pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    /// The marketplace serves its embedded page data more reliably to mobile browsers
    pub const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 13; SM-G991B) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.listen, "0.0.0.0:8000");
        assert_eq!(config.scraper.page_max_bytes, 2 * 1024 * 1024);
        assert_eq!(config.database_url(), "sqlite:db.sqlite3");
    }

    #[test]
    fn file_values_override_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("showcase.toml");
        let mut file = std::fs::File::create(&path)?;
        writeln!(file, "listen = \"127.0.0.1:9100\"")?;
        writeln!(file, "[scraper]")?;
        writeln!(file, "page_timeout_secs = 5")?;
        drop(file);

        let config = ServerConfig::load(Some(&path))?;
        assert_eq!(config.listen, "127.0.0.1:9100");
        assert_eq!(config.scraper.page_timeout_secs, 5);
        assert_eq!(config.scraper.store_timeout_secs, 30);
        Ok(())
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        let mut config = ServerConfig::default();
        config.scraper.proxy_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation { .. })));
    }
}
