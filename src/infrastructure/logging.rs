//! Logging system configuration and initialization
//!
//! - Console output, plain or JSON
//! - Optional daily rolling log file
//! - `RUST_LOG` overrides the configured level

use std::sync::Mutex;

use anyhow::{Result, anyhow};
use once_cell::sync::Lazy;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

pub use crate::infrastructure::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "product-showcase.log";

// Keeps the file writer alive for the lifetime of the process
static LOG_GUARDS: Lazy<Mutex<Vec<WorkerGuard>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Build the filter: our crate at the configured level, chatty dependencies
/// quieted unless the level is trace
pub fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .map_err(|e| anyhow!("Invalid log level '{}': {}", config.level, e))?;

    if !config.level.to_lowercase().contains("trace") {
        for directive in [
            "sqlx::query=warn",
            "sqlx=warn",
            "reqwest=info",
            "hyper=warn",
            "hyper_util=warn",
            "h2=warn",
            "tower_http=info",
            "html5ever=warn",
            "selectors=warn",
        ] {
            filter = filter.add_directive(directive.parse()?);
        }
        if !config.level.contains(['=', ',']) {
            filter = filter.add_directive(format!("product_showcase_lib={}", config.level).parse()?);
        }
    }

    Ok(filter)
}

/// Initialize the global subscriber
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = build_env_filter(config)?;

    let console_layer = if config.json_format {
        tracing_subscriber::fmt::layer().json().with_target(true).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(false).boxed()
    };

    let file_layer = if config.file_output {
        std::fs::create_dir_all(&config.log_dir)
            .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", config.log_dir, e))?;
        let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        LOG_GUARDS
            .lock()
            .map_err(|_| anyhow!("log guard registry poisoned"))?
            .push(guard);
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .boxed(),
        )
    } else {
        None
    };

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "📝 Logging initialized (level: {}, json: {}, file: {})",
        config.level, config.json_format, config.file_output
    );
    Ok(())
}
