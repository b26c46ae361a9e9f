use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use product_showcase_lib::infrastructure::config::ServerConfig;
use product_showcase_lib::infrastructure::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "product-showcase", about = "Product catalog storefront with admin panel", version)]
struct Cli {
    /// Config file (TOML or JSON)
    #[arg(long = "config", short = 'c')]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:8000
    #[arg(long = "listen")]
    listen: Option<String>,

    /// Admin panel password
    #[arg(long = "admin-password", env = "ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,

    /// SQLite database file
    #[arg(long = "db")]
    db: Option<PathBuf>,
}

impl Cli {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(listen) = self.listen {
            config.listen = listen;
        }
        if let Some(password) = self.admin_password.filter(|p| !p.is_empty()) {
            config.admin_password = password;
        }
        if let Some(db) = self.db {
            config.database_path = db;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ServerConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    init_logging(&config.logging)?;
    info!("📁 Database: {}", config.database_path.display());

    product_showcase_lib::serve(config).await
}
