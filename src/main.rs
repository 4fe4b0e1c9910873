use anyhow::{Context, Result};
use clap::Parser;
use pawconnect_api::{ServerBuilder, ServerConfig};
use pawconnect_core::config::LogFormat;
use pawconnect_core::AppConfig;
use pawconnect_directory::{builtin_seed, load_seed_file, MemoryDirectory};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// PawConnect - Animal shelter directory and application review server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    config: PathBuf,

    /// Override bind address
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Administrator email for initial setup
    #[arg(long, default_value = "admin@pawconnect.in")]
    admin_email: String,

    /// Administrator password for initial setup
    #[arg(long, env = "PAWCONNECT_ADMIN_PASSWORD", default_value = "changeme")]
    admin_password: String,

    /// Shelter seed file, overriding `directory.seed_file`
    #[arg(long)]
    seed: Option<PathBuf>,
}

fn load_config(path: &Path) -> Result<AppConfig> {
    let config = if path.exists() {
        AppConfig::from_config_builder(path)
            .with_context(|| format!("Failed to load config file: {:?}", path))?
    } else {
        AppConfig::default()
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match config.logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    if let Err(e) = result {
        eprintln!("Tracing already initialized: {}", e);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args.config)?;
    init_tracing(&config);

    if !args.config.exists() {
        warn!(path = ?args.config, "Config file not found, using defaults");
    }

    let seed_path = args.seed.clone().or_else(|| config.directory.seed_file.clone());
    let profiles = match &seed_path {
        Some(path) => load_seed_file(path)
            .with_context(|| format!("Failed to load seed file: {:?}", path))?,
        None => builtin_seed().context("Failed to parse bundled shelters")?,
    };
    let directory = Arc::new(MemoryDirectory::with_profiles(profiles));

    let mut server_config = ServerConfig::from_app_config(&config)?;
    if let Some(bind) = args.bind {
        server_config.bind_addr = bind;
    }

    info!(
        environment = %config.app.environment,
        bind = %server_config.bind_addr,
        shelters = directory.len(),
        "Starting PawConnect server"
    );
    if args.admin_password == "changeme" {
        warn!("Using the default administrator password; set PAWCONNECT_ADMIN_PASSWORD");
    }

    let server = ServerBuilder::new(server_config)
        .with_admin(&args.admin_email, &args.admin_password)
        .with_directory(directory)
        .build()?;

    if let Err(e) = server.run().await {
        error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}
