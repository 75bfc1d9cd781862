//! JIT maker bot - entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// JIT auction maker bot (paper-trading harness)
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via JIT_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    jit_bot::init_logging()?;

    info!("Starting jit-bot v{}", env!("CARGO_PKG_VERSION"));

    let config_path = args
        .config
        .or_else(|| std::env::var("JIT_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = jit_bot::AppConfig::from_file(&config_path)?;

    let app = jit_bot::Application::new(config);
    app.run().await?;

    Ok(())
}
