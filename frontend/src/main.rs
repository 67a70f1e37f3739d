//! Mixdesk console entry point.

use clap::Parser;
use mixdesk_frontend::{Config, ConfigOverrides};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Mixer console for a digital audio engine.
#[derive(Parser, Debug)]
#[command(name = "mixdesk", version, about)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long, env = "MIXDESK_CONFIG")]
    config: Option<PathBuf>,

    /// WebSocket URL of the audio engine
    #[arg(long)]
    engine_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::load(ConfigOverrides {
        config_file: args.config,
        engine_url: args.engine_url,
        log_level: args.log_level,
    })?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.log_level.clone().unwrap_or_else(|| "info".to_string()))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting mixdesk v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Config: {:?}", config);

    // wss:// engine URLs need a crypto provider; more than one may be compiled in
    let _ = rustls::crypto::ring::default_provider().install_default();

    // The engine link runs on tokio; the GUI owns the main thread
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    mixdesk_frontend::run_native_gui(config)
        .map_err(|e| anyhow::anyhow!("GUI error: {}", e))?;

    tracing::info!("Console closed");
    Ok(())
}
