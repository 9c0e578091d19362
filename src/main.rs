use anyhow::Result;
use clap::Parser;
use led_ticker::app::{build_orchestrator, build_sink, load_fonts};
use led_ticker::config::{AppConfig, SinkConfig};
use led_ticker::DisplayOrchestrator;
use led_ticker_core::ProviderContext;
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

/// led-ticker - rotating clock, ticker, news, calendar and of-the-day
/// content on an LED matrix
#[derive(Parser, Debug, Clone)]
#[command(name = "led-ticker")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0")]
    debug: u8,

    /// Override the matrix width in pixels
    #[arg(long = "width", value_name = "W")]
    width: Option<u32>,

    /// Override the matrix height in pixels
    #[arg(long = "height", value_name = "H")]
    height: Option<u32>,

    /// Write frames as a PNG preview to this path instead of the console
    #[arg(long = "snapshot", value_name = "PATH")]
    snapshot: Option<PathBuf>,

    /// Print the default configuration as JSON and exit
    #[arg(long = "print-default-config")]
    print_default_config: bool,

    /// Configuration file (defaults to config.json in the user config dir)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,
}

fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Level 0 (default): warn only
    // Level 1: info
    // Level 2: debug
    // Level 3+: trace
    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if cli.print_default_config {
        match serde_json::to_string_pretty(&AppConfig::default()) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize default config: {}", e),
        }
        return;
    }

    warn!("Starting led-ticker v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            AppConfig::load_from_path(path)?
        }
        None => AppConfig::load()?,
    };

    if let Some(width) = cli.width {
        config.display.width = width;
    }
    if let Some(height) = cli.height {
        config.display.height = height;
    }
    if let Some(path) = &cli.snapshot {
        config.display.sink = SinkConfig::Snapshot {
            path: path.clone(),
            min_interval_ms: led_ticker_render::DEFAULT_SNAPSHOT_INTERVAL.as_millis() as u64,
        };
    }
    config.display.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    let fonts = Arc::new(load_fonts(&config));
    let registry = led_ticker_sources::builtin_registry();
    let ctx = ProviderContext::new(fonts, Some(runtime.handle().clone()));

    runtime.block_on(async move {
        let orchestrator =
            build_orchestrator(&config, &registry, &ctx, build_sink(&config.display))?;
        let (_handle, commands) = DisplayOrchestrator::channel(32);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, shutting down");
                    let _ = shutdown_tx.send(true);
                }
                Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
            }
        });

        orchestrator.run(commands, shutdown_rx).await?;
        Ok(())
    })
}
