//! navcar - runs the navigation core against the configured device

use clap::Parser;
use navcar::app::NavcarApp;
use navcar::devices::create_device;
use navcar::{Error, NavConfig, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Default configuration file, optional
const DEFAULT_CONFIG: &str = "navcar.toml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simulation speed factor (1.0 = realtime)
    #[arg(long)]
    speed_factor: Option<f32>,

    /// Noise seed for the simulated device (0 = random)
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many seconds
    #[arg(long)]
    max_runtime_secs: Option<u64>,
}

fn load_config(args: &Args) -> Result<NavConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Using config: {}", path.display());
            NavConfig::load(path)?
        }
        None if std::path::Path::new(DEFAULT_CONFIG).exists() => {
            log::info!("Using config: {}", DEFAULT_CONFIG);
            NavConfig::load(DEFAULT_CONFIG)?
        }
        None => {
            log::info!("No {} found, using defaults", DEFAULT_CONFIG);
            NavConfig::default()
        }
    };

    #[cfg(feature = "mock")]
    {
        if let Some(factor) = args.speed_factor {
            config.device.simulation.speed_factor = factor;
        }
        if let Some(seed) = args.seed {
            config.device.simulation.random_seed = seed;
        }
    }
    #[cfg(not(feature = "mock"))]
    {
        if args.speed_factor.is_some() || args.seed.is_some() {
            log::warn!("--speed-factor/--seed only apply to the mock device");
        }
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    log::info!("navcar v{} starting...", env!("CARGO_PKG_VERSION"));
    let config = load_config(&args)?;
    log::info!(
        "Device: {} ({})",
        config.device.name,
        config.device.device_type
    );

    let device = create_device(&config)?;

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let mut app = NavcarApp::new(config, device, Box::new(std::io::stdout()), running)?;
    if let Some(secs) = args.max_runtime_secs {
        app = app.with_max_runtime(Duration::from_secs(secs));
    }

    let summary = app.run()?;
    log::info!(
        "navcar stopped: {:?}, counter={}, {:.1}s",
        summary.reason,
        summary.counter,
        summary.elapsed.as_secs_f32()
    );
    Ok(())
}
