//! # Turtle HAL Binary
//!
//! Drives the LEGO Interface A turtle through an FT232R bit-bang adapter.
//!
//! # Usage
//!
//! ```bash
//! # Reflex navigation with the simulation driver
//! turtle_hal --simulate navigate
//!
//! # Manual console against a config file
//! turtle_hal --config /etc/turtle/turtle.toml console
//!
//! # Shorter pulses, verbose logging
//! turtle_hal --command-delay-us 2500 -v navigate
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::EnvFilter;
use turtle_common::config::{ConfigError, ConfigLoader, LogLevel, TurtleConfig};
use turtle_common::consts::DEFAULT_CONFIG_PATH;
use turtle_hal::clock::SystemClock;
use turtle_hal::console::HELP;
use turtle_hal::keyboard::RawTerminal;
use turtle_hal::{DriverRegistry, TurtleCore};

/// Turtle HAL - H-bridge drive over a USB bit-bang port
#[derive(Parser, Debug)]
#[command(name = "turtle_hal")]
#[command(version)]
#[command(about = "H-bridge drive, reflex navigation and manual console over a USB bit-bang port")]
#[command(long_about = None)]
struct Args {
    /// Path to configuration file. Defaults apply if the default path is missing.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Device serial number (overrides config)
    #[arg(long)]
    serial: Option<String>,

    /// Device driver name (overrides config)
    #[arg(short, long)]
    driver: Option<String>,

    /// Force simulation driver
    #[arg(short = 's', long)]
    simulate: bool,

    /// Maneuver pulse hold in microseconds (overrides config)
    #[arg(long, value_name = "US")]
    command_delay_us: Option<u64>,

    /// Inter-cycle delay in milliseconds (overrides config)
    #[arg(long, value_name = "MS")]
    loop_delay_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    mode: Mode,
}

/// Control loop to run.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Autonomous reflex navigation (stop with Ctrl+C)
    Navigate,
    /// Interactive manual override console
    Console,
}

fn main() {
    if let Err(e) = run() {
        error!("Turtle HAL failed: {}", e);
        eprintln!("turtle_hal: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args)?;

    setup_tracing(&args, config.shared.log_level);
    info!("Turtle HAL v{} starting...", env!("CARGO_PKG_VERSION"));

    let registry = DriverRegistry::with_builtin_drivers();
    debug!("Available drivers: {:?}", registry.list_drivers());
    let mut core = TurtleCore::new(config, registry)?;

    let running = core.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    core.init()?;

    let mut clock = SystemClock;
    let result = match args.mode {
        Mode::Navigate => core.run_navigation(&mut clock),
        Mode::Console => {
            println!("{HELP}");
            match RawTerminal::acquire() {
                // Outputs are zeroed inside run_console; the terminal is
                // restored when `keys` drops right after.
                Ok(mut keys) => core.run_console(&mut keys, &mut clock, &mut std::io::stdout()),
                Err(e) => Err(e.into()),
            }
        }
    };

    core.finish(result)?;

    info!("Turtle HAL shutdown complete");
    Ok(())
}

/// Load the config file and apply CLI overrides.
fn load_config(args: &Args) -> Result<TurtleConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => TurtleConfig::load(path)?,
        None => match TurtleConfig::load(std::path::Path::new(DEFAULT_CONFIG_PATH)) {
            Ok(config) => config,
            Err(ConfigError::FileNotFound) => TurtleConfig::default(),
            Err(e) => return Err(e),
        },
    };

    if let Some(serial) = &args.serial {
        config.device.serial = serial.clone();
    }
    if let Some(driver) = &args.driver {
        config.device.driver = driver.clone();
    }
    if args.simulate {
        config.device.driver = "simulation".to_string();
    }
    if let Some(us) = args.command_delay_us {
        config.timing.command_delay_us = us;
    }
    if let Some(ms) = args.loop_delay_ms {
        config.timing.loop_delay_ms = ms;
    }

    config.validate()?;
    Ok(config)
}

/// Setup tracing subscriber; logs go to stderr so stdout keeps the status line.
fn setup_tracing(args: &Args, configured: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        match configured {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    if args.simulate {
        warn!("Simulation driver forced; no hardware will be driven");
    }
}
