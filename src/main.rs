//! # Keypanel - input panel scenario runner
//!
//! Replays a scripted sequence of compositor and input-method events against
//! a headless compositor and prints where the input panel ended up: the
//! layer list, the panel's render list and transition statistics.

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use keypanel::{InputPanelConfig, Scenario};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("KEYPANEL_TARGET"),
    ", built ",
    env!("KEYPANEL_BUILD_DATE"),
    ")"
);

#[derive(Parser)]
#[command(name = "keypanel")]
#[command(about = "Replay input panel scenarios against a headless compositor")]
#[command(version, long_version = LONG_VERSION)]
struct Cli {
    /// Scenario file (TOML)
    scenario: String,

    /// Path to configuration file
    #[arg(short, long, default_value = "~/.config/keypanel/keypanel.toml")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Disable the slide-in animation
    #[arg(long)]
    no_slide: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = InputPanelConfig::load(&cli.config);

    let debug = cli.debug || loaded.as_ref().map(|c| c.general.debug).unwrap_or(false);
    let filter = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    info!("🚀 Starting Keypanel");
    match option_env!("KEYPANEL_GIT_COMMIT") {
        Some(commit) => info!("📄 Version: {} ({})", keypanel::VERSION, commit),
        None => info!("📄 Version: {}", keypanel::VERSION),
    }

    let mut config = match loaded {
        Ok(config) => {
            info!("✅ Configuration loaded from: {}", cli.config);
            config
        }
        Err(e) => {
            error!("❌ Failed to load configuration: {:#}", e);
            info!("📝 Using default configuration");
            InputPanelConfig::default()
        }
    };

    if cli.no_slide {
        config.slide.enabled = false;
        info!("🚫 Slide animation disabled via CLI flag");
    }

    let scenario = Scenario::load(&cli.scenario)?;
    let report = scenario
        .run(&config)
        .with_context(|| format!("Failed to replay {}", cli.scenario))?;

    print!("{}", report);
    Ok(())
}
