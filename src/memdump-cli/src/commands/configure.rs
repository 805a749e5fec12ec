//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting memdump defaults.

use crate::config::Config;
use anyhow::Result;
use memdump::RegionTypePolicy;
use std::path::PathBuf;

/// Defaults to store; `None` leaves the current value
#[derive(Debug, Default)]
pub struct ConfigureArgs {
    pub output_dir: Option<PathBuf>,
    pub region: Option<RegionTypePolicy>,
    pub max_size_mb: Option<u64>,
    pub show: bool,
}

/// Handle the configure command
pub fn handle(args: ConfigureArgs) -> Result<()> {
    let mut config = Config::load()?;

    if args.show {
        show_config(&config);
        return Ok(());
    }

    if apply(&mut config, args) {
        config.save()?;
        println!("Configuration saved");
        if let Ok(path) = Config::config_path() {
            println!("Config saved to: {}", path.display());
        }
    } else {
        show_usage();
    }

    Ok(())
}

/// Copy given settings into `config`. Returns whether anything changed.
fn apply(config: &mut Config, args: ConfigureArgs) -> bool {
    let mut changed = false;
    if let Some(dir) = args.output_dir {
        config.output_dir = Some(dir);
        changed = true;
    }
    if let Some(region) = args.region {
        config.region = Some(region);
        changed = true;
    }
    if let Some(mb) = args.max_size_mb {
        config.max_size_mb = Some(mb);
        changed = true;
    }
    changed
}

/// Display current configuration
fn show_config(config: &Config) {
    println!("Output directory: {}", config.output_dir().display());
    println!("Region type: {}", config.region());
    println!("Max capture size: {}", config.budget());

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: memdump configure [--output-dir DIR] [--region all|heap|stack] [--max-size-mb N]");
    println!("   or: memdump configure --show");
}
