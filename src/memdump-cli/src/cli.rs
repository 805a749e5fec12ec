//! CLI argument definitions for memdump

use clap::{Parser, Subcommand};
use memdump::RegionTypePolicy;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "memdump")]
#[command(about = "Process memory dumper and string search", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Capture the memory of every process with the given executable name
    #[command(visible_alias = "d")]
    Dump {
        /// Executable name (e.g. "chrome.exe"); prompts for all settings if omitted
        target: Option<String>,

        /// Print strings containing this text from each capture
        #[arg(short, long)]
        grep: Option<String>,

        /// Region types to capture: all, heap or stack
        #[arg(short, long)]
        region: Option<RegionTypePolicy>,

        /// Maximum capture size per process in MB (0 = unlimited)
        #[arg(short, long)]
        max_size_mb: Option<String>,

        /// Directory for dump files (uses configured default if not provided)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// List running processes with the given executable name
    #[command(visible_alias = "l")]
    List {
        /// Executable name to match (case-insensitive)
        target: String,
    },

    /// Search a saved dump file for strings
    #[command(visible_alias = "s")]
    Strings {
        /// Path to a .bin dump
        input: PathBuf,

        /// Text the strings must contain
        grep: String,
    },

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set default output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Set default region type (all, heap, stack)
        #[arg(long)]
        region: Option<RegionTypePolicy>,

        /// Set default maximum capture size in MB (0 = unlimited)
        #[arg(long)]
        max_size_mb: Option<u64>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
