mod cli;
mod commands;
mod config;
mod prompt;
mod report;

use anyhow::Result;
use clap::Parser;
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::*;

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "memdump=debug,memdump_cli=debug"
    } else {
        "memdump=info,memdump_cli=info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Dump {
            target,
            grep,
            region,
            max_size_mb,
            output_dir,
        } => {
            let config = Config::load_or_default();
            let args = commands::dump::DumpArgs {
                target,
                grep,
                region,
                max_size_mb,
                output_dir,
            };
            commands::dump::handle(args, &config)?;
        }

        Commands::List { target } => {
            commands::list::handle(&target)?;
        }

        Commands::Strings { input, grep } => {
            commands::strings::handle(&input, &grep)?;
        }

        Commands::Configure {
            output_dir,
            region,
            max_size_mb,
            show,
        } => {
            commands::configure::handle(commands::configure::ConfigureArgs {
                output_dir,
                region,
                max_size_mb,
                show,
            })?;
        }
    }

    Ok(())
}
