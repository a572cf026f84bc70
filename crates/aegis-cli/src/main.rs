//! Aegis CLI - operator tool for the prompt-sanitization gateway

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use cli::{Cli, Commands, ConfigCommands, LogFormat};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // a missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    run_command(cli)
}

/// Logs go to stderr so stdout carries only command output.
fn init_logging(verbose: bool, format: LogFormat) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Keygen { env } => {
            commands::keygen::run(env);
        }

        Commands::Process {
            actor,
            config,
            format,
            text,
        } => {
            commands::process::run(&actor, config.as_deref(), format, text)?;
        }

        Commands::Scan {
            config,
            format,
            text,
        } => {
            commands::scan::run(config.as_deref(), format, text)?;
        }

        Commands::Decrypt { ttl, key_env, blob } => {
            commands::decrypt::run(ttl, &key_env, blob)?;
        }

        Commands::Config(ConfigCommands::Validate { file }) => {
            commands::config_cmd::run_validate(&file)?;
        }
    }

    Ok(())
}
