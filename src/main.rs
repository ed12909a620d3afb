//! VeilVault - encode a directory into a PNG image and back.
//!
//! A CLI tool that archives a directory and hides the archive bytes in the
//! pixel channels of a lossless PNG.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::debug;

use commands::{CommandExecutor, DecodeCommand, EncodeCommand, InitCommand, InspectCommand};
use veilvault::{ConfigError, VaultConfig};

/// VeilVault: A tool to encode and decode directories to PNG images
///
/// Encode a directory into a PNG file and decode a PNG file back into a
/// directory. Settings are read from ~/.veilvault/config.toml when present.
#[derive(Parser)]
#[command(name = "veilvault")]
#[command(version)]
#[command(about = "Encode and decode directories to PNG images")]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a config file (default: ~/.veilvault/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a directory into a PNG file
    Encode(EncodeCommand),

    /// Decode a PNG file back into a directory
    Decode(DecodeCommand),

    /// Show the header of an encoded PNG file
    Inspect(InspectCommand),

    /// Write a config file with the default settings
    Init(InitCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();

    // init writes the defaults and never reads an existing file
    let config = match &cli.command {
        Commands::Init(_) => VaultConfig::default(),
        _ => load_config(cli.config.as_ref())?,
    };

    let command: &dyn CommandExecutor = match &cli.command {
        Commands::Encode(cmd) => cmd,
        Commands::Decode(cmd) => cmd,
        Commands::Inspect(cmd) => cmd,
        Commands::Init(cmd) => cmd,
    };
    command.execute(&config)
}

/// Loads the configuration, falling back to defaults when there is no home directory.
fn load_config(path: Option<&PathBuf>) -> Result<VaultConfig> {
    if let Some(path) = path {
        return VaultConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    match VaultConfig::load() {
        Err(ConfigError::NoConfigDir) => {
            debug!("no home directory, using default configuration");
            Ok(VaultConfig::default())
        }
        result => result.context("Failed to load config"),
    }
}
