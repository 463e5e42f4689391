//! `sealbox` — command-line entry point.
//!
//! Startup sequence:
//! 1. Parse command-line arguments.
//! 2. Load and validate [`Config`] from `SEALBOX_*` variables.
//! 3. Initialise logging to stderr.
//! 4. Resolve the key (for `seal` / `open`) and run the subcommand.

mod commands;
mod config;
mod files;
mod telemetry;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "sealbox")]
#[command(version, about = "AES-256-GCM seal/open with a base64 envelope", long_about = None)]
struct Cli {
    /// File holding the base64 key (overrides SEALBOX_KEY_FILE / SEALBOX_KEY)
    #[arg(long, global = true)]
    key_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new random 256-bit key
    Keygen {
        /// Write the key here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Encrypt plaintext into an envelope
    Seal {
        /// Read plaintext from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Write the envelope here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Verify and decrypt an envelope
    Open {
        /// Read the envelope from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Write the plaintext here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the framing of an envelope without decrypting it
    Inspect {
        /// Read the envelope from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Arguments
    // -----------------------------------------------------------------------
    let cli = Cli::parse();

    // -----------------------------------------------------------------------
    // 2. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Logging is not yet up; write to stderr directly.
        eprintln!("ERROR: sealbox configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 3. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level, cfg.log_format)?;
    debug!(version = env!("CARGO_PKG_VERSION"), "sealbox starting");

    // -----------------------------------------------------------------------
    // 4. Command
    // -----------------------------------------------------------------------
    run(cli, &cfg)
}

/// Run one subcommand. Input is read in full and the command completes before
/// any output is written.
fn run(cli: Cli, cfg: &Config) -> Result<()> {
    match cli.command {
        Command::Keygen { output } => {
            let key = commands::keygen()?;
            files::write_output(output.as_deref(), &key)
        }
        Command::Seal { input, output } => {
            let key = cfg.load_key(cli.key_file.as_deref())?;
            let plaintext = files::read_input(input.as_deref())?;
            let envelope = commands::seal(&key, &plaintext)?;
            files::write_output(output.as_deref(), &envelope)
        }
        Command::Open { input, output } => {
            let key = cfg.load_key(cli.key_file.as_deref())?;
            let envelope = files::read_input(input.as_deref())?;
            let plaintext = commands::open(&key, &envelope)?;
            files::write_output(output.as_deref(), &plaintext)
        }
        Command::Inspect { input } => {
            let envelope = files::read_input(input.as_deref())?;
            let report = commands::inspect(&envelope)?;
            files::write_output(None, &report)
        }
    }
}
