//! Logging initialisation for the `sealbox` binary.
//!
//! stdout carries command output only, so every log line goes to stderr.
//!
//! # Logging invariants
//!
//! - **No key material or plaintext** in any log field. Sizes and outcomes only.
//! - `RUST_LOG` overrides the configured level.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;

/// Initialise the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the subscriber has already been set.
pub fn init(log_level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.with_target(false).try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("failed to initialise sealbox tracing subscriber: {e}"))
}
