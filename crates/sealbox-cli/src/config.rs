//! Configuration loading and validation for the `sealbox` binary.
//!
//! Values are read from `SEALBOX_*` environment variables at startup:
//!
//! | Variable              | Meaning                                   |
//! |-----------------------|-------------------------------------------|
//! | `SEALBOX_KEY`         | inline base64 key                         |
//! | `SEALBOX_KEY_FILE`    | path to a file holding a base64 key       |
//! | `SEALBOX_LOG_LEVEL`   | tracing level (default `warn`)            |
//! | `SEALBOX_LOG_FORMAT`  | `text` or `json` (default `text`)         |

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sealbox::SecretKey;
use serde::Deserialize;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line output.
    Text,
    /// One JSON object per event.
    Json,
}

/// Validated `sealbox` configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Inline base64-encoded key.
    #[serde(default)]
    pub key: Option<String>,

    /// Path to a file containing a base64-encoded key.
    #[serde(default)]
    pub key_file: Option<PathBuf>,

    /// Tracing log level (e.g. `"warn"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "warn".into()
}
fn default_log_format() -> LogFormat {
    LogFormat::Text
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or the combination is
    /// invalid.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("SEALBOX"))
            .build()
            .context("failed to build sealbox configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise sealbox configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if matches!(&self.key, Some(k) if k.trim().is_empty()) {
            anyhow::bail!("SEALBOX_KEY must not be empty when set");
        }
        if self.log_level.trim().is_empty() {
            anyhow::bail!("SEALBOX_LOG_LEVEL must not be empty");
        }
        Ok(())
    }

    /// Resolve the key to use for `seal` / `open`.
    ///
    /// `key_file_override` (from `--key-file`) wins over both configured
    /// sources. Without it, exactly one of `SEALBOX_KEY_FILE` and
    /// `SEALBOX_KEY` may be set.
    ///
    /// # Errors
    ///
    /// Returns an error if no key is configured, both sources are configured
    /// without an override, the file cannot be read, the value is not standard
    /// base64, or it does not decode to 32 bytes.
    pub fn load_key(&self, key_file_override: Option<&Path>) -> Result<SecretKey> {
        if key_file_override.is_none() && self.key.is_some() && self.key_file.is_some() {
            anyhow::bail!("set at most one of SEALBOX_KEY and SEALBOX_KEY_FILE");
        }
        if let Some(path) = key_file_override.or(self.key_file.as_deref()) {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read key file {}", path.display()))?;
            return decode_key(&contents)
                .with_context(|| format!("invalid key in {}", path.display()));
        }
        match &self.key {
            Some(inline) => decode_key(inline).context("invalid key in SEALBOX_KEY"),
            None => anyhow::bail!(
                "no key configured: pass --key-file, or set SEALBOX_KEY_FILE or SEALBOX_KEY"
            ),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .field("key_file", &self.key_file)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

/// Decode a base64 key, ignoring surrounding whitespace.
pub fn decode_key(encoded: &str) -> Result<SecretKey> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .context("key is not standard base64")?;
    Ok(SecretKey::try_from(bytes.as_slice())?)
}

/// Encode a key the way [`decode_key`] reads it.
pub fn encode_key(key: &SecretKey) -> String {
    STANDARD.encode(key.as_bytes())
}
