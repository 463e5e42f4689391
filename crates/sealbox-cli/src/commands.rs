//! Subcommand bodies.
//!
//! Each command takes its whole input as bytes and returns the bytes to
//! write, so nothing reaches the output until the operation has succeeded.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sealbox::{CipherError, Envelope, SecretKey, NONCE_LEN, TAG_LEN};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::encode_key;

/// JSON body written by `sealbox inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    /// Base64 of the nonce bytes.
    pub nonce: String,
    pub nonce_len: usize,
    /// Length of ciphertext plus tag.
    pub ciphertext_len: usize,
    pub tag_len: usize,
    /// `None` when the body is too short to hold a tag.
    pub plaintext_len: Option<usize>,
}

/// A freshly generated key as base64 plus newline.
pub fn keygen() -> Result<Vec<u8>> {
    let key = sealbox::generate_key().context("key generation failed")?;
    info!("generated new key");
    Ok(format!("{}\n", encode_key(&key)).into_bytes())
}

/// Seal `plaintext` and return the envelope plus newline.
pub fn seal(key: &SecretKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let envelope = sealbox::seal(plaintext, key.as_bytes()).context("seal failed")?;
    debug!(
        plaintext_len = plaintext.len(),
        envelope_len = envelope.len(),
        "sealed"
    );
    Ok(format!("{envelope}\n").into_bytes())
}

/// Open the envelope in `input` and return the plaintext bytes.
pub fn open(key: &SecretKey, input: &[u8]) -> Result<Vec<u8>> {
    let opened = envelope_text(input).and_then(|s| sealbox::open(s, key.as_bytes()));
    let plaintext = match opened {
        Ok(p) => p,
        Err(e) => {
            warn!(code = e.code(), "open failed");
            return Err(e).context("open failed");
        }
    };
    debug!(plaintext_len = plaintext.len(), "opened");
    Ok(plaintext)
}

/// Describe the framing of the envelope in `input` as pretty JSON.
pub fn inspect(input: &[u8]) -> Result<Vec<u8>> {
    let envelope = envelope_text(input)
        .and_then(|s| s.parse::<Envelope>())
        .context("inspect failed")?;

    let report = InspectReport {
        nonce: STANDARD.encode(envelope.nonce),
        nonce_len: NONCE_LEN,
        ciphertext_len: envelope.ciphertext.len(),
        tag_len: TAG_LEN,
        plaintext_len: envelope.plaintext_len(),
    };
    let mut out = serde_json::to_vec_pretty(&report).context("failed to encode report")?;
    out.push(b'\n');
    Ok(out)
}

/// The envelope text with surrounding whitespace removed. Bytes that are not
/// UTF-8 cannot be base64 and are reported as a malformed envelope.
fn envelope_text(input: &[u8]) -> Result<&str, CipherError> {
    std::str::from_utf8(input)
        .map(str::trim)
        .map_err(|_| CipherError::MalformedEnvelope("not valid UTF-8"))
}
