//! The on-the-wire [`Envelope`]: `base64(nonce || ciphertext || tag)`.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::{NONCE_LEN, TAG_LEN};
use crate::error::{CipherError, BAD_BASE64, TOO_SHORT};

/// A parsed envelope.
///
/// Parsing checks framing only. Whether the body authenticates is decided by
/// [`open`](crate::open), which needs the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Raw nonce bytes.
    pub nonce: [u8; NONCE_LEN],
    /// Raw ciphertext + authentication tag bytes.
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Encode this envelope to its canonical string representation.
    pub fn encode(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// The framed bytes: `nonce || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(NONCE_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse an envelope string.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::MalformedEnvelope`] if `s` is not standard,
    /// canonically padded base64, or decodes to fewer than [`NONCE_LEN`] bytes.
    pub fn parse(s: &str) -> Result<Self, CipherError> {
        let decoded = STANDARD
            .decode(s)
            .map_err(|_| CipherError::MalformedEnvelope(BAD_BASE64))?;
        Self::from_bytes(&decoded)
    }

    /// Split already-decoded framed bytes into nonce and body.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::MalformedEnvelope`] if `bytes` is shorter than
    /// [`NONCE_LEN`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CipherError> {
        if bytes.len() < NONCE_LEN {
            return Err(CipherError::MalformedEnvelope(TOO_SHORT));
        }
        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_LEN);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);
        Ok(Self {
            nonce,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Length of the plaintext this envelope would open to, or `None` if the
    /// body is too short to even hold a tag.
    pub fn plaintext_len(&self) -> Option<usize> {
        self.ciphertext.len().checked_sub(TAG_LEN)
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Envelope {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
