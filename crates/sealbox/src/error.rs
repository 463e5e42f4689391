//! Error taxonomy for the cipher layer.

use thiserror::Error;

use crate::crypto::KEY_LEN;

/// Errors produced by [`seal`](crate::seal), [`open`](crate::open) and
/// [`generate_key`](crate::generate_key).
///
/// No variant ever carries key material, plaintext, or the position of a
/// mismatching byte.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    /// The key is not exactly [`KEY_LEN`] bytes. Carries the length supplied.
    #[error("invalid key length: expected {KEY_LEN} bytes, got {0}")]
    InvalidKeyLength(usize),

    /// The OS secure random source could not supply enough bytes.
    #[error("secure random source unavailable: {0}")]
    RandomnessUnavailable(String),

    /// The envelope is not standard padded base64, or decodes to fewer than
    /// [`NONCE_LEN`](crate::NONCE_LEN) bytes.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(&'static str),

    /// Tag verification failed: wrong key, or the envelope was corrupted or
    /// tampered with.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The AEAD refused to seal the plaintext (exceeds the GCM length limit).
    #[error("aead seal failed")]
    EncryptionFailure,
}

impl CipherError {
    /// Short machine-readable code for this error (e.g. `"malformed_envelope"`).
    pub fn code(&self) -> &'static str {
        match self {
            CipherError::InvalidKeyLength(_) => "invalid_key_length",
            CipherError::RandomnessUnavailable(_) => "randomness_unavailable",
            CipherError::MalformedEnvelope(_) => "malformed_envelope",
            CipherError::AuthenticationFailed => "authentication_failed",
            CipherError::EncryptionFailure => "encryption_failure",
        }
    }
}

pub(crate) const TOO_SHORT: &str = "shorter than a nonce";
pub(crate) const BAD_BASE64: &str = "not standard padded base64";
