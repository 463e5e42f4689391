//! AES-256-GCM seal/open primitives and their envelope framing.
//!
//! This module is intentionally free of I/O, logging and configuration.
//!
//! # Envelope format
//!
//! ```text
//! base64-standard-padded( nonce(12) || ciphertext(n) || tag(16) )
//! ```
//!
//! A fresh random nonce is drawn for every seal. Plain GCM nonce reuse under
//! one key breaks both confidentiality and authentication, so callers must
//! never construct envelopes with caller-chosen nonces.

pub mod cipher;
pub mod envelope;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the GCM authentication tag (16 bytes = 128 bits).
pub const TAG_LEN: usize = 16;
