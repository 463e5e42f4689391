//! `sealbox` — single-shot AES-256-GCM authenticated encryption.
//!
//! Every operation is a pure function of its inputs plus the OS CSPRNG, so the
//! crate holds no state and is safe to call concurrently from any thread.
//!
//! ```
//! let key = sealbox::generate_key()?;
//! let envelope = sealbox::seal(b"hello", key.as_bytes())?;
//! assert_eq!(sealbox::open(&envelope, key.as_bytes())?, b"hello");
//! # Ok::<(), sealbox::CipherError>(())
//! ```

pub mod crypto;
pub mod error;
pub mod key;

pub use aes_gcm::aead::rand_core;
pub use crypto::cipher::{
    generate_key, generate_key_with_rng, open, seal, seal_with_rng, sealed_len,
};
pub use crypto::envelope::Envelope;
pub use crypto::{KEY_LEN, NONCE_LEN, TAG_LEN};
pub use error::CipherError;
pub use key::SecretKey;
