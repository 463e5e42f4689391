//! AES-256-GCM seal and open.
//!
//! **Algorithm choice:** AES-256-GCM with a 96-bit random nonce per call and a
//! 128-bit tag, no associated data. Sealing the same plaintext twice yields
//! different envelopes.
//!
//! Randomness is always drawn with `try_fill_bytes`, so an exhausted or broken
//! OS source surfaces as [`CipherError::RandomnessUnavailable`] instead of a
//! panic or a weaker fallback.

use aes_gcm::{
    aead::{
        rand_core::{CryptoRng, RngCore},
        Aead, KeyInit, OsRng,
    },
    Aes256Gcm, Nonce,
};
use zeroize::Zeroize;

use super::envelope::Envelope;
use super::{KEY_LEN, NONCE_LEN, TAG_LEN};
use crate::error::CipherError;
use crate::key::SecretKey;

/// Seal `plaintext` under `key` and return the encoded envelope.
///
/// A fresh nonce is drawn from the OS CSPRNG.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes.
/// Returns [`CipherError::RandomnessUnavailable`] if the OS source fails.
pub fn seal(plaintext: &[u8], key: &[u8]) -> Result<String, CipherError> {
    seal_with_rng(plaintext, key, &mut OsRng)
}

/// Seal `plaintext` under `key`, drawing the nonce from `rng`.
///
/// `rng` must never repeat output under the same key; anything other than a
/// CSPRNG voids the nonce-uniqueness guarantee.
///
/// # Errors
///
/// As [`seal`]. Also returns [`CipherError::EncryptionFailure`] if the AEAD
/// refuses the input (payload beyond the GCM length limit).
pub fn seal_with_rng<R>(plaintext: &[u8], key: &[u8], rng: &mut R) -> Result<String, CipherError>
where
    R: RngCore + CryptoRng,
{
    let cipher = build_cipher(key)?;

    let mut nonce = [0u8; NONCE_LEN];
    rng.try_fill_bytes(&mut nonce)
        .map_err(|e| CipherError::RandomnessUnavailable(e.to_string()))?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| CipherError::EncryptionFailure)?;

    Ok(Envelope { nonce, ciphertext }.encode())
}

/// Open an envelope produced by [`seal`] and return the plaintext.
///
/// The plaintext is returned only if the tag verifies; nothing is returned on
/// failure.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes.
/// Returns [`CipherError::MalformedEnvelope`] if `envelope` is not standard
/// padded base64 or is shorter than a nonce.
/// Returns [`CipherError::AuthenticationFailed`] if the tag does not verify
/// (wrong key, truncated, or tampered data).
pub fn open(envelope: &str, key: &[u8]) -> Result<Vec<u8>, CipherError> {
    let cipher = build_cipher(key)?;
    let envelope = Envelope::parse(envelope)?;
    cipher
        .decrypt(Nonce::from_slice(&envelope.nonce), envelope.ciphertext.as_slice())
        .map_err(|_| CipherError::AuthenticationFailed)
}

/// Generate a fresh 256-bit key from the OS CSPRNG.
///
/// # Errors
///
/// Returns [`CipherError::RandomnessUnavailable`] if the OS source fails.
pub fn generate_key() -> Result<SecretKey, CipherError> {
    generate_key_with_rng(&mut OsRng)
}

/// Generate a 256-bit key from `rng`.
///
/// # Errors
///
/// Returns [`CipherError::RandomnessUnavailable`] if `rng` fails.
pub fn generate_key_with_rng<R>(rng: &mut R) -> Result<SecretKey, CipherError>
where
    R: RngCore + CryptoRng,
{
    let mut buf = [0u8; KEY_LEN];
    let filled = rng.try_fill_bytes(&mut buf);
    let key = SecretKey::from_bytes(buf);
    buf.zeroize();
    filled.map_err(|e| CipherError::RandomnessUnavailable(e.to_string()))?;
    Ok(key)
}

/// Number of base64 characters [`seal`] produces for a plaintext of
/// `plaintext_len` bytes, or `None` if that count does not fit in a `usize`.
pub const fn sealed_len(plaintext_len: usize) -> Option<usize> {
    let framed = match plaintext_len.checked_add(NONCE_LEN + TAG_LEN) {
        Some(n) => n,
        None => return None,
    };
    framed.div_ceil(3).checked_mul(4)
}

fn build_cipher(key: &[u8]) -> Result<Aes256Gcm, CipherError> {
    if key.len() != KEY_LEN {
        return Err(CipherError::InvalidKeyLength(key.len()));
    }
    Aes256Gcm::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength(key.len()))
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use aes_gcm::aead::rand_core;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    use super::*;

    fn random_key() -> SecretKey {
        generate_key().unwrap()
    }

    /// A random source that always reports failure.
    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            panic!("infallible draw on a broken source")
        }
        fn next_u64(&mut self) -> u64 {
            panic!("infallible draw on a broken source")
        }
        fn fill_bytes(&mut self, _dest: &mut [u8]) {
            panic!("infallible draw on a broken source")
        }
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand_core::Error> {
            Err(rand_core::Error::from(
                NonZeroU32::new(rand_core::Error::CUSTOM_START).unwrap(),
            ))
        }
    }

    impl CryptoRng for BrokenRng {}

    /// Yields a fixed byte so the nonce is predictable.
    struct FixedRng(u8);

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            u32::from_le_bytes([self.0; 4])
        }
        fn next_u64(&mut self) -> u64 {
            u64::from_le_bytes([self.0; 8])
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(self.0);
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for FixedRng {}

    #[test]
    fn seal_open_round_trip() {
        let key = random_key();
        let cases: [&[u8]; 4] = [b"", b"x", b"123-45-6789", &[0u8; 1024]];
        for plaintext in cases {
            let envelope = seal(plaintext, key.as_bytes()).unwrap();
            assert_eq!(Some(envelope.len()), sealed_len(plaintext.len()));
            assert_eq!(open(&envelope, key.as_bytes()).unwrap(), plaintext);
        }
    }

    #[test]
    fn zero_key_hello_scenario() {
        let key = [0u8; KEY_LEN];
        let envelope = seal(b"hello", &key).unwrap();
        assert_eq!(envelope.len(), 44);
        assert_eq!(open(&envelope, &key).unwrap(), b"hello");
        assert_eq!(
            open(&envelope, &[0u8; 31]).unwrap_err(),
            CipherError::InvalidKeyLength(31)
        );
    }

    #[test]
    fn invalid_key_length_rejected() {
        let good = random_key();
        let envelope = seal(b"x", good.as_bytes()).unwrap();
        for len in [0, 16, 31, 33, 64] {
            let bad = vec![0u8; len];
            assert_eq!(seal(b"x", &bad).unwrap_err(), CipherError::InvalidKeyLength(len));
            assert_eq!(
                open(&envelope, &bad).unwrap_err(),
                CipherError::InvalidKeyLength(len)
            );
            // Key length is checked before the envelope is looked at.
            assert_eq!(
                open("!!!", &bad).unwrap_err(),
                CipherError::InvalidKeyLength(len)
            );
        }
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let key1 = random_key();
        let key2 = random_key();
        let envelope = seal(b"secret", key1.as_bytes()).unwrap();
        assert_eq!(
            open(&envelope, key2.as_bytes()).unwrap_err(),
            CipherError::AuthenticationFailed
        );
    }

    #[test]
    fn every_single_bit_flip_is_detected() {
        let key = random_key();
        let envelope = seal(b"tamper me", key.as_bytes()).unwrap();
        let raw = STANDARD.decode(&envelope).unwrap();

        for byte in 0..raw.len() {
            for bit in 0..8 {
                let mut tampered = raw.clone();
                tampered[byte] ^= 1 << bit;
                let reencoded = STANDARD.encode(&tampered);
                assert_eq!(
                    open(&reencoded, key.as_bytes()).unwrap_err(),
                    CipherError::AuthenticationFailed,
                    "flip of bit {bit} in byte {byte} went undetected"
                );
            }
        }
    }

    #[test]
    fn truncated_body_fails_authentication() {
        let key = random_key();
        let envelope = seal(b"hello", key.as_bytes()).unwrap();
        let raw = STANDARD.decode(&envelope).unwrap();

        // Nonce present but body shorter than a tag.
        let truncated = STANDARD.encode(&raw[..NONCE_LEN + TAG_LEN - 1]);
        assert_eq!(
            open(&truncated, key.as_bytes()).unwrap_err(),
            CipherError::AuthenticationFailed
        );

        // Nonce only.
        let nonce_only = STANDARD.encode(&raw[..NONCE_LEN]);
        assert_eq!(
            open(&nonce_only, key.as_bytes()).unwrap_err(),
            CipherError::AuthenticationFailed
        );
    }

    #[test]
    fn malformed_envelopes_rejected() {
        let key = random_key();
        assert!(matches!(
            open("not base64 at all!", key.as_bytes()),
            Err(CipherError::MalformedEnvelope(_))
        ));
        let short = STANDARD.encode([0u8; NONCE_LEN - 1]);
        assert!(matches!(
            open(&short, key.as_bytes()),
            Err(CipherError::MalformedEnvelope(_))
        ));
        assert!(matches!(
            open("", key.as_bytes()),
            Err(CipherError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn repeated_seals_differ() {
        let key = random_key();
        let a = seal(b"same input", key.as_bytes()).unwrap();
        let b = seal(b"same input", key.as_bytes()).unwrap();
        assert_ne!(a, b);
        assert_ne!(Envelope::parse(&a).unwrap().nonce, Envelope::parse(&b).unwrap().nonce);
    }

    #[test]
    fn nonce_comes_from_supplied_rng() {
        let key = random_key();
        let envelope = seal_with_rng(b"abc", key.as_bytes(), &mut FixedRng(0x5A)).unwrap();
        let parsed = Envelope::parse(&envelope).unwrap();
        assert_eq!(parsed.nonce, [0x5A; NONCE_LEN]);
        assert_eq!(parsed.plaintext_len(), Some(3));
        assert_eq!(open(&envelope, key.as_bytes()).unwrap(), b"abc");
    }

    #[test]
    fn broken_rng_fails_seal() {
        let key = random_key();
        assert!(matches!(
            seal_with_rng(b"abc", key.as_bytes(), &mut BrokenRng),
            Err(CipherError::RandomnessUnavailable(_))
        ));
    }

    #[test]
    fn broken_rng_fails_key_generation() {
        assert!(matches!(
            generate_key_with_rng(&mut BrokenRng),
            Err(CipherError::RandomnessUnavailable(_))
        ));
    }

    #[test]
    fn generated_keys_are_distinct() {
        let a = generate_key().unwrap();
        let b = generate_key().unwrap();
        assert_eq!(a.as_bytes().len(), KEY_LEN);
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn sealed_len_formula() {
        assert_eq!(sealed_len(0), Some(40));
        assert_eq!(sealed_len(5), Some(44));
        assert_eq!(sealed_len(6), Some(48));
    }

    #[test]
    fn sealed_len_reports_overflow() {
        assert_eq!(sealed_len(usize::MAX), None);
        assert_eq!(sealed_len(usize::MAX - NONCE_LEN - TAG_LEN), None);
        assert!(sealed_len(usize::MAX / 2).is_some());
    }

    #[test]
    fn concurrent_use_from_many_threads() {
        let key = random_key();
        std::thread::scope(|s| {
            for i in 0..8u8 {
                let key = &key;
                s.spawn(move || {
                    let plaintext = vec![i; 64];
                    for _ in 0..32 {
                        let envelope = seal(&plaintext, key.as_bytes()).unwrap();
                        assert_eq!(open(&envelope, key.as_bytes()).unwrap(), plaintext);
                    }
                });
            }
        });
    }
}
