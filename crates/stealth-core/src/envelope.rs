//! Cipher envelope codec.
//!
//! Decodes the base64 wire form of an encrypted submission, validates key
//! and nonce lengths, and performs AES-256-GCM authenticated decryption with
//! no associated data. The ciphertext carries the 16-byte tag at its end.
//!
//! Failure modes are deliberately coarse:
//!
//! - malformed base64 -> [`ScoringError::Encoding`]
//! - wrong key/nonce length or a too-short plaintext -> [`ScoringError::Validation`]
//! - anything that goes wrong inside or after the AEAD -> [`ScoringError::Decryption`]
//!
//! Length checks run before any decryption is attempted.
//!
//! Key bytes and recovered plaintext live in [`Zeroizing`] buffers and are
//! wiped when dropped. This is best-effort hygiene: copies the allocator or
//! the kernel made earlier are out of reach.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use rand::rngs::OsRng;
use stealth_types::{ScoreRequest, ScoringError, SecretString};
use zeroize::{Zeroize, Zeroizing};

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// Shortest plaintext, in characters, worth scoring.
pub const MIN_PLAINTEXT_CHARS: usize = 50;

/// A validated, not yet opened, encrypted submission.
///
/// Consumed by [`open`](CipherEnvelope::open), so it can be decrypted at
/// most once.
pub struct CipherEnvelope {
    ciphertext: Vec<u8>,
    key: Zeroizing<[u8; KEY_LEN]>,
    nonce: [u8; NONCE_LEN],
}

impl CipherEnvelope {
    /// Decode the three base64 fields and validate lengths.
    pub fn from_base64(
        ciphertext_b64: &str,
        key_b64: &str,
        nonce_b64: &str,
    ) -> Result<Self, ScoringError> {
        let ciphertext = decode_field(ciphertext_b64, "ciphertext")?;
        let key = decode_field(key_b64, "aes_key")?;
        let nonce = decode_field(nonce_b64, "iv")?;
        Self::from_parts(ciphertext.to_vec(), &key, &nonce)
    }

    /// Build from raw bytes, validating key and nonce lengths.
    pub fn from_parts(ciphertext: Vec<u8>, key: &[u8], nonce: &[u8]) -> Result<Self, ScoringError> {
        let key: [u8; KEY_LEN] = key.try_into().map_err(|_| {
            ScoringError::validation(format!("key must be {KEY_LEN} bytes, got {}", key.len()))
        })?;
        let key = Zeroizing::new(key);
        let nonce: [u8; NONCE_LEN] = nonce.try_into().map_err(|_| {
            ScoringError::validation(format!(
                "nonce must be {NONCE_LEN} bytes, got {}",
                nonce.len()
            ))
        })?;
        Ok(Self {
            ciphertext,
            key,
            nonce,
        })
    }

    /// Authenticated decryption.
    ///
    /// Tag mismatch and invalid UTF-8 both yield [`ScoringError::Decryption`].
    pub fn open(self) -> Result<Plaintext, ScoringError> {
        let cipher =
            Aes256Gcm::new_from_slice(self.key.as_slice()).map_err(|_| ScoringError::Decryption)?;
        let nonce = Nonce::from_slice(&self.nonce);
        let bytes = cipher
            .decrypt(nonce, self.ciphertext.as_slice())
            .map_err(|_| ScoringError::Decryption)?;

        match String::from_utf8(bytes) {
            Ok(text) => Ok(Plaintext(Zeroizing::new(text))),
            Err(err) => {
                let mut bytes = err.into_bytes();
                bytes.zeroize();
                Err(ScoringError::Decryption)
            }
        }
    }
}

impl std::fmt::Debug for CipherEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherEnvelope")
            .field("ciphertext_len", &self.ciphertext.len())
            .field("key", &"***")
            .field("nonce", &"***")
            .finish()
    }
}

/// Recovered plaintext. Wiped on drop and never printed.
pub struct Plaintext(Zeroizing<String>);

impl Plaintext {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl std::fmt::Debug for Plaintext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Plaintext([REDACTED; {} bytes])", self.0.len())
    }
}

/// Decode, validate, decrypt, and enforce the minimum plaintext length.
pub fn decode(
    ciphertext_b64: &str,
    key_b64: &str,
    nonce_b64: &str,
) -> Result<Plaintext, ScoringError> {
    let plaintext = CipherEnvelope::from_base64(ciphertext_b64, key_b64, nonce_b64)?.open()?;
    if plaintext.char_count() < MIN_PLAINTEXT_CHARS {
        return Err(ScoringError::validation(format!(
            "plaintext shorter than {MIN_PLAINTEXT_CHARS} characters"
        )));
    }
    Ok(plaintext)
}

fn decode_field(value: &str, field: &'static str) -> Result<Zeroizing<Vec<u8>>, ScoringError> {
    STANDARD
        .decode(value.trim())
        .map(Zeroizing::new)
        .map_err(|_| ScoringError::Encoding { field })
}

// ── Client side ────────────────────────────────────────────────────────

/// Encrypt `plaintext` under a fresh random key and nonce, producing a
/// ready-to-send request body.
pub fn seal(plaintext: &str) -> Result<ScoreRequest, ScoringError> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(key.as_mut_slice());
    OsRng.fill_bytes(&mut nonce);
    seal_with(plaintext, &key, &nonce)
}

/// Encrypt `plaintext` under the given key and nonce.
///
/// Reusing a nonce with the same key breaks GCM; this exists for
/// reproducible fixtures.
pub fn seal_with(
    plaintext: &str,
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
) -> Result<ScoreRequest, ScoringError> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| ScoringError::Internal(format!("cipher init: {e}")))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(nonce), plaintext.as_bytes())
        .map_err(|_| ScoringError::Internal("encryption failed".into()))?;

    Ok(ScoreRequest {
        ciphertext: STANDARD.encode(ciphertext),
        aes_key: SecretString::new(STANDARD.encode(key)),
        iv: SecretString::new(STANDARD.encode(nonce)),
        model: None,
        use_fallback: false,
        metadata: None,
    })
}
