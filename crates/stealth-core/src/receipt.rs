//! Tamper-evident receipts.
//!
//! A receipt is the lowercase hex SHA-256 of
//! `ciphertext_b64|model|timestamp|canonical_scores_json`, where the scores
//! JSON has lexicographically sorted keys, `", "` between entries and `": "`
//! after each key. It commits to
//! the ciphertext, never the plaintext, so anyone holding the response and
//! the ciphertext can recompute it.
//!
//! The hash is unkeyed: a receipt proves the four inputs are consistent, not
//! that this service produced them.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use stealth_types::ScoreVector;

/// Field separator in the hashed preimage.
pub const DELIMITER: char = '|';

/// A 64-character lowercase hex SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Receipt(String);

impl Receipt {
    /// Compute the receipt for the given inputs.
    pub fn generate(ciphertext_b64: &str, model: &str, timestamp: &str, scores: &ScoreVector) -> Self {
        let preimage = format!(
            "{ciphertext_b64}{DELIMITER}{model}{DELIMITER}{timestamp}{DELIMITER}{}",
            scores.canonical_json()
        );
        let digest = Sha256::digest(preimage.as_bytes());
        Self(hex_encode(&digest))
    }

    /// Recompute and compare.
    pub fn verify(
        &self,
        ciphertext_b64: &str,
        model: &str,
        timestamp: &str,
        scores: &ScoreVector,
    ) -> bool {
        Self::generate(ciphertext_b64, model, timestamp, scores) == *self
    }

    /// Parse a hex receipt, normalising to lowercase.
    ///
    /// Returns `None` unless the input is exactly 64 hex digits.
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.trim();
        (s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit()))
            .then(|| Self(s.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hex-encode bytes as lowercase.
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores() -> ScoreVector {
        ScoreVector::new(8.5, 7.2, 9.1, 8.8).unwrap()
    }

    #[test]
    fn known_vector_for_empty_input() {
        assert_eq!(
            hex_encode(&Sha256::digest(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn matches_manual_preimage() {
        let r = Receipt::generate("Y3Q=", "primary", "1700000000", &scores());
        let manual = hex_encode(&Sha256::digest(
            br#"Y3Q=|primary|1700000000|{"clarity": 8.5, "market_fit": 8.8, "originality": 7.2, "team_strength": 9.1}"#,
        ));
        assert_eq!(r.as_str(), manual);
    }

    #[test]
    fn matches_receipt_issued_by_existing_service() {
        let r = Receipt::generate("Y3Q=", "primary", "1700000000", &scores());
        assert_eq!(
            r.as_str(),
            "dea48a0c054fc6c5e2db2016b48e2ec2087d5663e5aaed5ab12bc07292f72572"
        );
    }

    #[test]
    fn deterministic() {
        let a = Receipt::generate("abc", "m", "1", &scores());
        let b = Receipt::generate("abc", "m", "1", &scores());
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert!(a.as_str().chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn every_input_matters() {
        let base = Receipt::generate("abc", "m", "1", &scores());
        assert_ne!(base, Receipt::generate("abd", "m", "1", &scores()));
        assert_ne!(base, Receipt::generate("abc", "n", "1", &scores()));
        assert_ne!(base, Receipt::generate("abc", "m", "2", &scores()));
        let other = ScoreVector::new(8.5, 7.2, 9.1, 8.7).unwrap();
        assert_ne!(base, Receipt::generate("abc", "m", "1", &other));
    }

    #[test]
    fn verify_roundtrip_and_tamper() {
        let r = Receipt::generate("abc", "m", "1", &scores());
        assert!(r.verify("abc", "m", "1", &scores()));
        assert!(!r.verify("abc", "mock", "1", &scores()));
    }

    #[test]
    fn from_hex_normalises_case() {
        let r = Receipt::generate("abc", "m", "1", &scores());
        let upper = r.as_str().to_ascii_uppercase();
        assert_eq!(Receipt::from_hex(&upper), Some(r));
        assert_eq!(Receipt::from_hex("abc"), None);
        assert_eq!(Receipt::from_hex(&"g".repeat(64)), None);
    }

    #[test]
    fn serializes_as_plain_string() {
        let r = Receipt::generate("abc", "m", "1", &scores());
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, format!("\"{}\"", r.as_str()));
    }
}
