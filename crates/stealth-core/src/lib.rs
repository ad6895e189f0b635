//! Encrypted scoring pipeline for Stealth Code.
//!
//! The plaintext pitch exists only inside [`ScoringPipeline::handle`]: it is
//! decrypted, sanitized, sent to a model, and wiped. What leaves is a score
//! vector, the model that produced it, a timestamp, and a [`Receipt`] that
//! binds those to the ciphertext.
//!
//! # Modules
//!
//! - [`envelope`] -- base64 + AES-256-GCM envelope codec, and client sealing
//! - [`sanitize`] -- markup stripping and length bounds
//! - [`receipt`] -- SHA-256 content commitments
//! - [`identity`] -- bearer token verification
//! - [`profiles`] -- profile store seam and in-memory store
//! - [`credits`] -- credit gate and background decrement worker
//! - [`pipeline`] -- the coordinator
//! - [`clock`] -- time source

pub mod clock;
pub mod credits;
pub mod envelope;
pub mod identity;
pub mod pipeline;
pub mod profiles;
pub mod receipt;
pub mod sanitize;

pub use clock::{Clock, FixedClock, SystemClock};
pub use credits::CreditLedger;
pub use envelope::{CipherEnvelope, Plaintext, decode, seal, seal_with};
pub use identity::{IdentityVerifier, JwtVerifier};
pub use pipeline::ScoringPipeline;
pub use profiles::{InMemoryProfileStore, ProfileStore, get_or_create};
pub use receipt::Receipt;
pub use sanitize::sanitize;
