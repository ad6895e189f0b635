//! # stealth-types
//!
//! Core type definitions for the Stealth Code pitch-scoring service.
//!
//! Every other crate in the workspace depends on this one. It contains:
//!
//! - **[`error`]** -- [`ScoringError`], [`AuthError`] and [`ProfileError`]
//! - **[`score`]** -- the four-dimensional [`ScoreVector`] and [`ScoringResult`]
//! - **[`submission`]** -- the inbound [`ScoreRequest`] wire type
//! - **[`profile`]** -- caller [`Identity`] and stored [`UserProfile`]
//! - **[`config`]** -- service configuration schema
//! - **[`secret`]** -- [`SecretString`], a redacting, zeroizing string

pub mod config;
pub mod error;
pub mod profile;
pub mod score;
pub mod secret;
pub mod submission;

pub use error::{AuthError, ProfileError, Result, ScoringError};
pub use profile::{Identity, ProfileDefaults, UserProfile};
pub use score::{SCORE_KEYS, ScoreError, ScoreVector, ScoringResult};
pub use secret::SecretString;
pub use submission::ScoreRequest;
