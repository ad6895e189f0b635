//! The four-dimensional score vector and the externally visible result.
//!
//! A [`ScoreVector`] can only be built through validating constructors, so
//! any value of the type holds four finite numbers in `[0.0, 10.0]`.

use std::collections::BTreeMap;
use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The rubric dimensions, in wire order.
pub const SCORE_KEYS: [&str; 4] = ["clarity", "originality", "team_strength", "market_fit"];

/// Inclusive lower bound for every dimension.
pub const MIN_SCORE: f64 = 0.0;

/// Inclusive upper bound for every dimension.
pub const MAX_SCORE: f64 = 10.0;

/// Why a candidate score vector was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    /// The candidate is not a JSON object.
    #[error("scores must be a JSON object")]
    NotAnObject,

    /// A required dimension is absent.
    #[error("missing score key: {0}")]
    Missing(&'static str),

    /// A dimension is present but not a number.
    #[error("score for {0} is not numeric")]
    NotNumeric(&'static str),

    /// A dimension is outside `[0, 10]` or not finite.
    #[error("score for {key} out of range: {value}")]
    OutOfRange {
        /// Dimension name.
        key: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Validated rubric output: clarity, originality, team strength, market fit.
///
/// Serializes as a JSON object in [`SCORE_KEYS`] order. Deserialization runs
/// the same validation as [`ScoreVector::from_value`]; extra keys are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct ScoreVector {
    clarity: f64,
    originality: f64,
    team_strength: f64,
    market_fit: f64,
}

impl ScoreVector {
    /// Build a vector, rejecting any dimension outside `[0, 10]`.
    pub fn new(
        clarity: f64,
        originality: f64,
        team_strength: f64,
        market_fit: f64,
    ) -> Result<Self, ScoreError> {
        let values = [clarity, originality, team_strength, market_fit];
        for (key, value) in SCORE_KEYS.iter().zip(values) {
            check_range(key, value)?;
        }
        Ok(Self {
            clarity,
            originality,
            team_strength,
            market_fit,
        })
    }

    /// Build a vector, clamping every dimension into `[0, 10]`.
    ///
    /// Non-finite inputs become `0.0`.
    pub fn clamped(clarity: f64, originality: f64, team_strength: f64, market_fit: f64) -> Self {
        let clamp = |v: f64| {
            if v.is_finite() {
                v.clamp(MIN_SCORE, MAX_SCORE)
            } else {
                MIN_SCORE
            }
        };
        Self {
            clarity: clamp(clarity),
            originality: clamp(originality),
            team_strength: clamp(team_strength),
            market_fit: clamp(market_fit),
        }
    }

    /// Validate an arbitrary JSON value as a score vector.
    ///
    /// Requires an object holding all four [`SCORE_KEYS`] as JSON numbers in
    /// range. Other keys are ignored.
    pub fn from_value(value: &Value) -> Result<Self, ScoreError> {
        let obj = value.as_object().ok_or(ScoreError::NotAnObject)?;
        let mut out = [0.0_f64; 4];
        for (slot, key) in out.iter_mut().zip(SCORE_KEYS) {
            let raw = obj.get(key).ok_or(ScoreError::Missing(key))?;
            let n = raw.as_f64().ok_or(ScoreError::NotNumeric(key))?;
            *slot = n;
        }
        Self::new(out[0], out[1], out[2], out[3])
    }

    pub fn clarity(&self) -> f64 {
        self.clarity
    }

    pub fn originality(&self) -> f64 {
        self.originality
    }

    pub fn team_strength(&self) -> f64 {
        self.team_strength
    }

    pub fn market_fit(&self) -> f64 {
        self.market_fit
    }

    /// `(key, value)` pairs in [`SCORE_KEYS`] order.
    pub fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("clarity", self.clarity),
            ("originality", self.originality),
            ("team_strength", self.team_strength),
            ("market_fit", self.market_fit),
        ]
    }

    /// True when every dimension is exactly zero.
    ///
    /// Providers treat such a vector as unusable output.
    pub fn is_all_zero(&self) -> bool {
        self.entries().iter().all(|(_, v)| *v == 0.0)
    }

    /// JSON with keys in lexicographic order, `", "` between entries and
    /// `": "` after each key.
    ///
    /// This is the form bound into receipts and the one existing receipts
    /// were issued over, so it must stay byte-stable:
    /// `{"clarity": 8.5, "market_fit": 8.8, "originality": 7.2, "team_strength": 9.1}`.
    pub fn canonical_json(&self) -> String {
        let sorted: BTreeMap<&str, f64> = self.entries().into_iter().collect();
        let mut buf = Vec::with_capacity(96);
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedSeparators);
        // A map of str -> finite f64 always serializes.
        if sorted.serialize(&mut ser).is_err() {
            return String::new();
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

/// Single-line JSON with a space after every `,` and `:`.
struct SpacedSeparators;

impl serde_json::ser::Formatter for SpacedSeparators {
    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

impl TryFrom<Value> for ScoreVector {
    type Error = ScoreError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

fn check_range(key: &'static str, value: f64) -> Result<(), ScoreError> {
    if value.is_finite() && (MIN_SCORE..=MAX_SCORE).contains(&value) {
        Ok(())
    } else {
        Err(ScoreError::OutOfRange { key, value })
    }
}

/// The externally visible artifact of one scoring request.
///
/// Contains no plaintext. `timestamp` is unix seconds rendered as a decimal
/// string; `model` names whichever variant actually produced `scores`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub scores: ScoreVector,
    pub receipt: String,
    pub timestamp: String,
    pub model: String,
}
