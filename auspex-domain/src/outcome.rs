//! Classification Outcome
//!
//! The three-valued result of sentiment analysis on a triggering message,
//! plus the normalization applied to raw classifier output and the total
//! mapping from outcome to trade direction.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::Direction;

/// The outcome of classifying a message.
///
/// Produced fresh per classified message; never cached or persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Message reports a favorable result
    Positive,
    /// Message reports an unfavorable result
    Negative,
    /// No concrete result, or unrecognized classifier output
    Inconclusive,
}

impl Outcome {
    /// Normalize a raw classifier response into an outcome.
    ///
    /// Takes the first whitespace-delimited token of the response and
    /// lowercases it. Anything that is not exactly "positive" or "negative"
    /// (empty, malformed, multi-word tail, "neutral", ...) normalizes to
    /// `Inconclusive` rather than erroring. This normalization is the
    /// correctness boundary: the transport-level single-token constraint on
    /// the classifier is best-effort only.
    pub fn from_raw(raw: &str) -> Self {
        let first = raw.split_whitespace().next().map(str::to_ascii_lowercase);
        match first.as_deref() {
            Some("positive") => Outcome::Positive,
            Some("negative") => Outcome::Negative,
            _ => Outcome::Inconclusive,
        }
    }

    /// Map this outcome to a trade direction.
    ///
    /// Total: positive trades long, negative trades short, and everything
    /// else is an explicit no-op (`None`), never a default direction.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Outcome::Positive => Some(Direction::Long),
            Outcome::Negative => Some(Direction::Short),
            Outcome::Inconclusive => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Positive => write!(f, "positive"),
            Outcome::Negative => write!(f, "negative"),
            Outcome::Inconclusive => write!(f, "inconclusive"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
