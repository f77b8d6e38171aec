//! Discrete gloss similarity.
//!
//! Similarity is an ordinal index where lower means closer: `1` for
//! identical canonical forms with agreeing part of speech, up to
//! [`Similarity::NO_MATCH`] for glosses sharing no token. It is symmetric
//! but not a metric.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Gloss, PartOfSpeech};

/// Ordinal similarity index; lower is more similar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Similarity(u8);

impl Similarity {
    /// Identical canonical forms with agreeing part of speech.
    pub const IDENTICAL: Self = Self(1);
    /// The default acceptance threshold for mappings.
    pub const DEFAULT_LEVEL: Self = Self(5);
    /// Sentinel: no shared token at all.
    pub const NO_MATCH: Self = Self(10);

    /// Build an index, clamped into `1..=10`.
    pub fn new(value: u8) -> Self {
        Self(value.clamp(Self::IDENTICAL.0, Self::NO_MATCH.0))
    }

    /// The numeric index.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Whether this is a real match (anything below the sentinel).
    pub fn is_match(self) -> bool {
        self < Self::NO_MATCH
    }

    /// Whether this is a real match no worse than `level`.
    pub fn within(self, level: Similarity) -> bool {
        self.is_match() && self <= level
    }
}

impl Default for Similarity {
    fn default() -> Self {
        Self::NO_MATCH
    }
}

impl fmt::Display for Similarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the parts of speech of two glosses relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosAgreement {
    /// Equal, or both unknown.
    Same,
    /// Exactly one side is unknown.
    Partial,
    /// Both known and different.
    Conflict,
}

impl PosAgreement {
    pub fn between(a: Option<PartOfSpeech>, b: Option<PartOfSpeech>) -> Self {
        match (a, b) {
            (Some(x), Some(y)) if x != y => Self::Conflict,
            (Some(_), None) | (None, Some(_)) => Self::Partial,
            _ => Self::Same,
        }
    }
}

/// Score two parsed glosses. Never fails; unrelated glosses get
/// [`Similarity::NO_MATCH`].
pub fn similarity(a: &Gloss, b: &Gloss) -> Similarity {
    let agreement = PosAgreement::between(a.pos, b.pos);

    if a.canonical == b.canonical {
        return match agreement {
            PosAgreement::Same => Similarity(1),
            PosAgreement::Partial => Similarity(2),
            PosAgreement::Conflict => Similarity(4),
        };
    }

    let left: BTreeSet<&str> = a.tokens.iter().map(String::as_str).collect();
    let right: BTreeSet<&str> = b.tokens.iter().map(String::as_str).collect();

    if left == right {
        return match agreement {
            PosAgreement::Same => Similarity(2),
            PosAgreement::Partial => Similarity(3),
            PosAgreement::Conflict => Similarity(4),
        };
    }

    if a.main == b.main {
        return match agreement {
            PosAgreement::Conflict => Similarity(6),
            _ => Similarity(5),
        };
    }

    let shared = left.intersection(&right).count();
    if shared == 0 {
        return Similarity::NO_MATCH;
    }
    let unshared = left.symmetric_difference(&right).count();
    Similarity::new(6usize.saturating_add(unshared).min(10) as u8)
}
