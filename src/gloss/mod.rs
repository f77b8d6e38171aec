//! Gloss normalization and similarity.
//!
//! A gloss is a short natural-language label for a concept as found in a
//! wordlist ("the dog (n)", "to kill", "kill (somebody)"). Parsing turns it
//! into a [`Gloss`] record whose canonical form is independent of articles,
//! part-of-speech annotations and surface formatting:
//!
//! ```text
//! raw string ──→ Lexicon (per language) ──→ parse_gloss ──→ Gloss ──→ similarity
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use concepticon::gloss::{parse_gloss, PartOfSpeech};
//!
//! let gloss = parse_gloss("the dog (n)", "en").unwrap();
//! assert_eq!(gloss.main, "dog");
//! assert_eq!(gloss.pos, Some(PartOfSpeech::Noun));
//! assert_eq!(gloss.canonical, "dog");
//! ```

pub mod lexicon;
pub mod parser;
pub mod similarity;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use lexicon::Lexicon;
pub use parser::{parse_constituents, parse_gloss};
pub use similarity::{PosAgreement, Similarity, similarity};

/// Part of speech inferred from particles or annotations.
///
/// An unknown part of speech is represented as `None` on [`Gloss::pos`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Classifier,
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Noun => "noun",
            Self::Verb => "verb",
            Self::Adjective => "adjective",
            Self::Adverb => "adverb",
            Self::Classifier => "classifier",
        };
        f.write_str(label)
    }
}

/// A parsed gloss.
///
/// Immutable once produced by [`parse_gloss`]; `main` and `canonical` are
/// never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gloss {
    /// The first content token.
    pub main: String,
    /// Content tokens in order, lowercased, stop-words removed.
    pub tokens: Vec<String>,
    /// Tokens joined by single spaces; the basis for comparison.
    pub canonical: String,
    /// Part of speech, if a particle or annotation revealed it.
    pub pos: Option<PartOfSpeech>,
    /// Auxiliary prefix stripped from the front ("be" in "to be quiet").
    pub prefix: Option<String>,
    /// Content of a trailing bracket that was not a part-of-speech marker.
    pub comment: Option<String>,
    /// Opening and closing characters of the trailing bracket, if any.
    pub brackets: Option<(char, char)>,
    /// The input string, untouched.
    pub original: String,
    /// Language tag the gloss was parsed with.
    pub language: String,
}

impl Gloss {
    /// Whether this gloss contains the given token.
    pub fn has_token(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }
}

impl fmt::Display for Gloss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)?;
        if let Some(pos) = self.pos {
            write!(f, " [{pos}]")?;
        }
        Ok(())
    }
}
