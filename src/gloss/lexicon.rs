//! Per-language glossing conventions.
//!
//! The lexicon maps function words to the roles they play in elicitation
//! glosses: particles that reveal a part of speech ("the dog", "to kill"),
//! auxiliary prefixes that carry no content ("be quiet"), and stop-words
//! that are dropped from the canonical form.

use super::PartOfSpeech;

/// Bracket characters that open a comment.
pub const OPENING_BRACKETS: &[char] = &['(', '[', '{', '（', '<'];

/// Bracket characters that close a comment.
pub const CLOSING_BRACKETS: &[char] = &[')', ']', '}', '）', '>'];

/// Characters (besides whitespace and brackets) that separate tokens.
pub const PUNCTUATION: &[char] = &[
    '?', '!', '"', '¨', ':', ';', ',', '»', '«', '´', '“', '”', '*', '+', '-', '/', '.',
];

/// Part-of-speech annotations accepted inside a trailing bracket.
const ABBREVIATIONS: &[(&str, PartOfSpeech)] = &[
    ("v", PartOfSpeech::Verb),
    ("v.", PartOfSpeech::Verb),
    ("vb", PartOfSpeech::Verb),
    ("verb", PartOfSpeech::Verb),
    ("n", PartOfSpeech::Noun),
    ("n.", PartOfSpeech::Noun),
    ("nn", PartOfSpeech::Noun),
    ("noun", PartOfSpeech::Noun),
    ("adj", PartOfSpeech::Adjective),
    ("adj.", PartOfSpeech::Adjective),
    ("adjective", PartOfSpeech::Adjective),
    ("adv", PartOfSpeech::Adverb),
    ("adv.", PartOfSpeech::Adverb),
    ("adverb", PartOfSpeech::Adverb),
    ("cls", PartOfSpeech::Classifier),
    ("clf", PartOfSpeech::Classifier),
    ("classifier", PartOfSpeech::Classifier),
];

const EN_PARTICLES: &[(&str, PartOfSpeech)] = &[
    ("the", PartOfSpeech::Noun),
    ("a", PartOfSpeech::Noun),
    ("an", PartOfSpeech::Noun),
    ("to", PartOfSpeech::Verb),
];
const EN_PREFIXES: &[&str] = &["be", "in", "at"];
const EN_STOP_WORDS: &[&str] = &["the", "a", "an", "or", "and"];

const DE_PARTICLES: &[(&str, PartOfSpeech)] = &[
    ("der", PartOfSpeech::Noun),
    ("die", PartOfSpeech::Noun),
    ("das", PartOfSpeech::Noun),
    ("ein", PartOfSpeech::Noun),
    ("eine", PartOfSpeech::Noun),
];
const DE_STOP_WORDS: &[&str] = &["der", "die", "das", "ein", "eine", "oder", "und"];

const FR_PARTICLES: &[(&str, PartOfSpeech)] = &[
    ("le", PartOfSpeech::Noun),
    ("la", PartOfSpeech::Noun),
    ("les", PartOfSpeech::Noun),
    ("du", PartOfSpeech::Noun),
    ("des", PartOfSpeech::Noun),
    ("de", PartOfSpeech::Noun),
    ("un", PartOfSpeech::Noun),
    ("une", PartOfSpeech::Noun),
];
const FR_PREFIXES: &[&str] = &["il", "est"];
const FR_STOP_WORDS: &[&str] = &["le", "la", "les", "un", "une", "ou", "et"];

const ES_PARTICLES: &[(&str, PartOfSpeech)] = &[
    ("el", PartOfSpeech::Noun),
    ("la", PartOfSpeech::Noun),
    ("los", PartOfSpeech::Noun),
    ("las", PartOfSpeech::Noun),
    ("un", PartOfSpeech::Noun),
    ("una", PartOfSpeech::Noun),
];
const ES_STOP_WORDS: &[&str] = &["el", "la", "los", "las", "un", "una", "o", "y"];

const NONE_PARTICLES: &[(&str, PartOfSpeech)] = &[];
const NONE_WORDS: &[&str] = &[];

/// Glossing conventions for one language.
#[derive(Debug, Clone)]
pub struct Lexicon {
    language: String,
    particles: &'static [(&'static str, PartOfSpeech)],
    prefixes: &'static [&'static str],
    stop_words: &'static [&'static str],
}

impl Lexicon {
    /// The lexicon for a language tag. Unknown tags get empty tables.
    pub fn for_language(tag: &str) -> Self {
        let tag = tag.trim().to_lowercase();
        let (particles, prefixes, stop_words) = match tag.as_str() {
            "en" => (EN_PARTICLES, EN_PREFIXES, EN_STOP_WORDS),
            "de" => (DE_PARTICLES, NONE_WORDS, DE_STOP_WORDS),
            "fr" => (FR_PARTICLES, FR_PREFIXES, FR_STOP_WORDS),
            "es" => (ES_PARTICLES, NONE_WORDS, ES_STOP_WORDS),
            _ => (NONE_PARTICLES, NONE_WORDS, NONE_WORDS),
        };

        Self {
            language: tag,
            particles,
            prefixes,
            stop_words,
        }
    }

    /// The normalized language tag.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Part of speech signalled by a leading particle.
    pub fn particle(&self, word: &str) -> Option<PartOfSpeech> {
        self.particles
            .iter()
            .find(|(p, _)| *p == word)
            .map(|(_, pos)| *pos)
    }

    /// Whether a word is an auxiliary prefix ("be" in "be quiet").
    pub fn is_prefix(&self, word: &str) -> bool {
        self.prefixes.contains(&word)
    }

    /// Whether a word is dropped from the canonical form.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(&word)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::for_language("en")
    }
}

/// Part of speech named by a bracket annotation such as `v.` or `noun`.
pub fn pos_annotation(text: &str) -> Option<PartOfSpeech> {
    let lower = text.trim().to_lowercase();
    ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| *abbr == lower)
        .map(|(_, pos)| *pos)
}

/// Whether a character separates tokens.
pub fn is_separator(c: char) -> bool {
    c.is_whitespace()
        || PUNCTUATION.contains(&c)
        || OPENING_BRACKETS.contains(&c)
        || CLOSING_BRACKETS.contains(&c)
}
