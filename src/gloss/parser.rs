//! Gloss parser: raw elicitation gloss → [`Gloss`].
//!
//! The parser performs four passes over the input:
//! 1. **Trailing bracket**: a final `(...)` is either a part-of-speech
//!    annotation (`(n)`, `(v.)`, `(verb)`) or a disambiguating comment
//! 2. **Tokenize**: split on whitespace and punctuation, lowercase
//! 3. **Leading function words**: strip particles ("the", "to"), auxiliary
//!    prefixes ("be") and stop-words from the front, recording the part of
//!    speech a particle reveals
//! 4. **Stop-words**: drop the remaining stop-words; the first token left
//!    becomes `main`

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::GlossError;

use super::Gloss;
use super::lexicon::{CLOSING_BRACKETS, Lexicon, OPENING_BRACKETS, is_separator, pos_annotation};

/// Result type for gloss parsing.
pub type GlossResult<T> = std::result::Result<T, GlossError>;

/// Marker separating the reference gloss from a localized gloss in mapping tables.
pub const COMPOSITE_SEPARATOR: &str = "///";

static RE_CONSTITUENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",|;|:|/| or | OR ").unwrap());

/// Parse a raw gloss with the conventions of the given language.
pub fn parse_gloss(raw: &str, language: &str) -> GlossResult<Gloss> {
    parse_with(raw, &Lexicon::for_language(language))
}

/// Parse a raw gloss with an explicit lexicon.
pub fn parse_with(raw: &str, lexicon: &Lexicon) -> GlossResult<Gloss> {
    let normalized: String = raw.nfc().collect();
    let text = localized_part(&normalized);
    if text.is_empty() {
        return Err(GlossError::Empty);
    }

    let mut surface = text;
    let mut annotated = None;
    let mut comment = None;
    let mut brackets = None;

    if let Some(trailing) = split_trailing_bracket(text) {
        let head = trailing.head.trim_end();
        // A gloss that is nothing but a bracket keeps its content as tokens.
        if !head.is_empty() {
            surface = head;
            brackets = Some((trailing.open, trailing.close));
            match pos_annotation(trailing.content) {
                Some(pos) => annotated = Some(pos),
                None => {
                    let content = trailing.content.trim();
                    if !content.is_empty() {
                        comment = Some(content.to_string());
                    }
                }
            }
        }
    }

    let tokens: Vec<String> = surface
        .split(is_separator)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect();

    let mut pos = None;
    let mut prefix = None;
    let mut start = 0;
    // Leading words go only while some content word remains after them.
    while tokens
        .get(start + 1..)
        .is_some_and(|rest| rest.iter().any(|t| !lexicon.is_stop_word(t)))
    {
        let word = tokens[start].as_str();
        if let Some(particle_pos) = lexicon.particle(word) {
            pos.get_or_insert(particle_pos);
        } else if lexicon.is_prefix(word) {
            prefix.get_or_insert_with(|| word.to_string());
        } else if !lexicon.is_stop_word(word) {
            break;
        }
        start += 1;
    }

    let tokens: Vec<String> = tokens
        .into_iter()
        .skip(start)
        .filter(|t| !lexicon.is_stop_word(t))
        .collect();

    let Some(main) = tokens.first().cloned() else {
        return Err(GlossError::NoContent {
            gloss: raw.to_string(),
        });
    };

    Ok(Gloss {
        main,
        canonical: tokens.join(" "),
        tokens,
        pos: pos.or(annotated),
        prefix,
        comment,
        brackets,
        original: raw.to_string(),
        language: lexicon.language().to_string(),
    })
}

/// Parse a gloss together with its constituents.
///
/// The first element is always the parse of the whole gloss. When the gloss
/// lists alternatives ("mountain, hill", "arm or hand"), one parse per
/// alternative follows; alternatives inherit the part of speech of the whole
/// gloss and are skipped when they have no content.
pub fn parse_constituents(raw: &str, language: &str) -> GlossResult<Vec<Gloss>> {
    let lexicon = Lexicon::for_language(language);
    let primary = parse_with(raw, &lexicon)?;
    let inherited = primary.pos;
    let mut glosses = vec![primary];

    let normalized: String = raw.nfc().collect();
    let parts: Vec<&str> = RE_CONSTITUENT
        .split(localized_part(&normalized))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if parts.len() > 1 {
        for part in parts {
            match parse_with(part, &lexicon) {
                Ok(mut gloss) => {
                    if gloss.pos.is_none() {
                        gloss.pos = inherited;
                    }
                    if !glosses.contains(&gloss) {
                        glosses.push(gloss);
                    }
                }
                Err(e) => {
                    tracing::debug!(gloss = raw, constituent = part, error = %e, "skipping constituent");
                }
            }
        }
    }

    Ok(glosses)
}

/// The part of a composite `english///localized` gloss that is compared.
fn localized_part(text: &str) -> &str {
    let text = text.trim();
    if text.contains(COMPOSITE_SEPARATOR) {
        text.split(COMPOSITE_SEPARATOR).nth(1).unwrap_or("").trim()
    } else {
        text
    }
}

struct TrailingBracket<'a> {
    head: &'a str,
    open: char,
    content: &'a str,
    close: char,
}

/// Split off a final bracket group whose content holds no further brackets.
fn split_trailing_bracket(text: &str) -> Option<TrailingBracket<'_>> {
    let close = text.chars().next_back()?;
    if !CLOSING_BRACKETS.contains(&close) {
        return None;
    }
    let body = &text[..text.len() - close.len_utf8()];
    let open_at = body.rfind(OPENING_BRACKETS)?;
    let open = body[open_at..].chars().next()?;
    let content = &body[open_at + open.len_utf8()..];
    if content.contains(CLOSING_BRACKETS) {
        return None;
    }
    Some(TrailingBracket {
        head: &text[..open_at],
        open,
        content,
        close,
    })
}
