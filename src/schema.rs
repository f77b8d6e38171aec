//! Explicit record schemas.
//!
//! Each record type gets a static list of fields, and each field a check
//! function. [`Schema::validate`] runs the checks in order and reports the
//! first failure as a [`ModelError::Validation`] naming entity and field.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ModelError, ModelResult};
use crate::model::{Concept, ConceptListMeta, ConceptSet};

/// One validated field of a record.
pub struct FieldSpec<T> {
    pub name: &'static str,
    pub check: fn(&T) -> Result<(), String>,
}

/// The validated fields of one record type.
pub struct Schema<T: 'static> {
    pub entity: &'static str,
    pub fields: &'static [FieldSpec<T>],
}

impl<T> Schema<T> {
    /// Run every field check, failing on the first violation.
    pub fn validate(&self, record: &T) -> ModelResult<()> {
        for field in self.fields {
            (field.check)(record).map_err(|message| ModelError::Validation {
                entity: self.entity,
                field: field.name,
                message,
            })?;
        }
        Ok(())
    }

    /// Names of the validated fields, in check order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }
}

static RE_CONCEPT_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+").unwrap());

static RE_CONCEPTLIST_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<author>[A-Za-z]+)-(?P<year>[0-9]+)-(?P<items>[0-9]+)(?P<letter>[a-z]?)$")
        .unwrap()
});

static RE_AUTHOR_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+(?:and|AND)\s+").unwrap());

const MAX_AUTHOR_NAME: usize = 200;

// ---------------------------------------------------------------------------
// Concept
// ---------------------------------------------------------------------------

pub static CONCEPT: Schema<Concept> = Schema {
    entity: "Concept",
    fields: &[
        FieldSpec {
            name: "id",
            check: |c| non_empty(&c.id, "missing concept id"),
        },
        FieldSpec {
            name: "number",
            check: |c| {
                if RE_CONCEPT_NUMBER.is_match(&c.number) {
                    Ok(())
                } else {
                    Err(format!("invalid concept number \"{}\" in {}", c.number, c.id))
                }
            },
        },
        FieldSpec {
            name: "label",
            check: |c| match c.label() {
                Some(_) => Ok(()),
                None => Err(format!("fields GLOSS and ENGLISH both missing in {}", c.id)),
            },
        },
    ],
};

// ---------------------------------------------------------------------------
// Concept set
// ---------------------------------------------------------------------------

pub static CONCEPT_SET: Schema<ConceptSet> = Schema {
    entity: "Conceptset",
    fields: &[
        FieldSpec {
            name: "id",
            check: |s| {
                if !s.id.is_empty() && s.id.chars().all(|c| c.is_ascii_digit()) {
                    Ok(())
                } else {
                    Err(format!("concept set id must be numeric, got \"{}\"", s.id))
                }
            },
        },
        FieldSpec {
            name: "gloss",
            check: |s| non_empty(&s.gloss, "missing concept set gloss"),
        },
    ],
};

// ---------------------------------------------------------------------------
// Concept list metadata
// ---------------------------------------------------------------------------

pub static CONCEPT_LIST: Schema<ConceptListMeta> = Schema {
    entity: "Conceptlist",
    fields: &[
        FieldSpec {
            name: "id",
            check: |m| {
                if m.local || RE_CONCEPTLIST_ID.is_match(&m.id) {
                    Ok(())
                } else {
                    Err(format!(
                        "\"{}\" does not match Author-Year-Items[letter]",
                        m.id
                    ))
                }
            },
        },
        FieldSpec {
            name: "author",
            check: |m| valid_author(&m.author),
        },
    ],
};

fn non_empty(value: &str, message: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(message.to_string())
    } else {
        Ok(())
    }
}

/// Several authors must be joined with "and"; no single name may be
/// implausibly long.
fn valid_author(value: &str) -> Result<(), String> {
    if value.matches(',').count() > 1 && !value.contains(" and ") && !value.contains(" AND ") {
        return Err(format!("invalid format for multiple authors: {value}"));
    }
    if RE_AUTHOR_SEPARATOR
        .split(value)
        .any(|name| name.chars().count() > MAX_AUTHOR_NAME)
    {
        return Err(format!("suspiciously long author name in {value}"));
    }
    Ok(())
}

/// Split a concept list id into (author, year, items, letter).
pub fn conceptlist_id_parts(id: &str) -> Option<(&str, u32, usize, Option<char>)> {
    let caps = RE_CONCEPTLIST_ID.captures(id)?;
    let author = caps.name("author")?.as_str();
    let year = caps.name("year")?.as_str().parse().ok()?;
    let items = caps.name("items")?.as_str().parse().ok()?;
    let letter = caps.name("letter").and_then(|m| m.as_str().chars().next());
    Some((author, year, items, letter))
}
