//! Concept relation graph.
//!
//! Relations between concept sets (`broader`, `narrower`, `sameas`, ...) are
//! loaded from a flat edge list into a [`ConceptRelations`] index:
//!
//! - **Index** ([`ConceptRelations`]): a `petgraph` digraph keyed by concept
//!   id *and* concept gloss, with broader/narrower inverses inserted
//!   automatically
//! - **Traversal** ([`Related`]): lazy breadth-first walk along one relation
//!   kind up to a depth bound

pub mod index;
pub mod traverse;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use index::{ConceptRelations, RelationMode};
pub use traverse::Related;

/// The label on a relation edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RelationKind {
    Broader,
    Narrower,
    SameAs,
    HasForm,
    /// Any label without special treatment, stored lowercased.
    Other(String),
}

impl RelationKind {
    /// The inverse relation, for the invertible pair broader/narrower.
    pub fn inverse(&self) -> Option<Self> {
        match self {
            Self::Broader => Some(Self::Narrower),
            Self::Narrower => Some(Self::Broader),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Broader => "broader",
            Self::Narrower => "narrower",
            Self::SameAs => "sameas",
            Self::HasForm => "hasform",
            Self::Other(label) => label,
        }
    }
}

impl FromStr for RelationKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_lowercase();
        Ok(match label.as_str() {
            "broader" => Self::Broader,
            "narrower" => Self::Narrower,
            "sameas" => Self::SameAs,
            "hasform" => Self::HasForm,
            _ => Self::Other(label),
        })
    }
}

impl From<String> for RelationKind {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for RelationKind {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<RelationKind> for String {
    fn from(kind: RelationKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the relations table: SOURCE → TARGET labelled RELATION.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptRelation {
    pub source: String,
    pub source_gloss: String,
    pub target: String,
    pub target_gloss: String,
    pub relation: RelationKind,
}

impl ConceptRelation {
    pub fn new(
        source: impl Into<String>,
        source_gloss: impl Into<String>,
        target: impl Into<String>,
        target_gloss: impl Into<String>,
        relation: impl Into<RelationKind>,
    ) -> Self {
        Self {
            source: source.into(),
            source_gloss: source_gloss.into(),
            target: target.into(),
            target_gloss: target_gloss.into(),
            relation: relation.into(),
        }
    }
}
