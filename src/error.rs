//! Rich diagnostic error types for the concepticon crate.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;

/// Top-level error type for the concepticon crate.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum ConcepticonError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Gloss(#[from] GlossError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Gloss errors
// ---------------------------------------------------------------------------

/// Errors from parsing a single gloss. Always local to one item.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum GlossError {
    #[error("empty gloss")]
    #[diagnostic(
        code(concepticon::gloss::empty),
        help(
            "The gloss is empty or consists only of whitespace. \
             Fill in the GLOSS or ENGLISH column for this row."
        )
    )]
    Empty,

    #[error("gloss \"{gloss}\" has no content word")]
    #[diagnostic(
        code(concepticon::gloss::no_content),
        help(
            "After removing articles, conjunctions and part-of-speech markers \
             nothing was left to compare. Use a gloss with at least one content \
             word, e.g. \"the dog\" instead of \"the\"."
        )
    )]
    NoContent { gloss: String },
}

// ---------------------------------------------------------------------------
// Model errors
// ---------------------------------------------------------------------------

/// Structural validation failures of concept sets, concepts and concept lists.
#[derive(Debug, Error, Diagnostic)]
pub enum ModelError {
    #[error("invalid {entity}.{field}: {message}")]
    #[diagnostic(
        code(concepticon::model::validation),
        help(
            "A record failed structural validation and was not loaded. \
             Fix the offending value in the source table and reload."
        )
    )]
    Validation {
        entity: &'static str,
        field: &'static str,
        message: String,
    },

    #[error("non-unique {entity} key: \"{key}\"")]
    #[diagnostic(
        code(concepticon::model::duplicate_key),
        help("Every {entity} must have a unique key. Remove or rename the duplicate row.")
    )]
    DuplicateKey { entity: &'static str, key: String },

    #[error("unknown ontological category: \"{value}\"")]
    #[diagnostic(
        code(concepticon::model::category),
        help(
            "Valid categories are: Person/Thing, Action/Process, Property, \
             Classifier, Number, Other."
        )
    )]
    InvalidCategory { value: String },

    #[error("replacement chain of concept set {id} does not terminate: {chain}")]
    #[diagnostic(
        code(concepticon::model::replacement_cycle),
        help(
            "Concept set replacements must form chains that end in a current \
             concept set. Break the cycle by clearing one REPLACEMENT_ID."
        )
    )]
    ReplacementCycle { id: String, chain: String },

    #[error("concept set {id} is replaced by unknown concept set {replacement}")]
    #[diagnostic(
        code(concepticon::model::dangling_replacement),
        help("Point REPLACEMENT_ID at an existing concept set or clear it.")
    )]
    DanglingReplacement { id: String, replacement: String },
}

/// Result type for model operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

/// Errors from building the concept relation graph.
#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("self-referential relation: {source_key} {relation} {source_key}")]
    #[diagnostic(
        code(concepticon::graph::self_relation),
        help(
            "A concept set cannot be related to itself. \
             Remove the row from conceptrelations.tsv."
        )
    )]
    SelfRelation { source_key: String, relation: String },

    #[error("sameas relation {source_key} -> {target} closes a cycle")]
    #[diagnostic(
        code(concepticon::graph::sameas_cycle),
        help(
            "The target already reaches the source through sameas edges. \
             List each sameas pair only once, from the newer to the older concept set."
        )
    )]
    SameAsCycle { source_key: String, target: String },
}

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Convenience alias for crate-wide results.
pub type ConcepticonResult<T> = std::result::Result<T, ConcepticonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_errors_keep_their_diagnostics() {
        let err: ConcepticonError = GraphError::SelfRelation {
            source_key: "1".into(),
            relation: "broader".into(),
        }
        .into();
        assert_eq!(err.to_string(), "self-referential relation: 1 broader 1");
        assert_eq!(
            err.code().map(|c| c.to_string()).as_deref(),
            Some("concepticon::graph::self_relation")
        );
        assert!(err.help().is_some());

        let err: ConcepticonError = CatalogError::UnknownLanguage {
            language: "xx".into(),
        }
        .into();
        assert!(matches!(err, ConcepticonError::Catalog(_)));
        assert!(err.code().is_some());
    }
}
