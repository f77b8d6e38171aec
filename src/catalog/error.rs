//! Rich diagnostic error types for the catalogue session.

use miette::Diagnostic;
use thiserror::Error;

use crate::error::{GraphError, ModelError};

/// Errors from reading, writing and querying the catalogue.
#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("I/O error on {path}")]
    #[diagnostic(
        code(concepticon::catalog::io),
        help(
            "Check that the path exists and is readable. The repository root must \
             contain a `concepticondata` directory; pass it with --repos."
        )
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table {path}")]
    #[diagnostic(
        code(concepticon::catalog::table),
        help("Tables are tab-separated with a header row. Check the file for stray quotes or encoding problems.")
    )]
    Table {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("table {path} has no column \"{column}\"")]
    #[diagnostic(
        code(concepticon::catalog::missing_column),
        help("Add the column to the header row of the table.")
    )]
    MissingColumn { path: String, column: String },

    #[error("invalid record in {path}, line {line}")]
    #[diagnostic(
        code(concepticon::catalog::invalid_record),
        help("Fix the row at the reported line; the cause below names the offending field.")
    )]
    InvalidRecord {
        path: String,
        line: u64,
        #[source]
        source: ModelError,
    },

    #[error("unknown concept list: \"{reference}\"")]
    #[diagnostic(
        code(concepticon::catalog::unknown_conceptlist),
        help(
            "Pass either the ID of a concept list listed in conceptlists.tsv \
             or the path to a concept list file."
        )
    )]
    UnknownConceptList { reference: String },

    #[error("no reference mapping for language \"{language}\"")]
    #[diagnostic(
        code(concepticon::catalog::unknown_language),
        help("Reference mappings live in mappings/map-<language>.tsv. Use a language with a mapping file or pass --otherlist.")
    )]
    UnknownLanguage { language: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),
}

/// Result type for catalogue operations.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
