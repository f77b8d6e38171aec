// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # concepticon
//!
//! Links concepts in published wordlists to a reference catalogue of
//! concept sets, and compares wordlists through the relations between
//! those concept sets.
//!
//! ## Architecture
//!
//! - **Glosses** (`gloss`): normalisation of short concept labels and an
//!   ordinal similarity between them
//! - **Mapping** (`mapping`): approximate (token buckets) and exhaustive
//!   gloss-to-reference mapping
//! - **Relations** (`graph`): petgraph-backed relation index with a lazy
//!   breadth-first walk
//! - **Comparison** (`compare`): union and intersection of concept lists
//! - **Catalogue** (`catalog`): TSV data, the `Concepticon` session, reports
//!   and checks
//!
//! ## Library usage
//!
//! ```no_run
//! use concepticon::catalog::Concepticon;
//! use concepticon::config::CatalogConfig;
//! use concepticon::graph::RelationKind;
//!
//! let config = CatalogConfig::with_repos("concepticon-data");
//! let catalog = Concepticon::open(&config).unwrap();
//! for (gloss, depth) in catalog.related("MOUNTAIN", RelationKind::Narrower, 2) {
//!     println!("{depth} {gloss}");
//! }
//! ```

pub mod catalog;
pub mod compare;
pub mod config;
pub mod error;
pub mod gloss;
pub mod graph;
pub mod mapping;
pub mod model;
pub mod schema;
