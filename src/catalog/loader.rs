//! Row → record conversion for the catalogue tables.

use std::path::Path;

use crate::error::ModelError;
use crate::graph::ConceptRelation;
use crate::mapping::MapTarget;
use crate::model::{
    CONCEPT_FIELDS, Concept, ConceptList, ConceptListMeta, ConceptSet, OntologicalCategory,
};

use super::error::{CatalogError, CatalogResult};
use super::tsv::{Row, Table};

/// Read `concepticon.tsv`.
pub fn read_conceptsets(path: &Path) -> CatalogResult<Vec<ConceptSet>> {
    let table = Table::read(path)?;
    let id = table.require("ID")?;
    let gloss = table.require("GLOSS")?;
    let semantic_field = table.column("SEMANTICFIELD");
    let definition = table.column("DEFINITION");
    let category = table.column("ONTOLOGICAL_CATEGORY");
    let replacement = table.column("REPLACEMENT_ID");

    table
        .rows()
        .iter()
        .map(|row| -> CatalogResult<ConceptSet> {
            let ontological_category = row
                .non_empty(category)
                .map(str::parse::<OntologicalCategory>)
                .transpose()
                .map_err(|e| invalid(&table, row, e))?;
            Ok(ConceptSet {
                id: row.get(id).to_string(),
                gloss: row.get(gloss).to_string(),
                semantic_field: row.non_empty(semantic_field).unwrap_or_default().to_string(),
                definition: row.non_empty(definition).unwrap_or_default().to_string(),
                ontological_category,
                replacement_id: row.non_empty(replacement).map(str::to_string),
            })
        })
        .collect()
}

/// Read `conceptrelations.tsv`.
pub fn read_relations(path: &Path) -> CatalogResult<Vec<ConceptRelation>> {
    let table = Table::read(path)?;
    let source = table.require("SOURCE")?;
    let source_gloss = table.require("SOURCE_GLOSS")?;
    let target = table.require("TARGET")?;
    let target_gloss = table.require("TARGET_GLOSS")?;
    let relation = table.require("RELATION")?;

    Ok(table
        .rows()
        .iter()
        .map(|row| {
            ConceptRelation::new(
                row.get(source),
                row.get(source_gloss),
                row.get(target),
                row.get(target_gloss),
                row.get(relation),
            )
        })
        .collect())
}

/// Read and validate `conceptlists.tsv`.
pub fn read_conceptlist_meta(path: &Path) -> CatalogResult<Vec<ConceptListMeta>> {
    let table = Table::read(path)?;
    let id = table.require("ID")?;
    let author = table.column("AUTHOR");
    let year = table.column("YEAR");
    let list_suffix = table.column("LIST_SUFFIX");
    let items = table.column("ITEMS");
    let tags = table.column("TAGS");
    let source_language = table.column("SOURCE_LANGUAGE");
    let target_language = table.column("TARGET_LANGUAGE");
    let refs = table.column("REFS");
    let note = table.column("NOTE");
    let alias = table.column("ALIAS");

    table
        .rows()
        .iter()
        .map(|row| -> CatalogResult<ConceptListMeta> {
            let meta = ConceptListMeta {
                id: row.get(id).to_string(),
                author: text(row, author),
                year: number(row, year, "year").map_err(|e| invalid(&table, row, e))?,
                list_suffix: text(row, list_suffix),
                items: number(row, items, "items").map_err(|e| invalid(&table, row, e))?,
                tags: split_ids(row.non_empty(tags)),
                source_language: split_ids(row.non_empty(source_language))
                    .into_iter()
                    .map(|l| l.to_lowercase())
                    .collect(),
                target_language: text(row, target_language),
                refs: split_ids(row.non_empty(refs)),
                note: text(row, note),
                alias: split_ids(row.non_empty(alias)),
                local: false,
            };
            meta.validate().map_err(|e| invalid(&table, row, e))?;
            Ok(meta)
        })
        .collect()
}

/// Read the concepts of a concept list table, plus its column order.
pub fn read_concepts(path: &Path) -> CatalogResult<(Vec<Concept>, Vec<String>)> {
    let table = Table::read(path)?;
    concepts_from_table(&table)
}

fn concepts_from_table(table: &Table) -> CatalogResult<(Vec<Concept>, Vec<String>)> {
    let id = table.require("ID")?;
    let number = table.require("NUMBER")?;
    let concepticon_id = table.column("CONCEPTICON_ID");
    let concepticon_gloss = table.column("CONCEPTICON_GLOSS");
    let gloss = table.column("GLOSS");
    let english = table.column("ENGLISH");
    let attribute_columns: Vec<(usize, String)> = table
        .header()
        .iter()
        .enumerate()
        .filter(|(_, h)| !h.is_empty() && !CONCEPT_FIELDS.iter().any(|f| f.eq_ignore_ascii_case(h)))
        .map(|(i, h)| (i, h.to_uppercase()))
        .collect();

    let concepts = table
        .rows()
        .iter()
        .map(|row| -> CatalogResult<Concept> {
            let concept = Concept {
                id: row.get(id).to_string(),
                number: row.get(number).to_string(),
                concepticon_id: row.non_empty(concepticon_id).map(str::to_string),
                concepticon_gloss: row.non_empty(concepticon_gloss).map(str::to_string),
                gloss: row.non_empty(gloss).map(str::to_string),
                english: row.non_empty(english).map(str::to_string),
                attributes: attribute_columns
                    .iter()
                    .map(|(i, name)| (name.clone(), row.get(*i).to_string()))
                    .collect(),
            };
            concept.validate().map_err(|e| invalid(table, row, e))?;
            Ok(concept)
        })
        .collect::<CatalogResult<Vec<_>>>()?;

    let columns = table.header().iter().map(|h| h.to_uppercase()).collect();
    Ok((concepts, columns))
}

impl ConceptList {
    /// Load a standalone concept list; its id is the file stem.
    pub fn from_file(path: &Path) -> CatalogResult<Self> {
        let table = Table::read(path)?;
        let (concepts, columns) = concepts_from_table(&table)?;
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let meta = ConceptListMeta::local(id, concepts.len());
        Ok(Self::with_columns(meta, concepts, columns)?)
    }

    /// Load the concepts of a catalogued list.
    pub fn from_catalog(path: &Path, meta: ConceptListMeta) -> CatalogResult<Self> {
        let (concepts, columns) = read_concepts(path)?;
        Ok(Self::with_columns(meta, concepts, columns)?)
    }
}

/// Write a concept list as a table in its column order.
pub fn write_conceptlist(list: &ConceptList, path: &Path) -> CatalogResult<()> {
    let mut table = Table::new(list.columns().to_vec());
    for concept in list.concepts() {
        table.push(
            list.columns()
                .iter()
                .map(|c| concept.column(c).unwrap_or_default().to_string())
                .collect(),
        );
    }
    table.write(path)?;
    tracing::info!(list = list.id(), path = %path.display(), concepts = list.len(), "wrote concept list");
    Ok(())
}

/// Read a reference mapping `map-<language>.tsv`: (ID, composite GLOSS).
pub fn read_map_targets(path: &Path) -> CatalogResult<Vec<MapTarget>> {
    let table = Table::read(path)?;
    let id = table.require("ID")?;
    let gloss = table.require("GLOSS")?;
    Ok(table
        .rows()
        .iter()
        .map(|row| MapTarget::new(row.get(id), row.get(gloss)))
        .collect())
}

/// Read another concept list as mapping targets, GLOSS falling back to ENGLISH.
pub fn read_list_targets(path: &Path) -> CatalogResult<Vec<MapTarget>> {
    let table = Table::read(path)?;
    let id = table.require("ID")?;
    let gloss = table.column("GLOSS");
    let english = table.column("ENGLISH");
    if gloss.is_none() && english.is_none() {
        return Err(CatalogError::MissingColumn {
            path: table.origin().to_string(),
            column: "GLOSS".into(),
        });
    }
    Ok(table
        .rows()
        .iter()
        .map(|row| {
            let label = row.non_empty(gloss).or(row.non_empty(english)).unwrap_or_default();
            MapTarget::new(row.get(id), label)
        })
        .collect())
}

fn invalid(table: &Table, row: &Row, source: ModelError) -> CatalogError {
    CatalogError::InvalidRecord {
        path: table.origin().to_string(),
        line: row.line,
        source,
    }
}

fn text(row: &Row, column: Option<usize>) -> String {
    row.non_empty(column).unwrap_or_default().to_string()
}

fn number<T: std::str::FromStr + Default>(
    row: &Row,
    column: Option<usize>,
    field: &'static str,
) -> Result<T, ModelError> {
    match row.non_empty(column) {
        None => Ok(T::default()),
        Some(value) => value.parse().map_err(|_| ModelError::Validation {
            entity: "Conceptlist",
            field,
            message: format!("invalid integer: {value}"),
        }),
    }
}

/// Split a comma-separated id list, dropping empty parts.
fn split_ids(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
