//! Typed records of the concept catalogue.
//!
//! - [`ConceptSet`]: a canonical concept with a stable numeric id and a
//!   globally unique gloss; may be superseded by another concept set
//! - [`Concept`]: one row of a concept list, optionally linked to a concept set
//! - [`ConceptList`]: an ordered list of concepts plus its metadata
//!
//! Records are validated against the schemas in [`crate::schema`] when they
//! enter an index or list; after that they are read-only.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::schema;

// ---------------------------------------------------------------------------
// Concept sets
// ---------------------------------------------------------------------------

/// Coarse ontological category of a concept set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OntologicalCategory {
    #[serde(rename = "Person/Thing")]
    PersonThing,
    #[serde(rename = "Action/Process")]
    ActionProcess,
    Property,
    Classifier,
    Number,
    Other,
}

impl OntologicalCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PersonThing => "Person/Thing",
            Self::ActionProcess => "Action/Process",
            Self::Property => "Property",
            Self::Classifier => "Classifier",
            Self::Number => "Number",
            Self::Other => "Other",
        }
    }
}

impl FromStr for OntologicalCategory {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Person/Thing" => Ok(Self::PersonThing),
            "Action/Process" => Ok(Self::ActionProcess),
            "Property" => Ok(Self::Property),
            "Classifier" => Ok(Self::Classifier),
            "Number" => Ok(Self::Number),
            "Other" => Ok(Self::Other),
            other => Err(ModelError::InvalidCategory {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for OntologicalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canonical concept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptSet {
    pub id: String,
    pub gloss: String,
    pub semantic_field: String,
    pub definition: String,
    pub ontological_category: Option<OntologicalCategory>,
    /// The concept set superseding this one.
    pub replacement_id: Option<String>,
}

impl ConceptSet {
    pub fn superseded(&self) -> bool {
        self.replacement_id.is_some()
    }
}

/// All concept sets, indexed by id and by gloss.
#[derive(Debug, Clone, Default)]
pub struct ConceptSetIndex {
    sets: Vec<ConceptSet>,
    by_id: HashMap<String, usize>,
    by_gloss: HashMap<String, usize>,
}

impl ConceptSetIndex {
    /// Validate and index concept sets.
    ///
    /// Fails on an invalid record, a repeated id or gloss, a replacement
    /// pointing nowhere, or a replacement chain that loops.
    pub fn new(sets: Vec<ConceptSet>) -> ModelResult<Self> {
        let mut by_id = HashMap::with_capacity(sets.len());
        let mut by_gloss = HashMap::with_capacity(sets.len());
        for (i, set) in sets.iter().enumerate() {
            schema::CONCEPT_SET.validate(set)?;
            if by_id.insert(set.id.clone(), i).is_some() {
                return Err(ModelError::DuplicateKey {
                    entity: "Conceptset.id",
                    key: set.id.clone(),
                });
            }
            if by_gloss.insert(set.gloss.clone(), i).is_some() {
                return Err(ModelError::DuplicateKey {
                    entity: "Conceptset.gloss",
                    key: set.gloss.clone(),
                });
            }
        }

        let index = Self {
            sets,
            by_id,
            by_gloss,
        };
        for set in index.sets.iter().filter(|s| s.superseded()) {
            index.resolve_replacement(&set.id)?;
        }
        Ok(index)
    }

    pub fn get(&self, id: &str) -> Option<&ConceptSet> {
        self.by_id.get(id).map(|&i| &self.sets[i])
    }

    pub fn by_gloss(&self, gloss: &str) -> Option<&ConceptSet> {
        self.by_gloss.get(gloss).map(|&i| &self.sets[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Concept sets in table order.
    pub fn iter(&self) -> impl Iterator<Item = &ConceptSet> {
        self.sets.iter()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Follow replacements from `id` to the current concept set.
    ///
    /// Returns `Ok(None)` for an unknown id. A chain that revisits a concept
    /// set fails with [`ModelError::ReplacementCycle`].
    pub fn resolve_replacement(&self, id: &str) -> ModelResult<Option<&ConceptSet>> {
        let Some(mut current) = self.get(id) else {
            return Ok(None);
        };
        let mut chain = vec![current.id.as_str()];
        let mut visited = HashSet::from([current.id.as_str()]);

        while let Some(next) = current.replacement_id.as_deref() {
            if !visited.insert(next) {
                chain.push(next);
                return Err(ModelError::ReplacementCycle {
                    id: id.to_string(),
                    chain: chain.join(" -> "),
                });
            }
            chain.push(next);
            current = self.get(next).ok_or_else(|| ModelError::DanglingReplacement {
                id: current.id.clone(),
                replacement: next.to_string(),
            })?;
        }
        Ok(Some(current))
    }
}

// ---------------------------------------------------------------------------
// Concepts
// ---------------------------------------------------------------------------

/// Typed columns of a concept list table, in output order. Every other
/// column is an attribute.
pub const CONCEPT_FIELDS: [&str; 6] = [
    "ID",
    "NUMBER",
    "CONCEPTICON_ID",
    "CONCEPTICON_GLOSS",
    "GLOSS",
    "ENGLISH",
];

/// One row of a concept list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    /// List-scoped id, conventionally `<list id>-<number>`.
    pub id: String,
    pub number: String,
    pub concepticon_id: Option<String>,
    pub concepticon_gloss: Option<String>,
    pub gloss: Option<String>,
    pub english: Option<String>,
    /// Extension columns in table order, keyed by upper-case column name.
    pub attributes: Vec<(String, String)>,
}

impl Concept {
    /// GLOSS, falling back to ENGLISH.
    pub fn label(&self) -> Option<&str> {
        [self.gloss.as_deref(), self.english.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
    }

    /// An extension column value.
    pub fn attribute(&self, column: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(column))
            .map(|(_, v)| v.as_str())
    }

    /// A column value by name, typed field or attribute.
    pub fn column(&self, column: &str) -> Option<&str> {
        match column.to_ascii_uppercase().as_str() {
            "ID" => Some(&self.id),
            "NUMBER" => Some(&self.number),
            "CONCEPTICON_ID" => self.concepticon_id.as_deref(),
            "CONCEPTICON_GLOSS" => self.concepticon_gloss.as_deref(),
            "GLOSS" => self.gloss.as_deref(),
            "ENGLISH" => self.english.as_deref(),
            _ => self.attribute(column),
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        schema::CONCEPT.validate(self)
    }
}

// ---------------------------------------------------------------------------
// Concept lists
// ---------------------------------------------------------------------------

/// Catalogue metadata of a concept list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptListMeta {
    pub id: String,
    pub author: String,
    pub year: u32,
    pub list_suffix: String,
    pub items: usize,
    pub tags: Vec<String>,
    pub source_language: Vec<String>,
    pub target_language: String,
    pub refs: Vec<String>,
    pub note: String,
    pub alias: Vec<String>,
    /// Loaded from a standalone file; the id is not validated.
    pub local: bool,
}

impl ConceptListMeta {
    /// Metadata for a standalone list that is not part of the catalogue.
    pub fn local(id: impl Into<String>, items: usize) -> Self {
        Self {
            id: id.into(),
            items,
            local: true,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        schema::CONCEPT_LIST.validate(self)
    }
}

/// Mapping coverage of a concept list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConceptListStats {
    pub total: usize,
    /// Concepts linked to a concept set.
    pub mapped: usize,
    /// `mapped / total` as a truncated percentage.
    pub mapped_ratio: u8,
    /// Concept sets linked by more than one concept, with their counts.
    pub mergers: Vec<(String, usize)>,
}

/// An ordered, validated concept list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptList {
    pub meta: ConceptListMeta,
    concepts: Vec<Concept>,
    /// Column order of the source table, typed fields included.
    columns: Vec<String>,
}

impl ConceptList {
    /// Validate metadata and concepts; concept ids must be unique.
    pub fn new(meta: ConceptListMeta, concepts: Vec<Concept>) -> ModelResult<Self> {
        let columns = default_columns(&concepts);
        Self::with_columns(meta, concepts, columns)
    }

    /// Like [`ConceptList::new`], keeping the given column order.
    pub fn with_columns(
        meta: ConceptListMeta,
        concepts: Vec<Concept>,
        columns: Vec<String>,
    ) -> ModelResult<Self> {
        meta.validate()?;
        let mut seen = HashSet::with_capacity(concepts.len());
        for concept in &concepts {
            concept.validate()?;
            if !seen.insert(concept.id.as_str()) {
                return Err(ModelError::DuplicateKey {
                    entity: "Concept.id",
                    key: concept.id.clone(),
                });
            }
        }
        Ok(Self {
            meta,
            concepts,
            columns,
        })
    }

    pub fn id(&self) -> &str {
        &self.meta.id
    }

    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn get(&self, id: &str) -> Option<&Concept> {
        self.concepts.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Concepts linked to a concept set.
    pub fn mapped(&self) -> impl Iterator<Item = &Concept> {
        self.concepts
            .iter()
            .filter(|c| c.concepticon_id.as_deref().is_some_and(|id| !id.is_empty()))
    }

    pub fn stats(&self) -> ConceptListStats {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for concept in self.mapped() {
            if let Some(id) = concept.concepticon_id.as_deref() {
                *counts.entry(id).or_default() += 1;
            }
        }
        let mapped = counts.values().sum();
        let total = self.concepts.len();
        let mapped_ratio = if total == 0 {
            0
        } else {
            (mapped * 100 / total) as u8
        };
        ConceptListStats {
            total,
            mapped,
            mapped_ratio,
            mergers: counts
                .into_iter()
                .filter(|(_, n)| *n > 1)
                .map(|(id, n)| (id.to_string(), n))
                .collect(),
        }
    }
}

/// Typed columns followed by attribute columns in first-seen order.
fn default_columns(concepts: &[Concept]) -> Vec<String> {
    let mut columns: Vec<String> = CONCEPT_FIELDS.iter().map(|s| s.to_string()).collect();
    for concept in concepts {
        for (key, _) in &concept.attributes {
            if !columns.iter().any(|c| c.eq_ignore_ascii_case(key)) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(id: &str, gloss: &str, replacement: Option<&str>) -> ConceptSet {
        ConceptSet {
            id: id.into(),
            gloss: gloss.into(),
            replacement_id: replacement.map(Into::into),
            ..Default::default()
        }
    }

    fn concept(id: &str, number: &str, english: &str, cid: Option<&str>) -> Concept {
        Concept {
            id: id.into(),
            number: number.into(),
            english: Some(english.into()),
            concepticon_id: cid.map(Into::into),
            ..Default::default()
        }
    }

    #[test]
    fn category_parsing() {
        assert_eq!(
            "Person/Thing".parse::<OntologicalCategory>().unwrap(),
            OntologicalCategory::PersonThing
        );
        assert!(matches!(
            "Thing".parse::<OntologicalCategory>(),
            Err(ModelError::InvalidCategory { .. })
        ));
        assert_eq!(OntologicalCategory::ActionProcess.to_string(), "Action/Process");
    }

    #[test]
    fn index_rejects_duplicates() {
        let err = ConceptSetIndex::new(vec![set("1", "DOG", None), set("1", "CAT", None)])
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateKey { entity: "Conceptset.id", .. }));

        let err = ConceptSetIndex::new(vec![set("1", "DOG", None), set("2", "DOG", None)])
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateKey { entity: "Conceptset.gloss", .. }));
    }

    #[test]
    fn replacement_chain_resolves() {
        let index = ConceptSetIndex::new(vec![
            set("1", "OLD DOG", Some("2")),
            set("2", "DOG (ANIMAL)", Some("3")),
            set("3", "DOG", None),
        ])
        .unwrap();
        assert_eq!(index.resolve_replacement("1").unwrap().unwrap().id, "3");
        assert_eq!(index.resolve_replacement("3").unwrap().unwrap().id, "3");
        assert!(index.resolve_replacement("99").unwrap().is_none());
        assert_eq!(index.by_gloss("DOG").unwrap().id, "3");
    }

    #[test]
    fn replacement_cycle_fails_fast() {
        let err = ConceptSetIndex::new(vec![
            set("1", "A", Some("2")),
            set("2", "B", Some("3")),
            set("3", "C", Some("1")),
        ])
        .unwrap_err();
        match err {
            ModelError::ReplacementCycle { chain, .. } => assert_eq!(chain, "1 -> 2 -> 3 -> 1"),
            other => panic!("expected cycle, got {other:?}"),
        }

        let err = ConceptSetIndex::new(vec![set("1", "A", Some("1"))]).unwrap_err();
        assert!(matches!(err, ModelError::ReplacementCycle { .. }));
    }

    #[test]
    fn dangling_replacement_fails() {
        let err = ConceptSetIndex::new(vec![set("1", "A", Some("9"))]).unwrap_err();
        assert!(matches!(err, ModelError::DanglingReplacement { .. }));
    }

    #[test]
    fn label_falls_back_to_english() {
        let mut c = concept("L-1", "1", "dog", None);
        assert_eq!(c.label(), Some("dog"));
        c.gloss = Some("hound".into());
        assert_eq!(c.label(), Some("hound"));
        c.gloss = Some(" ".into());
        assert_eq!(c.label(), Some("dog"));
    }

    #[test]
    fn column_lookup() {
        let mut c = concept("L-1", "1", "dog", Some("2009"));
        c.attributes.push(("FRENCH".into(), "chien".into()));
        assert_eq!(c.column("english"), Some("dog"));
        assert_eq!(c.column("CONCEPTICON_ID"), Some("2009"));
        assert_eq!(c.column("French"), Some("chien"));
        assert_eq!(c.column("GERMAN"), None);
    }

    #[test]
    fn list_rejects_duplicate_concepts() {
        let meta = ConceptListMeta::local("test", 2);
        let err = ConceptList::new(
            meta,
            vec![concept("L-1", "1", "dog", None), concept("L-1", "2", "cat", None)],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateKey { .. }));
    }

    #[test]
    fn list_rejects_invalid_concept() {
        let meta = ConceptListMeta::local("test", 1);
        let err = ConceptList::new(meta, vec![concept("L-1", "x", "dog", None)]).unwrap_err();
        assert!(matches!(err, ModelError::Validation { entity: "Concept", .. }));
    }

    #[test]
    fn stats_count_mergers() {
        let mut dog = concept("L-3", "3", "hound", Some("2009"));
        dog.attributes.push(("NOTE".into(), "x".into()));
        let list = ConceptList::new(
            ConceptListMeta::local("test", 4),
            vec![
                concept("L-1", "1", "dog", Some("2009")),
                concept("L-2", "2", "cat", Some("1208")),
                dog,
                concept("L-4", "4", "mouse", None),
            ],
        )
        .unwrap();
        let stats = list.stats();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.mapped, 3);
        assert_eq!(stats.mapped_ratio, 75);
        assert_eq!(stats.mergers, vec![("2009".to_string(), 2)]);
        assert_eq!(list.columns().last().map(String::as_str), Some("NOTE"));
    }
}
