//! The catalogue session.
//!
//! A [`Concepticon`] is opened on a concepticon-data checkout:
//!
//! ```text
//! <repos>/concepticondata/concepticon.tsv         concept sets
//! <repos>/concepticondata/conceptrelations.tsv    relations
//! <repos>/concepticondata/conceptlists.tsv        concept list metadata
//! <repos>/concepticondata/conceptlists/<ID>.tsv   concept lists
//! <repos>/mappings/map-<language>.tsv             reference glosses
//! ```
//!
//! Concept sets, relations and list metadata are loaded and validated when
//! the session opens. Reference mappings are read on first use and cached
//! for the lifetime of the session.

pub mod error;
pub mod loader;
pub mod report;
pub mod tsv;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::compare::{ComparedConcept, SetOperation, SetOperationRow, compare_conceptlists, set_operation};
use crate::config::CatalogConfig;
use crate::gloss::Similarity;
use crate::graph::{ConceptRelations, RelationKind, RelationMode, Related};
use crate::mapping::{MapTarget, MappingConfig, map_concepts};
use crate::model::{ConceptList, ConceptListMeta, ConceptSet, ConceptSetIndex};

pub use error::{CatalogError, CatalogResult};
pub use loader::write_conceptlist;
pub use report::MapSummary;
pub use tsv::Table;

const DATA_DIR: &str = "concepticondata";

/// Cache key for reference targets: (language, other list).
type TargetKey = (String, Option<PathBuf>);

/// One lookup hit for a search term.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LookupHit {
    pub term: String,
    pub id: String,
    pub gloss: String,
    pub similarity: Similarity,
}

/// A structural problem found by [`Concepticon::check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckIssue {
    /// File or list the problem was found in.
    pub name: String,
    pub line: Option<u64>,
    pub message: String,
}

impl fmt::Display for CheckIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ERROR:{}", self.name)?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// An open concept catalogue.
pub struct Concepticon {
    config: CatalogConfig,
    conceptsets: ConceptSetIndex,
    relations: ConceptRelations,
    multirelations: ConceptRelations,
    conceptlists: BTreeMap<String, ConceptListMeta>,
    /// Reference targets per (language, other list), filled on first use.
    targets: RwLock<HashMap<TargetKey, Arc<[MapTarget]>>>,
}

impl fmt::Debug for Concepticon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Concepticon")
            .field("repos", &self.config.repos)
            .field("conceptsets", &self.conceptsets.len())
            .field("relations", &self.relations.len())
            .field("conceptlists", &self.conceptlists.len())
            .finish()
    }
}

impl Concepticon {
    /// Open the catalogue at `config.repos`.
    pub fn open(config: &CatalogConfig) -> CatalogResult<Self> {
        let data = config.repos.join(DATA_DIR);

        let conceptsets = ConceptSetIndex::new(loader::read_conceptsets(&data.join("concepticon.tsv"))?)?;

        let rows = loader::read_relations(&data.join("conceptrelations.tsv"))?;
        let dangling = rows
            .iter()
            .filter(|r| !conceptsets.contains(&r.source) || !conceptsets.contains(&r.target))
            .count();
        if dangling > 0 {
            tracing::warn!(dangling, "relations refer to unknown concept sets; run `check` for details");
        }
        let relations = ConceptRelations::from_relations(rows.iter().cloned(), RelationMode::Single)?;
        let multirelations = ConceptRelations::from_relations(rows, RelationMode::Multiple)?;

        let mut conceptlists = BTreeMap::new();
        for meta in loader::read_conceptlist_meta(&data.join("conceptlists.tsv"))? {
            if conceptlists.contains_key(&meta.id) {
                return Err(crate::error::ModelError::DuplicateKey {
                    entity: "Conceptlist.id",
                    key: meta.id,
                }
                .into());
            }
            conceptlists.insert(meta.id.clone(), meta);
        }

        tracing::info!(
            repos = %config.repos.display(),
            conceptsets = conceptsets.len(),
            relations = relations.len(),
            conceptlists = conceptlists.len(),
            "opened concepticon"
        );

        Ok(Self {
            config: config.clone(),
            conceptsets,
            relations,
            multirelations,
            conceptlists,
            targets: RwLock::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn conceptsets(&self) -> &ConceptSetIndex {
        &self.conceptsets
    }

    /// Relations with one label per pair.
    pub fn relations(&self) -> &ConceptRelations {
        &self.relations
    }

    /// Relations with all labels per pair.
    pub fn multirelations(&self) -> &ConceptRelations {
        &self.multirelations
    }

    /// Catalogued concept list metadata by id.
    pub fn conceptlists(&self) -> &BTreeMap<String, ConceptListMeta> {
        &self.conceptlists
    }

    /// Path below the data directory.
    pub fn data_path(&self, parts: &[&str]) -> PathBuf {
        parts
            .iter()
            .fold(self.config.repos.join(DATA_DIR), |path, part| path.join(part))
    }

    /// Load a concept list by catalogue id or by file path.
    pub fn conceptlist(&self, reference: &str) -> CatalogResult<ConceptList> {
        if let Some(meta) = self.conceptlists.get(reference) {
            let file = format!("{reference}.tsv");
            let path = self.data_path(&["conceptlists", file.as_str()]);
            return ConceptList::from_catalog(&path, meta.clone());
        }
        let path = Path::new(reference);
        if path.is_file() {
            return ConceptList::from_file(path);
        }
        Err(CatalogError::UnknownConceptList {
            reference: reference.to_string(),
        })
    }

    /// Reference targets for a language, or the entries of another list.
    ///
    /// Read once per (language, other list) and shared afterwards.
    pub fn map_targets(
        &self,
        language: &str,
        otherlist: Option<&Path>,
    ) -> CatalogResult<Arc<[MapTarget]>> {
        let key: TargetKey = (language.to_string(), otherlist.map(Path::to_path_buf));
        if let Some(targets) = self.targets.read().expect("target cache lock poisoned").get(&key) {
            return Ok(Arc::clone(targets));
        }

        let targets: Arc<[MapTarget]> = match otherlist {
            Some(path) => loader::read_list_targets(path)?.into(),
            None => {
                let path = self
                    .config
                    .repos
                    .join("mappings")
                    .join(format!("map-{language}.tsv"));
                if !path.is_file() {
                    return Err(CatalogError::UnknownLanguage {
                        language: language.to_string(),
                    });
                }
                loader::read_map_targets(&path)?.into()
            }
        };
        tracing::debug!(language, targets = targets.len(), "loaded mapping targets");

        let mut cache = self.targets.write().expect("target cache lock poisoned");
        Ok(Arc::clone(cache.entry(key).or_insert(targets)))
    }

    /// Map a concept list file and write the report to `out`.
    pub fn map<W: Write>(
        &self,
        clist: &Path,
        otherlist: Option<&Path>,
        mapping: &MappingConfig,
        skip_multiple: bool,
        out: W,
    ) -> CatalogResult<MapSummary> {
        let source = Table::read(clist)?;
        let targets = self.map_targets(&mapping.language, otherlist)?;
        report::write_map_report(&source, &targets, mapping, skip_multiple, out)
    }

    /// Best concept sets for each search term.
    pub fn lookup<S: AsRef<str>>(
        &self,
        terms: &[S],
        mapping: &MappingConfig,
    ) -> CatalogResult<Vec<BTreeSet<LookupHit>>> {
        let targets = self.map_targets(&mapping.language, None)?;
        let found = map_concepts(terms, &targets, mapping);
        Ok(terms
            .iter()
            .enumerate()
            .map(|(i, term)| {
                found
                    .get(i)
                    .map(|m| {
                        m.candidates
                            .iter()
                            .map(|&j| LookupHit {
                                term: term.as_ref().to_string(),
                                id: targets[j].id.clone(),
                                gloss: targets[j].concepticon_gloss().to_string(),
                                similarity: m.similarity,
                            })
                            .collect()
                    })
                    .unwrap_or_default()
            })
            .collect())
    }

    /// Walk relations from a concept set id or gloss.
    pub fn related(&self, key: &str, relation: RelationKind, max_depth: usize) -> Related<'_> {
        self.related_in(RelationMode::Single, key, relation, max_depth)
    }

    /// Walk relations in the given index; `Multiple` sees every label of a pair.
    pub fn related_in(
        &self,
        mode: RelationMode,
        key: &str,
        relation: RelationKind,
        max_depth: usize,
    ) -> Related<'_> {
        let index = match mode {
            RelationMode::Single => &self.relations,
            RelationMode::Multiple => &self.multirelations,
        };
        index.related(key, relation, max_depth)
    }

    /// The concept set currently standing for `id`, following replacements.
    pub fn current_conceptset(&self, id: &str) -> CatalogResult<Option<&ConceptSet>> {
        Ok(self.conceptsets.resolve_replacement(id)?)
    }

    /// Compare concept lists given by id or path.
    pub fn compare(
        &self,
        references: &[&str],
        search_depth: usize,
    ) -> CatalogResult<Vec<ComparedConcept>> {
        let lists = references
            .iter()
            .map(|r| self.conceptlist(r))
            .collect::<CatalogResult<Vec<_>>>()?;
        let pairs: Vec<(&str, &ConceptList)> = references.iter().copied().zip(&lists).collect();
        Ok(compare_conceptlists(
            &pairs,
            &self.relations,
            &self.conceptsets,
            search_depth,
        ))
    }

    pub fn union(&self, references: &[&str], search_depth: usize) -> CatalogResult<Vec<SetOperationRow>> {
        self.set_operation(SetOperation::Union, references, search_depth)
    }

    pub fn intersection(
        &self,
        references: &[&str],
        search_depth: usize,
    ) -> CatalogResult<Vec<SetOperationRow>> {
        self.set_operation(SetOperation::Intersection, references, search_depth)
    }

    fn set_operation(
        &self,
        operation: SetOperation,
        references: &[&str],
        search_depth: usize,
    ) -> CatalogResult<Vec<SetOperationRow>> {
        let compared = self.compare(references, search_depth)?;
        Ok(set_operation(operation, &compared, references.len()))
    }

    /// Report structural problems across the catalogue.
    pub fn check(&self) -> CatalogResult<Vec<CheckIssue>> {
        let mut issues = Vec::new();
        let mut issue = |name: &str, line: Option<u64>, message: String| {
            issues.push(CheckIssue {
                name: name.to_string(),
                line,
                message,
            });
        };

        for (i, rel) in self.relations.raw().iter().enumerate() {
            let line = Some(i as u64 + 2);
            for (column, id) in [("SOURCE", &rel.source), ("TARGET", &rel.target)] {
                if !self.conceptsets.contains(id) {
                    issue("conceptrelations.tsv", line, format!("invalid {column}: {id}"));
                }
            }
            for (column, gloss) in [("SOURCE_GLOSS", &rel.source_gloss), ("TARGET_GLOSS", &rel.target_gloss)] {
                if self.conceptsets.by_gloss(gloss).is_none() {
                    issue("conceptrelations.tsv", line, format!("invalid {column}: {gloss}"));
                }
            }
        }

        let list_dir = self.data_path(&["conceptlists"]);
        let mut files = BTreeSet::new();
        if list_dir.is_dir() {
            let entries = std::fs::read_dir(&list_dir).map_err(|e| CatalogError::Io {
                path: list_dir.display().to_string(),
                source: e,
            })?;
            for entry in entries {
                let path = entry
                    .map_err(|e| CatalogError::Io {
                        path: list_dir.display().to_string(),
                        source: e,
                    })?
                    .path();
                if path.extension().is_some_and(|e| e == "tsv")
                    && let Some(stem) = path.file_stem()
                {
                    files.insert(stem.to_string_lossy().into_owned());
                }
            }
        }
        for stem in files.iter().filter(|s| !self.conceptlists.contains_key(*s)) {
            issue("conceptlists.tsv", None, format!("conceptlist missing in conceptlists.tsv: {stem}.tsv"));
        }

        for (id, meta) in &self.conceptlists {
            if !files.contains(id) {
                issue("conceptlists.tsv", None, format!("no concept list file for {id}"));
                continue;
            }
            let list = match self.conceptlist(id) {
                Ok(list) => list,
                Err(CatalogError::InvalidRecord { line, source, .. }) => {
                    issue(id, Some(line), source.to_string());
                    continue;
                }
                Err(e) => {
                    issue(id, None, e.to_string());
                    continue;
                }
            };
            for (i, concept) in list.concepts().iter().enumerate() {
                let line = Some(i as u64 + 2);
                if !concept.id.starts_with(id.as_str()) {
                    issue(id, line, format!("concept ID does not match concept list ID pattern {}", concept.id));
                }
                let Some(cid) = concept.concepticon_id.as_deref() else {
                    continue;
                };
                match self.conceptsets.get(cid) {
                    None => issue(id, line, format!("invalid conceptset ID {cid}")),
                    Some(set) => {
                        if concept.concepticon_gloss.as_deref() != Some(set.gloss.as_str()) {
                            issue(
                                id,
                                line,
                                format!(
                                    "wrong conceptset GLOSS for ID {}: {} -> {}",
                                    set.id,
                                    concept.concepticon_gloss.as_deref().unwrap_or_default(),
                                    set.gloss
                                ),
                            );
                        }
                        if set.superseded()
                            && let Some(current) = self.conceptsets.resolve_replacement(cid)?
                        {
                            issue(
                                id,
                                line,
                                format!("conceptset {cid} is superseded by {} {}", current.id, current.gloss),
                            );
                        }
                    }
                }
            }
            for language in &meta.source_language {
                let column = language.to_uppercase();
                if !list.columns().contains(&column) {
                    issue(id, None, format!("missing source language col {column}"));
                }
            }
        }

        tracing::info!(issues = issues.len(), "checked catalogue");
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_issue_display() {
        let issue = CheckIssue {
            name: "conceptrelations.tsv".into(),
            line: Some(3),
            message: "invalid SOURCE: 99".into(),
        };
        assert_eq!(issue.to_string(), "ERROR:conceptrelations.tsv:3: invalid SOURCE: 99");
        let issue = CheckIssue {
            line: None,
            ..issue
        };
        assert_eq!(issue.to_string(), "ERROR:conceptrelations.tsv: invalid SOURCE: 99");
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::TempDir::new().unwrap();
        let data = dir.path().join(DATA_DIR);
        std::fs::create_dir_all(data.join("conceptlists")).unwrap();
        std::fs::create_dir_all(dir.path().join("mappings")).unwrap();
        let write = |path: PathBuf, content: &str| std::fs::write(path, content).unwrap();
        write(
            data.join("concepticon.tsv"),
            "ID\tGLOSS\tREPLACEMENT_ID\n\
             1\tDOG\t\n\
             2\tHOUND\t1\n\
             3\tKILL\t\n",
        );
        write(
            data.join("conceptrelations.tsv"),
            "SOURCE\tSOURCE_GLOSS\tRELATION\tTARGET\tTARGET_GLOSS\n\
             1\tDOG\tbroader\t2\tHOUND\n\
             1\tDOG\thasform\t2\tHOUND\n\
             3\tKILL\tnarrower\t99\tMURDER\n",
        );
        write(
            data.join("conceptlists.tsv"),
            "ID\tAUTHOR\tYEAR\tITEMS\tSOURCE_LANGUAGE\n\
             Test-2020-2\tTester\t2020\t2\tEnglish,French\n",
        );
        write(
            data.join("conceptlists").join("Test-2020-2.tsv"),
            "ID\tNUMBER\tENGLISH\tCONCEPTICON_ID\tCONCEPTICON_GLOSS\n\
             Test-2020-2-1\t1\tdog\t2\tDOG\n\
             Other-1\t2\tkill\t3\tKILL\n",
        );
        write(data.join("conceptlists").join("Stray-2021-1.tsv"), "ID\tNUMBER\tENGLISH\n");
        write(
            dir.path().join("mappings").join("map-en.tsv"),
            "ID\tGLOSS\n1\tDOG///dog\n3\tKILL///to kill\n",
        );
        dir
    }

    #[test]
    fn check_reports_structural_problems() {
        let dir = fixture();
        let catalog = Concepticon::open(&CatalogConfig::with_repos(dir.path())).unwrap();
        let messages: Vec<String> = catalog
            .check()
            .unwrap()
            .into_iter()
            .map(|i| i.message)
            .collect();
        assert!(messages.contains(&"invalid TARGET: 99".to_string()));
        assert!(messages.contains(&"invalid TARGET_GLOSS: MURDER".to_string()));
        assert!(messages.contains(&"conceptlist missing in conceptlists.tsv: Stray-2021-1.tsv".to_string()));
        assert!(messages.contains(&"wrong conceptset GLOSS for ID 2: DOG -> HOUND".to_string()));
        assert!(messages.contains(&"conceptset 2 is superseded by 1 DOG".to_string()));
        assert!(messages.contains(&"concept ID does not match concept list ID pattern Other-1".to_string()));
        assert!(messages.contains(&"missing source language col FRENCH".to_string()));
        assert!(!messages.iter().any(|m| m.contains("col ENGLISH")));
    }

    #[test]
    fn check_reports_broken_list_and_continues() {
        let dir = fixture();
        let data = dir.path().join(DATA_DIR);
        std::fs::write(
            data.join("conceptlists.tsv"),
            "ID\tAUTHOR\tYEAR\tITEMS\tSOURCE_LANGUAGE\n\
             Broken-2020-1\tTester\t2020\t1\t\n\
             Test-2020-2\tTester\t2020\t2\tEnglish,French\n",
        )
        .unwrap();
        std::fs::write(
            data.join("conceptlists").join("Broken-2020-1.tsv"),
            "ID\tNUMBER\tENGLISH\nBroken-2020-1-1\tx\tdog\n",
        )
        .unwrap();

        let catalog = Concepticon::open(&CatalogConfig::with_repos(dir.path())).unwrap();
        let issues = catalog.check().unwrap();
        assert!(issues.contains(&CheckIssue {
            name: "Broken-2020-1".into(),
            line: Some(2),
            message: "invalid Concept.number: invalid concept number \"x\" in Broken-2020-1-1".into(),
        }));
        // The list after the broken one is still checked.
        assert!(
            issues
                .iter()
                .any(|i| i.name == "Test-2020-2" && i.message.contains("Other-1"))
        );
    }

    #[test]
    fn multiple_mode_keeps_every_label() {
        let dir = fixture();
        let catalog = Concepticon::open(&CatalogConfig::with_repos(dir.path())).unwrap();
        // The hasform row replaces broader on 1 -> 2 in the single index.
        assert_eq!(catalog.related("1", RelationKind::Broader, 2).count(), 0);
        let broader: Vec<_> = catalog
            .related_in(RelationMode::Multiple, "1", RelationKind::Broader, 2)
            .collect();
        assert_eq!(broader, vec![("2", 1)]);
        let forms: Vec<_> = catalog
            .related_in(RelationMode::Multiple, "DOG", RelationKind::HasForm, 2)
            .collect();
        assert_eq!(forms, vec![("HOUND", 1)]);
        // Inverse of broader still lands on the reverse pair in both indexes.
        assert_eq!(catalog.related("2", RelationKind::Narrower, 1).count(), 1);
    }

    #[test]
    fn map_targets_are_cached_per_language() {
        let dir = fixture();
        let catalog = Concepticon::open(&CatalogConfig::with_repos(dir.path())).unwrap();
        let first = catalog.map_targets("en", None).unwrap();
        let second = catalog.map_targets("en", None).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 2);
        assert!(matches!(
            catalog.map_targets("xx", None).unwrap_err(),
            CatalogError::UnknownLanguage { .. }
        ));
    }

    #[test]
    fn lookup_and_replacements() {
        let dir = fixture();
        let catalog = Concepticon::open(&CatalogConfig::with_repos(dir.path())).unwrap();
        let hits = catalog.lookup(&["dog", "to kill"], &MappingConfig::default()).unwrap();
        assert_eq!(hits.len(), 2);
        let dog: Vec<_> = hits[0].iter().map(|h| (h.id.as_str(), h.gloss.as_str())).collect();
        assert_eq!(dog, vec![("1", "DOG")]);
        assert_eq!(hits[1].iter().next().unwrap().similarity, Similarity::IDENTICAL);

        assert_eq!(catalog.current_conceptset("2").unwrap().unwrap().gloss, "DOG");
        assert!(catalog.conceptlist("Nope-2000-1").is_err());
        assert_eq!(catalog.conceptlist("Test-2020-2").unwrap().len(), 2);
    }

    #[test]
    fn open_fails_without_data() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Concepticon::open(&CatalogConfig::with_repos(dir.path())).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
