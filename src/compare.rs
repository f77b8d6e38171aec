//! Set operations across concept lists.
//!
//! Each linked concept of each list is recorded under its own concept set
//! id at depth 0, under every broader concept set at a positive depth and
//! under every narrower concept set at a negative depth. The entries of
//! each concept set are then classified:
//!
//! - **proper**: linked directly (depth 0) and present in more than one list
//! - **split**: one list reaches it as broader from several of its own
//!   concepts; merging there would collapse distinctions the list makes
//! - **blacklisted**: specific concepts absorbed by a broader concept set
//!   that every list reaches, via different specific concepts
//!
//! and an emit rule picks the concept sets that represent the lists.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;

use crate::graph::{ConceptRelations, RelationKind};
use crate::model::{ConceptList, ConceptSetIndex};

/// Default number of relation hops searched from each concept.
pub const DEFAULT_SEARCH_DEPTH: usize = 3;

/// How a list reaches a concept set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ListEntry {
    /// Reference of the list (catalogue id or path).
    pub list: String,
    /// 0 = linked directly, > 0 = broader, < 0 = narrower than the source.
    pub depth: i32,
    /// Concept set the list's concept is linked to.
    pub source_id: String,
    pub source_gloss: String,
}

/// A concept set selected to represent the compared lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparedConcept {
    pub id: String,
    /// Concept set gloss, or the id when the concept set is unknown.
    pub gloss: String,
    pub entries: BTreeSet<ListEntry>,
}

impl ComparedConcept {
    /// Whether any list links this concept set directly.
    pub fn has_direct_hit(&self) -> bool {
        self.entries.iter().any(|e| e.depth == 0)
    }

    /// Number of distinct lists that link this concept set directly.
    pub fn direct_lists(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.depth == 0)
            .map(|e| e.list.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Compare concept lists through the relation graph.
///
/// `lists` pairs each list with the reference it is reported under. Only
/// concepts linked to a concept set take part. Output is sorted by
/// concept set gloss.
pub fn compare_conceptlists(
    lists: &[(&str, &ConceptList)],
    relations: &ConceptRelations,
    conceptsets: &ConceptSetIndex,
    search_depth: usize,
) -> Vec<ComparedConcept> {
    let commons = collect_entries(lists, relations, conceptsets, search_depth);
    let list_count = lists.len();

    let proper: HashSet<&str> = commons
        .iter()
        .filter(|(_, entries)| {
            entries.iter().any(|e| e.depth == 0) && distinct_lists(entries.iter()) > 1
        })
        .map(|(id, _)| id.as_str())
        .collect();

    let split: HashSet<&str> = commons
        .iter()
        .filter(|(_, entries)| is_split(entries))
        .map(|(id, _)| id.as_str())
        .collect();

    let mut blacklist: HashSet<&str> = HashSet::new();
    for (id, entries) in &commons {
        if split.contains(id.as_str()) || entries.iter().any(|e| e.depth == 0) {
            continue;
        }
        let broader: Vec<&ListEntry> = entries.iter().filter(|e| e.depth > 0).collect();
        let sources: BTreeSet<&str> = broader.iter().map(|e| e.source_id.as_str()).collect();
        if distinct_lists(broader.iter().copied()) == list_count && sources.len() > 1 {
            blacklist.extend(sources.into_iter().filter(|s| !proper.contains(s)));
        }
    }

    let mut selected: Vec<ComparedConcept> = Vec::new();
    for (id, entries) in &commons {
        let direct = entries.iter().any(|e| e.depth == 0);
        let related = entries.iter().any(|e| e.depth != 0);

        let emit = match (direct, related) {
            // Linked directly only.
            (true, false) => !blacklist.contains(id.as_str()),
            // Reached through relations only.
            (false, _) => {
                let hidden_sense = entries
                    .iter()
                    .all(|e| e.depth < 0 && proper.contains(e.source_id.as_str()));
                !split.contains(id.as_str()) && !hidden_sense
            }
            // Both: a broader concept set of a distinct list concept wins.
            (true, true) => !entries
                .iter()
                .any(|e| e.depth < 0 && !split.contains(e.source_id.as_str())),
        };

        if emit {
            selected.push(ComparedConcept {
                id: id.clone(),
                gloss: conceptsets
                    .get(id)
                    .map_or_else(|| id.clone(), |s| s.gloss.clone()),
                entries: entries.clone(),
            });
        } else {
            tracing::trace!(id = %id, "concept set not selected");
        }
    }

    selected.sort_by(|a, b| a.gloss.cmp(&b.gloss).then_with(|| a.id.cmp(&b.id)));
    tracing::debug!(
        lists = list_count,
        candidates = commons.len(),
        selected = selected.len(),
        proper = proper.len(),
        split = split.len(),
        blacklisted = blacklist.len(),
        "compared concept lists"
    );
    selected
}

fn collect_entries(
    lists: &[(&str, &ConceptList)],
    relations: &ConceptRelations,
    conceptsets: &ConceptSetIndex,
    search_depth: usize,
) -> BTreeMap<String, BTreeSet<ListEntry>> {
    let mut commons: BTreeMap<String, BTreeSet<ListEntry>> = BTreeMap::new();
    for (reference, list) in lists {
        for concept in list.mapped() {
            let Some(source_id) = concept.concepticon_id.as_deref() else {
                continue;
            };
            let source_gloss = concept
                .concepticon_gloss
                .as_deref()
                .filter(|g| !g.is_empty())
                .or_else(|| conceptsets.get(source_id).map(|s| s.gloss.as_str()))
                .unwrap_or_default();
            let entry = |depth: i32| ListEntry {
                list: reference.to_string(),
                depth,
                source_id: source_id.to_string(),
                source_gloss: source_gloss.to_string(),
            };

            commons
                .entry(source_id.to_string())
                .or_default()
                .insert(entry(0));
            for (relation, sign) in [(RelationKind::Broader, 1), (RelationKind::Narrower, -1)] {
                for (target, depth) in relations.related(source_id, relation, search_depth) {
                    commons
                        .entry(target.to_string())
                        .or_default()
                        .insert(entry(sign * depth as i32));
                }
            }
        }
    }
    commons
}

fn distinct_lists<'a>(entries: impl Iterator<Item = &'a ListEntry>) -> usize {
    entries.map(|e| e.list.as_str()).collect::<HashSet<_>>().len()
}

/// One list reaches the concept set as broader from several of its concepts.
fn is_split(entries: &BTreeSet<ListEntry>) -> bool {
    let mut sources: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for e in entries.iter().filter(|e| e.depth > 0) {
        sources.entry(e.list.as_str()).or_default().insert(e.source_id.as_str());
    }
    sources.values().any(|ids| ids.len() > 1)
}

// ---------------------------------------------------------------------------
// Union / intersection rows
// ---------------------------------------------------------------------------

/// Which set operation to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperation {
    Union,
    Intersection,
}

/// One rendered row of a set operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetOperationRow {
    /// `*` when no list links the concept set directly, then `<` when
    /// fewer entries than lists.
    pub marker: String,
    pub id: String,
    pub gloss: String,
    /// Relation-mediated entries as `gloss (depth, list)`.
    pub annotation: String,
}

impl fmt::Display for SetOperationRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}\t{}", self.marker, self.id, self.gloss, self.annotation)
    }
}

/// Render compared concepts as union or intersection rows.
///
/// The intersection keeps a concept set only when every list links it
/// directly.
pub fn set_operation(
    operation: SetOperation,
    compared: &[ComparedConcept],
    list_count: usize,
) -> Vec<SetOperationRow> {
    compared
        .iter()
        .filter(|c| match operation {
            SetOperation::Union => true,
            SetOperation::Intersection => c.direct_lists() == list_count,
        })
        .map(|c| {
            let mut marker = String::with_capacity(2);
            marker.push(if c.has_direct_hit() { ' ' } else { '*' });
            marker.push(if c.entries.len() < list_count { '<' } else { ' ' });
            let annotation = c
                .entries
                .iter()
                .filter(|e| e.depth != 0)
                .map(|e| format!("{} ({}, {})", e.source_gloss, e.depth, e.list))
                .collect::<Vec<_>>()
                .join(", ");
            SetOperationRow {
                marker,
                id: c.id.clone(),
                gloss: c.gloss.clone(),
                annotation,
            }
        })
        .collect()
}
