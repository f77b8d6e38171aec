//! Batch mapping of source glosses onto a reference inventory.
//!
//! Two modes share one scorer:
//! - **Approximate**: targets are bucketed by canonical token; each source
//!   item is scored only against targets sharing a token and gets at most
//!   one best match.
//! - **Exhaustive**: every source item is scored against every target and
//!   all targets tied at the best score are returned.
//!
//! A source gloss that fails to parse is reported as a miss for its index;
//! the batch carries on.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::GlossError;
use crate::gloss::parser::COMPOSITE_SEPARATOR;
use crate::gloss::{Gloss, Similarity, parse_constituents, similarity};

/// Search strategy for [`map_concepts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapMode {
    /// Token-bucketed search; at most one candidate per source item.
    #[default]
    Approximate,
    /// Full pairwise search; all candidates tied at the best score.
    Exhaustive,
}

/// Configuration for a mapping run.
#[derive(Debug, Clone)]
pub struct MappingConfig {
    pub mode: MapMode,
    /// Worst similarity still accepted as a match.
    pub similarity_level: Similarity,
    /// Language tag used to parse both sides.
    pub language: String,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            mode: MapMode::Approximate,
            similarity_level: Similarity::DEFAULT_LEVEL,
            language: "en".into(),
        }
    }
}

/// A reference entry a source gloss can be mapped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapTarget {
    /// Concept set id.
    pub id: String,
    /// Reference gloss, possibly composite (`GLOSS///localized`).
    pub gloss: String,
}

impl MapTarget {
    pub fn new(id: impl Into<String>, gloss: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            gloss: gloss.into(),
        }
    }

    /// The concept set gloss, i.e. the part before `///`.
    pub fn concepticon_gloss(&self) -> &str {
        self.gloss
            .split(COMPOSITE_SEPARATOR)
            .next()
            .unwrap_or(&self.gloss)
            .trim()
    }
}

/// Best candidates for one source item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptMatch {
    /// Target indices in order of first appearance; empty on a miss.
    pub candidates: Vec<usize>,
    /// Best achieved score; [`Similarity::NO_MATCH`] on a miss.
    pub similarity: Similarity,
    /// Why the source gloss could not be parsed, if it could not.
    pub error: Option<GlossError>,
}

impl ConceptMatch {
    fn miss(error: Option<GlossError>) -> Self {
        Self {
            candidates: Vec::new(),
            similarity: Similarity::NO_MATCH,
            error,
        }
    }

    /// Whether any candidate was found.
    pub fn is_match(&self) -> bool {
        !self.candidates.is_empty()
    }

    /// Candidate targets deduplicated by (id, concept set gloss), keeping
    /// first appearance.
    pub fn distinct_targets<'a>(&self, targets: &'a [MapTarget]) -> Vec<(&'a str, &'a str)> {
        let mut seen = Vec::new();
        for &j in &self.candidates {
            if let Some(target) = targets.get(j) {
                let key = (target.id.as_str(), target.concepticon_gloss());
                if !seen.contains(&key) {
                    seen.push(key);
                }
            }
        }
        seen
    }
}

/// Result of a mapping run: source index → match.
///
/// Holds an entry for every source index unless the source or the target
/// list was empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConceptMapping {
    matches: BTreeMap<usize, ConceptMatch>,
}

impl ConceptMapping {
    pub fn get(&self, index: usize) -> Option<&ConceptMatch> {
        self.matches.get(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ConceptMatch)> {
        self.matches.iter().map(|(i, m)| (*i, m))
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Number of source items with at least one candidate.
    pub fn matched(&self) -> usize {
        self.matches.values().filter(|m| m.is_match()).count()
    }
}

/// Map source glosses onto reference targets.
pub fn map_concepts<S: AsRef<str>>(
    from: &[S],
    to: &[MapTarget],
    config: &MappingConfig,
) -> ConceptMapping {
    if from.is_empty() || to.is_empty() {
        return ConceptMapping::default();
    }

    let targets: Vec<Vec<Gloss>> = to
        .iter()
        .map(|t| match parse_constituents(&t.gloss, &config.language) {
            Ok(glosses) => glosses,
            Err(e) => {
                tracing::debug!(id = %t.id, gloss = %t.gloss, error = %e, "unparsable target gloss");
                Vec::new()
            }
        })
        .collect();

    let buckets = match config.mode {
        MapMode::Approximate => Some(token_buckets(&targets)),
        MapMode::Exhaustive => None,
    };

    let mut matches = BTreeMap::new();
    for (i, raw) in from.iter().enumerate() {
        let sources = match parse_constituents(raw.as_ref(), &config.language) {
            Ok(glosses) => glosses,
            Err(e) => {
                tracing::debug!(index = i, gloss = raw.as_ref(), error = %e, "unparsable source gloss");
                matches.insert(i, ConceptMatch::miss(Some(e)));
                continue;
            }
        };

        let found = match &buckets {
            Some(buckets) => best_in_buckets(&sources, &targets, buckets),
            None => best_exhaustive(&sources, &targets),
        };

        let found = match found {
            Some((candidates, score)) if score.within(config.similarity_level) => ConceptMatch {
                candidates,
                similarity: score,
                error: None,
            },
            _ => ConceptMatch::miss(None),
        };
        matches.insert(i, found);
    }

    let mapping = ConceptMapping { matches };
    tracing::info!(
        mode = ?config.mode,
        sources = from.len(),
        targets = to.len(),
        matched = mapping.matched(),
        "mapped concepts"
    );
    mapping
}

/// Best score over all constituent pairs of two items.
fn item_similarity(a: &[Gloss], b: &[Gloss]) -> Similarity {
    a.iter()
        .flat_map(|x| b.iter().map(move |y| similarity(x, y)))
        .min()
        .unwrap_or(Similarity::NO_MATCH)
}

/// Token → target indices, ascending.
fn token_buckets(targets: &[Vec<Gloss>]) -> HashMap<&str, Vec<usize>> {
    let mut buckets: HashMap<&str, Vec<usize>> = HashMap::new();
    for (j, glosses) in targets.iter().enumerate() {
        for token in glosses.iter().flat_map(|g| g.tokens.iter()) {
            let bucket = buckets.entry(token.as_str()).or_default();
            if bucket.last() != Some(&j) {
                bucket.push(j);
            }
        }
    }
    buckets
}

fn best_in_buckets(
    sources: &[Gloss],
    targets: &[Vec<Gloss>],
    buckets: &HashMap<&str, Vec<usize>>,
) -> Option<(Vec<usize>, Similarity)> {
    let candidates: BTreeSet<usize> = sources
        .iter()
        .flat_map(|g| g.tokens.iter())
        .filter_map(|t| buckets.get(t.as_str()))
        .flatten()
        .copied()
        .collect();

    let mut best: Option<(usize, Similarity)> = None;
    for j in candidates {
        let score = item_similarity(sources, &targets[j]);
        if score.is_match() && best.is_none_or(|(_, b)| score < b) {
            best = Some((j, score));
        }
    }
    best.map(|(j, score)| (vec![j], score))
}

fn best_exhaustive(sources: &[Gloss], targets: &[Vec<Gloss>]) -> Option<(Vec<usize>, Similarity)> {
    let mut best = Similarity::NO_MATCH;
    let mut candidates = Vec::new();
    for (j, target) in targets.iter().enumerate() {
        let score = item_similarity(sources, target);
        if !score.is_match() {
            continue;
        }
        if score < best {
            best = score;
            candidates.clear();
            candidates.push(j);
        } else if score == best {
            candidates.push(j);
        }
    }
    if candidates.is_empty() {
        None
    } else {
        Some((candidates, best))
    }
}
