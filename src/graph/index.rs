//! Relation index backed by petgraph.
//!
//! Concept ids and concept glosses share one key space: every relation row
//! is inserted twice, once between the ids and once between the glosses, so
//! lookups work with either.

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::error::{GraphError, GraphResult};

use super::traverse::Related;
use super::{ConceptRelation, RelationKind};

/// How repeated relations between the same pair are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelationMode {
    /// One label per directed pair; a later row replaces an earlier one.
    #[default]
    Single,
    /// A set of labels per directed pair.
    Multiple,
}

/// Bidirectional index over concept relations.
#[derive(Debug, Clone, Default)]
pub struct ConceptRelations {
    /// Nodes are keys (ids or glosses); edges carry the label set.
    graph: DiGraph<String, BTreeSet<RelationKind>>,
    /// Key → NodeIndex.
    node_index: HashMap<String, NodeIndex>,
    /// The accepted input rows, in order.
    raw: Vec<ConceptRelation>,
    mode: RelationMode,
}

impl ConceptRelations {
    /// Create an empty index.
    pub fn new(mode: RelationMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Build an index from relation rows, rejecting the first invalid one.
    pub fn from_relations(
        relations: impl IntoIterator<Item = ConceptRelation>,
        mode: RelationMode,
    ) -> GraphResult<Self> {
        let mut index = Self::new(mode);
        for relation in relations {
            index.insert(relation)?;
        }
        tracing::debug!(
            relations = index.raw.len(),
            keys = index.node_index.len(),
            ?mode,
            "built relation index"
        );
        Ok(index)
    }

    pub fn mode(&self) -> RelationMode {
        self.mode
    }

    /// The accepted relation rows in input order.
    pub fn raw(&self) -> &[ConceptRelation] {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Whether the key (id or gloss) takes part in any relation.
    pub fn contains(&self, key: &str) -> bool {
        self.node_index.contains_key(key)
    }

    /// Insert one relation row, plus its inverse for broader/narrower.
    ///
    /// Rejects self-relations and `sameas` rows that would close a `sameas`
    /// cycle; a rejected row leaves the index unchanged.
    pub fn insert(&mut self, relation: ConceptRelation) -> GraphResult<()> {
        let same_gloss =
            !relation.source_gloss.is_empty() && relation.source_gloss == relation.target_gloss;
        if relation.source == relation.target || same_gloss {
            return Err(GraphError::SelfRelation {
                source_key: relation.source.clone(),
                relation: relation.relation.to_string(),
            });
        }
        if relation.relation == RelationKind::SameAs
            && self.reaches_via_sameas(&relation.target, &relation.source)
        {
            return Err(GraphError::SameAsCycle {
                source_key: relation.source.clone(),
                target: relation.target.clone(),
            });
        }

        for (from, to) in key_pairs(&relation) {
            self.set_label(from, to, relation.relation.clone(), true);
            if let Some(inverse) = relation.relation.inverse() {
                // An explicit row in the other direction takes precedence in single mode.
                self.set_label(to, from, inverse, false);
            }
        }
        self.raw.push(relation);
        Ok(())
    }

    /// Relation labels on the edge `from → to`.
    pub fn labels(&self, from: &str, to: &str) -> Option<&BTreeSet<RelationKind>> {
        let a = *self.node_index.get(from)?;
        let b = *self.node_index.get(to)?;
        let edge = self.graph.find_edge(a, b)?;
        self.graph.edge_weight(edge)
    }

    /// Outgoing relations of a key, in insertion order.
    pub fn relations_of(&self, key: &str) -> Vec<(&str, &BTreeSet<RelationKind>)> {
        let Some(&node) = self.node_index.get(key) else {
            return Vec::new();
        };
        self.neighbors(node)
            .into_iter()
            .map(|(target, labels)| (self.graph[target].as_str(), labels))
            .collect()
    }

    /// Lazily walk `relation` edges from `start` up to `max_depth` hops.
    pub fn related(&self, start: &str, relation: RelationKind, max_depth: usize) -> Related<'_> {
        Related::new(self, start, relation, max_depth)
    }

    pub(super) fn node(&self, key: &str) -> Option<NodeIndex> {
        self.node_index.get(key).copied()
    }

    pub(super) fn key(&self, node: NodeIndex) -> &str {
        &self.graph[node]
    }

    /// Outgoing edges of a node, oldest first.
    pub(super) fn neighbors(&self, node: NodeIndex) -> Vec<(NodeIndex, &BTreeSet<RelationKind>)> {
        // petgraph lists outgoing edges newest first.
        let mut edges: Vec<_> = self
            .graph
            .edges(node)
            .map(|e| (e.target(), e.weight()))
            .collect();
        edges.reverse();
        edges
    }

    fn ensure_node(&mut self, key: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(key) {
            return idx;
        }
        let idx = self.graph.add_node(key.to_string());
        self.node_index.insert(key.to_string(), idx);
        idx
    }

    fn set_label(&mut self, from: &str, to: &str, label: RelationKind, overwrite: bool) {
        let a = self.ensure_node(from);
        let b = self.ensure_node(to);
        match self.graph.find_edge(a, b) {
            Some(edge) => {
                let labels = &mut self.graph[edge];
                match self.mode {
                    RelationMode::Multiple => {
                        labels.insert(label);
                    }
                    RelationMode::Single if overwrite || labels.is_empty() => {
                        labels.clear();
                        labels.insert(label);
                    }
                    RelationMode::Single => {}
                }
            }
            None => {
                self.graph.add_edge(a, b, BTreeSet::from([label]));
            }
        }
    }

    /// Whether `to` is reachable from `from` along `sameas` edges.
    fn reaches_via_sameas(&self, from: &str, to: &str) -> bool {
        let (Some(start), Some(goal)) = (self.node(from), self.node(to)) else {
            return false;
        };
        let mut seen = HashSet::from([start]);
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if node == goal {
                return true;
            }
            for edge in self.graph.edges(node) {
                if edge.weight().contains(&RelationKind::SameAs) && seen.insert(edge.target()) {
                    stack.push(edge.target());
                }
            }
        }
        false
    }
}

/// The id pair and, when both glosses are present, the gloss pair.
fn key_pairs(relation: &ConceptRelation) -> Vec<(&str, &str)> {
    let mut pairs = vec![(relation.source.as_str(), relation.target.as_str())];
    if !relation.source_gloss.is_empty() && !relation.target_gloss.is_empty() {
        pairs.push((relation.source_gloss.as_str(), relation.target_gloss.as_str()));
    }
    pairs
}
