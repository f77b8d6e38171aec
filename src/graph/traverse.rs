//! Bounded breadth-first traversal along one relation kind.
//!
//! The walk keeps no visited set: a concept reachable along several paths
//! is yielded once per path. Depth bounds the walk, so it always ends.

use std::collections::VecDeque;

use petgraph::graph::NodeIndex;

use super::RelationKind;
use super::index::ConceptRelations;

/// Lazy iterator of `(key, depth)` pairs reachable from a start key.
///
/// Created by [`ConceptRelations::related`]. Each call starts a fresh walk
/// with its own queue, so any number may run over the same index.
#[derive(Debug, Clone)]
pub struct Related<'a> {
    relations: &'a ConceptRelations,
    relation: RelationKind,
    max_depth: usize,
    /// BFS queue: (node, depth at which it was reached).
    queue: VecDeque<(NodeIndex, usize)>,
    /// Neighbors found on the last expansion, not yet yielded.
    ready: VecDeque<(&'a str, usize)>,
}

impl<'a> Related<'a> {
    pub(super) fn new(
        relations: &'a ConceptRelations,
        start: &str,
        relation: RelationKind,
        max_depth: usize,
    ) -> Self {
        let queue = relations.node(start).map(|n| (n, 0)).into_iter().collect();
        Self {
            relations,
            relation,
            max_depth,
            queue,
            ready: VecDeque::new(),
        }
    }

    fn expand(&mut self, node: NodeIndex, depth: usize) {
        let depth = depth + 1;
        if depth > self.max_depth {
            return;
        }
        let relations = self.relations;
        for (target, labels) in relations.neighbors(node) {
            if labels.contains(&self.relation) {
                self.queue.push_back((target, depth));
                self.ready.push_back((relations.key(target), depth));
            }
        }
    }
}

impl<'a> Iterator for Related<'a> {
    type Item = (&'a str, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.ready.pop_front() {
                return Some(item);
            }
            let (node, depth) = self.queue.pop_front()?;
            self.expand(node, depth);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ConceptRelation, RelationMode};

    fn index_in(mode: RelationMode, rows: &[(&str, &str, &str)]) -> ConceptRelations {
        ConceptRelations::from_relations(
            rows.iter().map(|(s, t, r)| {
                ConceptRelation::new(*s, format!("G{s}"), *t, format!("G{t}"), *r)
            }),
            mode,
        )
        .unwrap()
    }

    fn index(rows: &[(&str, &str, &str)]) -> ConceptRelations {
        index_in(RelationMode::Single, rows)
    }

    #[test]
    fn narrower_from_inverse_pair() {
        let idx = index(&[("1212", "1130", "narrower")]);
        let found: Vec<_> = idx.related("1212", RelationKind::Narrower, 2).collect();
        assert_eq!(found, vec![("1130", 1)]);
        let up: Vec<_> = idx.related("1130", RelationKind::Broader, 2).collect();
        assert_eq!(up, vec![("1212", 1)]);
    }

    #[test]
    fn depth_is_bounded() {
        // 1 > 2 > 3 > 4 along broader
        let idx = index(&[("1", "2", "broader"), ("2", "3", "broader"), ("3", "4", "broader")]);
        let all: Vec<_> = idx.related("1", RelationKind::Broader, 3).collect();
        assert_eq!(all, vec![("2", 1), ("3", 2), ("4", 3)]);
        let two: Vec<_> = idx.related("1", RelationKind::Broader, 2).collect();
        assert_eq!(two, vec![("2", 1), ("3", 2)]);
        assert_eq!(idx.related("1", RelationKind::Broader, 0).count(), 0);
    }

    #[test]
    fn other_labels_are_not_followed() {
        let idx = index(&[("1", "2", "broader"), ("1", "3", "hasform")]);
        let found: Vec<_> = idx.related("1", RelationKind::Broader, 3).collect();
        assert_eq!(found, vec![("2", 1)]);
    }

    #[test]
    fn paths_are_not_deduplicated() {
        // Diamond: 1 reaches 4 via 2 and via 3.
        let idx = index(&[
            ("1", "2", "narrower"),
            ("1", "3", "narrower"),
            ("2", "4", "narrower"),
            ("3", "4", "narrower"),
        ]);
        let found: Vec<_> = idx.related("1", RelationKind::Narrower, 2).collect();
        assert_eq!(found, vec![("2", 1), ("3", 1), ("4", 2), ("4", 2)]);
    }

    #[test]
    fn glosses_are_keys_too() {
        let idx = index(&[("1212", "1130", "narrower")]);
        let found: Vec<_> = idx.related("G1212", RelationKind::Narrower, 1).collect();
        assert_eq!(found, vec![("G1130", 1)]);
    }

    #[test]
    fn unknown_start_yields_nothing() {
        let idx = index(&[("1", "2", "broader")]);
        assert_eq!(idx.related("999", RelationKind::Broader, 3).count(), 0);
    }

    #[test]
    fn restartable() {
        let idx = index(&[("1", "2", "broader"), ("2", "3", "broader")]);
        let first: Vec<_> = idx.related("1", RelationKind::Broader, 3).collect();
        let second: Vec<_> = idx.related("1", RelationKind::Broader, 3).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn multiple_mode_matches_any_label_of_a_pair() {
        let idx = index_in(
            RelationMode::Multiple,
            &[("1", "2", "hasform"), ("1", "2", "narrower"), ("2", "3", "narrower")],
        );
        let down: Vec<_> = idx.related("1", RelationKind::Narrower, 3).collect();
        assert_eq!(down, vec![("2", 1), ("3", 2)]);
        let up: Vec<_> = idx.related("3", RelationKind::Broader, 3).collect();
        assert_eq!(up, vec![("2", 1), ("1", 2)]);
        let forms: Vec<_> = idx.related("1", RelationKind::HasForm, 3).collect();
        assert_eq!(forms, vec![("2", 1)]);
    }
}
