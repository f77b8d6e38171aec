use concepticon::gloss::{Similarity, parse_gloss, similarity};
use concepticon::mapping::{MapMode, MapTarget, MappingConfig, map_concepts};
use proptest::prelude::*;

const MAX_WORDS: usize = 4;

const VOCABULARY: &[&str] = &[
    "dog", "kill", "mountain", "hill", "hand", "arm", "big", "small", "water", "stone",
    "to", "the", "a", "be", "in", "or", "and",
];

const TAILS: &[&str] = &["", " (n)", " (v.)", " (something)", ", stone"];

fn gloss_strategy() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(prop::sample::select(VOCABULARY), 1..=MAX_WORDS),
        prop::sample::select(TAILS),
    )
        .prop_map(|(words, tail)| format!("{}{tail}", words.join(" ")))
}

fn targets_strategy() -> impl Strategy<Value = Vec<MapTarget>> {
    prop::collection::vec(gloss_strategy(), 1..12).prop_map(|glosses| {
        glosses
            .into_iter()
            .enumerate()
            .map(|(i, g)| MapTarget::new(i.to_string(), format!("{}///{g}", g.to_uppercase())))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn canonical_form_is_a_fixed_point(raw in gloss_strategy()) {
        if let Ok(gloss) = parse_gloss(&raw, "en") {
            let again = parse_gloss(&gloss.canonical, "en").unwrap();
            prop_assert_eq!(&again.canonical, &gloss.canonical);
            prop_assert_eq!(&again.tokens, &gloss.tokens);
        }
    }

    #[test]
    fn parsed_glosses_are_never_empty(raw in gloss_strategy()) {
        if let Ok(gloss) = parse_gloss(&raw, "en") {
            prop_assert!(!gloss.main.is_empty());
            prop_assert!(!gloss.canonical.is_empty());
            prop_assert_eq!(gloss.tokens.first(), Some(&gloss.main));
        }
    }

    #[test]
    fn a_gloss_is_identical_to_itself(raw in gloss_strategy()) {
        if let Ok(gloss) = parse_gloss(&raw, "en") {
            prop_assert_eq!(similarity(&gloss, &gloss), Similarity::IDENTICAL);
        }
    }

    #[test]
    fn similarity_is_symmetric_and_bounded(a in gloss_strategy(), b in gloss_strategy()) {
        if let (Ok(a), Ok(b)) = (parse_gloss(&a, "en"), parse_gloss(&b, "en")) {
            let forward = similarity(&a, &b);
            prop_assert_eq!(forward, similarity(&b, &a));
            prop_assert!((1..=10).contains(&forward.get()));
        }
    }

    #[test]
    fn exhaustive_mapping_never_loses_to_approximate(
        sources in prop::collection::vec(gloss_strategy(), 1..8),
        targets in targets_strategy(),
    ) {
        let config = |mode| MappingConfig { mode, ..Default::default() };
        let approximate = map_concepts(&sources, &targets, &config(MapMode::Approximate));
        let exhaustive = map_concepts(&sources, &targets, &config(MapMode::Exhaustive));

        prop_assert!(exhaustive.matched() >= approximate.matched());
        for (i, found) in approximate.iter() {
            prop_assert!(found.candidates.len() <= 1);
            let best = exhaustive.get(i).map_or(Similarity::NO_MATCH, |m| m.similarity);
            prop_assert!(best <= found.similarity);
        }
    }
}
