//! Benchmarks for gloss parsing and concept mapping.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use concepticon::gloss::{parse_gloss, similarity};
use concepticon::mapping::{MapMode, MapTarget, MappingConfig, map_concepts};

const WORDS: &[&str] = &[
    "dog", "kill", "mountain", "hill", "hand", "arm", "water", "fire", "stone", "tree",
    "sun", "moon", "star", "bird", "fish", "eat", "drink", "sleep", "walk", "die",
];

fn targets() -> Vec<MapTarget> {
    (0..2000)
        .map(|i| {
            let word = WORDS[i % WORDS.len()];
            let gloss = match i % 3 {
                0 => format!("{}///{word}", word.to_uppercase()),
                1 => format!("{} {i}///the {word} {i}", word.to_uppercase()),
                _ => format!("{} OR {i}///to {word} (something)", word.to_uppercase()),
            };
            MapTarget::new(i.to_string(), gloss)
        })
        .collect()
}

fn sources() -> Vec<String> {
    WORDS
        .iter()
        .cycle()
        .take(200)
        .enumerate()
        .map(|(i, w)| if i % 2 == 0 { format!("the {w}") } else { format!("to {w}") })
        .collect()
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_gloss", |bench| {
        bench.iter(|| black_box(parse_gloss(black_box("to kill (somebody)"), "en")))
    });
}

fn bench_similarity(c: &mut Criterion) {
    let a = parse_gloss("the dog (n)", "en").unwrap();
    let b = parse_gloss("dog", "en").unwrap();
    c.bench_function("similarity", |bench| bench.iter(|| black_box(similarity(&a, &b))));
}

fn bench_map(c: &mut Criterion) {
    let targets = targets();
    let sources = sources();
    let mut group = c.benchmark_group("map_200x2000");
    for (name, mode) in [("approximate", MapMode::Approximate), ("exhaustive", MapMode::Exhaustive)] {
        let config = MappingConfig {
            mode,
            ..Default::default()
        };
        group.bench_function(name, |bench| {
            bench.iter(|| black_box(map_concepts(&sources, &targets, &config)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_similarity, bench_map);
criterion_main!(benches);
