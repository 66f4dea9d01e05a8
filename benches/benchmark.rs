use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use paper_rank::{
    rank, FeedbackParams, Paper, PaperMeta, SortKey, SparseVector, TfidfVectorizer, update_profile,
};

const WORDS: &[&str] = &[
    "graph", "neural", "network", "learning", "vision", "language", "robot", "policy", "reward",
    "transformer", "attention", "embedding", "retrieval", "segmentation", "detection", "planning",
    "optimization", "gradient", "convex", "sparse", "dense", "model", "training", "dataset",
    "benchmark", "evaluation", "inference", "latent", "diffusion", "generative", "adversarial",
    "reinforcement", "control", "navigation", "manipulation", "speech", "translation", "parsing",
    "knowledge", "reasoning", "agent", "symbolic", "evolutionary", "genetic", "spiking", "neuron",
];

/// deterministic pseudo-abstracts (xorshift32)
fn synthetic_corpus(docs: usize, words_per_doc: usize) -> Vec<String> {
    let mut state = 0x9e37_79b9u32;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state
    };
    (0..docs)
        .map(|_| {
            (0..words_per_doc)
                .map(|_| WORDS[next() as usize % WORDS.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn fit_and_rank_benchmark(c: &mut Criterion) {
    let texts = synthetic_corpus(2_000, 150);

    c.bench_function("fit_2000_docs", |b| {
        b.iter(|| TfidfVectorizer::new().fit(black_box(&texts)))
    });

    let fitted = match TfidfVectorizer::new().fit(&texts) {
        Ok(fitted) => fitted,
        Err(e) => panic!("fit failed: {e}"),
    };
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let papers: Vec<Paper> = fitted
        .vectors
        .into_iter()
        .enumerate()
        .map(|(i, vector)| Paper {
            id: format!("p{i}"),
            meta: PaperMeta {
                title: format!("Paper {i}"),
                authors: Vec::new(),
                summary: String::new(),
                pdf_link: None,
                site_link: None,
                updated: base + Duration::minutes(i as i64),
                submitted: base,
            },
            popularity: (i % 17) as i64,
            vector,
        })
        .collect();

    let mut profile = SparseVector::new();
    for paper in papers.iter().take(20) {
        profile = update_profile(&profile, &paper.vector, FeedbackParams::LIKE);
    }

    c.bench_function("rank_2000_papers", |b| {
        b.iter(|| rank(black_box(&profile), &papers, SortKey::Relevance).len())
    });

    c.bench_function("update_profile", |b| {
        b.iter(|| update_profile(black_box(&profile), &papers[42].vector, FeedbackParams::LIKE))
    });
}

criterion_group!(benches, fit_and_rank_benchmark);
criterion_main!(benches);
