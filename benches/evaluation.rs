use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array2;
use plsacore::routines::evaluation::likelihood::log_likelihood;
use plsacore::routines::evaluation::posterior::e_step;
use plsacore::routines::initialization::{initialize, Init};
use plsacore::structs::corpus::Corpus;

/// Deterministic random-like sparse counts
fn synthetic_corpus(n_docs: usize, n_words: usize, entries_per_doc: usize) -> Corpus {
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut vals = Vec::new();
    for d in 0..n_docs {
        for s in 0..entries_per_doc {
            rows.push(d);
            cols.push((d * 17 + s * 23) % n_words);
            vals.push(((d * 7 + s * 13) % 9 + 1) as f64);
        }
    }
    Corpus::from_triplets(n_docs, n_words, rows, cols, vals).unwrap()
}

fn benchmark_evaluation(c: &mut Criterion) {
    let corpus = synthetic_corpus(500, 1000, 40);
    let k = 16;
    let (memberships, topics) = initialize(&corpus, k, &Init::Random, 347).unwrap();
    let mut posteriors = Array2::zeros((corpus.nnz(), k));

    c.bench_function("e_step", |b| {
        b.iter(|| {
            e_step(
                black_box(&corpus),
                &topics,
                &memberships,
                &mut posteriors,
                1e-32,
            )
        })
    });

    c.bench_function("log_likelihood", |b| {
        b.iter(|| log_likelihood(black_box(&corpus), &topics, &memberships))
    });
}

criterion_group!(benches, benchmark_evaluation);
criterion_main!(benches);
