use criterion::{black_box, criterion_group, criterion_main, Criterion};
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

fn benchmark_initialization(c: &mut Criterion) {
    let corpus = synthetic_corpus(200, 400, 20);

    c.bench_function("initialize_random", |b| {
        b.iter(|| initialize(black_box(&corpus), 8, &Init::Random, 347).unwrap())
    });

    c.bench_function("initialize_nndsvd", |b| {
        b.iter(|| initialize(black_box(&corpus), 8, &Init::Nndsvd, 347).unwrap())
    });

    c.bench_function("initialize_nmf", |b| {
        b.iter(|| initialize(black_box(&corpus), 8, &Init::Nmf, 347).unwrap())
    });
}

criterion_group!(benches, benchmark_initialization);
criterion_main!(benches);
