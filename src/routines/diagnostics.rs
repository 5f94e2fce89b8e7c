//! Topic-quality diagnostics computed from a fitted topic set and the
//! corpus it was trained on. These consume the output of a fit; they play
//! no part in the EM optimization itself.

use std::collections::HashSet;

use ndarray::Array1;
use rayon::prelude::*;

use crate::structs::corpus::Corpus;
use crate::structs::topics::Topics;

/// Indices of the `n_words` highest-probability words of a topic.
fn top_words(topics: &Topics, topic: usize, n_words: usize) -> Vec<usize> {
    let row = topics.matrix().row(topic);
    let mut order: Vec<usize> = (0..row.len()).collect();
    order.sort_by(|&a, &b| {
        row[b]
            .partial_cmp(&row[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order.truncate(n_words);
    order
}

/// Pairwise co-occurrence coherence of one topic.
///
/// For the topic's `n_words` top words, sums `ln((D(w_i, w_j) + 1) / D(w_j))`
/// over ranked word pairs, where `D` counts the documents containing a word
/// or a word pair. Topics whose top words co-occur in the same documents
/// score higher; the smoothing constant keeps never-co-occurring pairs
/// finite.
pub fn coherence(topics: &Topics, topic: usize, corpus: &Corpus, n_words: usize) -> f64 {
    let words = top_words(topics, topic, n_words);

    // Document sets of the selected words
    let mut docs: Vec<HashSet<usize>> = vec![HashSet::new(); words.len()];
    for (d, w, _) in corpus.entries() {
        if let Some(pos) = words.iter().position(|&word| word == w) {
            docs[pos].insert(d);
        }
    }

    let mut score = 0.0;
    for i in 1..words.len() {
        for j in 0..i {
            let denom = docs[j].len() as f64;
            if denom > 0.0 {
                let joint = docs[i].intersection(&docs[j]).count() as f64;
                score += ((joint + 1.0) / denom).ln();
            }
        }
    }

    score
}

/// Average [coherence] over all topics.
pub fn mean_coherence(topics: &Topics, corpus: &Corpus, n_words: usize) -> f64 {
    let k = topics.n_topics();
    if k == 0 {
        return 0.0;
    }
    (0..k)
        .into_par_iter()
        .map(|topic| coherence(topics, topic, corpus, n_words))
        .sum::<f64>()
        / k as f64
}

/// Average log-lift of a topic's top words.
///
/// Lift compares the in-topic probability of a word with its empirical
/// frequency in the corpus: `ln(P(w|z) / P(w))`. Words the topic merely
/// inherits from the corpus background contribute nothing; words the topic
/// concentrates on contribute strongly.
pub fn log_lift(topics: &Topics, topic: usize, corpus: &Corpus, n_words: usize) -> f64 {
    let words = top_words(topics, topic, n_words);
    let total = corpus.total();

    let mut word_totals: Array1<f64> = Array1::zeros(corpus.n_words());
    for (_, w, x) in corpus.entries() {
        word_totals[w] += x;
    }

    let row = topics.matrix().row(topic);
    let mut score = 0.0;
    let mut counted = 0usize;
    for &w in &words {
        let p_word = word_totals[w] / total;
        if p_word > 0.0 && row[w] > 0.0 {
            score += (row[w] / p_word).ln();
            counted += 1;
        }
    }

    if counted > 0 {
        score / counted as f64
    } else {
        0.0
    }
}

/// Average [log_lift] over all topics.
pub fn mean_log_lift(topics: &Topics, corpus: &Corpus, n_words: usize) -> f64 {
    let k = topics.n_topics();
    if k == 0 {
        return 0.0;
    }
    (0..k)
        .into_par_iter()
        .map(|topic| log_lift(topics, topic, corpus, n_words))
        .sum::<f64>()
        / k as f64
}
