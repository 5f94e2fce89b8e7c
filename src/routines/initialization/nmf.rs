use anyhow::Result;
use ndarray::{Array2, Zip};

use super::nndsvd;
use crate::structs::corpus::Corpus;
use crate::structs::memberships::Memberships;
use crate::structs::topics::Topics;

const MAX_ITER: usize = 100;
const TOLERANCE: f64 = 1e-2;
// small floor to avoid division by zero in the multiplicative updates
const EPS: f64 = 1e-10;

/// Non-negative matrix factorization of the corpus under Frobenius loss.
///
/// Runs multiplicative updates (Lee & Seung) seeded with the NNDSVD pair,
/// with zero seed entries lifted to the corpus mean so every coordinate can
/// move. The loss is checked every 10 iterations against a loose relative
/// tolerance; the loop is bounded by a fixed iteration cap either way. The
/// two factors are reused directly as the initial pLSA pair.
///
/// All update numerators are accumulated from the nonzero corpus entries;
/// only the k-by-k Gram matrices and the factors themselves are dense.
pub fn generate(corpus: &Corpus, n_topics: usize) -> Result<(Memberships, Topics)> {
    let n = corpus.n_docs();
    let m = corpus.n_words();
    let k = n_topics;

    let (memberships, topics) = nndsvd::generate(corpus, k)?;
    let mut w = memberships.matrix().clone();
    let mut h = topics.matrix().clone();

    let mean = corpus.total() / (n * m) as f64;
    w.mapv_inplace(|v| if v > 0.0 { v } else { mean });
    h.mapv_inplace(|v| if v > 0.0 { v } else { mean });

    let x_sq: f64 = corpus.vals().iter().map(|x| x * x).sum();
    let mut previous_loss = f64::INFINITY;

    for iter in 0..MAX_ITER {
        // H <- H .* (W'X) ./ (W'W H)
        let mut wt_x = Array2::zeros((k, m));
        for (d, word, x) in corpus.entries() {
            for z in 0..k {
                wt_x[[z, word]] += w[[d, z]] * x;
            }
        }
        let denom = w.t().dot(&w).dot(&h);
        Zip::from(&mut h)
            .and(&wt_x)
            .and(&denom)
            .for_each(|h, &num: &f64, &den: &f64| *h *= num / (den + EPS));

        // W <- W .* (X H') ./ (W H H')
        let mut x_ht = Array2::zeros((n, k));
        for (d, word, x) in corpus.entries() {
            for z in 0..k {
                x_ht[[d, z]] += x * h[[z, word]];
            }
        }
        let denom = w.dot(&h.dot(&h.t()));
        Zip::from(&mut w)
            .and(&x_ht)
            .and(&denom)
            .for_each(|w, &num: &f64, &den: &f64| *w *= num / (den + EPS));

        if (iter + 1) % 10 == 0 {
            let loss = frobenius_loss(corpus, &w, &h, x_sq);
            if previous_loss.is_finite()
                && (previous_loss - loss).abs() < TOLERANCE * previous_loss.abs().max(EPS)
            {
                break;
            }
            previous_loss = loss;
        }
    }

    Ok((Memberships::from(w), Topics::from(h)))
}

/// ||X - WH||^2 evaluated without forming WH:
/// ||X||^2 - 2 sum_nz x (WH)_dw + tr((W'W)(HH'))
fn frobenius_loss(corpus: &Corpus, w: &Array2<f64>, h: &Array2<f64>, x_sq: f64) -> f64 {
    let k = h.nrows();

    let mut cross = 0.0;
    for (d, word, x) in corpus.entries() {
        let mut p = 0.0;
        for z in 0..k {
            p += w[[d, z]] * h[[z, word]];
        }
        cross += x * p;
    }

    let wtw = w.t().dot(w);
    let hht = h.dot(&h.t());
    // tr(AB) for symmetric B reduces to the elementwise product sum
    let gram = (&wtw * &hht).sum();

    (x_sq - 2.0 * cross + gram).max(0.0)
}
