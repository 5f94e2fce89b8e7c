use anyhow::{ensure, Context, Result};
use linfa_linalg::svd::SVD;
use ndarray::{Array1, Array2};

use crate::structs::corpus::Corpus;
use crate::structs::memberships::Memberships;
use crate::structs::topics::Topics;

/// Non-negative double SVD initialization.
///
/// Computes the leading `n_topics` singular triplets (U, S, V) of the
/// corpus matrix and derives a non-negative factor pair from them. The
/// leading singular triplet of a non-negative matrix is itself
/// non-negative, so its absolute values scaled by sqrt(S_0) seed the first
/// component directly. Every later component j splits its singular vector
/// pair into positive and negative parts, keeps whichever pair has the
/// larger product of Euclidean norms, and scales the unit vectors by
/// sqrt(S_j * max(m_p, m_n)).
///
/// The factors are returned unnormalized; the initialization dispatch
/// applies the row normalization shared by all strategies.
pub fn generate(corpus: &Corpus, n_topics: usize) -> Result<(Memberships, Topics)> {
    let n = corpus.n_docs();
    let m = corpus.n_words();
    ensure!(
        n_topics <= n.min(m),
        "Cannot compute a rank-{} decomposition of a {}x{} matrix",
        n_topics,
        n,
        m
    );

    let dense = corpus.to_dense();
    let (u, s, vt) = dense
        .svd(true, true)
        .context("Singular value decomposition of the corpus failed")?;
    let u = u.context("Left singular vectors were not computed")?;
    let vt = vt.context("Right singular vectors were not computed")?;

    // Leading n_topics triplets, largest singular value first
    let mut order: Vec<usize> = (0..s.len()).collect();
    order.sort_by(|&a, &b| s[b].partial_cmp(&s[a]).unwrap_or(std::cmp::Ordering::Equal));
    order.truncate(n_topics);

    let mut doc_topic = Array2::zeros((n, n_topics));
    let mut topic_word = Array2::zeros((n_topics, m));

    let lead = order[0];
    let scale = s[lead].sqrt();
    for i in 0..n {
        doc_topic[[i, 0]] = scale * u[[i, lead]].abs();
    }
    for j in 0..m {
        topic_word[[0, j]] = scale * vt[[lead, j]].abs();
    }

    for (component, &t) in order.iter().enumerate().skip(1) {
        let x = u.column(t);
        let y = vt.row(t);

        // positive and negative parts of the singular vector pair
        let x_p = x.mapv(|v| v.max(0.0));
        let y_p = y.mapv(|v| v.max(0.0));
        let x_n = x.mapv(|v| (-v).max(0.0));
        let y_n = y.mapv(|v| (-v).max(0.0));

        let x_p_nrm = norm(&x_p);
        let y_p_nrm = norm(&y_p);
        let x_n_nrm = norm(&x_n);
        let y_n_nrm = norm(&y_n);

        let m_p = x_p_nrm * y_p_nrm;
        let m_n = x_n_nrm * y_n_nrm;

        let (xu, yu, x_nrm, y_nrm, sigma) = if m_p > m_n {
            (x_p, y_p, x_p_nrm, y_p_nrm, m_p)
        } else {
            (x_n, y_n, x_n_nrm, y_n_nrm, m_n)
        };

        // A vanished part leaves the component zeroed
        if sigma == 0.0 {
            continue;
        }

        let lbd = (s[t] * sigma).sqrt();
        for i in 0..n {
            doc_topic[[i, component]] = lbd * xu[i] / x_nrm;
        }
        for j in 0..m {
            topic_word[[component, j]] = lbd * yu[j] / y_nrm;
        }
    }

    Ok((Memberships::from(doc_topic), Topics::from(topic_word)))
}

fn norm(x: &Array1<f64>) -> f64 {
    x.iter().map(|v| v * v).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_corpus() -> Corpus {
        // Two disjoint document groups over disjoint vocabularies
        Corpus::from_triplets(
            4,
            6,
            vec![0, 0, 1, 1, 2, 2, 3, 3],
            vec![0, 1, 1, 2, 3, 4, 4, 5],
            vec![2.0, 1.0, 3.0, 1.0, 2.0, 2.0, 1.0, 3.0],
        )
        .unwrap()
    }

    #[test]
    fn test_factors_are_non_negative() {
        let (memberships, topics) = generate(&block_corpus(), 2).unwrap();

        assert!(memberships.matrix().iter().all(|&v| v >= 0.0));
        assert!(topics.matrix().iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_shapes() {
        let (memberships, topics) = generate(&block_corpus(), 2).unwrap();

        assert_eq!(memberships.n_docs(), 4);
        assert_eq!(memberships.n_topics(), 2);
        assert_eq!(topics.n_topics(), 2);
        assert_eq!(topics.n_words(), 6);
    }

    #[test]
    fn test_rank_larger_than_matrix_rejected() {
        assert!(generate(&block_corpus(), 5).is_err());
    }

    #[test]
    fn test_deterministic() {
        let corpus = block_corpus();
        let (m1, t1) = generate(&corpus, 2).unwrap();
        let (m2, t2) = generate(&corpus, 2).unwrap();

        assert_eq!(m1.matrix(), m2.matrix());
        assert_eq!(t1.matrix(), t2.matrix());
    }
}
