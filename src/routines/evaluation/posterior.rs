use ndarray::Array2;

use crate::structs::corpus::Corpus;
use crate::structs::memberships::Memberships;
use crate::structs::topics::Topics;

/// The expectation step of pLSA optimization.
///
/// For every nonzero entry (d, w) of the corpus this computes the posterior
/// probability of each topic z:
///
/// ```text
/// P(z|w,d) = P(w|z)P(z|d) / sum_z P(w|z)P(z|d)
/// ```
///
/// writing the result into `posteriors`, a scratch matrix of shape
/// `(nnz, n_topics)` that is reused across iterations. Only nonzero entries
/// of the corpus are visited, so the pass is proportional to `nnz`.
///
/// `probability_threshold` promotes sparsity: a joint probability
/// P(w|z)P(z|d) at or below the threshold is written as zero and excluded
/// from the normalizing sum. If every topic falls below the threshold the
/// row is left identically zero instead of dividing by zero; such entries
/// contribute nothing to the following maximization step.
pub fn e_step(
    corpus: &Corpus,
    topics: &Topics,
    memberships: &Memberships,
    posteriors: &mut Array2<f64>,
    probability_threshold: f64,
) {
    let k = topics.n_topics();
    let topic_word = topics.matrix();
    let doc_topic = memberships.matrix();

    for (idx, (d, w, _)) in corpus.entries().enumerate() {
        let mut norm = 0.0;
        for z in 0..k {
            let v = topic_word[[z, w]] * doc_topic[[d, z]];
            if v > probability_threshold {
                posteriors[[idx, z]] = v;
                norm += v;
            } else {
                posteriors[[idx, z]] = 0.0;
            }
        }
        if norm > 0.0 {
            for z in 0..k {
                posteriors[[idx, z]] /= norm;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn toy_corpus() -> Corpus {
        Corpus::from_triplets(2, 2, vec![0, 1], vec![0, 1], vec![2.0, 1.0]).unwrap()
    }

    #[test]
    fn test_posterior_rows_sum_to_one() {
        let corpus = toy_corpus();
        let topics = Topics::from(array![[0.8, 0.2], [0.4, 0.6]]);
        let memberships = Memberships::from(array![[0.5, 0.5], [0.3, 0.7]]);
        let mut posteriors = Array2::zeros((corpus.nnz(), 2));

        e_step(&corpus, &topics, &memberships, &mut posteriors, 0.0);

        for row in posteriors.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_large_threshold_zeroes_all_rows() {
        let corpus = toy_corpus();
        let topics = Topics::from(array![[0.8, 0.2], [0.4, 0.6]]);
        let memberships = Memberships::from(array![[0.5, 0.5], [0.3, 0.7]]);
        let mut posteriors = Array2::from_elem((corpus.nnz(), 2), 0.5);

        e_step(&corpus, &topics, &memberships, &mut posteriors, 1e9);

        assert!(posteriors.iter().all(|&p| p == 0.0));
    }
}
