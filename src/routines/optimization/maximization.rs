use ndarray::{Array1, Array2};

use crate::structs::corpus::Corpus;
use crate::structs::memberships::Memberships;
use crate::structs::topics::Topics;

/// The maximization step of pLSA optimization.
///
/// Re-estimates both factor matrices from the current posteriors:
///
/// ```text
/// P(w|z) = sum_d x_dw P(z|w,d) / sum_{d,w} x_dw P(z|w,d)
/// P(z|d) = sum_w x_dw P(z|w,d) / sum_{w,z} x_dw P(z|w,d)
/// ```
///
/// This is the maximum-likelihood closed form for the mixture given fixed
/// posteriors. Both output matrices and both normalization accumulators are
/// zeroed in place first; the accumulators are caller-owned so no buffer is
/// reallocated across iterations. A topic or document whose accumulator
/// stays zero keeps its zeroed row rather than dividing by zero.
pub fn m_step(
    corpus: &Corpus,
    topics: &mut Topics,
    memberships: &mut Memberships,
    posteriors: &Array2<f64>,
    norm_topic: &mut Array1<f64>,
    norm_doc: &mut Array1<f64>,
) {
    let k = posteriors.ncols();
    let topic_word = topics.matrix_mut();
    let doc_topic = memberships.matrix_mut();

    topic_word.fill(0.0);
    doc_topic.fill(0.0);
    norm_topic.fill(0.0);
    norm_doc.fill(0.0);

    for (idx, (d, w, x)) in corpus.entries().enumerate() {
        for z in 0..k {
            let s = x * posteriors[[idx, z]];

            topic_word[[z, w]] += s;
            doc_topic[[d, z]] += s;

            norm_topic[z] += s;
            norm_doc[d] += s;
        }
    }

    for z in 0..k {
        if norm_topic[z] > 0.0 {
            let mut row = topic_word.row_mut(z);
            row /= norm_topic[z];
        }
    }
    for d in 0..doc_topic.nrows() {
        if norm_doc[d] > 0.0 {
            let mut row = doc_topic.row_mut(d);
            row /= norm_doc[d];
        }
    }
}

/// The maximization step with a fixed topic set.
///
/// Identical accumulation pattern to [m_step], restricted to the
/// document-topic side: `topics` is read-only input and only the
/// document-topic rows and their accumulators are recomputed, with the same
/// zero-guard. Used when refitting document mixtures against predefined
/// topics.
pub fn constrained_m_step(
    corpus: &Corpus,
    memberships: &mut Memberships,
    posteriors: &Array2<f64>,
    norm_doc: &mut Array1<f64>,
) {
    let k = posteriors.ncols();
    let doc_topic = memberships.matrix_mut();

    doc_topic.fill(0.0);
    norm_doc.fill(0.0);

    for (idx, (d, _, x)) in corpus.entries().enumerate() {
        for z in 0..k {
            let s = x * posteriors[[idx, z]];
            doc_topic[[d, z]] += s;
            norm_doc[d] += s;
        }
    }

    for d in 0..doc_topic.nrows() {
        if norm_doc[d] > 0.0 {
            let mut row = doc_topic.row_mut(d);
            row /= norm_doc[d];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_m_step_hand_computed() {
        // Two entries: (0, 0, 2.0) and (1, 1, 1.0), two topics.
        let corpus =
            Corpus::from_triplets(2, 2, vec![0, 1], vec![0, 1], vec![2.0, 1.0]).unwrap();
        let posteriors = array![[0.5, 0.5], [1.0, 0.0]];

        let mut topics = Topics::new(2, 2);
        let mut memberships = Memberships::new(2, 2);
        let mut norm_topic = Array1::zeros(2);
        let mut norm_doc = Array1::zeros(2);

        m_step(
            &corpus,
            &mut topics,
            &mut memberships,
            &posteriors,
            &mut norm_topic,
            &mut norm_doc,
        );

        // Topic 0 accumulates 1.0 on word 0 and 1.0 on word 1.
        // Topic 1 accumulates 1.0 on word 0 only.
        assert_eq!(topics.matrix(), &array![[0.5, 0.5], [1.0, 0.0]]);
        // Document rows renormalize to their posterior mixtures.
        assert_eq!(memberships.matrix(), &array![[0.5, 0.5], [1.0, 0.0]]);
    }

    #[test]
    fn test_m_step_all_zero_posteriors_leave_zeros() {
        let corpus =
            Corpus::from_triplets(2, 2, vec![0, 1], vec![0, 1], vec![2.0, 1.0]).unwrap();
        let posteriors = Array2::zeros((2, 2));

        let mut topics = Topics::new(2, 2);
        let mut memberships = Memberships::new(2, 2);
        let mut norm_topic = Array1::zeros(2);
        let mut norm_doc = Array1::zeros(2);

        m_step(
            &corpus,
            &mut topics,
            &mut memberships,
            &posteriors,
            &mut norm_topic,
            &mut norm_doc,
        );

        assert!(topics.matrix().iter().all(|&v| v == 0.0));
        assert!(memberships.matrix().iter().all(|&v| v == 0.0));
        assert!(!topics.matrix().iter().any(|v| v.is_nan()));
    }

    #[test]
    fn test_constrained_m_step_only_touches_memberships() {
        let corpus =
            Corpus::from_triplets(2, 2, vec![0, 1], vec![0, 1], vec![2.0, 1.0]).unwrap();
        let posteriors = array![[0.25, 0.75], [0.5, 0.5]];

        let mut memberships = Memberships::new(2, 2);
        let mut norm_doc = Array1::zeros(2);

        constrained_m_step(&corpus, &mut memberships, &posteriors, &mut norm_doc);

        assert_eq!(memberships.matrix(), &array![[0.25, 0.75], [0.5, 0.5]]);
    }
}
