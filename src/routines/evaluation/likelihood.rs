use crate::structs::corpus::Corpus;
use crate::structs::memberships::Memberships;
use crate::structs::topics::Topics;

/// Log-likelihood of the corpus under the current model.
///
/// For every nonzero entry (d, w, x) the modeled probability of the pair is
/// `p = sum_z P(w|z)P(z|d)`, and the function returns
///
/// ```text
/// sum_{d,w} x * ln(p)
/// ```
///
/// Only nonzero entries are visited. Used for convergence testing by the
/// fitting engines and available for external diagnostics.
///
/// If some observed pair has modeled probability exactly zero the logarithm
/// is negative infinity, which propagates into the returned total and the
/// convergence comparison rather than being intercepted here.
pub fn log_likelihood(corpus: &Corpus, topics: &Topics, memberships: &Memberships) -> f64 {
    let k = topics.n_topics();
    let topic_word = topics.matrix();
    let doc_topic = memberships.matrix();

    let mut result = 0.0;
    for (d, w, x) in corpus.entries() {
        let mut p = 0.0;
        for z in 0..k {
            p += topic_word[[z, w]] * doc_topic[[d, z]];
        }
        result += x * p.ln();
    }

    result
}
