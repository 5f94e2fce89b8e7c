use std::fmt;
use std::str::FromStr;

use anyhow::{bail, ensure, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::structs::corpus::Corpus;
use crate::structs::memberships::Memberships;
use crate::structs::topics::Topics;

pub mod nmf;
pub mod nndsvd;
pub mod random;

/// The strategy used to seed the factor matrices before EM iteration
///
/// The strategy can be one of the following:
///
/// - `Random`: fills both matrices with uniform(0,1) draws
/// - `Nndsvd`: derives a non-negative pair from a truncated SVD
/// - `Nmf`: runs a bounded non-negative factorization and reuses its factors
/// - `Custom`: a caller-supplied pair, used as-is
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Init {
    Random,
    Nndsvd,
    Nmf,
    #[serde(skip)]
    Custom(Memberships, Topics),
}

impl Default for Init {
    fn default() -> Self {
        Init::Nndsvd
    }
}

impl FromStr for Init {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "random" => Ok(Init::Random),
            "nndsvd" => Ok(Init::Nndsvd),
            "nmf" => Ok(Init::Nmf),
            other => bail!("Unrecognized initialization mode {}", other),
        }
    }
}

impl fmt::Display for Init {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Init::Random => write!(f, "random"),
            Init::Nndsvd => write!(f, "nndsvd"),
            Init::Nmf => write!(f, "nmf"),
            Init::Custom(_, _) => write!(f, "custom"),
        }
    }
}

/// Produce the initial (document-topic, topic-word) pair for a corpus.
///
/// Dispatches on the [Init] strategy and row-normalizes both matrices
/// before returning them, regardless of strategy. Custom pairs are
/// shape-checked against the corpus and the requested number of topics
/// before any numeric work.
pub fn initialize(
    corpus: &Corpus,
    n_topics: usize,
    init: &Init,
    seed: u64,
) -> Result<(Memberships, Topics)> {
    ensure!(n_topics > 0, "The number of topics must be at least 1");

    let (mut memberships, mut topics) = match init {
        Init::Random => {
            let mut rng = StdRng::seed_from_u64(seed);
            let memberships =
                Memberships::from(random::generate(corpus.n_docs(), n_topics, &mut rng));
            let topics = Topics::from(random::generate(n_topics, corpus.n_words(), &mut rng));
            (memberships, topics)
        }
        Init::Nndsvd => nndsvd::generate(corpus, n_topics)?,
        Init::Nmf => nmf::generate(corpus, n_topics)?,
        Init::Custom(memberships, topics) => {
            ensure!(
                memberships.n_docs() == corpus.n_docs()
                    && memberships.n_topics() == n_topics,
                "Custom document-topic matrix has shape ({}, {}), expected ({}, {})",
                memberships.n_docs(),
                memberships.n_topics(),
                corpus.n_docs(),
                n_topics
            );
            ensure!(
                topics.n_topics() == n_topics && topics.n_words() == corpus.n_words(),
                "Custom topic-word matrix has shape ({}, {}), expected ({}, {})",
                topics.n_topics(),
                topics.n_words(),
                n_topics,
                corpus.n_words()
            );
            (memberships.clone(), topics.clone())
        }
    };

    memberships.normalize_rows();
    topics.normalize_rows();

    Ok((memberships, topics))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_from_str() {
        assert!(matches!("random".parse::<Init>().unwrap(), Init::Random));
        assert!(matches!("nndsvd".parse::<Init>().unwrap(), Init::Nndsvd));
        assert!(matches!("nmf".parse::<Init>().unwrap(), Init::Nmf));
        assert!("kmeans".parse::<Init>().is_err());
    }

    #[test]
    fn test_custom_pair_shape_mismatch() {
        let corpus =
            Corpus::from_triplets(2, 3, vec![0, 1], vec![0, 2], vec![1.0, 1.0]).unwrap();
        let memberships = Memberships::new(2, 2);
        let topics = Topics::new(2, 4);

        let result = initialize(&corpus, 2, &Init::Custom(memberships, topics), 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_topics_rejected() {
        let corpus = Corpus::from_triplets(1, 1, vec![0], vec![0], vec![1.0]).unwrap();
        assert!(initialize(&corpus, 0, &Init::Random, 0).is_err());
    }
}
