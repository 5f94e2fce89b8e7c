use anyhow::{ensure, Result};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::algorithms::{Algorithm, Status};
use crate::routines::evaluation::likelihood::log_likelihood;
use crate::routines::evaluation::posterior::e_step;
use crate::routines::initialization::random;
use crate::routines::optimization::maximization::constrained_m_step;
use crate::routines::output::{Cycle, CycleLog, PlsaResult};
use crate::routines::settings::Settings;
use crate::structs::corpus::Corpus;
use crate::structs::memberships::Memberships;
use crate::structs::topics::Topics;

/// Re-estimates document-topic mixtures against a fixed topic set.
///
/// The topic-word matrix is supplied by the caller and never mutated; only
/// the document-topic matrix is seeded (uniform draws, row-normalized) and
/// re-estimated, so the iteration budget defaults are smaller and the test
/// cadence tighter than for a full fit.
///
/// The convergence check only runs its relative-improvement test while the
/// current log-likelihood is strictly positive. Count data yields
/// non-positive log-likelihoods, so refits typically run their full cycle
/// budget; this mirrors the behavior of the reference implementation and is
/// deliberately left as is.
pub struct EmRefit<'a> {
    corpus: &'a Corpus,
    topics: &'a Topics,
    settings: Settings,
    memberships: Memberships,
    posteriors: Array2<f64>,
    norm_doc: Array1<f64>,
    last_objf: f64,
    objf: f64,
    cycle: usize,
    status: Status,
    cycle_log: CycleLog,
}

impl<'a> EmRefit<'a> {
    /// Creates a new refitting engine for a corpus and a fixed topic set.
    ///
    /// Configuration and shapes are validated here, before any matrix is
    /// allocated.
    pub fn new(corpus: &'a Corpus, topics: &'a Topics, settings: Settings) -> Result<Self> {
        ensure!(
            settings.refit.cycles_per_test > 0,
            "The number of cycles per convergence test must be at least 1"
        );
        ensure!(topics.n_topics() > 0, "The topic set must not be empty");
        ensure!(
            topics.n_words() == corpus.n_words(),
            "The topic set covers {} words but the corpus has {}",
            topics.n_words(),
            corpus.n_words()
        );

        Ok(Self {
            corpus,
            topics,
            settings,
            memberships: Memberships::new(0, 0),
            posteriors: Array2::zeros((0, 0)),
            norm_doc: Array1::zeros(0),
            last_objf: f64::NEG_INFINITY,
            objf: f64::NEG_INFINITY,
            cycle: 0,
            status: Status::Starting,
            cycle_log: CycleLog::new(),
        })
    }

    fn initialize(&mut self) {
        let n_topics = self.topics.n_topics();

        let mut rng = StdRng::seed_from_u64(self.settings.config.seed);
        let mut memberships =
            Memberships::from(random::generate(self.corpus.n_docs(), n_topics, &mut rng));
        memberships.normalize_rows();
        self.memberships = memberships;

        self.posteriors = Array2::zeros((self.corpus.nnz(), n_topics));
        self.norm_doc = Array1::zeros(self.corpus.n_docs());

        self.objf = log_likelihood(self.corpus, self.topics, &self.memberships);
        self.last_objf = self.objf;
        self.status = Status::InProgress;

        tracing::debug!(
            "Refitting {} documents against {} fixed topics, log-likelihood {:.4}",
            self.corpus.n_docs(),
            n_topics,
            self.objf
        );
    }

    fn run(&mut self) -> Result<PlsaResult> {
        self.initialize();

        for i in 0..self.settings.refit.cycles {
            self.cycle = i + 1;
            let cycle_span = tracing::span!(tracing::Level::DEBUG, "Cycle", cycle = self.cycle);
            let _enter = cycle_span.enter();

            e_step(
                self.corpus,
                self.topics,
                &self.memberships,
                &mut self.posteriors,
                self.settings.refit.probability_threshold,
            );
            constrained_m_step(
                self.corpus,
                &mut self.memberships,
                &self.posteriors,
                &mut self.norm_doc,
            );

            if i % self.settings.refit.cycles_per_test == 0 {
                let objf = log_likelihood(self.corpus, self.topics, &self.memberships);
                let delta = (objf - self.last_objf).abs();

                tracing::debug!("Log-likelihood = {:.4}", objf);

                self.objf = objf;
                self.cycle_log.push(Cycle {
                    cycle: self.cycle,
                    log_likelihood: objf,
                    delta,
                });

                if objf > 0.0 {
                    if delta / objf.abs() < self.settings.refit.tolerance {
                        tracing::info!("Log-likelihood convergence reached");
                        self.status = Status::Converged;
                        break;
                    }
                    self.last_objf = objf;
                }
            }
        }

        if self.status != Status::Converged {
            tracing::debug!("Maximum number of cycles reached");
            self.status = Status::MaxCycles;
        }

        Ok(self.to_result())
    }
}

impl Algorithm for EmRefit<'_> {
    fn fit(&mut self) -> Result<PlsaResult> {
        self.run()
    }

    fn to_result(&self) -> PlsaResult {
        PlsaResult::new(
            self.memberships.clone(),
            self.topics.clone(),
            self.objf,
            self.cycle,
            self.status.clone(),
            self.cycle_log.clone(),
            self.settings.clone(),
        )
    }

    fn status(&self) -> &Status {
        &self.status
    }
}
