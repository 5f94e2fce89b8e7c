use anyhow::{ensure, Result};
use ndarray::{Array1, Array2};

use crate::algorithms::{Algorithm, Status};
use crate::routines::evaluation::likelihood::log_likelihood;
use crate::routines::evaluation::posterior::e_step;
use crate::routines::initialization::{initialize, Init};
use crate::routines::optimization::maximization::m_step;
use crate::routines::output::{Cycle, CycleLog, PlsaResult};
use crate::routines::settings::Settings;
use crate::structs::corpus::Corpus;
use crate::structs::memberships::Memberships;
use crate::structs::topics::Topics;

/// Fits both factor matrices of a pLSA model by sparse EM.
///
/// After initialization the engine alternates expectation and maximization
/// steps, recomputing the corpus log-likelihood every
/// `cycles_per_test` cycles. The run stops once the relative improvement
/// drops below the configured tolerance, or when the cycle budget is
/// exhausted. Both terminal states carry the current factor matrices; the
/// [Status] on the result records which stopping condition was hit.
///
/// The posterior matrix and both normalization accumulators are allocated
/// once per engine and reused across cycles.
pub struct EmFit<'a> {
    corpus: &'a Corpus,
    init: Init,
    settings: Settings,
    memberships: Memberships,
    topics: Topics,
    posteriors: Array2<f64>,
    norm_topic: Array1<f64>,
    norm_doc: Array1<f64>,
    last_objf: f64,
    objf: f64,
    cycle: usize,
    status: Status,
    cycle_log: CycleLog,
}

impl<'a> EmFit<'a> {
    /// Creates a new fitting engine for a corpus.
    ///
    /// Configuration is validated here, before any matrix is allocated.
    pub fn new(corpus: &'a Corpus, init: Init, settings: Settings) -> Result<Self> {
        ensure!(
            settings.fit.cycles_per_test > 0,
            "The number of cycles per convergence test must be at least 1"
        );

        Ok(Self {
            corpus,
            init,
            settings,
            memberships: Memberships::new(0, 0),
            topics: Topics::new(0, 0),
            posteriors: Array2::zeros((0, 0)),
            norm_topic: Array1::zeros(0),
            norm_doc: Array1::zeros(0),
            last_objf: f64::NEG_INFINITY,
            objf: f64::NEG_INFINITY,
            cycle: 0,
            status: Status::Starting,
            cycle_log: CycleLog::new(),
        })
    }

    fn initialize(&mut self) -> Result<()> {
        let n_topics = self.settings.config.n_topics;

        let (memberships, topics) = initialize(
            self.corpus,
            n_topics,
            &self.init,
            self.settings.config.seed,
        )?;
        self.memberships = memberships;
        self.topics = topics;

        self.posteriors = Array2::zeros((self.corpus.nnz(), n_topics));
        self.norm_topic = Array1::zeros(n_topics);
        self.norm_doc = Array1::zeros(self.corpus.n_docs());

        self.objf = log_likelihood(self.corpus, &self.topics, &self.memberships);
        self.last_objf = self.objf;
        self.status = Status::InProgress;

        tracing::debug!(
            "Initialized {} topics with the {} strategy, log-likelihood {:.4}",
            n_topics,
            self.init,
            self.objf
        );
        Ok(())
    }

    fn run(&mut self) -> Result<PlsaResult> {
        self.initialize()?;

        for i in 0..self.settings.fit.cycles {
            self.cycle = i + 1;
            let cycle_span = tracing::span!(tracing::Level::DEBUG, "Cycle", cycle = self.cycle);
            let _enter = cycle_span.enter();

            e_step(
                self.corpus,
                &self.topics,
                &self.memberships,
                &mut self.posteriors,
                self.settings.fit.probability_threshold,
            );
            m_step(
                self.corpus,
                &mut self.topics,
                &mut self.memberships,
                &self.posteriors,
                &mut self.norm_topic,
                &mut self.norm_doc,
            );

            if i % self.settings.fit.cycles_per_test == 0 {
                let objf = log_likelihood(self.corpus, &self.topics, &self.memberships);
                let delta = (objf - self.last_objf).abs();

                // EM increases the log-likelihood; a decrease signals a
                // degenerate model state
                if objf < self.last_objf {
                    tracing::warn!(
                        "Log-likelihood decreased from {:.4} to {:.4}",
                        self.last_objf,
                        objf
                    );
                }
                tracing::debug!("Log-likelihood = {:.4}", objf);

                self.objf = objf;
                self.cycle_log.push(Cycle {
                    cycle: self.cycle,
                    log_likelihood: objf,
                    delta,
                });

                if delta / objf.abs() < self.settings.fit.tolerance {
                    tracing::info!("Log-likelihood convergence reached");
                    self.status = Status::Converged;
                    break;
                }
                self.last_objf = objf;
            }
        }

        if self.status != Status::Converged {
            tracing::info!("Maximum number of cycles reached");
            self.status = Status::MaxCycles;
        }

        Ok(self.to_result())
    }
}

impl Algorithm for EmFit<'_> {
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
