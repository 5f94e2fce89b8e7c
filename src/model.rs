use anyhow::{ensure, Context, Result};

use crate::entrypoints::{fit_with_init, refit};
use crate::routines::diagnostics;
use crate::routines::settings::Settings;
use crate::structs::corpus::Corpus;
use crate::structs::memberships::Memberships;
use crate::structs::topics::Topics;

/// An estimator-style wrapper around [crate::fit] and [crate::refit].
///
/// A [Plsa] holds the run settings, and after fitting also the topic set,
/// the document embedding and the training corpus. New documents are
/// embedded with [Plsa::transform], which refits them against the stored
/// topics; [Plsa::coherence] and [Plsa::log_lift] score the fitted topics
/// against the training data.
#[derive(Debug, Clone, Default)]
pub struct Plsa {
    settings: Settings,
    topics: Option<Topics>,
    memberships: Option<Memberships>,
    training: Option<Corpus>,
}

impl Plsa {
    pub fn new(settings: Settings) -> Self {
        Plsa {
            settings,
            topics: None,
            memberships: None,
            training: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The fitted topic-word matrix, if the model has been fitted
    pub fn topics(&self) -> Option<&Topics> {
        self.topics.as_ref()
    }

    /// The document-topic matrix of the training corpus, if fitted
    pub fn memberships(&self) -> Option<&Memberships> {
        self.memberships.as_ref()
    }

    /// Fit the model to a corpus, storing the factor matrices and the
    /// training corpus for later transforms and diagnostics.
    pub fn fit(&mut self, corpus: &Corpus) -> Result<()> {
        let init = self.settings.config.init.clone();
        let result = fit_with_init(corpus, init, self.settings.clone())?;

        let (memberships, topics) = result.into_matrices();
        self.memberships = Some(memberships);
        self.topics = Some(topics);
        self.training = Some(corpus.clone());
        Ok(())
    }

    /// Fit the model and return the document-topic matrix of the corpus.
    pub fn fit_transform(&mut self, corpus: &Corpus) -> Result<Memberships> {
        self.fit(corpus)?;
        Ok(self.fitted_memberships()?.clone())
    }

    /// Embed a corpus against the fitted topics.
    ///
    /// The corpus must share the vocabulary of the training data. The
    /// stored topic set is never mutated.
    pub fn transform(&self, corpus: &Corpus) -> Result<Memberships> {
        let topics = self.fitted_topics()?;
        refit(corpus, topics, self.settings.clone())
    }

    /// Coherence of one topic, or the mean over all topics when `topic` is
    /// `None`, scored over the top `n_words` words per topic.
    pub fn coherence(&self, topic: Option<usize>, n_words: usize) -> Result<f64> {
        let topics = self.fitted_topics()?;
        let corpus = self.training_corpus()?;

        match topic {
            Some(t) => {
                ensure!(
                    t < topics.n_topics(),
                    "Topic number must be in range 0 to {}",
                    topics.n_topics()
                );
                Ok(diagnostics::coherence(topics, t, corpus, n_words))
            }
            None => Ok(diagnostics::mean_coherence(topics, corpus, n_words)),
        }
    }

    /// Log-lift of one topic, or the mean over all topics when `topic` is
    /// `None`, scored over the top `n_words` words per topic.
    pub fn log_lift(&self, topic: Option<usize>, n_words: usize) -> Result<f64> {
        let topics = self.fitted_topics()?;
        let corpus = self.training_corpus()?;

        match topic {
            Some(t) => {
                ensure!(
                    t < topics.n_topics(),
                    "Topic number must be in range 0 to {}",
                    topics.n_topics()
                );
                Ok(diagnostics::log_lift(topics, t, corpus, n_words))
            }
            None => Ok(diagnostics::mean_log_lift(topics, corpus, n_words)),
        }
    }

    fn fitted_topics(&self) -> Result<&Topics> {
        self.topics.as_ref().context("The model has not been fitted")
    }

    fn fitted_memberships(&self) -> Result<&Memberships> {
        self.memberships
            .as_ref()
            .context("The model has not been fitted")
    }

    fn training_corpus(&self) -> Result<&Corpus> {
        self.training
            .as_ref()
            .context("The model has not been fitted")
    }
}
