use anyhow::Result;

use crate::algorithms::{Algorithm, EmFit, EmRefit};
use crate::routines::initialization::Init;
use crate::routines::output::PlsaResult;
use crate::routines::settings::Settings;
use crate::structs::corpus::Corpus;
use crate::structs::memberships::Memberships;
use crate::structs::topics::Topics;

/// Fit a pLSA model to a corpus.
///
/// Runs EM from the initialization strategy configured in the settings
/// until the relative improvement in log-likelihood drops below the
/// tolerance, or the cycle budget is exhausted. When output is enabled in
/// the settings the result files are written before returning.
pub fn fit(corpus: &Corpus, settings: Settings) -> Result<PlsaResult> {
    let init = settings.config.init.clone();
    fit_with_init(corpus, init, settings)
}

/// Fit a pLSA model with an explicit initialization strategy.
///
/// This is the entrypoint for custom seeding: pass
/// [Init::Custom] with a caller-supplied matrix pair, for example to seed
/// from an ensemble result.
pub fn fit_with_init(corpus: &Corpus, init: Init, settings: Settings) -> Result<PlsaResult> {
    let write = settings.output.write;

    let mut algorithm = EmFit::new(corpus, init, settings)?;
    let result = algorithm.fit()?;

    tracing::info!(
        "Fit stopped after {} cycle(s): {}",
        result.cycles(),
        result.status()
    );

    if write {
        result.write_outputs()?;
    }

    Ok(result)
}

/// Re-estimate document-topic mixtures against a fixed topic set.
///
/// The topic matrix is never mutated; only the document-topic matrix is
/// estimated, seeded with row-normalized uniform draws. Used to embed new
/// documents into an already fitted model.
pub fn refit(corpus: &Corpus, topics: &Topics, settings: Settings) -> Result<Memberships> {
    let mut algorithm = EmRefit::new(corpus, topics, settings)?;
    let result = algorithm.fit()?;

    tracing::info!(
        "Refit stopped after {} cycle(s): {}",
        result.cycles(),
        result.status()
    );

    let (memberships, _) = result.into_matrices();
    Ok(memberships)
}
