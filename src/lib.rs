//! Building blocks for fitting probabilistic Latent Semantic Analysis (pLSA)
//! models to sparse document-word count data.
//!
//! The crate exposes two entrypoints: [fit], which estimates both the
//! topic-word and document-topic distributions of a pLSA model by sparse
//! Expectation-Maximization, and [refit], which re-estimates document-topic
//! distributions against an already fitted set of topics. The [model::Plsa]
//! wrapper bundles both behind a fit/transform API.

pub mod algorithms;
pub mod model;
pub mod routines;
pub mod structs;

mod entrypoints;
pub use entrypoints::{fit, fit_with_init, refit};

pub mod prelude {
    pub use crate::algorithms::{Algorithm, Status};
    pub use crate::entrypoints::{fit, fit_with_init, refit};
    pub use crate::model::Plsa;
    pub use crate::routines::diagnostics;
    pub use crate::routines::initialization::Init;
    pub use crate::routines::logger::setup_log;
    pub use crate::routines::output::PlsaResult;
    pub use crate::routines::settings::{read_settings, Settings};
    pub use crate::structs::corpus::Corpus;
    pub use crate::structs::memberships::Memberships;
    pub use crate::structs::topics::Topics;
}
