use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::routines::output::PlsaResult;

pub mod em;
pub mod refit;

pub use em::EmFit;
pub use refit::EmRefit;

/// A cycle-driven fitting algorithm.
///
/// Implementors own their corpus view and scratch buffers, run EM cycles
/// until a stopping condition is met, and summarize the run as a
/// [PlsaResult].
pub trait Algorithm {
    fn fit(&mut self) -> Result<PlsaResult>;
    fn to_result(&self) -> PlsaResult;
    fn status(&self) -> &Status;
}

/// Represents the status of the algorithm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// Algorithm is starting up
    Starting,
    /// Algorithm is currently running
    InProgress,
    /// Algorithm has converged to a solution
    Converged,
    /// Algorithm stopped due to reaching maximum cycles
    MaxCycles,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Starting => write!(f, "Starting"),
            Status::InProgress => write!(f, "In progress"),
            Status::Converged => write!(f, "Converged"),
            Status::MaxCycles => write!(f, "Maximum cycles reached"),
        }
    }
}
