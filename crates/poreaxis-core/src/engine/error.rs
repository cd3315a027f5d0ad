use super::config::ConfigError;
use crate::core::path::PathError;
use std::error::Error as StdError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Degenerate result: {0}")]
    DegenerateResult(String),

    #[error("Molecular path construction failed: {0}")]
    Path(#[from] PathError),

    #[error("Neighbour search failed: {0}")]
    NeighborSearch(#[source] Box<dyn StdError + Send + Sync>),

    #[error("Local refinement failed: {0}")]
    Refinement(String),
}

impl EngineError {
    pub(crate) fn neighbor_search<E: StdError + Send + Sync + 'static>(error: E) -> Self {
        Self::NeighborSearch(Box::new(error))
    }

    /// Maps a failure of the argmin refinement stage back onto the engine's errors.
    ///
    /// Lookup errors of the neighbour index `E` travel through argmin wrapped in
    /// its error type and are unwrapped here, so callers see the collaborator's
    /// error unchanged. Anything else is a solver failure.
    pub(crate) fn from_refinement<E: StdError + Send + Sync + 'static>(
        error: argmin::core::Error,
    ) -> Self {
        match error.downcast::<E>() {
            Ok(lookup) => Self::neighbor_search(lookup),
            Err(solver) => Self::Refinement(solver.to_string()),
        }
    }

    /// Checks whether the error only invalidates the current frame.
    ///
    /// Degenerate results (a path too short to fit a curve, a seed outside the
    /// structure) let a trajectory scan skip the frame and continue. All other
    /// errors are fatal for the whole analysis.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DegenerateResult(_) | Self::Path(_))
    }
}
