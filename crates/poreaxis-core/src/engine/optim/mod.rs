//! Derivative-free optimisers over real vectors.
//!
//! Simulated annealing minimises a fallible closure `FnMut(&[f64]) -> Result<f64, E>`;
//! the simplex refiner minimises an argmin [`CostFunction`](argmin::core::CostFunction).
//! In both, the first error returned by the cost function aborts the run and is
//! handed back to the caller unchanged.

pub mod annealing;
pub mod simplex;

pub use annealing::{AnnealingOutcome, AnnealingStatus, SimulatedAnnealing};
pub use simplex::{SimplexOutcome, SimplexRefiner};
