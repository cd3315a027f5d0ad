//! # Poreaxis Core Library
//!
//! Locates the central axis and local bore radius of a tubular void (a pore or
//! channel) threading through a cloud of van-der-Waals spheres, and exposes the
//! result as a continuous, queryable centre line with a radius profile.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`AtomSphere`, `PathPoint`),
//!   the neighbour-search abstraction, van-der-Waals radius lookup, the
//!   `MolecularPath` curve and simple I/O helpers.
//!
//! - **[`engine`]: The Logic Core.** The stateful optimisation machinery: the
//!   simulated-annealing optimiser, the local simplex refiner, the void-radius
//!   evaluator and the marching path finders, together with their configuration,
//!   error types and progress reporting.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together to turn one
//!   frame (or a whole trajectory of frames) into finished molecular paths.

pub mod core;
pub mod engine;
pub mod workflows;
