//! # Engine Module
//!
//! The stateful optimisation machinery that turns one frame of atom spheres into
//! an ordered list of pore support points.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Every tunable of the path finder, the annealing
//!   schedule and the local refiner, validated eagerly on construction
//! - **Error Handling** ([`error`]) - Engine-specific error types, split into fatal
//!   configuration errors and recoverable degenerate results
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Optimisers** ([`optim`]) - Simulated annealing and Nelder–Mead simplex search
//!   over real vectors
//! - **Void Radius** ([`void_radius`]) - Clearance evaluation and the two-stage
//!   global-then-local maximisation of the free radius in a cross-section
//! - **Path Finding** ([`path_finding`]) - The marching strategies producing a raw path
//!
//! Within a frame everything runs sequentially: each marching step starts from
//! the previous step's optimum. Randomness is seeded per optimiser run, so runs
//! over different frames are independent and reproducible.

pub mod config;
pub mod error;
pub mod optim;
pub mod path_finding;
pub mod progress;
pub mod void_radius;
