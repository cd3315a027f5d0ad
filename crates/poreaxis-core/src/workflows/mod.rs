//! # Workflows Module
//!
//! High-level entry points that run the complete pore analysis pipeline.
//!
//! ## Overview
//!
//! A workflow validates a frame, builds its neighbour index, selects and runs the
//! configured path-finding strategy and fits the resulting support points into a
//! [`MolecularPath`](crate::core::path::MolecularPath). Progress is reported
//! through a [`ProgressReporter`](crate::engine::progress::ProgressReporter).
//!
//! ## Architecture
//!
//! - **Pore Workflow** ([`pore`]) - Single-frame analysis and trajectory scans
//!   that process independent frames in parallel.

pub mod pore;
