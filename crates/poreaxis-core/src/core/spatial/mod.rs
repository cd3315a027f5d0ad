//! Neighbour queries against the atom spheres of one frame.
//!
//! The path-finding engine never scans a frame's atoms directly; it asks a
//! [`NeighborSearch`] implementation for the candidates around a point. A
//! kd-tree backed implementation is bundled, but any index (e.g. one owned by a
//! surrounding trajectory-analysis driver) can be plugged in.

pub mod kdtree;
pub mod traits;

pub use kdtree::{KdTreeNeighborSearch, NeighborSearchError};
pub use traits::NeighborSearch;
