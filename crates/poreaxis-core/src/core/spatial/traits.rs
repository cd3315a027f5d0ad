use crate::core::models::atom::AtomSphere;
use nalgebra::Point3;
use std::error::Error;

/// Defines the interface for spatial neighbour lookups over atom spheres.
///
/// Implementations must be immutable views of one frame so that they can be
/// shared between optimiser runs without synchronisation.
pub trait NeighborSearch {
    /// The error type for failed lookups.
    ///
    /// Errors are surfaced to callers of the path-finding engine unchanged.
    type Error: Error + Send + Sync + 'static;

    /// Returns every atom whose centre lies within `cutoff` of `point`.
    ///
    /// # Arguments
    ///
    /// * `point` - The query point.
    /// * `cutoff` - The search radius around `point` in Angstroms.
    ///
    /// # Return
    ///
    /// The neighbouring atom spheres in no particular order.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot resolve a candidate to an atom.
    fn neighbors(&self, point: &Point3<f64>, cutoff: f64) -> Result<Vec<AtomSphere>, Self::Error>;

    /// Returns the largest van der Waals radius among the indexed atoms.
    fn max_radius(&self) -> f64;

    /// Returns the number of indexed atoms.
    fn len(&self) -> usize;

    /// Checks whether the index holds no atoms.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
