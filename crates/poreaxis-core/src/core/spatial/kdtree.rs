use super::traits::NeighborSearch;
use crate::core::models::atom::AtomSphere;
use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Point3;
use thiserror::Error;

/// Relative widening of the kd-tree query radius.
const BOUNDARY_SLACK: f64 = 1e-9;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NeighborSearchError {
    #[error("Spatial index returned item {index}, which does not map onto any atom")]
    UnmappedAtom { index: u64 },
}

/// A neighbour index over one frame's atom spheres backed by a kd-tree.
pub struct KdTreeNeighborSearch {
    atoms: Vec<AtomSphere>,
    tree: KdTree<f64, 3>,
    max_radius: f64,
}

impl KdTreeNeighborSearch {
    pub fn new(atoms: Vec<AtomSphere>) -> Self {
        let mut tree: KdTree<f64, 3> = KdTree::with_capacity(atoms.len().max(1));
        for (index, atom) in atoms.iter().enumerate() {
            tree.add(
                &[atom.position.x, atom.position.y, atom.position.z],
                index as u64,
            );
        }
        let max_radius = atoms.iter().map(|a| a.radius).fold(0.0, f64::max);

        Self {
            atoms,
            tree,
            max_radius,
        }
    }
}

impl NeighborSearch for KdTreeNeighborSearch {
    type Error = NeighborSearchError;

    fn neighbors(&self, point: &Point3<f64>, cutoff: f64) -> Result<Vec<AtomSphere>, Self::Error> {
        if self.atoms.is_empty() {
            return Ok(Vec::new());
        }

        // kiddo's radius query is exclusive; widen it and apply the inclusive
        // bound on the exact squared distance instead.
        let cutoff_sq = cutoff * cutoff;
        let query_sq = cutoff_sq * (1.0 + BOUNDARY_SLACK) + f64::MIN_POSITIVE;

        let mut neighbors = Vec::new();
        for nearest in self
            .tree
            .within_unsorted::<SquaredEuclidean>(&[point.x, point.y, point.z], query_sq)
        {
            let atom = self
                .atoms
                .get(nearest.item as usize)
                .copied()
                .ok_or(NeighborSearchError::UnmappedAtom {
                    index: nearest.item,
                })?;
            if (atom.position - point).norm_squared() <= cutoff_sq {
                neighbors.push(atom);
            }
        }
        Ok(neighbors)
    }

    fn max_radius(&self) -> f64 {
        self.max_radius
    }

    fn len(&self) -> usize {
        self.atoms.len()
    }
}
