use super::config::{AnnealingConfig, ConfigError, SimplexConfig};
use super::error::EngineError;
use super::optim::{AnnealingStatus, SimplexRefiner, SimulatedAnnealing};
use crate::core::models::path_point::PathPoint;
use crate::core::spatial::NeighborSearch;
use crate::core::utils::geometry::DirectionFrame;
use argmin::core::{CostFunction, Error};
use nalgebra::Point3;
use tracing::trace;

/// Free radius at `point`: the distance to the nearest atom surface.
///
/// Only atoms reported by `index` within `cutoff` are considered. If there are
/// none, the probe is outside the structure and the result is `cutoff` itself.
///
/// # Errors
///
/// Propagates the error of the neighbour lookup.
pub fn clearance<N: NeighborSearch>(
    point: &Point3<f64>,
    index: &N,
    cutoff: f64,
) -> Result<f64, N::Error> {
    let neighbors = index.neighbors(point, cutoff)?;
    Ok(neighbors
        .iter()
        .map(|atom| atom.surface_distance(point))
        .fold(cutoff, f64::min))
}

/// Negated free radius over the in-plane coordinates `(a, b)` of one cross-section.
struct InPlaneClearance<'p, N> {
    index: &'p N,
    cutoff: f64,
    plane_origin: &'p Point3<f64>,
    frame: &'p DirectionFrame,
}

impl<N: NeighborSearch> InPlaneClearance<'_, N> {
    fn evaluate(&self, state: &[f64]) -> Result<f64, N::Error> {
        let point = self.frame.plane_to_point(self.plane_origin, state[0], state[1]);
        clearance(&point, self.index, self.cutoff).map(|radius| -radius)
    }
}

impl<N: NeighborSearch> CostFunction for InPlaneClearance<'_, N> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, state: &Vec<f64>) -> Result<f64, Error> {
        self.evaluate(state).map_err(Error::new)
    }
}

/// The optimum of one cross-section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaximisedVoid {
    pub point: PathPoint,
    /// Termination status of the global stage.
    pub annealing_status: AnnealingStatus,
    /// Whether the local refinement improved on the global stage.
    pub refined: bool,
}

/// Evaluates and maximises the free radius against one frame's neighbour index.
pub struct VoidRadiusEvaluator<'a, N: NeighborSearch> {
    index: &'a N,
    cutoff: f64,
    annealer: SimulatedAnnealing,
    refiner: SimplexRefiner,
}

impl<'a, N: NeighborSearch> VoidRadiusEvaluator<'a, N> {
    pub fn new(
        index: &'a N,
        cutoff: f64,
        annealing: AnnealingConfig,
        simplex: SimplexConfig,
    ) -> Result<Self, ConfigError> {
        if !(cutoff.is_finite() && cutoff > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "neighbor_cutoff",
                reason: format!("must be a finite positive number (got {})", cutoff),
            });
        }
        Ok(Self {
            index,
            cutoff,
            annealer: SimulatedAnnealing::new(annealing)?,
            refiner: SimplexRefiner::new(simplex)?,
        })
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn clearance(&self, point: &Point3<f64>) -> Result<f64, EngineError> {
        clearance(point, self.index, self.cutoff).map_err(EngineError::neighbor_search)
    }

    /// Checks whether any atom lies within the cutoff of `point`.
    pub fn has_neighbors(&self, point: &Point3<f64>) -> Result<bool, EngineError> {
        self.index
            .neighbors(point, self.cutoff)
            .map(|neighbors| !neighbors.is_empty())
            .map_err(EngineError::neighbor_search)
    }

    fn cross_section<'p>(
        &'p self,
        plane_origin: &'p Point3<f64>,
        frame: &'p DirectionFrame,
    ) -> InPlaneClearance<'p, N> {
        InPlaneClearance {
            index: self.index,
            cutoff: self.cutoff,
            plane_origin,
            frame,
        }
    }

    /// Finds the point of largest free radius in the plane through `plane_origin`
    /// orthogonal to the frame's direction.
    ///
    /// Simulated annealing over the in-plane coordinates locates the global
    /// basin; argmin's Nelder–Mead started from its best point then sharpens the
    /// optimum. The stage with the higher clearance supplies the result.
    ///
    /// # Arguments
    ///
    /// * `plane_origin` - Origin of the cross-section, in-plane coordinate `(0, 0)`.
    /// * `frame` - Frame whose `u`/`w` vectors span the cross-section.
    ///
    /// # Return
    ///
    /// The optimised point with its free radius.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NeighborSearch`] if a neighbour lookup fails.
    pub fn maximise_void_radius(
        &self,
        plane_origin: &Point3<f64>,
        frame: &DirectionFrame,
    ) -> Result<MaximisedVoid, EngineError> {
        let section = self.cross_section(plane_origin, frame);
        let global = self.annealer.anneal(&[0.0, 0.0], |state| {
            section.evaluate(state).map_err(EngineError::neighbor_search)
        })?;
        let local = self
            .refiner
            .minimize(section, &global.best_state)
            .map_err(EngineError::from_refinement::<N::Error>)?;

        let refined = local.best_cost <= global.best_cost;
        let (state, radius) = if refined {
            (local.best_state, -local.best_cost)
        } else {
            (global.best_state, -global.best_cost)
        };

        trace!(
            annealing_radius = -global.best_cost,
            refined_radius = -local.best_cost,
            annealing_stages = global.cooling_iterations,
            "Cross-section optimised."
        );

        Ok(MaximisedVoid {
            point: PathPoint::new(frame.plane_to_point(plane_origin, state[0], state[1]), radius),
            annealing_status: global.status,
            refined,
        })
    }
}
