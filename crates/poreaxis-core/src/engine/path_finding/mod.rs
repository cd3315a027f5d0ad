//! Strategies that march through a pore and produce its raw support points.

mod naive;
mod probe;

pub use naive::NaiveCylindricalPathFinder;
pub use probe::{MarchPhase, ProbePathFinder};

use super::config::{PathFindingConfig, PathFindingMethod};
use super::error::EngineError;
use crate::core::models::path_point::RawPath;
use crate::core::spatial::NeighborSearch;
use tracing::warn;

/// A path-finding strategy bound to one frame.
pub trait PathFinder {
    /// Runs the strategy and returns the support points ordered along the
    /// channel direction.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] for an unusable direction,
    /// [`EngineError::DegenerateResult`] if the frame does not admit a path and
    /// [`EngineError::NeighborSearch`] if the neighbour index fails.
    fn find_path(&self) -> Result<RawPath, EngineError>;
}

/// Builds the strategy selected by `config.method` for the frame behind `index`.
///
/// The neighbour cutoff is resolved here: an explicit cutoff is used as given,
/// otherwise it is the maximum probe radius plus twice the largest atom radius
/// of the frame.
pub fn build_path_finder<'a, N: NeighborSearch>(
    config: &'a PathFindingConfig,
    index: &'a N,
) -> Result<Box<dyn PathFinder + 'a>, EngineError> {
    config.validate()?;
    match config.method {
        PathFindingMethod::InplaneOptimised => {
            let cutoff = config.resolve_neighbor_cutoff(index.max_radius());
            if cutoff <= config.max_probe_radius {
                warn!(
                    cutoff,
                    max_probe_radius = config.max_probe_radius,
                    "Neighbour cutoff does not exceed the maximum probe radius; the probe can never leave the pore."
                );
            }
            Ok(Box::new(ProbePathFinder::new(config, index, cutoff)?))
        }
        PathFindingMethod::NaiveCylindrical => Ok(Box::new(NaiveCylindricalPathFinder::new(config))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::AtomSphere;
    use crate::core::spatial::KdTreeNeighborSearch;
    use crate::engine::config::{ConfigError, PathFindingConfigBuilder};
    use nalgebra::{Point3, Vector3};

    #[test]
    fn factory_selects_strategy_by_method() {
        let index = KdTreeNeighborSearch::new(vec![AtomSphere::new(Point3::new(2.0, 0.0, 0.0), 1.0)]);
        let config = PathFindingConfigBuilder::new()
            .method(PathFindingMethod::NaiveCylindrical)
            .seed_position(Point3::origin())
            .channel_direction(Vector3::z())
            .probe_radius(0.7)
            .max_probe_steps(2)
            .build()
            .unwrap();

        let path = build_path_finder(&config, &index).unwrap().find_path().unwrap();

        assert_eq!(path.len(), 5);
        assert!(path.iter().all(|p| p.radius == 0.7));
    }

    #[test]
    fn factory_rejects_invalid_configuration() {
        let index = KdTreeNeighborSearch::new(Vec::new());
        let mut config = PathFindingConfigBuilder::new()
            .seed_position(Point3::origin())
            .channel_direction(Vector3::z())
            .build()
            .unwrap();
        config.step_length = -1.0;

        let error = build_path_finder(&config, &index).err().unwrap();
        assert!(matches!(
            error,
            EngineError::Config(ConfigError::InvalidParameter {
                name: "step_length",
                ..
            })
        ));
    }
}
