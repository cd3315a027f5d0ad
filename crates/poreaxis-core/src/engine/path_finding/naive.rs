use super::PathFinder;
use crate::core::models::path_point::{PathPoint, RawPath};
use crate::core::utils::geometry::DirectionFrame;
use crate::engine::config::{ConfigError, PathFindingConfig};
use crate::engine::error::EngineError;

/// Marches straight along the channel direction with a constant probe radius.
///
/// No atom is ever consulted; the path is the axis through the seed sampled
/// every step length, `max_probe_steps` times on each side.
pub struct NaiveCylindricalPathFinder<'a> {
    config: &'a PathFindingConfig,
}

impl<'a> NaiveCylindricalPathFinder<'a> {
    pub fn new(config: &'a PathFindingConfig) -> Self {
        Self { config }
    }
}

impl PathFinder for NaiveCylindricalPathFinder<'_> {
    fn find_path(&self) -> Result<RawPath, EngineError> {
        let frame = DirectionFrame::new(&self.config.channel_direction).ok_or(
            ConfigError::InvalidParameter {
                name: "channel_direction",
                reason: "must be a finite vector of non-zero length".to_string(),
            },
        )?;
        let steps = self.config.max_probe_steps as i64;
        Ok((-steps..=steps)
            .map(|k| {
                PathPoint::new(
                    frame.advance(&self.config.seed_position, k as f64 * self.config.step_length),
                    self.config.probe_radius,
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::{PathFindingConfigBuilder, PathFindingMethod};
    use nalgebra::{Point3, Vector3};

    #[test]
    fn samples_the_axis_through_the_seed() {
        let config = PathFindingConfigBuilder::new()
            .method(PathFindingMethod::NaiveCylindrical)
            .seed_position(Point3::new(1.0, 1.0, 1.0))
            .channel_direction(Vector3::new(0.0, 2.0, 0.0))
            .step_length(0.5)
            .probe_radius(0.3)
            .max_probe_steps(3)
            .build()
            .unwrap();

        let path = NaiveCylindricalPathFinder::new(&config).find_path().unwrap();

        assert_eq!(path.len(), 7);
        assert_eq!(path[3].position, Point3::new(1.0, 1.0, 1.0));
        assert!((path[0].position.y - -0.5).abs() < 1e-12);
        assert!((path[6].position.y - 2.5).abs() < 1e-12);
        for pair in path.windows(2) {
            assert!((pair[1].position - pair[0].position - Vector3::new(0.0, 0.5, 0.0)).norm() < 1e-12);
        }
        assert!(path.iter().all(|p| p.radius == 0.3));
    }

    #[test]
    fn zero_steps_yield_only_the_seed() {
        let config = PathFindingConfigBuilder::new()
            .seed_position(Point3::origin())
            .channel_direction(Vector3::x())
            .max_probe_steps(0)
            .build()
            .unwrap();

        let path = NaiveCylindricalPathFinder::new(&config).find_path().unwrap();
        assert_eq!(path, vec![PathPoint::new(Point3::origin(), 0.0)]);
    }
}
