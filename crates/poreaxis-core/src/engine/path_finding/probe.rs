use super::PathFinder;
use crate::core::models::path_point::{PathPoint, RawPath};
use crate::core::spatial::NeighborSearch;
use crate::core::utils::geometry::DirectionFrame;
use crate::engine::config::{ConfigError, PathFindingConfig};
use crate::engine::error::EngineError;
use crate::engine::optim::AnnealingStatus;
use crate::engine::void_radius::VoidRadiusEvaluator;
use nalgebra::Point3;
use tracing::{debug, trace, warn};

/// Phases of a marching run, in the order they are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarchPhase {
    Init,
    OptimizeSeed,
    AdvanceForward,
    ReverseAccumulator,
    AdvanceBackward,
    Done,
}

enum March {
    Init,
    OptimizeSeed {
        frame: DirectionFrame,
    },
    AdvanceForward {
        frame: DirectionFrame,
        seed: PathPoint,
        path: RawPath,
    },
    ReverseAccumulator {
        frame: DirectionFrame,
        seed: PathPoint,
        path: RawPath,
    },
    AdvanceBackward {
        frame: DirectionFrame,
        seed: PathPoint,
        path: RawPath,
    },
    Done {
        path: RawPath,
    },
}

impl March {
    fn phase(&self) -> MarchPhase {
        match self {
            March::Init => MarchPhase::Init,
            March::OptimizeSeed { .. } => MarchPhase::OptimizeSeed,
            March::AdvanceForward { .. } => MarchPhase::AdvanceForward,
            March::ReverseAccumulator { .. } => MarchPhase::ReverseAccumulator,
            March::AdvanceBackward { .. } => MarchPhase::AdvanceBackward,
            March::Done { .. } => MarchPhase::Done,
        }
    }
}

/// Marches a probe through the pore, maximising the free radius in every
/// cross-section.
///
/// Starting from the optimised seed, the probe advances one step length along
/// the channel direction at a time. Each new cross-section is the plane through
/// the previous optimum shifted by one step; within it the probe moves to the
/// point of largest free radius. A side ends once the free radius exceeds the
/// maximum probe radius or the step budget is spent. The same is then done in
/// the opposite direction and both halves are joined at the seed.
pub struct ProbePathFinder<'a, N: NeighborSearch> {
    config: &'a PathFindingConfig,
    evaluator: VoidRadiusEvaluator<'a, N>,
}

impl<'a, N: NeighborSearch> ProbePathFinder<'a, N> {
    pub fn new(config: &'a PathFindingConfig, index: &'a N, cutoff: f64) -> Result<Self, ConfigError> {
        let evaluator = VoidRadiusEvaluator::new(
            index,
            cutoff,
            config.annealing.clone(),
            config.simplex.clone(),
        )?;
        Ok(Self { config, evaluator })
    }

    fn step(&self, state: March) -> Result<March, EngineError> {
        Ok(match state {
            March::Init => {
                let frame = DirectionFrame::new(&self.config.channel_direction).ok_or(
                    ConfigError::InvalidParameter {
                        name: "channel_direction",
                        reason: "must be a finite vector of non-zero length".to_string(),
                    },
                )?;
                March::OptimizeSeed { frame }
            }
            March::OptimizeSeed { frame } => {
                let seed_position = self.config.seed_position;
                if !self.evaluator.has_neighbors(&seed_position)? {
                    return Err(EngineError::DegenerateResult(format!(
                        "no atom lies within {} of the seed position ({}, {}, {})",
                        self.evaluator.cutoff(),
                        seed_position.x,
                        seed_position.y,
                        seed_position.z
                    )));
                }
                let optimum = self.evaluator.maximise_void_radius(&seed_position, &frame)?;
                let seed = optimum.point;
                debug!(radius = seed.radius, "Seed cross-section optimised.");
                if seed.radius < self.config.probe_radius {
                    warn!(
                        radius = seed.radius,
                        probe_radius = self.config.probe_radius,
                        "Free radius at the seed is smaller than the probe radius."
                    );
                }
                March::AdvanceForward {
                    frame,
                    seed,
                    path: vec![seed],
                }
            }
            March::AdvanceForward {
                frame,
                seed,
                mut path,
            } => {
                path.extend(self.advance(&seed.position, &frame)?);
                March::ReverseAccumulator { frame, seed, path }
            }
            March::ReverseAccumulator {
                frame,
                seed,
                mut path,
            } => {
                path.reverse();
                March::AdvanceBackward { frame, seed, path }
            }
            March::AdvanceBackward {
                frame,
                seed,
                mut path,
            } => {
                path.extend(self.advance(&seed.position, &frame.reversed())?);
                // Merged path runs against the channel direction at this point.
                path.reverse();
                March::Done { path }
            }
            March::Done { path } => March::Done { path },
        })
    }

    /// Marches from `start` along `frame`'s direction until the probe leaves
    /// the pore or the step budget is spent.
    fn advance(&self, start: &Point3<f64>, frame: &DirectionFrame) -> Result<RawPath, EngineError> {
        let mut points = Vec::new();
        let mut current = *start;

        for step in 1..=self.config.max_probe_steps {
            let origin = frame.advance(&current, self.config.step_length);
            let optimum = self.evaluator.maximise_void_radius(&origin, frame)?;
            if optimum.annealing_status == AnnealingStatus::MaxIterationsReached {
                trace!(step, "Annealing used its whole stage budget.");
            }
            current = optimum.point.position;
            points.push(optimum.point);

            debug!(
                step,
                radius = optimum.point.radius,
                refined = optimum.refined,
                "Probe advanced."
            );

            if optimum.point.radius > self.config.max_probe_radius {
                debug!(step, "Probe left the pore.");
                break;
            }
        }

        if points
            .last()
            .is_some_and(|p| p.radius <= self.config.max_probe_radius)
            && points.len() == self.config.max_probe_steps
        {
            debug!("Step budget exhausted before the probe left the pore.");
        }
        Ok(points)
    }
}

impl<N: NeighborSearch> PathFinder for ProbePathFinder<'_, N> {
    fn find_path(&self) -> Result<RawPath, EngineError> {
        let mut state = March::Init;
        loop {
            trace!(phase = ?state.phase(), "Entering marching phase.");
            state = match self.step(state)? {
                March::Done { path } => return Ok(path),
                next => next,
            };
        }
    }
}
