use nalgebra::{Point3, Vector3};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

fn require_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be a finite positive number (got {})", value),
        })
    }
}

fn require_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be a finite non-negative number (got {})", value),
        })
    }
}

fn require_at_least_one(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: "must be at least 1".to_string(),
        })
    }
}

/// Tunables of the simulated-annealing optimiser.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnealingConfig {
    /// Seed of the run-local random stream.
    pub seed: u64,
    /// Maximum number of temperature stages.
    pub max_cooling_iterations: usize,
    /// Candidates drawn per temperature stage.
    pub cost_samples_per_temperature: usize,
    /// Scale of the Metropolis acceptance exponent.
    pub xi: f64,
    /// Relative change of the best cost below which the run counts as converged.
    pub convergence_rel_tol: f64,
    pub initial_temperature: f64,
    /// Factor applied to the temperature after every stage, in (0, 1).
    pub cooling_factor: f64,
    /// Base amplitude of a candidate step.
    pub step_length_factor: f64,
    /// Enables per-dimension step sizes adapted to the acceptance ratio.
    pub adaptive_candidate_generation: bool,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            seed: 15011991,
            max_cooling_iterations: 1000,
            cost_samples_per_temperature: 10,
            xi: 3.0,
            convergence_rel_tol: 1e-3,
            initial_temperature: 0.1,
            cooling_factor: 0.98,
            step_length_factor: 0.001,
            adaptive_candidate_generation: true,
        }
    }
}

impl AnnealingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_at_least_one("max_cooling_iterations", self.max_cooling_iterations)?;
        require_at_least_one(
            "cost_samples_per_temperature",
            self.cost_samples_per_temperature,
        )?;
        require_positive("xi", self.xi)?;
        require_non_negative("convergence_rel_tol", self.convergence_rel_tol)?;
        require_positive("initial_temperature", self.initial_temperature)?;
        require_positive("step_length_factor", self.step_length_factor)?;
        if !(self.cooling_factor > 0.0 && self.cooling_factor < 1.0) {
            return Err(ConfigError::InvalidParameter {
                name: "cooling_factor",
                reason: format!("must lie strictly between 0 and 1 (got {})", self.cooling_factor),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct AnnealingConfigBuilder {
    seed: Option<u64>,
    max_cooling_iterations: Option<usize>,
    cost_samples_per_temperature: Option<usize>,
    xi: Option<f64>,
    convergence_rel_tol: Option<f64>,
    initial_temperature: Option<f64>,
    cooling_factor: Option<f64>,
    step_length_factor: Option<f64>,
    adaptive_candidate_generation: Option<bool>,
}

impl AnnealingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn max_cooling_iterations(mut self, iterations: usize) -> Self {
        self.max_cooling_iterations = Some(iterations);
        self
    }
    pub fn cost_samples_per_temperature(mut self, samples: usize) -> Self {
        self.cost_samples_per_temperature = Some(samples);
        self
    }
    pub fn xi(mut self, xi: f64) -> Self {
        self.xi = Some(xi);
        self
    }
    pub fn convergence_rel_tol(mut self, tolerance: f64) -> Self {
        self.convergence_rel_tol = Some(tolerance);
        self
    }
    pub fn initial_temperature(mut self, temperature: f64) -> Self {
        self.initial_temperature = Some(temperature);
        self
    }
    pub fn cooling_factor(mut self, factor: f64) -> Self {
        self.cooling_factor = Some(factor);
        self
    }
    pub fn step_length_factor(mut self, factor: f64) -> Self {
        self.step_length_factor = Some(factor);
        self
    }
    pub fn adaptive_candidate_generation(mut self, enabled: bool) -> Self {
        self.adaptive_candidate_generation = Some(enabled);
        self
    }

    pub fn build(self) -> Result<AnnealingConfig, ConfigError> {
        let defaults = AnnealingConfig::default();
        let config = AnnealingConfig {
            seed: self.seed.unwrap_or(defaults.seed),
            max_cooling_iterations: self
                .max_cooling_iterations
                .unwrap_or(defaults.max_cooling_iterations),
            cost_samples_per_temperature: self
                .cost_samples_per_temperature
                .unwrap_or(defaults.cost_samples_per_temperature),
            xi: self.xi.unwrap_or(defaults.xi),
            convergence_rel_tol: self
                .convergence_rel_tol
                .unwrap_or(defaults.convergence_rel_tol),
            initial_temperature: self
                .initial_temperature
                .unwrap_or(defaults.initial_temperature),
            cooling_factor: self.cooling_factor.unwrap_or(defaults.cooling_factor),
            step_length_factor: self
                .step_length_factor
                .unwrap_or(defaults.step_length_factor),
            adaptive_candidate_generation: self
                .adaptive_candidate_generation
                .unwrap_or(defaults.adaptive_candidate_generation),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Tunables of the Nelder–Mead local refiner.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexConfig {
    pub max_iterations: usize,
    /// Edge length of the initial simplex around the starting state.
    pub initial_shift: f64,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            initial_shift: 0.1,
        }
    }
}

impl SimplexConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("initial_shift", self.initial_shift)
    }
}

#[derive(Default)]
pub struct SimplexConfigBuilder {
    max_iterations: Option<usize>,
    initial_shift: Option<f64>,
}

impl SimplexConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }
    pub fn initial_shift(mut self, shift: f64) -> Self {
        self.initial_shift = Some(shift);
        self
    }

    pub fn build(self) -> Result<SimplexConfig, ConfigError> {
        let defaults = SimplexConfig::default();
        let config = SimplexConfig {
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
            initial_shift: self.initial_shift.unwrap_or(defaults.initial_shift),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Strategy used to march through the pore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathFindingMethod {
    /// Maximise the free radius in every cross-section.
    #[default]
    InplaneOptimised,
    /// Follow the channel direction straight from the seed with a constant radius.
    NaiveCylindrical,
}

impl fmt::Display for PathFindingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathFindingMethod::InplaneOptimised => write!(f, "inplane-optimised"),
            PathFindingMethod::NaiveCylindrical => write!(f, "naive-cylindrical"),
        }
    }
}

impl FromStr for PathFindingMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "inplane-optimised" | "inplane-optimized" | "inplane" => Ok(Self::InplaneOptimised),
            "naive-cylindrical" | "cylindrical" => Ok(Self::NaiveCylindrical),
            other => Err(ConfigError::InvalidParameter {
                name: "method",
                reason: format!("unknown path finding method '{}'", other),
            }),
        }
    }
}

/// Everything that controls how one frame's raw path is found.
#[derive(Debug, Clone, PartialEq)]
pub struct PathFindingConfig {
    pub method: PathFindingMethod,
    /// Distance between consecutive cross-sections.
    pub step_length: f64,
    /// Radius of the probe at the seed; also the constant radius of the
    /// cylindrical strategy.
    pub probe_radius: f64,
    /// Free radius beyond which the probe counts as having left the pore.
    pub max_probe_radius: f64,
    /// Maximum number of marching steps on each side of the seed.
    pub max_probe_steps: usize,
    pub seed_position: Point3<f64>,
    pub channel_direction: Vector3<f64>,
    /// Neighbour search radius. `None` derives it from the frame.
    pub neighbor_cutoff: Option<f64>,
    pub annealing: AnnealingConfig,
    pub simplex: SimplexConfig,
}

impl PathFindingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("step_length", self.step_length)?;
        require_non_negative("probe_radius", self.probe_radius)?;
        require_positive("max_probe_radius", self.max_probe_radius)?;
        if self.max_probe_radius < self.probe_radius {
            return Err(ConfigError::InvalidParameter {
                name: "max_probe_radius",
                reason: format!(
                    "must not be smaller than the probe radius ({} < {})",
                    self.max_probe_radius, self.probe_radius
                ),
            });
        }
        if self.seed_position.iter().any(|c| !c.is_finite()) {
            return Err(ConfigError::InvalidParameter {
                name: "seed_position",
                reason: "coordinates must be finite".to_string(),
            });
        }
        let norm = self.channel_direction.norm();
        if !norm.is_finite() || norm == 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "channel_direction",
                reason: "must be a finite vector of non-zero length".to_string(),
            });
        }
        if let Some(cutoff) = self.neighbor_cutoff {
            require_positive("neighbor_cutoff", cutoff)?;
        }
        self.annealing.validate()?;
        self.simplex.validate()
    }

    /// Neighbour search radius for a frame whose largest atom radius is `max_vdw_radius`.
    pub fn resolve_neighbor_cutoff(&self, max_vdw_radius: f64) -> f64 {
        self.neighbor_cutoff
            .unwrap_or(self.max_probe_radius + 2.0 * max_vdw_radius)
    }
}

#[derive(Default)]
pub struct PathFindingConfigBuilder {
    method: Option<PathFindingMethod>,
    step_length: Option<f64>,
    probe_radius: Option<f64>,
    max_probe_radius: Option<f64>,
    max_probe_steps: Option<usize>,
    seed_position: Option<Point3<f64>>,
    channel_direction: Option<Vector3<f64>>,
    neighbor_cutoff: Option<f64>,
    annealing: Option<AnnealingConfig>,
    simplex: Option<SimplexConfig>,
}

impl PathFindingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: PathFindingMethod) -> Self {
        self.method = Some(method);
        self
    }
    pub fn step_length(mut self, length: f64) -> Self {
        self.step_length = Some(length);
        self
    }
    pub fn probe_radius(mut self, radius: f64) -> Self {
        self.probe_radius = Some(radius);
        self
    }
    pub fn max_probe_radius(mut self, radius: f64) -> Self {
        self.max_probe_radius = Some(radius);
        self
    }
    pub fn max_probe_steps(mut self, steps: usize) -> Self {
        self.max_probe_steps = Some(steps);
        self
    }
    pub fn seed_position(mut self, position: Point3<f64>) -> Self {
        self.seed_position = Some(position);
        self
    }
    pub fn channel_direction(mut self, direction: Vector3<f64>) -> Self {
        self.channel_direction = Some(direction);
        self
    }
    pub fn neighbor_cutoff(mut self, cutoff: f64) -> Self {
        self.neighbor_cutoff = Some(cutoff);
        self
    }
    pub fn annealing(mut self, config: AnnealingConfig) -> Self {
        self.annealing = Some(config);
        self
    }
    pub fn simplex(mut self, config: SimplexConfig) -> Self {
        self.simplex = Some(config);
        self
    }

    pub fn build(self) -> Result<PathFindingConfig, ConfigError> {
        let config = PathFindingConfig {
            method: self.method.unwrap_or_default(),
            step_length: self.step_length.unwrap_or(0.1),
            probe_radius: self.probe_radius.unwrap_or(0.0),
            max_probe_radius: self.max_probe_radius.unwrap_or(1.0),
            max_probe_steps: self.max_probe_steps.unwrap_or(1000),
            seed_position: self
                .seed_position
                .ok_or(ConfigError::MissingParameter("seed_position"))?,
            channel_direction: self
                .channel_direction
                .ok_or(ConfigError::MissingParameter("channel_direction"))?,
            neighbor_cutoff: self.neighbor_cutoff,
            annealing: self.annealing.unwrap_or_default(),
            simplex: self.simplex.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Controls how a raw path is turned into a continuous curve.
#[derive(Debug, Clone, PartialEq)]
pub struct MolecularPathConfig {
    /// How far beyond either end the path stays defined.
    pub extrapolation_distance: f64,
}

impl Default for MolecularPathConfig {
    fn default() -> Self {
        Self {
            extrapolation_distance: 1.0,
        }
    }
}

impl MolecularPathConfig {
    pub fn new(extrapolation_distance: f64) -> Result<Self, ConfigError> {
        let config = Self {
            extrapolation_distance,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_negative("extrapolation_distance", self.extrapolation_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_builder() -> PathFindingConfigBuilder {
        PathFindingConfigBuilder::new()
            .seed_position(Point3::origin())
            .channel_direction(Vector3::z())
    }

    fn invalid_name(result: Result<PathFindingConfig, ConfigError>) -> &'static str {
        match result {
            Err(ConfigError::InvalidParameter { name, .. }) => name,
            other => panic!("expected an invalid parameter error, got {:?}", other),
        }
    }

    #[test]
    fn builder_fills_in_defaults() {
        let config = minimal_builder().build().unwrap();
        assert_eq!(config.method, PathFindingMethod::InplaneOptimised);
        assert_eq!(config.step_length, 0.1);
        assert_eq!(config.probe_radius, 0.0);
        assert_eq!(config.max_probe_radius, 1.0);
        assert_eq!(config.max_probe_steps, 1000);
        assert_eq!(config.neighbor_cutoff, None);
        assert_eq!(config.annealing.seed, 15011991);
        assert_eq!(config.annealing.max_cooling_iterations, 1000);
        assert_eq!(config.annealing.cost_samples_per_temperature, 10);
        assert!(config.annealing.adaptive_candidate_generation);
        assert_eq!(config.simplex.max_iterations, 100);
    }

    #[test]
    fn builder_requires_seed_and_direction() {
        let missing_seed = PathFindingConfigBuilder::new()
            .channel_direction(Vector3::z())
            .build();
        assert_eq!(
            missing_seed,
            Err(ConfigError::MissingParameter("seed_position"))
        );

        let missing_direction = PathFindingConfigBuilder::new()
            .seed_position(Point3::origin())
            .build();
        assert_eq!(
            missing_direction,
            Err(ConfigError::MissingParameter("channel_direction"))
        );
    }

    #[test]
    fn zero_direction_is_rejected() {
        let result = minimal_builder().channel_direction(Vector3::zeros()).build();
        assert_eq!(invalid_name(result), "channel_direction");
    }

    #[test]
    fn non_positive_lengths_are_rejected() {
        assert_eq!(
            invalid_name(minimal_builder().step_length(0.0).build()),
            "step_length"
        );
        assert_eq!(
            invalid_name(minimal_builder().probe_radius(-0.5).build()),
            "probe_radius"
        );
        assert_eq!(
            invalid_name(minimal_builder().neighbor_cutoff(-1.0).build()),
            "neighbor_cutoff"
        );
        assert_eq!(
            invalid_name(minimal_builder().step_length(f64::NAN).build()),
            "step_length"
        );
    }

    #[test]
    fn max_probe_radius_must_cover_probe_radius() {
        let result = minimal_builder()
            .probe_radius(2.0)
            .max_probe_radius(1.0)
            .build();
        assert_eq!(invalid_name(result), "max_probe_radius");
    }

    #[test]
    fn zero_probe_steps_are_legal() {
        let config = minimal_builder().max_probe_steps(0).build().unwrap();
        assert_eq!(config.max_probe_steps, 0);
    }

    #[test]
    fn annealing_builder_validates_schedule() {
        for factor in [0.0, 1.0, 1.5] {
            let result = AnnealingConfigBuilder::new().cooling_factor(factor).build();
            assert!(matches!(
                result,
                Err(ConfigError::InvalidParameter {
                    name: "cooling_factor",
                    ..
                })
            ));
        }
        assert!(matches!(
            AnnealingConfigBuilder::new()
                .cost_samples_per_temperature(0)
                .build(),
            Err(ConfigError::InvalidParameter {
                name: "cost_samples_per_temperature",
                ..
            })
        ));
        assert!(matches!(
            AnnealingConfigBuilder::new().initial_temperature(0.0).build(),
            Err(ConfigError::InvalidParameter {
                name: "initial_temperature",
                ..
            })
        ));
        assert!(AnnealingConfigBuilder::new()
            .convergence_rel_tol(0.0)
            .build()
            .is_ok());
    }

    #[test]
    fn nested_configs_are_validated_by_path_finding_builder() {
        let bad_annealing = AnnealingConfig {
            xi: -1.0,
            ..AnnealingConfig::default()
        };
        assert_eq!(
            invalid_name(minimal_builder().annealing(bad_annealing).build()),
            "xi"
        );
    }

    #[test]
    fn simplex_builder_rejects_zero_shift() {
        assert!(SimplexConfigBuilder::new().initial_shift(0.0).build().is_err());
        let config = SimplexConfigBuilder::new().max_iterations(0).build().unwrap();
        assert_eq!(config.max_iterations, 0);
    }

    #[test]
    fn default_cutoff_derives_from_frame() {
        let config = minimal_builder().max_probe_radius(3.0).build().unwrap();
        assert_eq!(config.resolve_neighbor_cutoff(1.5), 6.0);

        let explicit = minimal_builder().neighbor_cutoff(4.0).build().unwrap();
        assert_eq!(explicit.resolve_neighbor_cutoff(1.5), 4.0);
    }

    #[test]
    fn molecular_path_config_rejects_negative_extrapolation() {
        assert!(MolecularPathConfig::new(-0.1).is_err());
        assert_eq!(MolecularPathConfig::new(0.0).unwrap().extrapolation_distance, 0.0);
    }

    #[test]
    fn method_parses_from_kebab_case() {
        assert_eq!(
            "inplane-optimised".parse::<PathFindingMethod>().unwrap(),
            PathFindingMethod::InplaneOptimised
        );
        assert_eq!(
            "NAIVE_CYLINDRICAL".parse::<PathFindingMethod>().unwrap(),
            PathFindingMethod::NaiveCylindrical
        );
        assert!("spiral".parse::<PathFindingMethod>().is_err());
        assert_eq!(
            PathFindingMethod::NaiveCylindrical.to_string(),
            "naive-cylindrical"
        );
    }
}
