use crate::cli::PathArgs;
use crate::error::{CliError, Result};
use nalgebra::{Point3, Vector3};
use poreaxis::engine::config as core_config;
use serde::Deserialize;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const DEFAULT_PROFILE_SAMPLES: usize = 1000;
const DEFAULT_CHANNEL_DIRECTION: [f64; 3] = [0.0, 0.0, 1.0];

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialPathFindingConfig {
    method: Option<String>,
    step_length: Option<f64>,
    probe_radius: Option<f64>,
    max_probe_radius: Option<f64>,
    max_probe_steps: Option<usize>,
    seed_position: Option<[f64; 3]>,
    channel_direction: Option<[f64; 3]>,
    neighbor_cutoff: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialAnnealingConfig {
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

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialSimplexConfig {
    max_iterations: Option<usize>,
    initial_shift: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialMolecularPathConfig {
    extrapolation_distance: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialOutputConfig {
    num_samples: Option<usize>,
    spacing: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialRadiiConfig {
    table: Option<PathBuf>,
    default_radius: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialPoreConfig {
    path_finding: Option<PartialPathFindingConfig>,
    annealing: Option<PartialAnnealingConfig>,
    simplex: Option<PartialSimplexConfig>,
    molecular_path: Option<PartialMolecularPathConfig>,
    output: Option<PartialOutputConfig>,
    radii: Option<PartialRadiiConfig>,
}

/// How the fitted path is sampled for the CSV profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProfileSampling {
    Count(usize),
    Spacing(f64),
}

/// Fully merged settings of one `path` run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub path_finding: core_config::PathFindingConfig,
    pub molecular_path: core_config::MolecularPathConfig,
    pub sampling: ProfileSampling,
    pub radii_table: Option<PathBuf>,
    pub default_radius: Option<f64>,
}

impl PartialPoreConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Merges file values with command-line flags; flags and `--set` values win.
    pub fn merge_with_cli(mut self, args: &PathArgs) -> Result<RunConfig> {
        self.apply_set_values(&args.set_values)?;

        let path_finding = self.path_finding.take().unwrap_or_default();
        let annealing = self.annealing.take().unwrap_or_default();
        let simplex = self.simplex.take().unwrap_or_default();
        let molecular_path = self.molecular_path.take().unwrap_or_default();
        let output = self.output.take().unwrap_or_default();
        let radii = self.radii.take().unwrap_or_default();

        let annealing = Self::merge_annealing(annealing, args.random_seed)?;
        let simplex = Self::merge_simplex(simplex)?;

        let seed_position = match args.seed_position.as_deref() {
            Some(values) => Some(Self::vector_from_cli("--seed-position", values)?),
            None => path_finding.seed_position,
        }
        .ok_or_else(|| {
            CliError::Config(
                "A seed position is required, either as `path-finding.seed-position` in the config file or via --seed-position.".to_string(),
            )
        })?;
        let channel_direction = match args.direction.as_deref() {
            Some(values) => Self::vector_from_cli("--direction", values)?,
            None => path_finding
                .channel_direction
                .unwrap_or(DEFAULT_CHANNEL_DIRECTION),
        };

        let method = match args.method.as_ref().or(path_finding.method.as_ref()) {
            Some(name) => name
                .parse::<core_config::PathFindingMethod>()
                .map_err(|e| CliError::Config(e.to_string()))?,
            None => core_config::PathFindingMethod::default(),
        };

        let mut builder = core_config::PathFindingConfigBuilder::new()
            .method(method)
            .seed_position(Point3::from(seed_position))
            .channel_direction(Vector3::from(channel_direction))
            .annealing(annealing)
            .simplex(simplex);
        if let Some(value) = args.step_length.or(path_finding.step_length) {
            builder = builder.step_length(value);
        }
        if let Some(value) = path_finding.probe_radius {
            builder = builder.probe_radius(value);
        }
        if let Some(value) = args.max_probe_radius.or(path_finding.max_probe_radius) {
            builder = builder.max_probe_radius(value);
        }
        if let Some(value) = args.max_probe_steps.or(path_finding.max_probe_steps) {
            builder = builder.max_probe_steps(value);
        }
        if let Some(value) = path_finding.neighbor_cutoff {
            builder = builder.neighbor_cutoff(value);
        }
        let path_finding = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let molecular_path = match molecular_path.extrapolation_distance {
            Some(distance) => core_config::MolecularPathConfig::new(distance)
                .map_err(|e| CliError::Config(e.to_string()))?,
            None => core_config::MolecularPathConfig::default(),
        };

        Ok(RunConfig {
            path_finding,
            molecular_path,
            sampling: Self::merge_sampling(args, output)?,
            radii_table: args.radii.clone().or(radii.table),
            default_radius: args.default_radius.or(radii.default_radius),
        })
    }

    fn merge_annealing(
        partial: PartialAnnealingConfig,
        cli_seed: Option<u64>,
    ) -> Result<core_config::AnnealingConfig> {
        let mut builder = core_config::AnnealingConfigBuilder::new();
        if let Some(value) = cli_seed.or(partial.seed) {
            builder = builder.seed(value);
        }
        if let Some(value) = partial.max_cooling_iterations {
            builder = builder.max_cooling_iterations(value);
        }
        if let Some(value) = partial.cost_samples_per_temperature {
            builder = builder.cost_samples_per_temperature(value);
        }
        if let Some(value) = partial.xi {
            builder = builder.xi(value);
        }
        if let Some(value) = partial.convergence_rel_tol {
            builder = builder.convergence_rel_tol(value);
        }
        if let Some(value) = partial.initial_temperature {
            builder = builder.initial_temperature(value);
        }
        if let Some(value) = partial.cooling_factor {
            builder = builder.cooling_factor(value);
        }
        if let Some(value) = partial.step_length_factor {
            builder = builder.step_length_factor(value);
        }
        if let Some(value) = partial.adaptive_candidate_generation {
            builder = builder.adaptive_candidate_generation(value);
        }
        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn merge_simplex(partial: PartialSimplexConfig) -> Result<core_config::SimplexConfig> {
        let mut builder = core_config::SimplexConfigBuilder::new();
        if let Some(value) = partial.max_iterations {
            builder = builder.max_iterations(value);
        }
        if let Some(value) = partial.initial_shift {
            builder = builder.initial_shift(value);
        }
        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn merge_sampling(args: &PathArgs, file: PartialOutputConfig) -> Result<ProfileSampling> {
        let sampling = match (args.num_samples, args.spacing) {
            (Some(count), _) => ProfileSampling::Count(count),
            (None, Some(spacing)) => ProfileSampling::Spacing(spacing),
            (None, None) => match (file.num_samples, file.spacing) {
                (Some(_), Some(_)) => {
                    return Err(CliError::Config(
                        "`output.num-samples` and `output.spacing` are mutually exclusive."
                            .to_string(),
                    ));
                }
                (Some(count), None) => ProfileSampling::Count(count),
                (None, Some(spacing)) => ProfileSampling::Spacing(spacing),
                (None, None) => ProfileSampling::Count(DEFAULT_PROFILE_SAMPLES),
            },
        };
        match sampling {
            ProfileSampling::Count(count) if count < 2 => Err(CliError::Config(format!(
                "At least 2 profile samples are required (got {}).",
                count
            ))),
            ProfileSampling::Spacing(spacing) if !(spacing.is_finite() && spacing > 0.0) => {
                Err(CliError::Config(format!(
                    "Profile spacing must be a positive number (got {}).",
                    spacing
                )))
            }
            valid => Ok(valid),
        }
    }

    fn vector_from_cli(flag: &str, values: &[f64]) -> Result<[f64; 3]> {
        <[f64; 3]>::try_from(values).map_err(|_| {
            CliError::Argument(format!("{} expects exactly 3 numbers", flag))
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value) = kv_pair.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                ))
            })?;
            let (key, value) = (key.trim(), value.trim());

            match key.split_once('.') {
                Some(("path-finding", field)) => {
                    let section = self.path_finding.get_or_insert_with(Default::default);
                    match field {
                        "method" => section.method = Some(value.to_string()),
                        "step-length" => section.step_length = Some(parse_value(key, value)?),
                        "probe-radius" => section.probe_radius = Some(parse_value(key, value)?),
                        "max-probe-radius" => {
                            section.max_probe_radius = Some(parse_value(key, value)?)
                        }
                        "max-probe-steps" => {
                            section.max_probe_steps = Some(parse_value(key, value)?)
                        }
                        "seed-position" => section.seed_position = Some(parse_vector(key, value)?),
                        "channel-direction" => {
                            section.channel_direction = Some(parse_vector(key, value)?)
                        }
                        "neighbor-cutoff" => {
                            section.neighbor_cutoff = Some(parse_value(key, value)?)
                        }
                        _ => return Err(unsupported_key(key)),
                    }
                }
                Some(("annealing", field)) => {
                    let section = self.annealing.get_or_insert_with(Default::default);
                    match field {
                        "seed" => section.seed = Some(parse_value(key, value)?),
                        "max-cooling-iterations" => {
                            section.max_cooling_iterations = Some(parse_value(key, value)?)
                        }
                        "cost-samples-per-temperature" => {
                            section.cost_samples_per_temperature = Some(parse_value(key, value)?)
                        }
                        "xi" => section.xi = Some(parse_value(key, value)?),
                        "convergence-rel-tol" => {
                            section.convergence_rel_tol = Some(parse_value(key, value)?)
                        }
                        "initial-temperature" => {
                            section.initial_temperature = Some(parse_value(key, value)?)
                        }
                        "cooling-factor" => section.cooling_factor = Some(parse_value(key, value)?),
                        "step-length-factor" => {
                            section.step_length_factor = Some(parse_value(key, value)?)
                        }
                        "adaptive-candidate-generation" => {
                            section.adaptive_candidate_generation = Some(parse_value(key, value)?)
                        }
                        _ => return Err(unsupported_key(key)),
                    }
                }
                Some(("simplex", field)) => {
                    let section = self.simplex.get_or_insert_with(Default::default);
                    match field {
                        "max-iterations" => section.max_iterations = Some(parse_value(key, value)?),
                        "initial-shift" => section.initial_shift = Some(parse_value(key, value)?),
                        _ => return Err(unsupported_key(key)),
                    }
                }
                Some(("molecular-path", "extrapolation-distance")) => {
                    self.molecular_path
                        .get_or_insert_with(Default::default)
                        .extrapolation_distance = Some(parse_value(key, value)?);
                }
                Some(("output", field)) => {
                    let section = self.output.get_or_insert_with(Default::default);
                    match field {
                        "num-samples" => {
                            section.num_samples = Some(parse_value(key, value)?);
                            section.spacing = None;
                        }
                        "spacing" => {
                            section.spacing = Some(parse_value(key, value)?);
                            section.num_samples = None;
                        }
                        _ => return Err(unsupported_key(key)),
                    }
                }
                Some(("radii", "default-radius")) => {
                    self.radii
                        .get_or_insert_with(Default::default)
                        .default_radius = Some(parse_value(key, value)?);
                }
                _ => return Err(unsupported_key(key)),
            }
        }
        Ok(())
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().map_err(|e: T::Err| {
        CliError::Config(format!("Invalid value for {}: '{}' ({})", key, value, e))
    })
}

fn parse_vector(key: &str, value: &str) -> Result<[f64; 3]> {
    let components = value
        .split(',')
        .map(|component| parse_value::<f64>(key, component.trim()))
        .collect::<Result<Vec<_>>>()?;
    <[f64; 3]>::try_from(components).map_err(|_| {
        CliError::Config(format!(
            "Invalid value for {}: '{}' (expected X,Y,Z)",
            key, value
        ))
    })
}

fn unsupported_key(key: &str) -> CliError {
    CliError::Config(format!("Unsupported configuration key for --set: '{}'", key))
}
