use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Poreaxis Developers",
    version,
    about = "Poreaxis CLI - Locate the central axis and radius profile of pores and channels in molecular structures.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to analyse frames in parallel.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find the pore centre line and radius profile in every frame of an atom file.
    Path(PathArgs),
}

/// Arguments for the `path` subcommand.
#[derive(Args, Debug)]
pub struct PathArgs {
    // --- Input / Output ---
    /// Atom file(s) with one or more frames separated by `END` lines.
    /// Frames of several files are analysed in the given order.
    #[arg(short, long, required = true, value_name = "PATH", num_args(1..))]
    pub input: Vec<PathBuf>,

    /// Output CSV file. With several frames, the frame number is appended to the file stem.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Van der Waals radius table (TOML, `[[vdwradii]]` entries) for atoms given by name.
    #[arg(short, long, value_name = "PATH")]
    pub radii: Option<PathBuf>,

    /// Radius used for atoms not covered by the radius table.
    #[arg(long, value_name = "FLOAT")]
    pub default_radius: Option<f64>,

    // --- Path Finding Overrides ---
    /// Path finding method: `inplane-optimised` or `naive-cylindrical`.
    #[arg(short, long, value_name = "METHOD")]
    pub method: Option<String>,

    /// Starting point of the probe.
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    pub seed_position: Option<Vec<f64>>,

    /// Direction of the channel axis.
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    pub direction: Option<Vec<f64>>,

    /// Distance between consecutive cross-sections.
    #[arg(long, value_name = "FLOAT")]
    pub step_length: Option<f64>,

    /// Free radius beyond which the probe counts as having left the pore.
    #[arg(long, value_name = "FLOAT")]
    pub max_probe_radius: Option<f64>,

    /// Maximum number of steps on each side of the seed.
    #[arg(long, value_name = "INT")]
    pub max_probe_steps: Option<usize>,

    /// Seed of the simulated-annealing random stream.
    #[arg(long, value_name = "INT")]
    pub random_seed: Option<u64>,

    // --- Output Overrides ---
    /// Number of evenly spaced profile samples written per frame.
    #[arg(short = 'n', long, value_name = "INT", conflicts_with = "spacing")]
    pub num_samples: Option<usize>,

    /// Arclength spacing of the profile samples written per frame.
    #[arg(long, value_name = "FLOAT")]
    pub spacing: Option<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S annealing.xi=2.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
