use crate::cli::PathArgs;
use crate::config::{PartialPoreConfig, ProfileSampling, RunConfig};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use poreaxis::{
    core::{
        io::{atoms::read_frames_from_path, profile::write_profile_to_path},
        models::atom::{AtomRecord, AtomSphere},
        path::{MolecularPath, ProfileSample},
        radii::VdwRadiusProvider,
    },
    engine::progress::ProgressReporter,
    workflows,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub fn run(args: PathArgs) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialPoreConfig::from_file(path)?,
        None => PartialPoreConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args)?;

    let provider = load_radius_provider(&config)?;
    let frames = load_frames(&args.input, &provider)?;
    if frames.is_empty() {
        return Err(CliError::Argument(
            "The input files do not contain any atoms.".to_string(),
        ));
    }

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Analysing {} frame(s) with the {} method...",
        frames.len(),
        config.path_finding.method
    );
    let results = workflows::pore::run_trajectory(
        &frames,
        &config.path_finding,
        &config.molecular_path,
        &reporter,
    )?;

    let total = results.len();
    let mut written = 0;
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(pore) => {
                let output_path = generate_output_path(&args.output, index, total);
                let samples = sample_profile(&pore.path, config.sampling)?;
                write_profile_to_path(&samples, &output_path).map_err(|e| {
                    CliError::ProfileOutput {
                        path: output_path.clone(),
                        source: e.into(),
                    }
                })?;
                let (s_min, r_min) = pore.path.min_radius();
                println!(
                    "✓ Frame {}: length {:.3}, minimum radius {:.3} at s = {:.3}, volume {:.3} -> {}",
                    index,
                    pore.path.length(),
                    r_min,
                    s_min,
                    pore.path.volume(),
                    output_path.display()
                );
                written += 1;
            }
            Err(e) if e.is_recoverable() => {
                warn!(frame = index, "Skipping frame: {}", e);
                println!("  Frame {} skipped: {}", index, e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    if written == 0 {
        return Err(CliError::Other(anyhow::anyhow!(
            "No frame produced a pore path ({} frame(s) skipped).",
            progress_handler.failed_frames()
        )));
    }
    info!(written, skipped = total - written, "Profiles written.");
    Ok(())
}

fn load_radius_provider(config: &RunConfig) -> Result<VdwRadiusProvider> {
    let provider = match &config.radii_table {
        Some(path) => {
            info!("Loading van der Waals radii from {:?}", path);
            VdwRadiusProvider::load(path).map_err(|e| CliError::FileParsing {
                path: path.clone(),
                source: e.into(),
            })?
        }
        None => VdwRadiusProvider::new(Vec::new()).map_err(|e| CliError::Config(e.to_string()))?,
    };
    match config.default_radius {
        Some(radius) => provider
            .with_default_radius(radius)
            .map_err(|e| CliError::Config(e.to_string())),
        None => Ok(provider),
    }
}

fn load_frames(inputs: &[PathBuf], provider: &VdwRadiusProvider) -> Result<Vec<Vec<AtomSphere>>> {
    let mut frames = Vec::new();
    for input in inputs {
        info!("Loading atom frames from {:?}", input);
        let records: Vec<Vec<AtomRecord>> =
            read_frames_from_path(input).map_err(|e| CliError::FileParsing {
                path: input.clone(),
                source: e.into(),
            })?;
        for frame in records {
            let spheres = provider
                .resolve(&frame)
                .map_err(|e| CliError::FileParsing {
                    path: input.clone(),
                    source: e.into(),
                })?;
            frames.push(spheres);
        }
    }
    Ok(frames)
}

fn sample_profile(path: &MolecularPath, sampling: ProfileSampling) -> Result<Vec<ProfileSample>> {
    let samples = match sampling {
        ProfileSampling::Count(count) => path.resample_by_count(count),
        ProfileSampling::Spacing(spacing) => path.resample_by_spacing(spacing),
    };
    samples.map_err(|e| CliError::Config(e.to_string()))
}

fn generate_output_path(base_path: &Path, frame: usize, total_frames: usize) -> PathBuf {
    if total_frames <= 1 {
        return base_path.to_path_buf();
    }
    let stem = base_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "profile".to_string());
    let file_name = match base_path.extension() {
        Some(ext) => format!("{}_frame{}.{}", stem, frame, ext.to_string_lossy()),
        None => format!("{}_frame{}", stem, frame),
    };
    base_path.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn ring_frame(radius: f64) -> String {
        let mut lines = String::from("# x y z r\n");
        for i in 0..=12 {
            let z = -3.0 + 0.5 * i as f64;
            let offset = if i % 2 == 0 { 0.0 } else { std::f64::consts::PI / 8.0 };
            for k in 0..8 {
                let angle = offset + k as f64 * std::f64::consts::PI / 4.0;
                lines.push_str(&format!(
                    "{} {} {} 1.0\n",
                    radius * angle.cos(),
                    radius * angle.sin(),
                    z
                ));
            }
        }
        lines
    }

    fn path_args(argv: Vec<String>) -> PathArgs {
        let Commands::Path(args) = Cli::parse_from(argv).command;
        args
    }

    #[test]
    fn output_path_gets_frame_suffix_for_trajectories() {
        let base = Path::new("/tmp/out/profile.csv");
        assert_eq!(generate_output_path(base, 0, 1), base.to_path_buf());
        assert_eq!(
            generate_output_path(base, 4, 10),
            PathBuf::from("/tmp/out/profile_frame4.csv")
        );
        assert_eq!(
            generate_output_path(Path::new("profile"), 1, 2),
            PathBuf::from("profile_frame1")
        );
    }

    #[test]
    fn frames_with_named_atoms_need_a_radius_source() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("named.txt");
        fs::write(&input, "CA ALA C 0.0 0.0 0.0\nOW SOL O 1.0 0.0 0.0\n").unwrap();

        let without_radii = VdwRadiusProvider::new(Vec::new()).unwrap();
        assert!(matches!(
            load_frames(&[input.clone()], &without_radii),
            Err(CliError::FileParsing { .. })
        ));

        let with_default = VdwRadiusProvider::new(Vec::new())
            .unwrap()
            .with_default_radius(1.7)
            .unwrap();
        let frames = load_frames(&[input], &with_default).unwrap();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].iter().all(|atom| atom.radius == 1.7));
    }

    #[test]
    fn end_to_end_run_writes_one_profile_per_frame() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("pore.xyzr");
        fs::write(
            &input,
            format!("{}END\n{}END\n", ring_frame(3.0), ring_frame(3.5)),
        )
        .unwrap();
        let config_path = dir.path().join("pore.toml");
        fs::write(
            &config_path,
            r#"
            [path-finding]
            seed-position = [0.0, 0.0, 0.0]
            step-length = 0.5
            max-probe-radius = 4.0
            max-probe-steps = 20

            [annealing]
            max-cooling-iterations = 60
            initial-temperature = 0.05
            step-length-factor = 0.05
            adaptive-candidate-generation = false

            [output]
            num-samples = 50
            "#,
        )
        .unwrap();
        let output = dir.path().join("profile.csv");

        let args = path_args(vec![
            "poreaxis".to_string(),
            "path".to_string(),
            "-i".to_string(),
            input.to_string_lossy().into_owned(),
            "-o".to_string(),
            output.to_string_lossy().into_owned(),
            "-c".to_string(),
            config_path.to_string_lossy().into_owned(),
        ]);
        run(args).unwrap();

        for frame in 0..2 {
            let written = dir.path().join(format!("profile_frame{}.csv", frame));
            let content = fs::read_to_string(&written).unwrap();
            let mut lines = content.lines();
            assert_eq!(lines.next(), Some("s,x,y,z,radius"));
            assert_eq!(lines.count(), 50);
        }
    }

    #[test]
    fn run_fails_when_every_frame_is_degenerate() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("far.xyzr");
        fs::write(&input, "100.0 100.0 100.0 1.0\n").unwrap();
        let output = dir.path().join("profile.csv");

        let args = path_args(vec![
            "poreaxis".to_string(),
            "path".to_string(),
            "-i".to_string(),
            input.to_string_lossy().into_owned(),
            "-o".to_string(),
            output.to_string_lossy().into_owned(),
            "--seed-position".to_string(),
            "0".to_string(),
            "0".to_string(),
            "0".to_string(),
        ]);

        assert!(matches!(run(args), Err(CliError::Other(_))));
        assert!(!output.exists());
    }
}
